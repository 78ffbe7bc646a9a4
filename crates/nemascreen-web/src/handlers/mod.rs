//! Request handlers, one module per page group.

pub mod dashboard;
pub mod strains;
pub mod clones;
pub mod library;
pub mod experiments;
pub mod scores;
pub mod reports;

use axum::response::Html;

/// Navigation fragment shared across all pages.
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

/// Wrap page content in the shared layout.
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} — Nemascreen</title>
    <link rel="stylesheet" href="/static/css/main.css">
</head>
<body>
<div class="app-container">
{NAV_HTML}
<main class="content">
<h1>{title}</h1>
{body}
</main>
</div>
</body>
</html>"#
    ))
}

/// Escape text destined for HTML bodies and attributes.
pub fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_covers_markup_characters() {
        assert_eq!(escape(r#"<b a="1">&"#), "&lt;b a=&quot;1&quot;&gt;&amp;");
    }

    #[test]
    fn test_page_includes_nav_and_title() {
        let html = page("Strains", "<p>body</p>").0;
        assert!(html.contains("Strains — Nemascreen"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("nav"));
    }
}
