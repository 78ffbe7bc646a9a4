//! RNAi clone pages.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use nemascreen_common::error::NemascreenError;
use nemascreen_db::clones::CloneRepository;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::SharedState;

const SEARCH_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CloneSearch {
    pub q: Option<String>,
}

pub async fn clones_page(
    State(state): State<SharedState>,
    Query(search): Query<CloneSearch>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CloneRepository::new(state.db.pool().clone());
    let query = search.q.unwrap_or_default();
    let clones = repo.search(&query, SEARCH_LIMIT).await?;

    let rows: String = clones
        .iter()
        .map(|clone| {
            format!(
                r#"<tr><td><a href="/clones/{id}">{id}</a></td><td>{gene}</td><td>{description}</td></tr>"#,
                id = escape(&clone.id),
                gene = escape(clone.gene.as_deref().unwrap_or("")),
                description = escape(clone.functional_description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    let body = format!(
        r#"<form method="get" action="/clones" class="search-form">
    <input name="q" value="{q}" placeholder="clone or gene">
    <button type="submit" class="btn">Search</button>
</form>
<table class="data-table">
<thead><tr><th>Clone</th><th>Gene</th><th>Functional description</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        q = escape(&query),
    );

    Ok(page("RNAi clones", &body))
}

pub async fn clone_page(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let clone = CloneRepository::new(state.db.pool().clone())
        .get(&id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("clone {id}")))?;

    let control_note = if clone.is_control() {
        "<p class=\"badge\">Empty-vector control</p>"
    } else {
        ""
    };

    let body = format!(
        r#"{control_note}
<dl class="detail-list">
    <dt>Gene</dt><dd>{gene}</dd>
    <dt>Functional description</dt><dd>{description}</dd>
</dl>"#,
        gene = escape(clone.gene.as_deref().unwrap_or("—")),
        description = escape(clone.functional_description.as_deref().unwrap_or("—")),
    );

    Ok(page(&format!("Clone {}", escape(&clone.id)), &body))
}
