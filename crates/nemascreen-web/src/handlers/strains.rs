//! Worm strain pages.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use nemascreen_common::entities::WormStrain;
use nemascreen_db::strains::StrainRepository;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::{AppEvent, SharedState};

fn temperature_cell(temperature: Option<f64>) -> String {
    temperature.map_or_else(|| "—".to_string(), |t| format!("{t:.1}°C"))
}

pub async fn strains_page(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let strains = StrainRepository::new(state.db.pool().clone()).list().await?;

    let rows: String = strains
        .iter()
        .map(|strain| {
            let screen = if strain.restrictive_temperature.is_some() { "SUP" } else { "ENH" };
            let control = if strain.is_control() { r#" <span class="badge">control</span>"# } else { "" };
            format!(
                r#"<tr><td><a href="/reports/secondary-scores/{id}?screen={screen}">{id}</a>{control}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                escape(strain.gene.as_deref().unwrap_or("")),
                escape(strain.allele.as_deref().unwrap_or("")),
                escape(strain.genotype.as_deref().unwrap_or("")),
                temperature_cell(strain.permissive_temperature),
                temperature_cell(strain.restrictive_temperature),
                id = escape(&strain.id),
            )
        })
        .collect();

    let body = format!(
        r#"<table class="data-table">
<thead><tr><th>Strain</th><th>Gene</th><th>Allele</th><th>Genotype</th><th>Permissive</th><th>Restrictive</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<h2>Add strain</h2>
<form method="post" action="/strains" class="entry-form">
    <label>Strain <input name="id" required></label>
    <label>Gene <input name="gene"></label>
    <label>Allele <input name="allele"></label>
    <label>Genotype <input name="genotype"></label>
    <label>Permissive temperature <input name="permissive_temperature" type="number" step="0.1"></label>
    <label>Restrictive temperature <input name="restrictive_temperature" type="number" step="0.1"></label>
    <button type="submit" class="btn">Create</button>
</form>"#
    );

    Ok(page("Worm strains", &body))
}

#[derive(Debug, Deserialize)]
pub struct AddStrainForm {
    pub id: String,
    pub gene: Option<String>,
    pub allele: Option<String>,
    pub genotype: Option<String>,
    #[serde(default, deserialize_with = "nemascreen_common::serde_helpers::empty_as_none")]
    pub permissive_temperature: Option<f64>,
    #[serde(default, deserialize_with = "nemascreen_common::serde_helpers::empty_as_none")]
    pub restrictive_temperature: Option<f64>,
}

pub async fn add_strain(
    State(state): State<SharedState>,
    Form(form): Form<AddStrainForm>,
) -> Result<impl IntoResponse, ApiError> {
    let strain = WormStrain {
        id: form.id,
        gene: form.gene.filter(|s| !s.is_empty()),
        allele: form.allele.filter(|s| !s.is_empty()),
        genotype: form.genotype.filter(|s| !s.is_empty()),
        permissive_temperature: form.permissive_temperature,
        restrictive_temperature: form.restrictive_temperature,
    };

    StrainRepository::new(state.db.pool().clone()).insert(&strain).await?;

    state.publish(AppEvent::Notification {
        level: "info".to_string(),
        message: format!("Created worm strain {}", strain.id),
    });

    Ok(Redirect::to("/strains"))
}
