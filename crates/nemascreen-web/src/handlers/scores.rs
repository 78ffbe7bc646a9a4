//! Manual score entry.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use nemascreen_common::entities::{Experiment, ImageMode};
use nemascreen_common::error::NemascreenError;
use nemascreen_db::experiments::ExperimentRepository;
use nemascreen_db::scores::ScoreRepository;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::{AppEvent, SharedState};

pub async fn score_entry_page(
    State(state): State<SharedState>,
    Path(experiment_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.pool().clone();

    let row = ExperimentRepository::new(pool.clone())
        .get_well(&experiment_id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("experiment {experiment_id}")))?;

    let experiment = Experiment {
        id: row.id.clone(),
        plate_id: row.plate_id,
        well: row.well.clone(),
        worm_strain_id: row.worm_strain_id.clone(),
        library_stock_id: row.library_stock_id.clone(),
        is_junk: row.is_junk,
    };

    let thumbnail = experiment.image_url(&state.config.images, ImageMode::Thumbnail)?;

    let codes = ScoreRepository::new(pool).score_codes().await?;
    let code_buttons: String = codes
        .iter()
        .map(|code| {
            format!(
                r#"<label class="score-option"><input type="radio" name="score_code" value="{id}" required> {name} <span class="badge">{category}</span></label>"#,
                id = code.id,
                name = escape(code.display_name()),
                category = code.category().as_str(),
            )
        })
        .collect();

    let body = format!(
        r#"<p>{strain} × {stock} at {temperature:.1}°C on {date}</p>
<img src="{thumbnail}" alt="well {well}" class="score-image">
<form method="post" action="/score/{id}" class="entry-form">
{code_buttons}
<label>Scorer <input name="scorer" required></label>
<button type="submit" class="btn">Record score</button>
</form>"#,
        strain = escape(&row.worm_strain_id),
        stock = escape(&row.library_stock_id),
        temperature = row.temperature,
        date = row.date,
        well = escape(&row.well),
        id = escape(&experiment_id),
    );

    Ok(page(&format!("Score {}", escape(&experiment_id)), &body))
}

#[derive(Debug, Deserialize)]
pub struct ScoreForm {
    pub score_code: i32,
    pub scorer: String,
}

pub async fn score_submit(
    State(state): State<SharedState>,
    Path(experiment_id): Path<String>,
    Form(form): Form<ScoreForm>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ScoreRepository::new(state.db.pool().clone());

    let scorer = repo
        .get_scorer(&form.scorer)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("scorer {}", form.scorer)))?;

    repo.insert_manual(&experiment_id, form.score_code, scorer.id)
        .await?;

    state.publish(AppEvent::ScoreRecorded {
        experiment_id: experiment_id.clone(),
        score_code: form.score_code,
        scorer: scorer.username,
    });

    Ok(Redirect::to(&format!("/experiments/wells/{experiment_id}")))
}
