//! Experiment browsing, plate and well detail, and plate creation.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use nemascreen_common::entities::{Experiment, ImageMode};
use nemascreen_common::error::NemascreenError;
use nemascreen_db::experiments::{ExperimentFilter, ExperimentRepository, NewExperimentPlate};
use nemascreen_db::library::LibraryRepository;
use nemascreen_db::scores::ScoreRepository;
use nemascreen_db::strains::StrainRepository;
use nemascreen_scoring::most_relevant_score;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::{AppEvent, SharedState};

const FILTER_PER_PAGE: i64 = 100;

fn filter_form(filter: &ExperimentFilter) -> String {
    fn text(name: &str, label: &str, value: &Option<String>) -> String {
        format!(
            r#"<label>{label} <input name="{name}" value="{}"></label>"#,
            value.as_deref().map(escape).unwrap_or_default()
        )
    }
    fn num<T: std::fmt::Display>(name: &str, label: &str, value: &Option<T>) -> String {
        format!(
            r#"<label>{label} <input name="{name}" value="{}"></label>"#,
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        )
    }

    format!(
        r#"<form method="get" action="/experiments" class="filter-form">
{}{}{}{}{}{}{}{}{}{}{}{}{}{}
<label>Screen stage <input name="screen_stage" value="{}"></label>
<label>Junk <input name="is_junk" value="{}"></label>
<button type="submit" class="btn">Filter</button>
</form>"#,
        num("plate", "Exact plate", &filter.plate),
        num("plate_gte", "Min plate", &filter.plate_gte),
        num("plate_lte", "Max plate", &filter.plate_lte),
        text("well", "Well", &filter.well),
        text("worm_strain", "Worm strain", &filter.worm_strain),
        text("worm_gene", "Worm gene", &filter.worm_gene),
        text("worm_allele", "Worm allele", &filter.worm_allele),
        num("temperature", "Exact temp", &filter.temperature),
        num("temperature_gte", "Min temp", &filter.temperature_gte),
        num("temperature_lte", "Max temp", &filter.temperature_lte),
        num("date", "Date", &filter.date),
        num("date_gte", "Min date", &filter.date_gte),
        num("date_lte", "Max date", &filter.date_lte),
        text("library_plate", "Library plate", &filter.library_plate),
        filter.screen_stage.map(|s| s.to_string()).unwrap_or_default(),
        filter.is_junk.map(|j| j.to_string()).unwrap_or_default(),
    )
}

pub async fn experiments_page(
    State(state): State<SharedState>,
    Query(filter): Query<ExperimentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let form = filter_form(&filter);

    if !filter.has_criteria() {
        let repo = ExperimentRepository::new(state.db.pool().clone());
        let temperatures: Vec<String> = repo
            .distinct_temperatures()
            .await?
            .into_iter()
            .map(|t| format!("{t:.1}"))
            .collect();
        let dates: Vec<String> = repo
            .distinct_dates()
            .await?
            .into_iter()
            .map(|d| d.to_string())
            .collect();

        let body = format!(
            r#"{form}
<p class="text-muted">Enter at least one filter to list experiment wells.</p>
<p class="text-muted">Tested temperatures: {temperatures}</p>
<p class="text-muted">Experiment dates: {first_date} — {last_date}</p>
<h2>Create experiment plate</h2>
<form method="post" action="/experiments/plates" class="entry-form">
    <label>Plate id <input name="id" type="number" required></label>
    <label>Screen stage <input name="screen_stage" type="number" min="1" max="2" required></label>
    <label>Temperature <input name="temperature" type="number" step="0.1" required></label>
    <label>Date <input name="date" type="date" required></label>
    <label>Worm strain <input name="worm_strain" required></label>
    <label>Library plate <input name="library_plate" required></label>
    <label>Comment <input name="comment"></label>
    <button type="submit" class="btn">Create plate + wells</button>
</form>"#,
            temperatures = temperatures.join(", "),
            first_date = dates.first().map(String::as_str).unwrap_or("—"),
            last_date = dates.last().map(String::as_str).unwrap_or("—"),
        );
        return Ok(page("Experiments", &body));
    }

    let rows = ExperimentRepository::new(state.db.pool().clone())
        .filter(&filter, FILTER_PER_PAGE)
        .await?;

    let table_rows: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr{junk}><td><a href="/experiments/wells/{id}">{id}</a></td>
<td><a href="/experiments/plates/{plate}">{plate}</a></td>
<td>{well}</td><td>{strain}</td><td>{stock}</td>
<td>{temperature:.1}°C</td><td>{date}</td><td>{stage}</td></tr>"#,
                junk = if row.is_junk { r#" class="junk""# } else { "" },
                id = escape(&row.id),
                plate = row.plate_id,
                well = escape(&row.well),
                strain = escape(&row.worm_strain_id),
                stock = escape(&row.library_stock_id),
                temperature = row.temperature,
                date = row.date,
                stage = row.screen_stage,
            )
        })
        .collect();

    let body = format!(
        r#"{form}
<p>{count} wells (page {page})</p>
<table class="data-table">
<thead><tr><th>Well id</th><th>Plate</th><th>Well</th><th>Strain</th><th>Library stock</th><th>Temp</th><th>Date</th><th>Stage</th></tr></thead>
<tbody>{table_rows}</tbody>
</table>"#,
        count = rows.len(),
        page = filter.page.unwrap_or(1),
    );

    Ok(page("Experiments", &body))
}

/// GET /api/experiments - filtered experiment wells as JSON
pub async fn api_experiments(
    State(state): State<SharedState>,
    Query(filter): Query<ExperimentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = ExperimentRepository::new(state.db.pool().clone())
        .filter(&filter, FILTER_PER_PAGE)
        .await?;

    Ok(Json(rows))
}

pub async fn experiment_plate_page(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ExperimentRepository::new(state.db.pool().clone());

    let plate = repo
        .get_plate(id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("experiment plate {id}")))?;

    let wells = repo.wells_for_plate(id).await?;

    let rows: String = wells
        .iter()
        .map(|well| {
            format!(
                r#"<tr{junk}><td>{well_name}</td><td><a href="/experiments/wells/{id}">{id}</a></td><td>{strain}</td><td>{stock}</td></tr>"#,
                junk = if well.is_junk { r#" class="junk""# } else { "" },
                well_name = escape(&well.well),
                id = escape(&well.id),
                strain = escape(&well.worm_strain_id),
                stock = escape(&well.library_stock_id),
            )
        })
        .collect();

    let body = format!(
        r#"<dl class="detail-list">
    <dt>Screen stage</dt><dd>{stage}</dd>
    <dt>Temperature</dt><dd>{temperature:.1}°C</dd>
    <dt>Date</dt><dd>{date}</dd>
    <dt>Comment</dt><dd>{comment}</dd>
</dl>
<form method="post" action="/experiments/plates/{id}/set-junk" class="entry-form">
    <label>Junk <input name="is_junk" value="true"></label>
    <button type="submit" class="btn btn-outline">Set junk for all wells</button>
</form>
<table class="data-table">
<thead><tr><th>Well</th><th>Well id</th><th>Strain</th><th>Library stock</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        stage = plate.screen_stage,
        temperature = plate.temperature,
        date = plate.date,
        comment = escape(&plate.comment),
    );

    Ok(page(&format!("Experiment plate {id}"), &body))
}

#[derive(Debug, Deserialize)]
pub struct SetJunkForm {
    pub is_junk: bool,
}

/// POST /experiments/plates/{id}/set-junk - flag or unflag every well
/// of a plate.
pub async fn set_plate_junk(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Form(form): Form<SetJunkForm>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = ExperimentRepository::new(state.db.pool().clone())
        .set_plate_junk(id, form.is_junk)
        .await?;

    state.publish(AppEvent::Notification {
        level: "info".to_string(),
        message: format!("Marked {updated} wells of plate {id} junk={}", form.is_junk),
    });

    Ok(Redirect::to(&format!("/experiments/plates/{id}")))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlateForm {
    pub id: i64,
    pub screen_stage: i16,
    pub temperature: f64,
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub comment: String,
    pub worm_strain: String,
    pub library_plate: String,
    #[serde(default)]
    pub is_junk: bool,
}

/// POST /experiments/plates - create a plate plus its 96 wells from a
/// library plate's stocks.
pub async fn create_plate(
    State(state): State<SharedState>,
    Form(form): Form<CreatePlateForm>,
) -> Result<impl IntoResponse, ApiError> {
    let stocks = LibraryRepository::new(state.db.pool().clone())
        .stocks_by_well(&form.library_plate)
        .await?;

    if stocks.is_empty() {
        return Err(NemascreenError::NotFound(format!(
            "library plate {} stocks",
            form.library_plate
        ))
        .into());
    }

    let new_plate = NewExperimentPlate {
        id: form.id,
        screen_stage: form.screen_stage,
        temperature: form.temperature,
        date: form.date,
        comment: form.comment,
    };

    let (plate, _wells) = ExperimentRepository::new(state.db.pool().clone())
        .create_plate_and_wells(&new_plate, &form.worm_strain, &stocks, form.is_junk)
        .await?;

    state.publish(AppEvent::PlateCreated {
        plate_id: plate.id,
        worm_strain: form.worm_strain,
    });

    Ok(Redirect::to(&format!("/experiments/plates/{}", plate.id)))
}

pub async fn experiment_well_page(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.pool().clone();
    let experiments = ExperimentRepository::new(pool.clone());

    let row = experiments
        .get_well(&id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("experiment {id}")))?;

    let experiment = Experiment {
        id: row.id.clone(),
        plate_id: row.plate_id,
        well: row.well.clone(),
        worm_strain_id: row.worm_strain_id.clone(),
        library_stock_id: row.library_stock_id.clone(),
        is_junk: row.is_junk,
    };

    let images = &state.config.images;
    let image = experiment.image_url(images, ImageMode::Full)?;
    let thumbnail = experiment.image_url(images, ImageMode::Thumbnail)?;
    let devstar_image = experiment.image_url(images, ImageMode::Devstar)?;

    // Whether this well was run at the strain's restrictive (SUP) or
    // permissive (ENH) temperature, if either.
    let screen = StrainRepository::new(pool.clone())
        .get(&row.worm_strain_id)
        .await?
        .and_then(|strain| strain.screen_for_temperature(row.temperature))
        .map_or("—", |screen| screen.as_str());

    // Wild-type controls run alongside this well; if none exist at this
    // exact temperature, point at the nearest tested one.
    let control_temperature = experiments
        .closest_temperature(row.temperature)
        .await?
        .unwrap_or(row.temperature);

    let score_repo = ScoreRepository::new(pool);
    let manual = score_repo.manual_for_experiment(&id).await?;
    let devstar = score_repo.devstar_for_experiment(&id).await?;

    let most_relevant = most_relevant_score(&manual)
        .map(|score| format!("{} (code {})", score.category().as_str(), score.score_code))
        .unwrap_or_else(|_| "unscored".to_string());

    let manual_rows: String = manual
        .iter()
        .map(|score| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                score.score_code,
                score.category().as_str(),
                score.scorer_id,
                score.timestamp.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect();

    let devstar_rows: String = devstar
        .iter()
        .map(|score| {
            fn cell<T: std::fmt::Display>(value: &Option<T>) -> String {
                value.as_ref().map_or_else(|| "—".to_string(), |v| v.to_string())
            }
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                cell(&score.count_adult),
                cell(&score.count_larva),
                cell(&score.count_embryo),
                cell(&score.survival.map(|s| format!("{s:.3}"))),
                cell(&score.lethality.map(|l| format!("{l:.3}"))),
            )
        })
        .collect();

    let body = format!(
        r#"<dl class="detail-list">
    <dt>Plate</dt><dd><a href="/experiments/plates/{plate}">{plate}</a></dd>
    <dt>Well</dt><dd>{well} (row {well_row}, column {well_column}, {tile})</dd>
    <dt>Worm strain</dt><dd>{strain}</dd>
    <dt>Library stock</dt><dd><a href="/library/stocks/{stock}">{stock}</a></dd>
    <dt>Temperature</dt><dd>{temperature:.1}°C ({screen})</dd>
    <dt>Date</dt><dd>{date}</dd>
    <dt>Junk</dt><dd>{is_junk}</dd>
    <dt>Most relevant score</dt><dd>{most_relevant}</dd>
</dl>
<p>
    <a href="{image}">Image</a> ·
    <a href="{thumbnail}">Thumbnail</a> ·
    <a href="{devstar_image}">DevStaR overlay</a> ·
    <a href="/experiments?worm_strain=N2&amp;date={date}&amp;temperature={control_temperature}">N2 controls</a> ·
    <a href="/score/{id}" class="btn">Score</a>
</p>
<form method="post" action="/experiments/wells/{id}/toggle-junk">
    <button type="submit" class="btn btn-outline">Toggle junk</button>
</form>
<h2>Manual scores</h2>
<table class="data-table">
<thead><tr><th>Code</th><th>Category</th><th>Scorer</th><th>When</th></tr></thead>
<tbody>{manual_rows}</tbody>
</table>
<h2>DevStaR scores</h2>
<table class="data-table">
<thead><tr><th>Adults</th><th>Larvae</th><th>Embryos</th><th>Survival</th><th>Lethality</th></tr></thead>
<tbody>{devstar_rows}</tbody>
</table>"#,
        plate = row.plate_id,
        well = escape(&row.well),
        well_row = experiment.row(),
        well_column = experiment.column(),
        tile = experiment.tile()?,
        strain = escape(&row.worm_strain_id),
        stock = escape(&row.library_stock_id),
        temperature = row.temperature,
        date = row.date,
        is_junk = row.is_junk,
        id = escape(&id),
    );

    Ok(page(&format!("Experiment {}", escape(&id)), &body))
}

/// POST /experiments/wells/{id}/toggle-junk
pub async fn toggle_junk(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let is_junk = ExperimentRepository::new(state.db.pool().clone())
        .toggle_junk(&id)
        .await?;

    state.publish(AppEvent::JunkToggled {
        experiment_id: id.clone(),
        is_junk,
    });

    Ok(Redirect::to(&format!("/experiments/wells/{id}")))
}
