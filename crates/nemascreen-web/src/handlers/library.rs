//! Library plate and stock pages.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use nemascreen_common::error::NemascreenError;
use nemascreen_db::library::LibraryRepository;

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::SharedState;

pub async fn library_plates_page(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let plates = LibraryRepository::new(state.db.pool().clone()).plates().await?;

    let rows: String = plates
        .iter()
        .map(|plate| {
            let stage = plate
                .screen_stage
                .map_or_else(|| "—".to_string(), |s| s.to_string());
            format!(
                r#"<tr><td><a href="/library/plates/{id}">{id}</a></td><td>{stage}</td><td>{wells}</td></tr>"#,
                id = escape(&plate.id),
                wells = plate.number_of_wells,
            )
        })
        .collect();

    let body = format!(
        r#"<table class="data-table">
<thead><tr><th>Plate</th><th>Screen stage</th><th>Wells</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
    );

    Ok(page("Library plates", &body))
}

pub async fn library_plate_page(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = LibraryRepository::new(state.db.pool().clone());

    let plate = repo
        .get_plate(&id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("library plate {id}")))?;

    let stocks = repo.stocks_for_plate(&plate.id).await?;

    let rows: String = stocks
        .iter()
        .map(|stock| {
            let clone_cell = stock.intended_clone_id.as_deref().map_or_else(
                || "—".to_string(),
                |clone| format!(r#"<a href="/clones/{0}">{0}</a>"#, escape(clone)),
            );
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&stock.well),
                clone_cell,
            )
        })
        .collect();

    let body = format!(
        r#"<table class="data-table">
<thead><tr><th>Well</th><th>Intended clone</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
    );

    Ok(page(&format!("Library plate {}", escape(&plate.id)), &body))
}

pub async fn library_stock_page(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stock = LibraryRepository::new(state.db.pool().clone())
        .get_stock(&id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("library stock {id}")))?;

    let clone_cell = stock.intended_clone_id.as_deref().map_or_else(
        || "—".to_string(),
        |clone| format!(r#"<a href="/clones/{0}">{0}</a>"#, escape(clone)),
    );

    let body = format!(
        r#"<dl class="detail-list">
    <dt>Plate</dt><dd><a href="/library/plates/{plate}">{plate}</a></dd>
    <dt>Well</dt><dd>{well}</dd>
    <dt>Intended clone</dt><dd>{clone_cell}</dd>
</dl>"#,
        plate = escape(&stock.plate_id),
        well = escape(&stock.well),
    );

    Ok(page(&format!("Library stock {}", escape(&stock.id)), &body))
}
