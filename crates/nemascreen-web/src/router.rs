//! Axum router — maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::handlers::{
    clones::{clone_page, clones_page},
    dashboard::dashboard,
    experiments::{
        api_experiments, create_plate, experiment_plate_page, experiment_well_page,
        experiments_page, set_plate_junk, toggle_junk,
    },
    library::{library_plate_page, library_plates_page, library_stock_page},
    reports::{
        api_positives, api_secondary_scores, secondary_candidates_page, secondary_scores_page,
    },
    scores::{score_entry_page, score_submit},
    strains::{add_strain, strains_page},
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/", get(dashboard))
        .route("/strains", get(strains_page).post(add_strain))
        .route("/clones", get(clones_page))
        .route("/clones/{id}", get(clone_page))
        .route("/library/plates", get(library_plates_page))
        .route("/library/plates/{id}", get(library_plate_page))
        .route("/library/stocks/{id}", get(library_stock_page))
        .route("/experiments", get(experiments_page))
        .route("/experiments/plates", post(create_plate))
        .route("/experiments/plates/{id}", get(experiment_plate_page))
        .route("/experiments/plates/{id}/set-junk", post(set_plate_junk))
        .route("/experiments/wells/{id}", get(experiment_well_page))
        .route("/experiments/wells/{id}/toggle-junk", post(toggle_junk))
        .route("/score/{id}", get(score_entry_page).post(score_submit))
        .route("/reports/secondary-scores/{strain}", get(secondary_scores_page))
        .route("/reports/secondary-candidates", get(secondary_candidates_page))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/experiments", get(api_experiments))
        .route("/api/positives", get(api_positives))
        .route("/api/secondary-scores/{strain}", get(api_secondary_scores))

        // Static files
        .nest_service("/static", ServeDir::new("static"))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
