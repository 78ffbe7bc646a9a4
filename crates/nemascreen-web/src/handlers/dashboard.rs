//! Dashboard handler — landing page with database overview.

use axum::extract::State;
use axum::response::Html;
use nemascreen_db::clones::CloneRepository;
use nemascreen_db::experiments::ExperimentRepository;
use nemascreen_db::library::LibraryRepository;
use nemascreen_db::scores::ScoreRepository;
use nemascreen_db::strains::StrainRepository;

use crate::state::SharedState;

pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let pool = state.db.pool().clone();

    let strains = StrainRepository::new(pool.clone()).count().await.unwrap_or(0);
    let clones = CloneRepository::new(pool.clone()).count().await.unwrap_or(0);
    let stocks = LibraryRepository::new(pool.clone()).count_stocks().await.unwrap_or(0);
    let plates = ExperimentRepository::new(pool.clone()).count_plates().await.unwrap_or(0);

    let score_repo = ScoreRepository::new(pool);
    let manual = score_repo.count_manual().await.unwrap_or(0);
    let devstar = score_repo.count_devstar().await.unwrap_or(0);

    let body = format!(
        r#"<div class="stat-grid">
    <div class="stat-tile"><span class="stat-value">{strains}</span><span class="stat-label">Worm strains</span></div>
    <div class="stat-tile"><span class="stat-value">{clones}</span><span class="stat-label">RNAi clones</span></div>
    <div class="stat-tile"><span class="stat-value">{stocks}</span><span class="stat-label">Library stocks</span></div>
    <div class="stat-tile"><span class="stat-value">{plates}</span><span class="stat-label">Experiment plates</span></div>
    <div class="stat-tile"><span class="stat-value">{manual}</span><span class="stat-label">Manual scores</span></div>
    <div class="stat-tile"><span class="stat-value">{devstar}</span><span class="stat-label">DevStaR scores</span></div>
</div>
<p><a href="/experiments" class="btn">Browse experiments</a></p>"#
    );

    super::page("Dashboard", &body)
}
