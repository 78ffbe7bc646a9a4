//! Screen reports: suppressor secondary verdicts, secondary-screen
//! candidate selection, and positive lists.

use std::collections::BTreeSet;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use nemascreen_common::entities::{Screen, ScreenStage, WormStrain};
use nemascreen_common::error::NemascreenError;
use nemascreen_db::experiments::ExperimentRepository;
use nemascreen_db::scores::ScoreRepository;
use nemascreen_db::strains::StrainRepository;
use nemascreen_scoring::criteria::{
    passes_enh_secondary, passes_sup_positive_count, passes_sup_positive_percentage,
    passes_sup_positive_stringent,
};
use nemascreen_scoring::organize::{
    organize_most_relevant, select_candidates, summarize_stocks, StockSummary,
};
use nemascreen_scoring::rank_across_replicates;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::{escape, page};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct ScreenQuery {
    pub screen: Screen,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositiveRule {
    Percentage,
    Count,
    Stringent,
}

impl PositiveRule {
    fn predicate(self) -> fn(&[nemascreen_common::entities::ManualScore]) -> bool {
        match self {
            PositiveRule::Percentage => passes_sup_positive_percentage,
            PositiveRule::Count => passes_sup_positive_count,
            PositiveRule::Stringent => passes_sup_positive_stringent,
        }
    }
}

async fn strain_or_404(state: &SharedState, id: &str) -> Result<WormStrain, ApiError> {
    Ok(StrainRepository::new(state.db.pool().clone())
        .get(id)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("worm strain {id}")))?)
}

#[derive(Debug, Serialize)]
pub struct SecondaryScoresReport {
    pub strain: String,
    pub screen: Screen,
    pub num_passes_percentage: usize,
    pub num_passes_count: usize,
    pub num_passes_stringent: usize,
    pub stocks: Vec<StockSummary>,
}

async fn build_secondary_report(
    state: &SharedState,
    strain: &WormStrain,
    screen: Screen,
) -> Result<SecondaryScoresReport, ApiError> {
    let rows = ScoreRepository::new(state.db.pool().clone())
        .screen_score_rows(strain, screen, ScreenStage::Secondary)
        .await?;

    let collapsed = organize_most_relevant(rows);
    let stocks = summarize_stocks(&collapsed);

    Ok(SecondaryScoresReport {
        strain: strain.id.clone(),
        screen,
        num_passes_percentage: stocks.iter().filter(|s| s.passes_percentage).count(),
        num_passes_count: stocks.iter().filter(|s| s.passes_count).count(),
        num_passes_stringent: stocks.iter().filter(|s| s.passes_stringent).count(),
        stocks,
    })
}

/// GET /reports/secondary-scores/{strain}?screen= - strongest positives
/// on top, with each stock's verdict under the three rules.
pub async fn secondary_scores_page(
    State(state): State<SharedState>,
    Path(strain_id): Path<String>,
    Query(query): Query<ScreenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let strain = strain_or_404(&state, &strain_id).await?;
    let report = build_secondary_report(&state, &strain, query.screen).await?;

    fn verdict(pass: bool) -> &'static str {
        if pass {
            r#"<td class="pass">yes</td>"#
        } else {
            r#"<td class="fail">no</td>"#
        }
    }

    let rows: String = report
        .stocks
        .iter()
        .map(|summary| {
            // Most relevant replicates first in the strip.
            let strip: Vec<&str> = rank_across_replicates(&summary.scores)
                .into_iter()
                .map(|score| score.category().as_str())
                .collect();
            format!(
                "<tr><td>{}</td><td>{:.2}</td>{}{}{}<td>{}</td></tr>",
                escape(&summary.library_stock_id),
                summary.average_weight,
                verdict(summary.passes_stringent),
                verdict(summary.passes_percentage),
                verdict(summary.passes_count),
                strip.join(", "),
            )
        })
        .collect();

    let body = format!(
        r#"<p>{total} stocks scored · {stringent} pass stringent · {percentage} pass percentage · {count} pass count</p>
<table class="data-table">
<thead><tr><th>Library stock</th><th>Avg weight</th><th>Stringent</th><th>Percentage</th><th>Count</th><th>Replicates (most relevant first)</th></tr></thead>
<tbody>{rows}</tbody>
</table>"#,
        total = report.stocks.len(),
        stringent = report.num_passes_stringent,
        percentage = report.num_passes_percentage,
        count = report.num_passes_count,
    );

    Ok(page(
        &format!("Secondary scores — {} ({})", escape(&strain.id), report.screen.as_str()),
        &body,
    ))
}

/// GET /api/secondary-scores/{strain}?screen=
pub async fn api_secondary_scores(
    State(state): State<SharedState>,
    Path(strain_id): Path<String>,
    Query(query): Query<ScreenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let strain = strain_or_404(&state, &strain_id).await?;
    let report = build_secondary_report(&state, &strain, query.screen).await?;
    Ok(Json(report))
}

/// GET /reports/secondary-candidates?screen= - primary-screen stocks
/// strong enough to escalate into the secondary screen.
pub async fn secondary_candidates_page(
    State(state): State<SharedState>,
    Query(query): Query<ScreenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.pool().clone();
    let screen = query.screen;

    let strains = StrainRepository::new(pool.clone()).for_screen(screen).await?;
    let singles = ExperimentRepository::new(pool.clone())
        .single_replicate_experiments(screen)
        .await?;
    let scores = ScoreRepository::new(pool);

    let mut sections = String::new();
    let mut total = 0usize;

    for strain in &strains {
        let rows = scores
            .screen_score_rows(strain, screen, ScreenStage::Primary)
            .await?;
        let collapsed = organize_most_relevant(rows);

        let candidates = match screen {
            Screen::Enh => {
                select_candidates(&collapsed, |replicates| {
                    passes_enh_secondary(replicates, &singles)
                })
            }
            Screen::Sup => select_candidates(&collapsed, passes_sup_positive_count),
        };

        total += candidates.len();

        let items: String = candidates
            .iter()
            .map(|stock| format!("<li>{}</li>", escape(stock)))
            .collect();

        sections.push_str(&format!(
            "<h2>{} ({} candidates)</h2><ul>{}</ul>",
            escape(&strain.id),
            candidates.len(),
            items,
        ));
    }

    let body = format!("<p>{total} candidate stocks across {} strains</p>{sections}", strains.len());

    Ok(page(
        &format!("Secondary candidates ({})", screen.as_str()),
        &body,
    ))
}

#[derive(Debug, Deserialize)]
pub struct PositivesQuery {
    pub screen: Screen,
    pub stage: Option<i16>,
    pub rule: PositiveRule,
}

/// GET /api/positives?screen=&stage=&rule= - library stocks whose
/// replicate scores pass the chosen rule, across all strains.
pub async fn api_positives(
    State(state): State<SharedState>,
    Query(query): Query<PositivesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pool = state.db.pool().clone();

    let stage = match query.stage {
        Some(1) => ScreenStage::Primary,
        _ => ScreenStage::Secondary,
    };

    let strains = StrainRepository::new(pool.clone()).for_screen(query.screen).await?;
    let scores = ScoreRepository::new(pool);
    let predicate = query.rule.predicate();

    let mut positives: BTreeSet<String> = BTreeSet::new();

    for strain in &strains {
        let rows = scores.screen_score_rows(strain, query.screen, stage).await?;
        let collapsed = organize_most_relevant(rows);
        positives.extend(select_candidates(&collapsed, predicate));
    }

    Ok(Json(positives.into_iter().collect::<Vec<_>>()))
}
