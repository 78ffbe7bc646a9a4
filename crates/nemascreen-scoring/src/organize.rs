//! Organizing raw score rows for classification and reporting.
//!
//! Scores arrive as flat rows (one per image score, joined with the
//! library stock of the experiment well). Classification wants them as
//! stock -> experiment -> scores, collapsed to the single most relevant
//! score per replicate.

use std::collections::BTreeMap;

use nemascreen_common::entities::ManualScore;
use tracing::debug;

use crate::criteria::{
    passes_sup_positive_count, passes_sup_positive_percentage, passes_sup_positive_stringent,
};
use crate::relevance::average_score_weight;

/// One manual score joined with the context needed to organize it.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub library_stock_id: String,
    pub score: ManualScore,
}

/// stock -> experiment -> all scores for that replicate.
pub type OrganizedScores = BTreeMap<String, BTreeMap<String, Vec<ManualScore>>>;

/// stock -> experiment -> single most relevant score for that replicate.
pub type CollapsedScores = BTreeMap<String, BTreeMap<String, ManualScore>>;

/// Group flat score rows by library stock and experiment.
pub fn organize_scores(rows: impl IntoIterator<Item = ScoreRow>) -> OrganizedScores {
    let mut organized = OrganizedScores::new();

    for row in rows {
        organized
            .entry(row.library_stock_id)
            .or_default()
            .entry(row.score.experiment_id.clone())
            .or_default()
            .push(row.score);
    }

    organized
}

/// Group flat score rows, keeping only the most relevant score per
/// replicate. Ties keep the score seen first.
pub fn organize_most_relevant(rows: impl IntoIterator<Item = ScoreRow>) -> CollapsedScores {
    use std::collections::btree_map::Entry;

    let mut collapsed = CollapsedScores::new();

    for row in rows {
        let per_stock = collapsed.entry(row.library_stock_id).or_default();
        match per_stock.entry(row.score.experiment_id.clone()) {
            Entry::Occupied(mut current) => {
                if row.score.category().relevance_per_replicate()
                    > current.get().category().relevance_per_replicate()
                {
                    current.insert(row.score);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(row.score);
            }
        }
    }

    collapsed
}

/// Library stocks whose per-replicate scores pass the given criteria.
///
/// The criteria receives one most-relevant score per replicate,
/// covering all replicates for the stock.
pub fn select_candidates<F>(collapsed: &CollapsedScores, criteria: F) -> Vec<String>
where
    F: Fn(&[ManualScore]) -> bool,
{
    let mut candidates = Vec::new();

    for (stock, replicates) in collapsed {
        let scores: Vec<ManualScore> = replicates.values().cloned().collect();
        if criteria(&scores) {
            candidates.push(stock.clone());
        }
    }

    debug!(total = collapsed.len(), passing = candidates.len(), "candidate selection");
    candidates
}

/// Per-stock report line for the suppressor secondary screen.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StockSummary {
    pub library_stock_id: String,
    /// One most-relevant score per replicate, in experiment order.
    pub scores: Vec<ManualScore>,
    pub average_weight: f64,
    pub passes_stringent: bool,
    pub passes_percentage: bool,
    pub passes_count: bool,
}

/// Summarize each stock's replicates against the three suppressor
/// rules, strongest stocks first.
pub fn summarize_stocks(collapsed: &CollapsedScores) -> Vec<StockSummary> {
    let mut summaries: Vec<StockSummary> = collapsed
        .iter()
        .map(|(stock, replicates)| {
            let scores: Vec<ManualScore> = replicates.values().cloned().collect();
            StockSummary {
                library_stock_id: stock.clone(),
                average_weight: average_score_weight(&scores),
                passes_stringent: passes_sup_positive_stringent(&scores),
                passes_percentage: passes_sup_positive_percentage(&scores),
                passes_count: passes_sup_positive_count(&scores),
                scores,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        (b.passes_stringent, b.passes_percentage, b.passes_count)
            .cmp(&(a.passes_stringent, a.passes_percentage, a.passes_count))
            .then(b.average_weight.total_cmp(&a.average_weight))
    });

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nemascreen_common::entities::ScoreCategory;
    use uuid::Uuid;

    fn row(stock: &str, experiment: &str, code: i32) -> ScoreRow {
        ScoreRow {
            library_stock_id: stock.to_string(),
            score: ManualScore {
                id: 0,
                experiment_id: experiment.to_string(),
                score_code: code,
                scorer_id: Uuid::nil(),
                timestamp: Utc::now(),
            },
        }
    }

    #[test]
    fn test_organize_groups_by_stock_and_experiment() {
        let organized = organize_scores(vec![
            row("II-3-B2_A05", "10_A05", 3),
            row("II-3-B2_A05", "10_A05", 7),
            row("II-3-B2_A05", "11_A05", 0),
            row("X-1-A1_C02", "10_C02", 1),
        ]);

        assert_eq!(organized.len(), 2);
        assert_eq!(organized["II-3-B2_A05"]["10_A05"].len(), 2);
        assert_eq!(organized["II-3-B2_A05"]["11_A05"].len(), 1);
        assert_eq!(organized["X-1-A1_C02"]["10_C02"].len(), 1);
    }

    #[test]
    fn test_organize_most_relevant_collapses_replicates() {
        let collapsed = organize_most_relevant(vec![
            row("s", "10_A05", 7), // other
            row("s", "10_A05", 3), // strong replaces it
            row("s", "10_A05", 1), // weak does not
        ]);

        let score = &collapsed["s"]["10_A05"];
        assert_eq!(score.category(), ScoreCategory::Strong);
    }

    #[test]
    fn test_select_candidates_applies_criteria_per_stock() {
        let collapsed = organize_most_relevant(vec![
            row("hit", "1_A01", 3),
            row("hit", "2_A01", 2),
            row("miss", "1_B01", 0),
            row("miss", "2_B01", 0),
        ]);

        let candidates =
            select_candidates(&collapsed, |scores| scores.iter().any(|s| s.weight() >= 2));
        assert_eq!(candidates, vec!["hit".to_string()]);
    }

    #[test]
    fn test_summaries_sorted_strongest_first() {
        let collapsed = organize_most_relevant(vec![
            // weak-only stock
            row("weakish", "1_A01", 1),
            row("weakish", "2_A01", 1),
            // strong stock passing everything
            row("strongest", "1_B01", 3),
            row("strongest", "2_B01", 3),
            row("strongest", "3_B01", 3),
            // negatives only
            row("nothing", "1_C01", 0),
            row("nothing", "2_C01", 0),
        ]);

        let summaries = summarize_stocks(&collapsed);
        assert_eq!(summaries[0].library_stock_id, "strongest");
        assert!(summaries[0].passes_stringent);
        assert!(summaries[0].passes_count);
        assert_eq!(summaries[2].library_stock_id, "nothing");
        assert!(summaries[0].average_weight > summaries[1].average_weight);
    }
}
