//! End-to-end classification over organized score sets: raw rows in,
//! positive calls and report summaries out.
//!
//! Run with: cargo test --package nemascreen-scoring --test test_positive_calls

use std::collections::HashSet;

use chrono::Utc;
use nemascreen_common::entities::{ManualScore, ScoreCategory};
use nemascreen_scoring::criteria::{passes_enh_secondary, passes_sup_positive_count};
use nemascreen_scoring::organize::{organize_most_relevant, select_candidates, summarize_stocks, ScoreRow};
use nemascreen_scoring::relevance::most_relevant_score;
use uuid::Uuid;

const STRONG: i32 = 3;
const MEDIUM: i32 = 2;
const WEAK: i32 = 1;
const NEGATIVE: i32 = 0;
const AUXILIARY: i32 = 10;

fn row(stock: &str, experiment: &str, code: i32) -> ScoreRow {
    ScoreRow {
        library_stock_id: stock.to_string(),
        score: ManualScore {
            id: 0,
            experiment_id: experiment.to_string(),
            score_code: code,
            scorer_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        },
    }
}

#[test]
fn suppressor_positives_from_raw_rows() {
    // Stock "hit": three replicates, one of which carries both an
    // auxiliary and a strong score; the strong one must win the
    // replicate before counting.
    let rows = vec![
        row("hit", "101_A05", AUXILIARY),
        row("hit", "101_A05", STRONG),
        row("hit", "102_A05", MEDIUM),
        row("hit", "103_A05", STRONG),
        // Stock "borderline": one medium and three weaks pass counts.
        row("borderline", "101_B07", MEDIUM),
        row("borderline", "102_B07", WEAK),
        row("borderline", "103_B07", WEAK),
        row("borderline", "104_B07", WEAK),
        // Stock "cold": negatives only.
        row("cold", "101_C02", NEGATIVE),
        row("cold", "102_C02", NEGATIVE),
    ];

    let collapsed = organize_most_relevant(rows);
    let positives = select_candidates(&collapsed, passes_sup_positive_count);

    assert_eq!(positives, vec!["borderline".to_string(), "hit".to_string()]);

    // The collapsed "hit" replicate kept the strong score, not the
    // auxiliary one recorded against the same image set.
    assert_eq!(
        collapsed["hit"]["101_A05"].category(),
        ScoreCategory::Strong
    );
}

#[test]
fn enhancer_candidates_respect_single_replicate_experiments() {
    let rows = vec![
        // One weak replicate in a designated single-replicate experiment.
        row("lonely", "201_D03", WEAK),
        // One weak replicate without the designation.
        row("insufficient", "202_E04", WEAK),
        // Two weak replicates, no designation needed.
        row("paired", "203_F05", WEAK),
        row("paired", "204_F05", WEAK),
    ];

    let mut singles = HashSet::new();
    singles.insert("201_D03".to_string());

    let collapsed = organize_most_relevant(rows);
    let candidates =
        select_candidates(&collapsed, |scores| passes_enh_secondary(scores, &singles));

    assert_eq!(
        candidates,
        vec!["lonely".to_string(), "paired".to_string()]
    );
}

#[test]
fn report_summaries_rank_and_count_rule_verdicts() {
    let mut rows = Vec::new();
    // Eight secondary replicates for a clear hit: 4 strong, 4 negative.
    for plate in 1..=8 {
        let code = if plate <= 4 { STRONG } else { NEGATIVE };
        rows.push(row("clear", &format!("{plate}_A01"), code));
    }
    // Eight replicates all weak: passes neither percentage nor counts
    // arms requiring a yes vote, but yes+maybe = 8/8 passes both.
    for plate in 1..=8 {
        rows.push(row("weak-heavy", &format!("{plate}_B01"), WEAK));
    }
    // Eight negatives.
    for plate in 1..=8 {
        rows.push(row("quiet", &format!("{plate}_C01"), NEGATIVE));
    }

    let collapsed = organize_most_relevant(rows);
    let summaries = summarize_stocks(&collapsed);

    assert_eq!(summaries[0].library_stock_id, "clear");
    assert!(summaries[0].passes_stringent);
    assert!(summaries[0].passes_percentage);
    assert!(summaries[0].passes_count);

    assert_eq!(summaries[1].library_stock_id, "weak-heavy");
    assert!(!summaries[1].passes_stringent);
    assert!(summaries[1].passes_percentage);
    assert!(summaries[1].passes_count);

    assert_eq!(summaries[2].library_stock_id, "quiet");
    assert!(!summaries[2].passes_count);
}

#[test]
fn reducer_never_fabricates_a_score() {
    let scores: Vec<ManualScore> = [WEAK, NEGATIVE, MEDIUM, AUXILIARY]
        .iter()
        .map(|&code| row("s", "301_A01", code).score)
        .collect();

    let best = most_relevant_score(&scores).unwrap();
    assert!(scores.iter().any(|s| std::ptr::eq(s, best)));
    for score in &scores {
        assert!(
            best.category().relevance_per_replicate()
                >= score.category().relevance_per_replicate()
        );
    }
}
