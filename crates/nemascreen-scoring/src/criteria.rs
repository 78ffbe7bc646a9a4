//! Positive-call criteria.
//!
//! Each predicate takes the single most relevant score per replicate,
//! covering all replicates for a particular worm / library stock combo,
//! and decides whether the pairing passes. All are total over
//! well-formed input: degenerate inputs return false, never an error.

use std::collections::HashSet;

use nemascreen_common::entities::{ManualScore, ScoreCategory};

/// Countable replicates required before the percentage criteria apply.
const PERCENTAGE_MIN_REPLICATES: usize = 8;

fn yes_maybe_counts(scores: &[ManualScore]) -> (usize, usize, usize) {
    let mut countable = 0;
    let mut yes = 0;
    let mut maybe = 0;

    for score in scores {
        let category = score.category();
        if category != ScoreCategory::Other {
            countable += 1;
        }
        match category {
            ScoreCategory::Strong | ScoreCategory::Medium => yes += 1,
            ScoreCategory::Weak => maybe += 1,
            _ => {}
        }
    }

    (countable, yes, maybe)
}

/// Percentage-based criteria for a positive suppressor.
///
/// Fractions are taken over the countable (non-Other) replicates. With
/// fewer than eight countable replicates the percentages are too
/// granular to mean much, so the count-based criteria decide instead.
pub fn passes_sup_positive_percentage(scores: &[ManualScore]) -> bool {
    let (countable, yes, maybe) = yes_maybe_counts(scores);

    if countable == 0 {
        return false;
    }

    if countable < PERCENTAGE_MIN_REPLICATES {
        return passes_sup_positive_count(scores);
    }

    let yes = yes as f64 / countable as f64;
    let maybe = maybe as f64 / countable as f64;

    yes >= 0.375 || (yes >= 0.125 && yes + maybe >= 0.5) || yes + maybe >= 0.625
}

/// Count-based criteria for a positive suppressor.
pub fn passes_sup_positive_count(scores: &[ManualScore]) -> bool {
    let (_, yes, maybe) = yes_maybe_counts(scores);

    yes >= 3 || (yes >= 1 && yes + maybe >= 4) || yes + maybe >= 5
}

/// Stringent criteria for a positive suppressor.
///
/// Unlike the percentage criteria, Other replicates stay in the
/// denominator here.
pub fn passes_sup_positive_stringent(scores: &[ManualScore]) -> bool {
    if scores.is_empty() {
        return false;
    }

    let (_, yes, _) = yes_maybe_counts(scores);

    yes as f64 / scores.len() as f64 >= 0.375
}

/// Criteria for an enhancer primary hit to enter the secondary screen.
///
/// `singles` is the set of experiment ids for primary experiments that
/// had only a single replicate; a lone Weak there carries the same
/// weight as two Weaks elsewhere.
pub fn passes_enh_secondary(scores: &[ManualScore], singles: &HashSet<String>) -> bool {
    let mut weak_experiments: Vec<&str> = Vec::new();

    for score in scores {
        match score.category() {
            ScoreCategory::Strong | ScoreCategory::Medium => return true,
            ScoreCategory::Weak => weak_experiments.push(&score.experiment_id),
            _ => {}
        }
    }

    if weak_experiments.len() >= 2 {
        return true;
    }

    weak_experiments.len() == 1 && singles.contains(weak_experiments[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    const STRONG: i32 = 3;
    const MEDIUM: i32 = 2;
    const WEAK: i32 = 1;
    const NEGATIVE: i32 = 0;
    const AUXILIARY: i32 = 7;

    fn score(code: i32) -> ManualScore {
        score_in("1_A01", code)
    }

    fn score_in(experiment_id: &str, code: i32) -> ManualScore {
        ManualScore {
            id: 0,
            experiment_id: experiment_id.to_string(),
            score_code: code,
            scorer_id: Uuid::nil(),
            timestamp: Utc::now(),
        }
    }

    fn scores(codes: &[i32]) -> Vec<ManualScore> {
        codes.iter().copied().map(score).collect()
    }

    #[test]
    fn test_count_three_strongs_pass() {
        assert!(passes_sup_positive_count(&scores(&[STRONG, STRONG, STRONG])));
    }

    #[test]
    fn test_count_four_weaks_fail() {
        assert!(!passes_sup_positive_count(&scores(&[WEAK, WEAK, WEAK, WEAK])));
    }

    #[test]
    fn test_count_one_medium_three_weaks_pass() {
        assert!(passes_sup_positive_count(&scores(&[MEDIUM, WEAK, WEAK, WEAK])));
    }

    #[test]
    fn test_count_five_weaks_pass() {
        assert!(passes_sup_positive_count(&scores(&[WEAK, WEAK, WEAK, WEAK, WEAK])));
    }

    #[test]
    fn test_percentage_boundary_inclusive() {
        // 3 strong out of 8 countable = 0.375 exactly
        let input = scores(&[STRONG, STRONG, STRONG, NEGATIVE, NEGATIVE, NEGATIVE, NEGATIVE, NEGATIVE]);
        assert!(passes_sup_positive_percentage(&input));
    }

    #[test]
    fn test_percentage_yes_plus_maybe() {
        // yes = 1/8 = 0.125, yes + maybe = 4/8 = 0.5
        let input = scores(&[MEDIUM, WEAK, WEAK, WEAK, NEGATIVE, NEGATIVE, NEGATIVE, NEGATIVE]);
        assert!(passes_sup_positive_percentage(&input));
        // yes = 0, maybe = 5/8 = 0.625
        let input = scores(&[WEAK, WEAK, WEAK, WEAK, WEAK, NEGATIVE, NEGATIVE, NEGATIVE]);
        assert!(passes_sup_positive_percentage(&input));
        // yes = 0, maybe = 4/8 = 0.5 does not reach any arm
        let input = scores(&[WEAK, WEAK, WEAK, WEAK, NEGATIVE, NEGATIVE, NEGATIVE, NEGATIVE]);
        assert!(!passes_sup_positive_percentage(&input));
    }

    #[test]
    fn test_percentage_excludes_other_from_denominator() {
        // 3 strong + 5 auxiliary: countable = 3, falls through to counts,
        // which pass on 3 yes votes
        let input = scores(&[STRONG, STRONG, STRONG, AUXILIARY, AUXILIARY, AUXILIARY, AUXILIARY, AUXILIARY]);
        assert!(passes_sup_positive_percentage(&input));
    }

    #[test]
    fn test_percentage_delegates_below_eight_replicates() {
        // 2 strong of 4 countable would be 50% but counts require 3 yes
        let input = scores(&[STRONG, STRONG, NEGATIVE, NEGATIVE]);
        assert!(!passes_sup_positive_percentage(&input));
    }

    #[test]
    fn test_percentage_zero_countable_fails() {
        assert!(!passes_sup_positive_percentage(&[]));
        assert!(!passes_sup_positive_percentage(&scores(&[AUXILIARY, AUXILIARY])));
    }

    #[test]
    fn test_stringent_keeps_other_in_denominator() {
        // 3 medium + 5 other: 3/8 = 0.375, boundary passes
        let input = scores(&[MEDIUM, MEDIUM, MEDIUM, AUXILIARY, AUXILIARY, AUXILIARY, AUXILIARY, AUXILIARY]);
        assert!(passes_sup_positive_stringent(&input));
        // one more Other pushes it below the bar
        let mut input = input;
        input.push(score(AUXILIARY));
        assert!(!passes_sup_positive_stringent(&input));
    }

    #[test]
    fn test_stringent_empty_fails() {
        assert!(!passes_sup_positive_stringent(&[]));
    }

    #[test]
    fn test_enh_any_strong_or_medium_passes() {
        let singles = HashSet::new();
        assert!(passes_enh_secondary(&scores(&[NEGATIVE, MEDIUM]), &singles));
        assert!(passes_enh_secondary(&scores(&[STRONG]), &singles));
    }

    #[test]
    fn test_enh_two_weaks_pass_without_singles() {
        let singles = HashSet::new();
        assert!(passes_enh_secondary(&scores(&[WEAK, WEAK]), &singles));
    }

    #[test]
    fn test_enh_single_weak_needs_single_replicate_flag() {
        let input = vec![score_in("77_B05", WEAK)];

        let mut singles = HashSet::new();
        assert!(!passes_enh_secondary(&input, &singles));

        singles.insert("77_B05".to_string());
        assert!(passes_enh_secondary(&input, &singles));
    }

    #[test]
    fn test_enh_single_weak_checks_the_weak_replicate() {
        // The weak score is not first in the list; the flag must apply
        // to its experiment, not whichever happens to come first.
        let input = vec![score_in("10_A01", NEGATIVE), score_in("77_B05", WEAK)];
        let mut singles = HashSet::new();
        singles.insert("77_B05".to_string());
        assert!(passes_enh_secondary(&input, &singles));
    }

    #[test]
    fn test_enh_negatives_alone_fail() {
        let singles = HashSet::new();
        assert!(!passes_enh_secondary(&scores(&[NEGATIVE, NEGATIVE]), &singles));
        assert!(!passes_enh_secondary(&[], &singles));
    }
}
