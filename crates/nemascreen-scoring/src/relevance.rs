//! Score relevance orderings and per-replicate reduction.

use nemascreen_common::entities::{ManualScore, ScoreCategory};

use crate::error::ScoringError;

/// Rank across replicates, least to most relevant:
/// Negative < Other < Unscored < Weak < Medium < Strong.
///
/// None stands for an unscored replicate, a state that only exists at
/// this layer (within a replicate there is always at least one score).
pub fn relevance_across_replicates(category: Option<ScoreCategory>) -> u8 {
    match category {
        Some(ScoreCategory::Negative) => 0,
        Some(ScoreCategory::Other) => 1,
        None => 2,
        Some(ScoreCategory::Weak) => 3,
        Some(ScoreCategory::Medium) => 4,
        Some(ScoreCategory::Strong) => 5,
    }
}

/// From multiple scores for a single replicate, get the most relevant.
///
/// Ties resolve to the earliest such score in input order.
pub fn most_relevant_score(scores: &[ManualScore]) -> Result<&ManualScore, ScoringError> {
    let mut best: Option<&ManualScore> = None;

    for score in scores {
        match best {
            Some(current)
                if current.category().relevance_per_replicate()
                    >= score.category().relevance_per_replicate() => {}
            _ => best = Some(score),
        }
    }

    best.ok_or(ScoringError::EmptyInput)
}

/// From scores across replicates (a single, most relevant score per
/// replicate), order by the most relevant. Stable for ties.
pub fn rank_across_replicates(scores: &[ManualScore]) -> Vec<&ManualScore> {
    let mut ranked: Vec<&ManualScore> = scores.iter().collect();
    ranked.sort_by_key(|score| std::cmp::Reverse(relevance_across_replicates(Some(score.category()))));
    ranked
}

/// Average weight of the countable (non-Other) scores; 0 if none.
pub fn average_score_weight(scores: &[ManualScore]) -> f64 {
    let mut num_countable = 0u32;
    let mut total_weight = 0u32;

    for score in scores {
        if score.category() != ScoreCategory::Other {
            num_countable += 1;
            total_weight += score.weight();
        }
    }

    if num_countable > 0 {
        f64::from(total_weight) / f64::from(num_countable)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn score(code: i32) -> ManualScore {
        ManualScore {
            id: 0,
            experiment_id: "1_A01".to_string(),
            score_code: code,
            scorer_id: Uuid::nil(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_most_relevant_prefers_strong() {
        // weak (1), strong (3), negative (0)
        let scores = vec![score(1), score(3), score(0)];
        let best = most_relevant_score(&scores).unwrap();
        assert_eq!(best.category(), ScoreCategory::Strong);
    }

    #[test]
    fn test_most_relevant_negative_beats_other() {
        // auxiliary code 7 is Other; negative outranks it per replicate
        let scores = vec![score(7), score(0)];
        let best = most_relevant_score(&scores).unwrap();
        assert_eq!(best.category(), ScoreCategory::Negative);
    }

    #[test]
    fn test_most_relevant_is_element_of_input() {
        let scores = vec![score(2), score(13), score(17)];
        let best = most_relevant_score(&scores).unwrap();
        // All tie at Medium; the first wins
        assert_eq!(best.score_code, 2);
        assert!(scores.iter().any(|s| std::ptr::eq(s, best)));
    }

    #[test]
    fn test_most_relevant_empty_is_an_error() {
        assert_eq!(most_relevant_score(&[]).unwrap_err(), ScoringError::EmptyInput);
    }

    #[test]
    fn test_rank_across_replicates_order() {
        // negative, weak, strong, other
        let scores = vec![score(0), score(1), score(3), score(7)];
        let ranked = rank_across_replicates(&scores);
        let categories: Vec<ScoreCategory> = ranked.iter().map(|s| s.category()).collect();
        assert_eq!(
            categories,
            vec![
                ScoreCategory::Strong,
                ScoreCategory::Weak,
                ScoreCategory::Other,
                ScoreCategory::Negative,
            ]
        );
    }

    #[test]
    fn test_rank_is_permutation_and_monotone() {
        let scores = vec![score(1), score(0), score(2), score(3), score(8), score(16)];
        let ranked = rank_across_replicates(&scores);
        assert_eq!(ranked.len(), scores.len());
        for pair in ranked.windows(2) {
            assert!(
                relevance_across_replicates(Some(pair[0].category()))
                    >= relevance_across_replicates(Some(pair[1].category()))
            );
        }
    }

    #[test]
    fn test_unscored_sits_between_other_and_weak() {
        assert!(relevance_across_replicates(None) > relevance_across_replicates(Some(ScoreCategory::Other)));
        assert!(relevance_across_replicates(None) < relevance_across_replicates(Some(ScoreCategory::Weak)));
    }

    #[test]
    fn test_average_score_weight_skips_other() {
        // strong (3) + weak (1), auxiliary Other ignored
        let scores = vec![score(3), score(1), score(7)];
        assert_eq!(average_score_weight(&scores), 2.0);
    }

    #[test]
    fn test_average_score_weight_empty() {
        assert_eq!(average_score_weight(&[]), 0.0);
        // all Other
        let scores = vec![score(7), score(10)];
        assert_eq!(average_score_weight(&scores), 0.0);
    }
}
