//! Float comparison helpers.
//!
//! Experiment temperatures are recorded to one decimal place, so
//! equality checks allow a small margin.

const DEFAULT_MARGIN: f64 = 0.001;

/// Compare two floats for equality within the default margin.
pub fn floats_equal(x: f64, y: f64) -> bool {
    (x - y).abs() < DEFAULT_MARGIN
}

/// Compare two optional floats; two Nones are equal, one None is not.
pub fn floats_equal_opt(x: Option<f64>, y: Option<f64>) -> bool {
    match (x, y) {
        (None, None) => true,
        (Some(x), Some(y)) => floats_equal(x, y),
        _ => false,
    }
}

/// Get the candidate numerically closest to the goal.
pub fn closest_candidate(goal: f64, candidates: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;

    for candidate in candidates {
        let difference = (goal - candidate).abs();
        match best {
            Some((_, best_difference)) if difference >= best_difference => {}
            _ => best = Some((candidate, difference)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats_equal_margin() {
        assert!(floats_equal(22.5, 22.5004));
        assert!(!floats_equal(22.5, 22.6));
    }

    #[test]
    fn test_closest_candidate() {
        assert_eq!(closest_candidate(22.4, vec![15.0, 20.0, 22.5, 25.0]), Some(22.5));
        assert_eq!(closest_candidate(22.4, vec![]), None);
    }

    #[test]
    fn test_closest_candidate_prefers_first_on_tie() {
        assert_eq!(closest_candidate(21.0, vec![20.0, 22.0]), Some(20.0));
    }
}
