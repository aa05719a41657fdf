//! Eligibility filtering and Poisson scoring of tag-count windows.

use isle_core::models::{ScoredWindow, Window};

use crate::poisson::poisson_pmf;

/// Probabilities below this are treated as underflow.
pub const PROBABILITY_FLOOR: f64 = 1e-250;

/// Score assigned to windows whose probability underflows.
pub const SCORE_CEILING: f64 = 1000.0;

///
/// Score of a window holding `count` tags when `expected` tags are expected: `-ln P(X = count)`.
///
/// Clamped to [`SCORE_CEILING`] when the probability falls under [`PROBABILITY_FLOOR`],
/// so the result is always finite.
///
pub fn window_score(count: u32, expected: f64) -> f64 {
    let probability = poisson_pmf(count as u64, expected);
    if probability < PROBABILITY_FLOOR {
        SCORE_CEILING
    } else {
        -probability.ln()
    }
}

///
/// Drop windows with fewer than `min_count` tags and score the rest.
///
/// A window whose score is not strictly positive is also dropped, even when its count
/// passed. Input order is kept.
///
/// # Arguments
/// - windows: windows of one chromosome, ordered by start
/// - min_count: minimum tag count for a window to be eligible
/// - expected: genome-wide average tags per window
///
pub fn filter_and_score_windows(
    windows: &[Window],
    min_count: u32,
    expected: f64,
) -> Vec<ScoredWindow> {
    windows
        .iter()
        .filter(|window| window.count >= min_count)
        .filter_map(|window| {
            let score = window_score(window.count, expected);
            (score > 0.0).then(|| ScoredWindow {
                window: window.clone(),
                score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn window(start: u32, count: u32) -> Window {
        Window {
            chrom: "chr1".to_string(),
            start,
            end: start + 199,
            count,
        }
    }

    #[rstest]
    fn test_window_score() {
        let expected = -poisson_pmf(5, 2.0).ln();
        assert_eq!(window_score(5, 2.0), expected);
        assert!(window_score(5, 2.0) > 0.0);
    }

    #[rstest]
    fn test_window_score_underflow_is_clamped() {
        assert_eq!(window_score(2000, 1.0), SCORE_CEILING);
    }

    #[rstest]
    fn test_filter_and_score_windows() {
        let windows = vec![window(0, 5), window(200, 1), window(400, 7)];
        let scored = filter_and_score_windows(&windows, 5, 2.0);

        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].window, windows[0]);
        assert_eq!(scored[0].score, -poisson_pmf(5, 2.0).ln());
        assert_eq!(scored[1].window, windows[2]);
        assert_eq!(scored[1].score, -poisson_pmf(7, 2.0).ln());
    }

    #[rstest]
    fn test_zero_score_is_ineligible() {
        // P(X = 0 | lambda = 0) = 1, so the score is exactly 0
        let windows = vec![window(0, 0)];
        assert!(filter_and_score_windows(&windows, 0, 0.0).is_empty());
    }

    #[rstest]
    fn test_empty_input() {
        assert!(filter_and_score_windows(&[], 1, 2.0).is_empty());
    }
}
