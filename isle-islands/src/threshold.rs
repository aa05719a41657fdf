use isle_core::models::Island;

/// Round-off tolerance at the threshold boundary.
pub const SCORE_TOLERANCE: f64 = 1e-10;

///
/// Keep islands whose aggregate score reaches `threshold` (within [`SCORE_TOLERANCE`]).
///
pub fn filter_islands_by_score(islands: Vec<Island>, threshold: f64) -> Vec<Island> {
    islands
        .into_iter()
        .filter(|island| island.score >= threshold - SCORE_TOLERANCE)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn island(start: u32, score: f64) -> Island {
        Island {
            chrom: "chr1".to_string(),
            start,
            end: start + 399,
            score,
        }
    }

    #[rstest]
    fn test_filter_islands_by_score() {
        let islands = vec![island(0, 10.0), island(1000, 24.99), island(2000, 25.0)];
        let kept = filter_islands_by_score(islands.clone(), 25.0);
        assert_eq!(kept, vec![islands[2].clone()]);
    }

    #[rstest]
    fn test_boundary_round_off_is_tolerated() {
        let islands = vec![island(0, 0.1 + 0.2)];
        let kept = filter_islands_by_score(islands, 0.3 + 1e-12);
        assert_eq!(kept.len(), 1);
    }

    #[rstest]
    fn test_output_is_subset_of_input() {
        let islands = vec![island(0, 1.0), island(1000, 50.0), island(2000, 5.0)];
        let kept = filter_islands_by_score(islands.clone(), 4.0);
        assert!(kept.iter().all(|island| islands.contains(island)));
        assert_eq!(kept.len(), 2);
    }
}
