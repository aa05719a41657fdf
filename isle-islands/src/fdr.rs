//! Benjamini-Hochberg correction.

///
/// 1-based ranks of `values` in ascending order. Tied values share the mean of the
/// ranks they span.
///
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // positions i..=j hold ranks i+1..=j+1
        let rank = (i + j + 2) as f64 / 2.0;
        for &index in &order[i..=j] {
            ranks[index] = rank;
        }
        i = j + 1;
    }
    ranks
}

///
/// Benjamini-Hochberg adjusted significance, `min(1, p * N / rank(p))`, in input order.
///
/// Each value is adjusted against its own rank only; no cumulative minimum is taken.
///
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let total = pvalues.len() as f64;
    pvalues
        .iter()
        .zip(rank_average(pvalues))
        .map(|(&p, rank)| (p * total / rank).min(1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_rank_average_with_ties() {
        assert_eq!(rank_average(&[0.5, 0.01, 0.2, 0.01]), vec![4.0, 1.5, 3.0, 1.5]);
        assert_eq!(rank_average(&[1.0, 1.0, 1.0]), vec![2.0, 2.0, 2.0]);
        assert!(rank_average(&[]).is_empty());
    }

    #[rstest]
    fn test_benjamini_hochberg() {
        let corrected = benjamini_hochberg(&[0.5, 0.01, 0.2, 0.01]);
        let expected = [0.5, 0.01 * 4.0 / 1.5, 0.2 * 4.0 / 3.0, 0.01 * 4.0 / 1.5];
        for (actual, expected) in corrected.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-15);
        }
        assert_eq!(corrected[1], corrected[3]);
    }

    #[rstest]
    fn test_corrected_is_bounded() {
        let pvalues = [0.9, 0.04, 0.3, 1.0, 0.8, 0.001, 0.04];
        let corrected = benjamini_hochberg(&pvalues);
        for (p, q) in pvalues.iter().zip(&corrected) {
            assert!(q >= p);
            assert!(*q <= 1.0);
        }
    }

    #[rstest]
    fn test_reapplying_correction_to_corrected_values() {
        let corrected = benjamini_hochberg(&[0.01, 0.04, 0.03, 0.2]);
        let expected = [0.04, 0.16 / 3.0, 0.06, 0.2];
        for (actual, expected) in corrected.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-15);
        }

        let again = benjamini_hochberg(&corrected);
        for (q, q_again) in corrected.iter().zip(&again) {
            assert!(q_again >= q);
            assert!(*q_again <= 1.0);
        }
        // the largest value has rank N and is a fixed point
        assert_eq!(again[3], corrected[3]);
        assert_eq!(benjamini_hochberg(&[0.3]), vec![0.3]);
    }

    #[rstest]
    fn test_correction_is_stable_on_saturated_values() {
        let corrected = benjamini_hochberg(&[1.0, 1.0]);
        assert_eq!(benjamini_hochberg(&corrected), corrected);
    }
}
