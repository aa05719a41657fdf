//! Null model of island scores on a randomly tagged genome.
//!
//! Under the null hypothesis, tags fall uniformly on the effective genome, so the
//! tag count of each window is Poisson with the genome-wide window average. Windows
//! are *eligible* when their count reaches the minimum window count, and an island
//! is a run of eligible windows separated by at most `gap / W` ineligible ones,
//! flanked by ineligible windows. [`PoissonBackground`] tabulates the expected number
//! of such random islands per (binned) score, which yields the score a real island
//! must reach to be expected fewer than `e_value` times by chance.

use log::debug;

use crate::poisson::poisson_pmf;
use crate::scoring::window_score;

/// Fewest window counts considered by the null model.
pub const MIN_WINDOW_COUNT_TABLE: u64 = 500;

/// Island scores above this are not tabulated.
pub const MAX_ISLAND_SCORE: f64 = 500.0;

/// Expectations below this are dropped from the table.
const NEGLIGIBLE_EXPECTATION: f64 = 1e-30;

/// Relative increment at which the island-length iteration stops.
const CONVERGENCE_TOLERANCE: f64 = 1e-12;

const MAX_ISLAND_WINDOWS: usize = 100_000;

///
/// The two quantities island calling needs from a background model.
///
pub trait BackgroundModel {
    /// Minimum tag count for a window to be eligible.
    fn min_window_count(&self) -> u32;

    /// Island score expected to be reached by at most `e_value` random islands.
    fn score_threshold(&self, e_value: f64) -> f64;
}

///
/// Background model with caller-supplied values.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBackground {
    pub min_window_count: u32,
    pub score_threshold: f64,
}

impl BackgroundModel for FixedBackground {
    fn min_window_count(&self) -> u32 {
        self.min_window_count
    }

    fn score_threshold(&self, _e_value: f64) -> f64 {
        self.score_threshold
    }
}

///
/// Poisson null model of random island scores.
///
#[derive(Debug, Clone)]
pub struct PoissonBackground {
    window_average: f64,
    bin_size: f64,
    min_window_count: u32,
    /// Expected number of random islands per score bin. Bin `b` covers score `b * bin_size`.
    island_expectation: Vec<f64>,
}

impl PoissonBackground {
    ///
    /// Build the model.
    ///
    /// # Arguments
    /// - total_tags: tags in the library
    /// - window_size: window width in bp
    /// - gap_size: gap tolerance in bp
    /// - window_pvalue: largest P(X >= min count) accepted for an eligible window
    /// - effective_genome_length: mappable genome length in bp
    /// - bin_size: score resolution of the expectation table
    ///
    pub fn new(
        total_tags: u64,
        window_size: u32,
        gap_size: u32,
        window_pvalue: f64,
        effective_genome_length: f64,
        bin_size: f64,
    ) -> Self {
        let window_average = if effective_genome_length > 0.0 {
            total_tags as f64 * window_size as f64 / effective_genome_length
        } else {
            0.0
        };

        let pmf: Vec<f64> = (0..window_count_limit(window_average))
            .map(|k| poisson_pmf(k, window_average))
            .collect();
        let min_window_count = minimum_count(&pmf, window_pvalue);

        let window_count = if window_size > 0 {
            (effective_genome_length / window_size as f64).floor()
        } else {
            0.0
        };
        let gap_windows = if window_size > 0 {
            gap_size / window_size
        } else {
            0
        };

        let island_expectation = tabulate_island_expectation(
            &pmf,
            min_window_count,
            window_average,
            window_count,
            gap_windows,
            bin_size,
        );

        debug!(
            "Background: window average {:.4}, minimum window count {}, {} score bins",
            window_average,
            min_window_count,
            island_expectation.len()
        );

        PoissonBackground {
            window_average,
            bin_size,
            min_window_count,
            island_expectation,
        }
    }

    /// Genome-wide average tags per window.
    pub fn window_average(&self) -> f64 {
        self.window_average
    }

    /// Expected number of random islands scoring at least `score`.
    pub fn expected_islands_above(&self, score: f64) -> f64 {
        let first = (score / self.bin_size).round().max(0.0) as usize;
        self.island_expectation.iter().skip(first).sum()
    }
}

impl BackgroundModel for PoissonBackground {
    fn min_window_count(&self) -> u32 {
        self.min_window_count
    }

    fn score_threshold(&self, e_value: f64) -> f64 {
        let mut cumulative = 0.0;
        let mut threshold_bin = self.island_expectation.len();
        for (bin, expectation) in self.island_expectation.iter().enumerate().rev() {
            if cumulative + expectation > e_value {
                break;
            }
            cumulative += expectation;
            threshold_bin = bin;
        }
        threshold_bin as f64 * self.bin_size
    }
}

///
/// Number of window counts tabulated for a window average: far enough past the
/// mean that the remaining tail is negligible.
///
pub fn window_count_limit(window_average: f64) -> u64 {
    let reach = (window_average + 20.0 * window_average.sqrt() + 50.0).ceil() as u64;
    reach.max(MIN_WINDOW_COUNT_TABLE)
}

///
/// Smallest `k` with P(X >= k) <= `window_pvalue`.
///
fn minimum_count(pmf: &[f64], window_pvalue: f64) -> u32 {
    let mut survival = 1.0;
    let mut k = 0usize;
    while survival > window_pvalue && k < pmf.len() {
        survival -= pmf[k];
        k += 1;
    }
    k as u32
}

///
/// Expected number of random islands per score bin.
///
/// Single-window islands are an eligible window between two ineligible ones. An
/// island of `n + 1` windows extends one of `n` windows by an eligible window that
/// follows at most `gap_windows` ineligible ones, which is a convolution with the
/// eligible-window score distribution scaled by the gap factor.
///
fn tabulate_island_expectation(
    pmf: &[f64],
    min_window_count: u32,
    window_average: f64,
    window_count: f64,
    gap_windows: u32,
    bin_size: f64,
) -> Vec<f64> {
    let bins = (MAX_ISLAND_SCORE / bin_size).ceil() as usize + 1;

    // sparse distribution of eligible window scores: (bin, probability)
    let mut kernel: Vec<(usize, f64)> = Vec::new();
    for (k, &probability) in pmf.iter().enumerate().skip(min_window_count as usize) {
        if probability < NEGLIGIBLE_EXPECTATION {
            continue;
        }
        let score = window_score(k as u32, window_average);
        if score <= 0.0 {
            continue;
        }
        let bin = (score / bin_size).round() as usize;
        if bin < bins {
            kernel.push((bin, probability));
        }
    }

    kernel.sort_by_key(|&(bin, _)| bin);

    let mut expectation = vec![0.0; bins];
    if kernel.is_empty() {
        return expectation;
    }

    let ineligible = pmf
        .iter()
        .take(min_window_count as usize)
        .sum::<f64>()
        .min(1.0);
    let boundary = ineligible * ineligible;
    let gap_factor: f64 = (0..=gap_windows).map(|j| ineligible.powi(j as i32)).sum();

    let mut current = vec![0.0; bins];
    for &(bin, probability) in &kernel {
        current[bin] += window_count * boundary * probability;
    }

    let mut total = 0.0;
    for _ in 0..MAX_ISLAND_WINDOWS {
        let added: f64 = current.iter().sum();
        for (slot, value) in expectation.iter_mut().zip(current.iter()) {
            *slot += value;
        }
        total += added;
        if added < NEGLIGIBLE_EXPECTATION || added <= total * CONVERGENCE_TOLERANCE {
            break;
        }

        let mut next = vec![0.0; bins];
        for (bin, &value) in current.iter().enumerate() {
            if value < NEGLIGIBLE_EXPECTATION {
                continue;
            }
            for &(offset, probability) in &kernel {
                let target = bin + offset;
                if target >= bins {
                    break;
                }
                next[target] += value * probability * gap_factor;
            }
        }
        current = next;
    }

    expectation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poisson::poisson_upper_tail;

    use rstest::*;

    #[rstest]
    fn test_fixed_background() {
        let background = FixedBackground {
            min_window_count: 3,
            score_threshold: 42.0,
        };
        assert_eq!(background.min_window_count(), 3);
        assert_eq!(background.score_threshold(1.0), 42.0);
        assert_eq!(background.score_threshold(1e6), 42.0);
    }

    #[rstest]
    #[case(0.5)]
    #[case(1.3)]
    #[case(4.0)]
    fn test_minimum_count_is_smallest_passing_count(#[case] average: f64) {
        let pmf: Vec<f64> = (0..window_count_limit(average))
            .map(|k| poisson_pmf(k, average))
            .collect();
        let min = minimum_count(&pmf, 0.2) as u64;

        assert!(poisson_upper_tail(min, average) <= 0.2 + 1e-12);
        assert!(poisson_upper_tail(min - 1, average) > 0.2);
    }

    #[rstest]
    fn test_high_window_average() {
        // 3e8 tags in 5kb windows on 2.3e9 bp: about 652 tags per window
        let background = PoissonBackground::new(300_000_000, 5000, 15_000, 0.2, 2.3e9, 0.1);
        let average = background.window_average();
        let min = background.min_window_count() as u64;

        assert!(min as f64 > average);
        assert!(poisson_upper_tail(min, average) <= 0.2 + 1e-12);
        assert!(poisson_upper_tail(min - 1, average) > 0.2);
        assert!(background.score_threshold(1000.0) > 0.0);
    }

    #[rstest]
    #[case(0.4, 500)]
    #[case(652.0, 1213)]
    fn test_window_count_limit(#[case] average: f64, #[case] expected: u64) {
        assert_eq!(window_count_limit(average), expected);
    }

    #[fixture]
    fn background() -> PoissonBackground {
        // 2e5 tags on a 1e8 bp effective genome: 0.4 tags per 200bp window
        PoissonBackground::new(200_000, 200, 600, 0.2, 1e8, 0.01)
    }

    #[rstest]
    fn test_window_average(background: PoissonBackground) {
        assert!((background.window_average() - 0.4).abs() < 1e-12);
        assert_eq!(background.min_window_count(), 2);
    }

    #[rstest]
    fn test_threshold_decreases_with_e_value(background: PoissonBackground) {
        let strict = background.score_threshold(1.0);
        let lenient = background.score_threshold(1000.0);
        assert!(strict > lenient, "{} <= {}", strict, lenient);
        assert!(lenient > 0.0);
    }

    #[rstest]
    fn test_threshold_meets_e_value(background: PoissonBackground) {
        for e_value in [1.0, 10.0, 100.0, 1000.0] {
            let threshold = background.score_threshold(e_value);
            assert!(background.expected_islands_above(threshold) <= e_value * (1.0 + 1e-9));
            // one bin lower admits more than e_value islands
            assert!(background.expected_islands_above(threshold - 0.01) > e_value);
        }
    }

    #[rstest]
    fn test_empty_library() {
        let background = PoissonBackground::new(0, 200, 600, 0.2, 1e6, 0.01);
        assert_eq!(background.min_window_count(), 1);
        assert_eq!(background.score_threshold(1.0), 0.0);
    }
}
