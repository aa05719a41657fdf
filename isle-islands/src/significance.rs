//! Significance of candidate islands against a control library.
//!
//! Each island's treatment tag count is tested against the control tag count in the
//! same island, scaled to the treatment library size. Islands without any control
//! tags fall back to a length-based expectation capped at
//! [`ZERO_CONTROL_EXPECTATION_CAP`]. The Benjamini-Hochberg correction ranks the
//! p-values of the whole genome at once, so it runs only after every chromosome has
//! been annotated, see [`correct_genome_wide`].

use isle_core::models::{AnnotatedIsland, GenomicSpan, Island, Read};

use crate::associate::IslandIndex;
use crate::fdr::benjamini_hochberg;
use crate::poisson::enrichment_pvalue;

/// Upper bound of the expected control count of an island without control tags.
pub const ZERO_CONTROL_EXPECTATION_CAP: f64 = 0.25;

///
/// Library sizes and genome size shared by every chromosome of a run.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlScaling {
    pub treatment_library_size: u64,
    pub control_library_size: u64,
    /// Effective genome length in bp.
    pub effective_genome_size: f64,
}

impl ControlScaling {
    /// Treatment library size over control library size.
    pub fn scaling_factor(&self) -> f64 {
        if self.control_library_size == 0 {
            return 1.0;
        }
        self.treatment_library_size as f64 / self.control_library_size as f64
    }

    ///
    /// Expected treatment count of an island of `island_length` bp holding
    /// `control_count` control tags.
    ///
    pub fn expected_control(&self, control_count: u32, island_length: u32) -> f64 {
        let scaling_factor = self.scaling_factor();
        if control_count > 0 {
            return control_count as f64 * scaling_factor;
        }

        let by_length = if self.effective_genome_size > 0.0 {
            island_length as f64 * self.control_library_size as f64 / self.effective_genome_size
        } else {
            0.0
        };
        let clamped = by_length.min(ZERO_CONTROL_EXPECTATION_CAP);
        if clamped > 0.0 {
            clamped * scaling_factor
        } else {
            ZERO_CONTROL_EXPECTATION_CAP * scaling_factor
        }
    }
}

///
/// Count treatment and control tags per island and test each island.
///
/// `corrected_significance` is left at 1 until [`correct_genome_wide`] runs.
///
/// # Arguments
/// - islands: islands of one chromosome, sorted and non-overlapping
/// - treatment: treatment reads of that chromosome
/// - control: control reads of that chromosome
/// - fragment_size: fragment size for tag shifting
/// - chrom_length: chromosome length, for tag clamping
/// - scaling: library sizes and effective genome size
///
pub fn annotate_islands(
    islands: &[Island],
    treatment: &[Read],
    control: &[Read],
    fragment_size: u32,
    chrom_length: u32,
    scaling: &ControlScaling,
) -> Vec<AnnotatedIsland> {
    let index = IslandIndex::new(islands);
    let treatment_counts = index.count_reads(treatment, fragment_size, chrom_length);
    let control_counts = index.count_reads(control, fragment_size, chrom_length);

    islands
        .iter()
        .zip(treatment_counts)
        .zip(control_counts)
        .map(|((island, treatment_count), control_count)| {
            let expected_control = scaling.expected_control(control_count, island.length());
            AnnotatedIsland {
                island: island.clone(),
                treatment_count,
                control_count,
                expected_control,
                p_value: enrichment_pvalue(treatment_count, expected_control),
                fold_change: treatment_count as f64 / expected_control,
                corrected_significance: 1.0,
            }
        })
        .collect()
}

///
/// Benjamini-Hochberg correction over every chromosome's islands.
///
/// `chroms` must yield the per-chromosome island lists in genome order; the p-values
/// are ranked together and the corrected values written back in place.
///
pub fn correct_genome_wide<'a, I>(chroms: I)
where
    I: IntoIterator<Item = &'a mut Vec<AnnotatedIsland>>,
{
    let mut chroms: Vec<&'a mut Vec<AnnotatedIsland>> = chroms.into_iter().collect();
    let pvalues: Vec<f64> = chroms
        .iter()
        .flat_map(|islands| islands.iter().map(|island| island.p_value))
        .collect();
    let corrected = benjamini_hochberg(&pvalues);

    for (island, significance) in chroms
        .iter_mut()
        .flat_map(|islands| islands.iter_mut())
        .zip(corrected)
    {
        island.corrected_significance = significance;
    }
}

///
/// Islands whose corrected significance is at most `false_discovery_rate`.
///
pub fn filter_by_fdr(islands: &[AnnotatedIsland], false_discovery_rate: f64) -> Vec<AnnotatedIsland> {
    islands
        .iter()
        .filter(|island| island.corrected_significance <= false_discovery_rate)
        .cloned()
        .collect()
}
