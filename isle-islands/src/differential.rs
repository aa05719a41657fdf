//! Differential enrichment between two treatment libraries on their union islands.
//!
//! Both libraries' tags are counted on every union island and each island is tested
//! in both directions, A against B scaled by the library size ratio and B against A
//! scaled by its inverse. The two directions are corrected independently across the
//! whole genome by [`correct_differential_genome_wide`].

use isle_core::models::{DifferentialIsland, Read, UnionIsland};

use crate::associate::IslandIndex;
use crate::fdr::benjamini_hochberg;
use crate::poisson::enrichment_pvalue;
use crate::statistics::{Correlation, pearson, spearman};

/// Stands in for a zero reference count, and is added to both sides of fold changes.
pub const DIFFERENTIAL_PSEUDOCOUNT: f64 = 1.0;

/// Normalized counts are per million library reads.
pub const PER_MILLION: f64 = 1e6;

///
/// Sizes of the two libraries being compared.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LibraryScaling {
    pub library_size_a: u64,
    pub library_size_b: u64,
}

impl LibraryScaling {
    /// Library size of A over library size of B.
    pub fn scaling_factor(&self) -> f64 {
        if self.library_size_b == 0 {
            return 1.0;
        }
        self.library_size_a as f64 / self.library_size_b as f64
    }
}

///
/// Direction of a differential call.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Enriched in library A relative to B.
    Increased,
    /// Enriched in library B relative to A.
    Decreased,
}

impl Direction {
    /// The corrected significance this direction is filtered on.
    pub fn fdr(&self, island: &DifferentialIsland) -> f64 {
        match self {
            Direction::Increased => island.fdr_a_vs_b,
            Direction::Decreased => island.fdr_b_vs_a,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
        }
    }
}

///
/// Pearson and Spearman correlation of the two libraries' per-million counts over
/// all union islands. `None` where the correlation is undefined.
///
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LibraryCorrelation {
    pub pearson: Option<Correlation>,
    pub spearman: Option<Correlation>,
}

///
/// P-value of `observed` tags against `reference` tags scaled by `scaling_factor`.
///
/// A zero reference count is replaced by `pseudocount`.
///
pub fn pairwise_pvalue(observed: u32, reference: u32, scaling_factor: f64, pseudocount: f64) -> f64 {
    let expected = if reference > 0 {
        reference as f64 * scaling_factor
    } else {
        pseudocount * scaling_factor
    };
    enrichment_pvalue(observed, expected)
}

///
/// Count both libraries on the union islands of one chromosome and test each island.
///
/// The FDR fields are left at 1 until [`correct_differential_genome_wide`] runs.
///
/// # Arguments
/// - union: union islands of one chromosome, sorted and non-overlapping
/// - reads_a: library A reads of that chromosome
/// - reads_b: library B reads of that chromosome
/// - fragment_size: fragment size for tag shifting
/// - chrom_length: chromosome length, for tag clamping
/// - scaling: library sizes
///
pub fn compare_libraries(
    union: &[UnionIsland],
    reads_a: &[Read],
    reads_b: &[Read],
    fragment_size: u32,
    chrom_length: u32,
    scaling: &LibraryScaling,
) -> Vec<DifferentialIsland> {
    let index = IslandIndex::new(union);
    let counts_a = index.count_reads(reads_a, fragment_size, chrom_length);
    let counts_b = index.count_reads(reads_b, fragment_size, chrom_length);
    let factor = scaling.scaling_factor();

    union
        .iter()
        .zip(counts_a)
        .zip(counts_b)
        .map(|((island, count_a), count_b)| {
            let a = count_a as f64 + DIFFERENTIAL_PSEUDOCOUNT;
            let b = count_b as f64 + DIFFERENTIAL_PSEUDOCOUNT;
            DifferentialIsland {
                island: island.clone(),
                count_a,
                norm_count_a: per_million(count_a, scaling.library_size_a),
                count_b,
                norm_count_b: per_million(count_b, scaling.library_size_b),
                fc_a_vs_b: (a / b) / factor,
                p_a_vs_b: pairwise_pvalue(count_a, count_b, factor, DIFFERENTIAL_PSEUDOCOUNT),
                fdr_a_vs_b: 1.0,
                fc_b_vs_a: (b / a) * factor,
                p_b_vs_a: pairwise_pvalue(count_b, count_a, 1.0 / factor, DIFFERENTIAL_PSEUDOCOUNT),
                fdr_b_vs_a: 1.0,
            }
        })
        .collect()
}

fn per_million(count: u32, library_size: u64) -> f64 {
    if library_size == 0 {
        return 0.0;
    }
    count as f64 / library_size as f64 * PER_MILLION
}

///
/// Independent Benjamini-Hochberg corrections of both directions over every
/// chromosome's union islands, given in genome order.
///
pub fn correct_differential_genome_wide<'a, I>(chroms: I)
where
    I: IntoIterator<Item = &'a mut Vec<DifferentialIsland>>,
{
    let mut chroms: Vec<&'a mut Vec<DifferentialIsland>> = chroms.into_iter().collect();

    let (p_a_vs_b, p_b_vs_a): (Vec<f64>, Vec<f64>) = chroms
        .iter()
        .flat_map(|islands| islands.iter().map(|island| (island.p_a_vs_b, island.p_b_vs_a)))
        .unzip();
    let fdr_a_vs_b = benjamini_hochberg(&p_a_vs_b);
    let fdr_b_vs_a = benjamini_hochberg(&p_b_vs_a);

    for ((island, a_vs_b), b_vs_a) in chroms
        .iter_mut()
        .flat_map(|islands| islands.iter_mut())
        .zip(fdr_a_vs_b)
        .zip(fdr_b_vs_a)
    {
        island.fdr_a_vs_b = a_vs_b;
        island.fdr_b_vs_a = b_vs_a;
    }
}

///
/// Correlation of the per-million counts of the two libraries.
///
pub fn library_correlation<'a, I>(islands: I) -> LibraryCorrelation
where
    I: IntoIterator<Item = &'a DifferentialIsland>,
{
    let (a, b): (Vec<f64>, Vec<f64>) = islands
        .into_iter()
        .map(|island| (island.norm_count_a, island.norm_count_b))
        .unzip();
    LibraryCorrelation {
        pearson: pearson(&a, &b),
        spearman: spearman(&a, &b),
    }
}

///
/// Islands significant in `direction` at `false_discovery_rate`.
///
pub fn filter_by_direction(
    islands: &[DifferentialIsland],
    direction: Direction,
    false_discovery_rate: f64,
) -> Vec<DifferentialIsland> {
    islands
        .iter()
        .filter(|island| direction.fdr(island) <= false_discovery_rate)
        .cloned()
        .collect()
}
