use std::fmt::{self, Display};

use crate::models::span::GenomicSpan;

///
/// A merged run of enriched windows. `score` is the sum of the window scores.
///
#[derive(PartialEq, Debug, Clone)]
pub struct Island {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub score: f64,
}

///
/// An island tested against the control library.
///
/// `corrected_significance` is the Benjamini-Hochberg adjusted p-value. It is only
/// meaningful once every chromosome has been tested, since the ranking spans the
/// whole genome; until then it holds the conservative value 1.
///
#[derive(PartialEq, Debug, Clone)]
pub struct AnnotatedIsland {
    pub island: Island,
    pub treatment_count: u32,
    pub control_count: u32,
    pub expected_control: f64,
    pub p_value: f64,
    pub fold_change: f64,
    pub corrected_significance: f64,
}

///
/// An interval from the union of two island sets. Carries no counts of its own.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct UnionIsland {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
}

///
/// A union island compared between library A and library B, in both directions.
///
#[derive(PartialEq, Debug, Clone)]
pub struct DifferentialIsland {
    pub island: UnionIsland,
    pub count_a: u32,
    pub norm_count_a: f64,
    pub count_b: u32,
    pub norm_count_b: f64,
    pub fc_a_vs_b: f64,
    pub p_a_vs_b: f64,
    pub fdr_a_vs_b: f64,
    pub fc_b_vs_a: f64,
    pub p_b_vs_a: f64,
    pub fdr_b_vs_a: f64,
}

macro_rules! impl_span {
    ($ty:ty) => {
        impl GenomicSpan for $ty {
            fn chrom(&self) -> &str {
                &self.chrom
            }

            fn start(&self) -> u32 {
                self.start
            }

            fn end(&self) -> u32 {
                self.end
            }
        }
    };
    ($ty:ty, $field:ident) => {
        impl GenomicSpan for $ty {
            fn chrom(&self) -> &str {
                &self.$field.chrom
            }

            fn start(&self) -> u32 {
                self.$field.start
            }

            fn end(&self) -> u32 {
                self.$field.end
            }
        }
    };
}

impl_span!(Island);
impl_span!(UnionIsland);
impl_span!(AnnotatedIsland, island);
impl_span!(DifferentialIsland, island);

impl Display for Island {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.score)
    }
}

impl Display for UnionIsland {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

impl Display for AnnotatedIsland {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.island.chrom,
            self.island.start,
            self.island.end,
            self.treatment_count,
            self.control_count,
            self.p_value,
            self.fold_change,
            self.corrected_significance,
        )
    }
}

impl Display for DifferentialIsland {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.island,
            self.count_a,
            self.norm_count_a,
            self.count_b,
            self.norm_count_b,
            self.fc_a_vs_b,
            self.p_a_vs_b,
            self.fdr_a_vs_b,
            self.fc_b_vs_a,
            self.p_b_vs_a,
            self.fdr_b_vs_a,
        )
    }
}
