use std::fmt::{self, Display};

use crate::models::span::GenomicSpan;

///
/// Fixed-width genomic bin with the number of tags that landed in it.
///
/// `end` is inclusive: a 200bp window starting at 0 ends at 199.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Window {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub count: u32,
}

///
/// A window that passed the minimum count filter, together with its enrichment
/// score `-ln P(X = count)`.
///
#[derive(PartialEq, Debug, Clone)]
pub struct ScoredWindow {
    pub window: Window,
    pub score: f64,
}

impl GenomicSpan for Window {
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

impl GenomicSpan for ScoredWindow {
    fn chrom(&self) -> &str {
        &self.window.chrom
    }

    fn start(&self) -> u32 {
        self.window.start
    }

    fn end(&self) -> u32 {
        self.window.end
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.count)
    }
}

impl Display for ScoredWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.window, self.score)
    }
}
