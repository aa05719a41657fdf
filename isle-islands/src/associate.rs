//! Assign reads to the islands their tag positions fall in.

use isle_core::models::{GenomicSpan, Read};

///
/// Binary-search index over the islands of one chromosome.
///
/// The islands must be sorted by start and pairwise non-overlapping, so a position
/// lies in at most one of them.
///
#[derive(Debug, Clone, Default)]
pub struct IslandIndex {
    starts: Vec<u32>,
    ends: Vec<u32>,
}

impl IslandIndex {
    pub fn new<T: GenomicSpan>(islands: &[T]) -> Self {
        IslandIndex {
            starts: islands.iter().map(|island| island.start()).collect(),
            ends: islands.iter().map(|island| island.end()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    ///
    /// Index of the island containing `position` (both ends inclusive), if any.
    ///
    /// Islands starting at or before the position, minus islands ending before it,
    /// must leave exactly one candidate.
    ///
    pub fn locate(&self, position: u32) -> Option<usize> {
        let started = self.starts.partition_point(|&start| start <= position);
        let finished = self.ends.partition_point(|&end| end < position);
        (started == finished + 1).then(|| started - 1)
    }

    ///
    /// Number of reads whose tag position falls in each island.
    ///
    pub fn count_reads(&self, reads: &[Read], fragment_size: u32, chrom_length: u32) -> Vec<u32> {
        let mut counts = vec![0u32; self.len()];
        for read in reads {
            if let Some(index) = self.locate(read.tag_position(fragment_size, chrom_length)) {
                counts[index] += 1;
            }
        }
        counts
    }

    ///
    /// Reads whose tag position falls in any island, in input order.
    ///
    pub fn filter_reads(&self, reads: &[Read], fragment_size: u32, chrom_length: u32) -> Vec<Read> {
        reads
            .iter()
            .filter(|read| {
                self.locate(read.tag_position(fragment_size, chrom_length))
                    .is_some()
            })
            .cloned()
            .collect()
    }
}
