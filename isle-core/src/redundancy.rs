//! Removal of redundant (PCR duplicate) reads.

use crate::models::{Read, Strand};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedundancyReport {
    pub total: usize,
    pub retained: usize,
}

impl RedundancyReport {
    pub fn removed(&self) -> usize {
        self.total - self.retained
    }
}

impl std::ops::Add for RedundancyReport {
    type Output = RedundancyReport;

    fn add(self, other: RedundancyReport) -> RedundancyReport {
        RedundancyReport {
            total: self.total + other.total,
            retained: self.retained + other.retained,
        }
    }
}

///
/// Keep at most `cutoff` copies of reads sharing strand, start and end.
///
/// Reads of one chromosome are sorted by (strand, start, end) in place. The first
/// copy of every distinct read is always retained, so a cutoff of 0 behaves like 1.
///
pub fn remove_redundant_reads(reads: &mut Vec<Read>, cutoff: u32) -> RedundancyReport {
    let total = reads.len();
    reads.sort_by(|a, b| (a.strand, a.start, a.end).cmp(&(b.strand, b.start, b.end)));

    let mut previous: Option<(Strand, u32, u32)> = None;
    let mut copies = 0u32;
    reads.retain(|read| {
        let key = (read.strand, read.start, read.end);
        if previous == Some(key) {
            copies += 1;
            copies <= cutoff
        } else {
            previous = Some(key);
            copies = 1;
            true
        }
    });

    RedundancyReport {
        total,
        retained: reads.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn read(start: u32, end: u32, strand: Strand) -> Read {
        Read {
            chrom: "chr1".to_string(),
            start,
            end,
            name: "r".to_string(),
            score: 0,
            strand,
        }
    }

    #[rstest]
    #[case(1, 4)]
    #[case(2, 6)]
    #[case(0, 4)]
    fn test_remove_redundant_reads(#[case] cutoff: u32, #[case] retained: usize) {
        let mut reads = vec![
            read(100, 125, Strand::Forward),
            read(100, 125, Strand::Forward),
            read(100, 125, Strand::Forward),
            read(100, 125, Strand::Reverse),
            read(100, 125, Strand::Reverse),
            read(100, 130, Strand::Forward),
            read(50, 75, Strand::Forward),
        ];

        let report = remove_redundant_reads(&mut reads, cutoff);
        assert_eq!(report.total, 7);
        assert_eq!(report.retained, retained);
        assert_eq!(reads.len(), retained);
        assert_eq!(reads[0].start, 50);
    }
}
