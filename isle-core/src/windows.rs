//! Partition a chromosome into fixed-width windows and count the tags in each.

use crate::models::{Read, Window};

///
/// Tag-containing windows of one chromosome, in start order.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromWindows {
    pub windows: Vec<Window>,
    /// Tags that landed in a retained window.
    pub total_tags: u64,
}

///
/// Bin the tag positions of `reads` into windows `[k*W, k*W + W - 1]`.
///
/// Windows without tags are not materialized. The last window of a chromosome is
/// dropped when it would reach past the chromosome end, together with its tags.
///
/// # Arguments
/// - reads: reads of a single chromosome, in any order
/// - chrom: name of that chromosome
/// - chrom_length: its length in bp
/// - fragment_size: fragment size used to shift reads to their tag position
/// - window_size: window width in bp
///
pub fn generate_windows(
    reads: &[Read],
    chrom: &str,
    chrom_length: u32,
    fragment_size: u32,
    window_size: u32,
) -> ChromWindows {
    let mut positions: Vec<u32> = reads
        .iter()
        .map(|read| read.tag_position(fragment_size, chrom_length))
        .collect();
    positions.sort_unstable();

    let mut windows: Vec<Window> = Vec::new();
    let mut total_tags = 0u64;

    let mut push_window = |start: u32, count: u32| {
        let end = start as u64 + window_size as u64 - 1;
        if end < chrom_length as u64 {
            windows.push(Window {
                chrom: chrom.to_string(),
                start,
                end: end as u32,
                count,
            });
            total_tags += count as u64;
        }
    };

    let mut current: Option<(u32, u32)> = None;
    for position in positions {
        let start = (position / window_size) * window_size;
        current = match current {
            Some((current_start, count)) if current_start == start => Some((start, count + 1)),
            Some((current_start, count)) => {
                push_window(current_start, count);
                Some((start, 1))
            }
            None => Some((start, 1)),
        };
    }
    if let Some((current_start, count)) = current {
        push_window(current_start, count);
    }

    ChromWindows {
        windows,
        total_tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Strand;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn forward_read(start: u32) -> Read {
        Read {
            chrom: "chr1".to_string(),
            start,
            end: start + 25,
            name: "r".to_string(),
            score: 0,
            strand: Strand::Forward,
        }
    }

    #[rstest]
    fn test_generate_windows() {
        // fragment 0 means the tag sits on the read start
        let reads = vec![
            forward_read(10),
            forward_read(199),
            forward_read(450),
            forward_read(205),
            forward_read(20),
        ];

        let result = generate_windows(&reads, "chr1", 1000, 0, 200);
        assert_eq!(
            result.windows,
            vec![
                Window {
                    chrom: "chr1".to_string(),
                    start: 0,
                    end: 199,
                    count: 3
                },
                Window {
                    chrom: "chr1".to_string(),
                    start: 200,
                    end: 399,
                    count: 1
                },
                Window {
                    chrom: "chr1".to_string(),
                    start: 400,
                    end: 599,
                    count: 1
                },
            ]
        );
        assert_eq!(result.total_tags, 5);
    }

    #[rstest]
    fn test_last_partial_window_is_dropped() {
        let reads = vec![forward_read(100), forward_read(910)];

        let result = generate_windows(&reads, "chr1", 950, 0, 200);
        assert_eq!(result.windows.len(), 1);
        assert_eq!(result.windows[0].start, 0);
        assert_eq!(result.total_tags, 1);
    }

    #[rstest]
    fn test_no_reads_no_windows() {
        let result = generate_windows(&[], "chr1", 1000, 150, 200);
        assert!(result.windows.is_empty());
        assert_eq!(result.total_tags, 0);
    }
}
