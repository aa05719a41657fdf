use std::iter::Peekable;

use isle_core::models::{GenomicSpan, UnionIsland};

use crate::errors::IslandError;

///
/// Union of two island sets of one chromosome.
///
/// Both inputs must be sorted by start. They are swept together in start order;
/// an interval starting past the end of the open union island closes it, any other
/// interval extends it to `max(end, interval.end)`.
///
/// Returns [`IslandError::IslandOrderViolation`] if an input is not sorted.
///
pub fn find_union_islands<T: GenomicSpan>(
    chrom: &str,
    first: &[T],
    second: &[T],
) -> Result<Vec<UnionIsland>, IslandError> {
    let mut union: Vec<UnionIsland> = Vec::new();
    let mut sweep = SortedSweep {
        first: first.iter().peekable(),
        second: second.iter().peekable(),
    };

    let Some(head) = sweep.next() else {
        return Ok(union);
    };
    let mut current = UnionIsland {
        chrom: chrom.to_string(),
        start: head.start(),
        end: head.end(),
    };

    for next in sweep {
        if next.start() < current.start {
            return Err(IslandError::IslandOrderViolation {
                chrom: chrom.to_string(),
                previous_start: current.start,
                next_start: next.start(),
            });
        }

        if next.start() > current.end {
            let opened = UnionIsland {
                chrom: chrom.to_string(),
                start: next.start(),
                end: next.end(),
            };
            union.push(std::mem::replace(&mut current, opened));
        } else {
            current.end = current.end.max(next.end());
        }
    }
    union.push(current);

    Ok(union)
}

/// Two-way merge of two start-sorted slices.
struct SortedSweep<'a, T: GenomicSpan> {
    first: Peekable<std::slice::Iter<'a, T>>,
    second: Peekable<std::slice::Iter<'a, T>>,
}

impl<'a, T: GenomicSpan> Iterator for SortedSweep<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match (self.first.peek(), self.second.peek()) {
            (Some(a), Some(b)) if b.start() < a.start() => self.second.next(),
            (Some(_), _) => self.first.next(),
            (None, _) => self.second.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_core::models::Island;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn island(start: u32, end: u32) -> Island {
        Island {
            chrom: "chr1".to_string(),
            start,
            end,
            score: 1.0,
        }
    }

    fn union(start: u32, end: u32) -> UnionIsland {
        UnionIsland {
            chrom: "chr1".to_string(),
            start,
            end,
        }
    }

    #[rstest]
    fn test_disjoint_sets_are_not_merged() {
        let a = vec![island(0, 199), island(1000, 1199)];
        let b = vec![island(400, 599), island(2000, 2199)];

        let result = find_union_islands("chr1", &a, &b).unwrap();
        assert_eq!(
            result,
            vec![
                union(0, 199),
                union(400, 599),
                union(1000, 1199),
                union(2000, 2199)
            ]
        );
    }

    #[rstest]
    fn test_overlaps_are_merged_and_never_shrink() {
        let a = vec![island(0, 999), island(3000, 3199)];
        let b = vec![island(200, 399), island(900, 1599), island(3199, 3399)];

        let result = find_union_islands("chr1", &a, &b).unwrap();
        assert_eq!(result, vec![union(0, 1599), union(3000, 3399)]);
    }

    #[rstest]
    fn test_union_is_commutative() {
        let a = vec![island(0, 399), island(800, 1199), island(5000, 5599)];
        let b = vec![island(200, 599), island(1200, 1399), island(4000, 4199)];

        assert_eq!(
            find_union_islands("chr1", &a, &b).unwrap(),
            find_union_islands("chr1", &b, &a).unwrap()
        );
    }

    #[rstest]
    fn test_one_side_empty() {
        let a = vec![island(0, 399)];
        assert_eq!(find_union_islands("chr1", &a, &[]).unwrap(), vec![union(0, 399)]);
        assert!(find_union_islands::<Island>("chr1", &[], &[]).unwrap().is_empty());
    }

    #[rstest]
    fn test_unsorted_input_is_fatal() {
        let a = vec![island(1000, 1199), island(0, 199)];
        let result = find_union_islands("chr1", &a, &[]);
        assert!(matches!(
            result,
            Err(IslandError::IslandOrderViolation {
                previous_start: 1000,
                next_start: 0,
                ..
            })
        ));
    }
}
