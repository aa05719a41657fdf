//! Greedy gap-bounded merging of scored windows into islands.

use isle_core::models::{Island, ScoredWindow};

/// Added to the gap tolerance to absorb window-boundary rounding.
pub const WINDOW_BOUNDARY_BUFFER: u32 = 2;

///
/// Merge consecutive scored windows into islands.
///
/// A window joins the open island when `window.start - island.end <= gap + buffer`;
/// its score is added to the island's. Otherwise the open island is emitted and a new
/// one starts at the window. The last open island is always emitted.
///
/// # Arguments
/// - windows: scored windows of one chromosome, ordered by start
/// - gap: gap tolerance in bp
///
pub fn combine_proximal_windows(windows: &[ScoredWindow], gap: u32) -> Vec<Island> {
    let tolerance = gap as i64 + WINDOW_BOUNDARY_BUFFER as i64;
    let mut islands: Vec<Island> = Vec::new();

    let mut iter = windows.iter();
    let Some(first) = iter.next() else {
        return islands;
    };

    let mut current = Island {
        chrom: first.window.chrom.clone(),
        start: first.window.start,
        end: first.window.end,
        score: first.score,
    };

    for scored in iter {
        let distance = scored.window.start as i64 - current.end as i64;
        if distance <= tolerance {
            current.end = scored.window.end;
            current.score += scored.score;
        } else {
            let next = Island {
                chrom: scored.window.chrom.clone(),
                start: scored.window.start,
                end: scored.window.end,
                score: scored.score,
            };
            islands.push(std::mem::replace(&mut current, next));
        }
    }
    islands.push(current);

    islands
}
