//! Window counts normalized to reads per million per kilobase, for WIG tracks.

use isle_core::models::Window;

///
/// Divisor turning a window count into reads per million (of `total_tags`) per kb.
///
pub fn wig_scaling(total_tags: u64, window_size: u32) -> f64 {
    total_tags as f64 / 1e6 * (window_size as f64 / 1000.0)
}

///
/// A track value: 1-based window start and its normalized count, rounded to 2 decimals.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WigValue {
    pub position: u32,
    pub value: f64,
}

pub fn normalize_windows(windows: &[Window], scaling: f64) -> Vec<WigValue> {
    windows
        .iter()
        .map(|window| {
            let value = if scaling > 0.0 {
                (window.count as f64 / scaling * 100.0).round() / 100.0
            } else {
                0.0
            };
            WigValue {
                position: window.start + 1,
                value,
            }
        })
        .collect()
}
