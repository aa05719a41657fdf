//! Core library for isle.
//!
//! Holds the data model shared by every stage of island calling (reads, windows and
//! the island records of each stage), the genome metadata the stages are keyed by,
//! and the read preprocessing that feeds them: BED6 parsing, redundant read removal
//! and tag counting in fixed-width windows.

pub mod errors;
pub mod genome;
pub mod models;
pub mod reads;
pub mod redundancy;
pub mod utils;
pub mod windows;

// re-exports
pub use errors::CoreError;
pub use genome::GenomeData;
pub use reads::ReadSet;
