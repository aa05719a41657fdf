//! Island calling on windowed ChIP-seq tag counts.
//!
//! This crate implements the SICER family of island callers:
//!
//! - Poisson scoring of tag-count windows and gap-bounded merging into islands
//! - A Poisson background model that turns an E-value into an island score threshold
//! - Control-normalized significance with genome-wide Benjamini-Hochberg correction
//! - Union islands of two libraries and bidirectional differential testing
//! - Per-chromosome orchestration of all of the above on a rayon worker pool
//!
//! # Example
//!
//! ```no_run
//! use isle_core::{GenomeData, ReadSet};
//! use isle_islands::{SicerConfig, run_sicer};
//!
//! let genome = GenomeData::from_chrom_sizes("hg38.chrom.sizes").unwrap();
//! let treatment = ReadSet::from_bed("treatment.bed", &genome).unwrap();
//! let control = ReadSet::from_bed("control.bed", &genome).unwrap();
//!
//! let output = run_sicer(treatment, Some(control), &genome, &SicerConfig::default()).unwrap();
//! for (chrom, islands) in output.significant_islands.unwrap().iter() {
//!     println!("{}: {} islands", chrom, islands.len());
//! }
//! ```

pub mod associate;
pub mod background;
pub mod config;
pub mod differential;
pub mod errors;
pub mod fdr;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod poisson;
pub mod scoring;
pub mod significance;
pub mod statistics;
pub mod store;
pub mod threshold;
pub mod union;

// re-exports
pub use config::SicerConfig;
pub use errors::IslandError;
pub use pipeline::{SicerDfOutput, SicerOutput, run_sicer, run_sicer_df};
pub use store::PerChrom;
