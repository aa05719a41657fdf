//! Genome metadata: the ordered chromosome list and per-chromosome lengths.
//!
//! The chromosome order is the order of the `chrom.sizes` file and it is the order
//! every per-chromosome result is reported in.

use std::io::BufRead;
use std::path::Path;

use fxhash::FxHashMap;

use crate::errors::CoreError;
use crate::utils::get_dynamic_reader;

#[derive(Debug, Clone)]
pub struct GenomeData {
    chroms: Vec<String>,
    lengths: FxHashMap<String, u32>,
}

impl GenomeData {
    ///
    /// Build genome metadata from `(chrom, length)` pairs, keeping their order.
    ///
    pub fn new(chrom_lengths: Vec<(String, u32)>) -> Result<Self, CoreError> {
        let mut chroms = Vec::with_capacity(chrom_lengths.len());
        let mut lengths = FxHashMap::default();

        for (chrom, length) in chrom_lengths {
            if lengths.insert(chrom.clone(), length).is_some() {
                return Err(CoreError::DuplicateChromosome(chrom));
            }
            chroms.push(chrom);
        }

        Ok(GenomeData { chroms, lengths })
    }

    ///
    /// Read a two column `chrom.sizes` file (name, length), whitespace separated.
    ///
    pub fn from_chrom_sizes<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path)?;

        let mut chrom_lengths = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(chrom), Some(length)) = (parts.next(), parts.next()) else {
                return Err(CoreError::ChromSizesParseError {
                    line: index + 1,
                    reason: "expected a chromosome name and a length".to_string(),
                });
            };
            let length = length
                .parse::<u32>()
                .map_err(|_| CoreError::ChromSizesParseError {
                    line: index + 1,
                    reason: format!("invalid length '{}'", length),
                })?;
            chrom_lengths.push((chrom.to_string(), length));
        }

        if chrom_lengths.is_empty() {
            return Err(CoreError::EmptyGenome(path.display().to_string()));
        }

        GenomeData::new(chrom_lengths)
    }

    pub fn chroms(&self) -> &[String] {
        &self.chroms
    }

    pub fn chrom_length(&self, chrom: &str) -> Option<u32> {
        self.lengths.get(chrom).copied()
    }

    pub fn contains_chr(&self, chrom: &str) -> bool {
        self.lengths.contains_key(chrom)
    }

    ///
    /// Chromosomes with their lengths, in genome order.
    ///
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.chroms
            .iter()
            .map(|chrom| (chrom.as_str(), self.lengths[chrom]))
    }

    pub fn genome_length(&self) -> u64 {
        self.lengths.values().map(|&l| l as u64).sum()
    }

    ///
    /// The mappable share of the genome used for background rates.
    ///
    pub fn effective_length(&self, effective_fraction: f64) -> f64 {
        self.genome_length() as f64 * effective_fraction
    }

    pub fn len(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }
}
