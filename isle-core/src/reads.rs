//! Aligned reads grouped by chromosome.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use log::{debug, info};

use crate::errors::CoreError;
use crate::genome::GenomeData;
use crate::models::Read;
use crate::utils::get_dynamic_reader;

///
/// All reads of one sequencing library, bucketed per chromosome.
///
/// Only reads that lie on a chromosome of the genome, and end before that
/// chromosome's last base, are kept.
///
#[derive(Clone, Debug, Default)]
pub struct ReadSet {
    pub reads: FxHashMap<String, Vec<Read>>,
    pub path: Option<PathBuf>,
}

impl ReadSet {
    ///
    /// Load a BED6 file (optionally gzip'd).
    ///
    /// A malformed data line aborts loading with [CoreError::MalformedRead].
    ///
    pub fn from_bed<P: AsRef<Path>>(path: P, genome: &GenomeData) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let reader = get_dynamic_reader(path)?;

        let mut reads = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }
            reads.push(Read::from_bed_line(line.trim_end(), index + 1)?);
        }

        let mut read_set = ReadSet::from_reads(reads, genome);
        read_set.path = Some(path.to_path_buf());
        info!(
            "Loaded {} reads from {}",
            read_set.read_count(),
            path.display()
        );

        Ok(read_set)
    }

    pub fn from_reads<I: IntoIterator<Item = Read>>(reads: I, genome: &GenomeData) -> Self {
        let mut by_chrom: FxHashMap<String, Vec<Read>> = FxHashMap::default();
        let mut ignored = 0usize;

        for read in reads {
            match genome.chrom_length(&read.chrom) {
                Some(length) if read.end < length => {
                    by_chrom.entry(read.chrom.clone()).or_default().push(read);
                }
                Some(length) => {
                    debug!(
                        "Ignoring read with end beyond chromosome length {}: {}",
                        length, read
                    );
                    ignored += 1;
                }
                None => ignored += 1,
            }
        }

        if ignored > 0 {
            debug!("{} reads ignored (unknown chromosome or out of bounds)", ignored);
        }

        ReadSet {
            reads: by_chrom,
            path: None,
        }
    }

    ///
    /// Reads on `chrom`; empty when the chromosome has none.
    ///
    pub fn chrom_reads(&self, chrom: &str) -> &[Read] {
        self.reads.get(chrom).map(Vec::as_slice).unwrap_or(&[])
    }

    ///
    /// Library size: the number of reads currently held.
    ///
    pub fn read_count(&self) -> usize {
        self.reads.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read_count() == 0
    }
}
