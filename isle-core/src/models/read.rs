use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::CoreError;

#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub enum Strand {
    Forward,
    Reverse,
}

impl FromStr for Strand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(format!("unknown strand '{}'", other)),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// A single aligned sequencing read, as found in a BED6 file.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Read {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub name: String,
    pub score: i32,
    pub strand: Strand,
}

impl Read {
    ///
    /// Parse one BED6 line. `line_number` is only used for error reporting.
    ///
    /// Columns past the sixth are ignored.
    ///
    pub fn from_bed_line(line: &str, line_number: usize) -> Result<Read, CoreError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(CoreError::MalformedRead {
                line: line_number,
                reason: format!("expected 6 tab-separated fields, found {}", fields.len()),
            });
        }

        let malformed = |reason: String| CoreError::MalformedRead {
            line: line_number,
            reason,
        };

        let start = fields[1]
            .parse::<u32>()
            .map_err(|_| malformed(format!("invalid start '{}'", fields[1])))?;
        let end = fields[2]
            .parse::<u32>()
            .map_err(|_| malformed(format!("invalid end '{}'", fields[2])))?;
        let score = fields[4]
            .parse::<i32>()
            .map_err(|_| malformed(format!("invalid score '{}'", fields[4])))?;
        let strand = Strand::from_str(fields[5]).map_err(malformed)?;

        if end < start {
            return Err(malformed(format!("end {} precedes start {}", end, start)));
        }

        Ok(Read {
            chrom: fields[0].to_string(),
            start,
            end,
            name: fields[3].to_string(),
            score,
            strand,
        })
    }

    ///
    /// Position of the fragment center this read stands for.
    ///
    /// Forward reads are shifted downstream from their start by half the fragment
    /// size, reverse reads upstream from their last base. The result is clamped to
    /// `[0, chrom_length - 1]`.
    ///
    pub fn tag_position(&self, fragment_size: u32, chrom_length: u32) -> u32 {
        let shift = (fragment_size / 2) as i64;
        let position = match self.strand {
            Strand::Forward => self.start as i64 + shift,
            Strand::Reverse => self.end as i64 - 1 - shift,
        };
        let last_base = chrom_length.saturating_sub(1) as i64;
        position.clamp(0, last_base) as u32
    }
}

impl Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.name, self.score, self.strand
        )
    }
}
