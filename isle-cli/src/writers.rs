//! Tab-delimited and WIG output files of SICER and SICER-DF runs.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use isle_core::windows::ChromWindows;
use isle_islands::differential::Direction;
use isle_islands::normalize::{normalize_windows, wig_scaling};
use isle_islands::{PerChrom, SicerConfig, SicerDfOutput, SicerOutput};

pub const DIFFERENTIAL_SUMMARY_HEADER: &str = "#chrom\tstart\tend\tReadcount_A\tNormalized_Readcount_A\tReadcount_B\tNormalized_Readcount_B\tFc_A_vs_B\tpvalue_A_vs_B\tFDR_A_vs_B\tFc_B_vs_A\tpvalue_B_vs_A\tFDR_B_vs_A";

///
/// Output file names of one library's SICER run.
///
pub struct SicerFileNames {
    name: String,
    window_size: u32,
    gap_size: u32,
    false_discovery_rate: f64,
}

impl SicerFileNames {
    pub fn new(name: &str, config: &SicerConfig) -> Self {
        SicerFileNames {
            name: name.to_string(),
            window_size: config.window_size,
            gap_size: config.gap_size,
            false_discovery_rate: config.false_discovery_rate,
        }
    }

    fn window_gap(&self) -> String {
        format!("{}-W{}-G{}", self.name, self.window_size, self.gap_size)
    }

    pub fn normalized_wig(&self) -> String {
        format!("{}-W{}-normalized.wig", self.name, self.window_size)
    }

    pub fn score_island(&self) -> String {
        format!("{}.scoreisland", self.window_gap())
    }

    pub fn islands_summary(&self) -> String {
        format!("{}-islands-summary", self.window_gap())
    }

    pub fn fdr_island_bed(&self) -> String {
        format!("{}-FDR{}-island.bed", self.window_gap(), self.false_discovery_rate)
    }

    pub fn island_filtered_bed(&self) -> String {
        format!(
            "{}-FDR{}-islandfiltered.bed",
            self.window_gap(),
            self.false_discovery_rate
        )
    }

    pub fn island_filtered_wig(&self) -> String {
        format!(
            "{}-FDR{}-islandfiltered-normalized.wig",
            self.window_gap(),
            self.false_discovery_rate
        )
    }
}

///
/// Output file names of a SICER-DF comparison of libraries A and B.
///
pub struct SicerDfFileNames {
    name_a: String,
    name_b: String,
    window_size: u32,
    gap_size: u32,
    e_value: f64,
    false_discovery_rate_df: f64,
}

impl SicerDfFileNames {
    pub fn new(name_a: &str, name_b: &str, config: &SicerConfig) -> Self {
        SicerDfFileNames {
            name_a: name_a.to_string(),
            name_b: name_b.to_string(),
            window_size: config.window_size,
            gap_size: config.gap_size,
            e_value: config.e_value,
            false_discovery_rate_df: config.false_discovery_rate_df,
        }
    }

    pub fn union_islands(&self) -> String {
        format!(
            "{}-vs-{}-W{}-G{}-E{}-union.island",
            self.name_a, self.name_b, self.window_size, self.gap_size, self.e_value
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-and-{}-W{}-G{}-summary",
            self.name_a, self.name_b, self.window_size, self.gap_size
        )
    }

    pub fn directional_summary(&self, label: &str) -> String {
        format!(
            "{}-and-{}-W{}-G{}-FDR{}-{}-islands-summary",
            self.name_a,
            self.name_b,
            self.window_size,
            self.gap_size,
            self.false_discovery_rate_df,
            label
        )
    }
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

///
/// Write one line per item, optionally preceded by `header`.
///
pub fn write_rows<I, T>(path: &Path, header: Option<&str>, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let mut writer = create_file(path)?;
    if let Some(header) = header {
        writeln!(writer, "{}", header)?;
    }
    let mut count = 0;
    for row in rows {
        writeln!(writer, "{}", row)?;
        count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(count)
}

///
/// Write a `variableStep` WIG track of window counts normalized to reads per
/// million per kb. Chromosomes without windows get no block.
///
pub fn write_normalized_wig(
    path: &Path,
    track_name: &str,
    windows: &PerChrom<ChromWindows>,
    window_size: u32,
) -> Result<()> {
    let total_tags: u64 = windows.values().map(|chrom| chrom.total_tags).sum();
    let scaling = wig_scaling(total_tags, window_size);

    let mut writer = create_file(path)?;
    writeln!(writer, "track type=wiggle_0 name={}", track_name)?;
    for (chrom, chrom_windows) in windows.iter() {
        if chrom_windows.windows.is_empty() {
            continue;
        }
        writeln!(writer, "variableStep chrom={} span={}", chrom, window_size)?;
        for value in normalize_windows(&chrom_windows.windows, scaling) {
            writeln!(writer, "{}\t{}", value.position, value.value)?;
        }
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

///
/// Create `dir` if it does not exist.
///
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

///
/// Write every file of a SICER run into `dir`. Returns the written paths.
///
pub fn write_sicer_outputs(dir: &Path, output: &SicerOutput, config: &SicerConfig) -> Result<Vec<PathBuf>> {
    let names = SicerFileNames::new(&output.name, config);
    let mut written = Vec::new();

    let path = dir.join(names.normalized_wig());
    write_normalized_wig(&path, &output.name, &output.windows, config.window_size)?;
    written.push(path);

    let path = dir.join(names.score_island());
    write_rows(&path, None, output.candidate_islands.flatten())?;
    written.push(path);

    if let Some(annotated) = &output.annotated_islands {
        let path = dir.join(names.islands_summary());
        write_rows(&path, None, annotated.flatten())?;
        written.push(path);
    }

    if let Some(significant) = &output.significant_islands {
        let path = dir.join(names.fdr_island_bed());
        let rows = significant.flatten().map(|island| {
            format!(
                "{}\t{}\t{}\t{}",
                island.island.chrom, island.island.start, island.island.end, island.treatment_count
            )
        });
        write_rows(&path, None, rows)?;
        written.push(path);
    }

    if let (Some(reads), Some(read_windows)) = (&output.island_reads, &output.island_read_windows) {
        let path = dir.join(names.island_filtered_bed());
        write_rows(&path, None, reads.flatten())?;
        written.push(path);

        let path = dir.join(names.island_filtered_wig());
        let track_name = format!("{}-islandfiltered", output.name);
        write_normalized_wig(&path, &track_name, read_windows, config.window_size)?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

///
/// Write the comparison files of a SICER-DF run into `dir`, after both libraries'
/// own SICER files.
///
pub fn write_sicer_df_outputs(dir: &Path, output: &SicerDfOutput, config: &SicerConfig) -> Result<Vec<PathBuf>> {
    let mut written = write_sicer_outputs(dir, &output.library_a, config)?;
    written.extend(write_sicer_outputs(dir, &output.library_b, config)?);

    let names = SicerDfFileNames::new(&output.library_a.name, &output.library_b.name, config);
    let mut comparison = Vec::new();

    let path = dir.join(names.union_islands());
    write_rows(&path, None, output.union_islands.flatten())?;
    comparison.push(path);

    let path = dir.join(names.summary());
    write_rows(
        &path,
        Some(DIFFERENTIAL_SUMMARY_HEADER),
        output.differential_islands.flatten(),
    )?;
    comparison.push(path);

    for (direction, islands) in [
        (Direction::Increased, &output.increased),
        (Direction::Decreased, &output.decreased),
    ] {
        let path = dir.join(names.directional_summary(direction.label()));
        write_rows(&path, None, islands.flatten())?;
        comparison.push(path);
    }

    for path in &comparison {
        info!("Wrote {}", path.display());
    }
    written.extend(comparison);
    Ok(written)
}
