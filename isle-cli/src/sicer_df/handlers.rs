use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use isle_core::{GenomeData, ReadSet};
use isle_islands::run_sicer_df;

use crate::params::config_from_matches;
use crate::writers::{ensure_output_dir, write_sicer_df_outputs};

fn read_pair(files: Vec<&String>, genome: &GenomeData, kind: &str) -> Result<[ReadSet; 2]> {
    let mut sets = Vec::with_capacity(2);
    for file in files {
        let reads = ReadSet::from_bed(file, genome)
            .with_context(|| format!("Failed to read {} file: {}", kind, file))?;
        sets.push(reads);
    }
    sets.try_into()
        .map_err(|_| anyhow::anyhow!("Expected exactly two {} files", kind))
}

pub fn run_sicer_df_cmd(matches: &ArgMatches) -> Result<()> {
    let treatments: Vec<&String> = matches
        .get_many::<String>("treatment")
        .expect("Two treatment files are required.")
        .collect();
    let controls: Option<Vec<&String>> = matches
        .get_many::<String>("control")
        .map(|files| files.collect());
    let chrom_sizes = matches
        .get_one::<String>("chrom-sizes")
        .expect("A chrom.sizes file is required.");
    let output_dir = Path::new(
        matches
            .get_one::<String>("output-dir")
            .expect("output-dir has a default"),
    );

    let config = config_from_matches(matches)?;

    let genome = GenomeData::from_chrom_sizes(chrom_sizes)
        .with_context(|| format!("Failed to read chrom sizes: {}", chrom_sizes))?;
    let treatment_reads = read_pair(treatments, &genome, "treatment")?;
    let control_reads = match controls {
        Some(files) => Some(read_pair(files, &genome, "control")?),
        None => None,
    };

    let output = run_sicer_df(treatment_reads, control_reads, &genome, &config)?;

    ensure_output_dir(output_dir)?;
    write_sicer_df_outputs(output_dir, &output, &config)?;

    info!(
        "{} union islands, {} increased and {} decreased in {} vs {}",
        output.union_islands.total_len(),
        output.increased.total_len(),
        output.decreased.total_len(),
        output.library_a.name,
        output.library_b.name
    );
    if let Some(pearson) = output.correlation.pearson {
        info!(
            "Pearson correlation: {:.4} (p = {:e})",
            pearson.coefficient, pearson.p_value
        );
    }
    if let Some(spearman) = output.correlation.spearman {
        info!(
            "Spearman correlation: {:.4} (p = {:e})",
            spearman.coefficient, spearman.p_value
        );
    }

    Ok(())
}
