use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use isle_core::{GenomeData, ReadSet};
use isle_islands::run_sicer;

use crate::params::config_from_matches;
use crate::writers::{ensure_output_dir, write_sicer_outputs};

pub fn run_sicer_cmd(matches: &ArgMatches) -> Result<()> {
    let treatment = matches
        .get_one::<String>("treatment")
        .expect("A treatment file is required.");
    let control = matches.get_one::<String>("control");
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
    let treatment_reads = ReadSet::from_bed(treatment, &genome)
        .with_context(|| format!("Failed to read treatment file: {}", treatment))?;
    let control_reads = match control {
        Some(control) => Some(
            ReadSet::from_bed(control, &genome)
                .with_context(|| format!("Failed to read control file: {}", control))?,
        ),
        None => None,
    };

    let output = run_sicer(treatment_reads, control_reads, &genome, &config)?;

    ensure_output_dir(output_dir)?;
    write_sicer_outputs(output_dir, &output, &config)?;

    info!(
        "{}: {} candidate islands",
        output.name,
        output.candidate_islands.total_len()
    );
    if let Some(significant) = &output.significant_islands {
        info!(
            "{}: {} islands at FDR {}",
            output.name,
            significant.total_len(),
            config.false_discovery_rate
        );
    }
    if let Some(reads) = output.significant_read_count() {
        info!("{}: {} reads in significant islands", output.name, reads);
    }

    Ok(())
}
