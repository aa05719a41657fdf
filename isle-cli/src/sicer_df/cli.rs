use clap::{Arg, Command, arg};

use crate::params::sicer_param_args;
use crate::sicer::cli::DEFAULT_OUTPUT_DIR;

pub const SICER_DF_CMD: &str = "sicer-df";

pub fn create_sicer_df_cli() -> Command {
    Command::new(SICER_DF_CMD)
        .author("Databio")
        .about("Find islands with differential enrichment between two ChIP-seq libraries.")
        .arg(
            Arg::new("treatment")
                .long("treatment")
                .short('t')
                .num_args(2)
                .value_names(["A", "B"])
                .required(true)
                .help("Treatment reads of libraries A and B in BED6 format"),
        )
        .arg(
            Arg::new("control")
                .long("control")
                .short('c')
                .num_args(2)
                .value_names(["A", "B"])
                .help("Control reads of libraries A and B in BED6 format"),
        )
        .arg(arg!(--"chrom-sizes" <chromsizes> "Two-column chrom.sizes file of the reference genome").required(true))
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .default_value(DEFAULT_OUTPUT_DIR)
                .help("Directory the output files are written to"),
        )
        .args(sicer_param_args())
}
