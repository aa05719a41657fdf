use clap::{Arg, Command, arg};

use crate::params::sicer_param_args;

pub const SICER_CMD: &str = "sicer";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

pub fn create_sicer_cli() -> Command {
    Command::new(SICER_CMD)
        .author("Databio")
        .about("Call enriched islands in a ChIP-seq library, optionally against a control library.")
        .arg(
            Arg::new("treatment")
                .long("treatment")
                .short('t')
                .required(true)
                .help("Treatment reads in BED6 format (plain or gzipped)"),
        )
        .arg(
            Arg::new("control")
                .long("control")
                .short('c')
                .help("Control reads in BED6 format (plain or gzipped)"),
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
