use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, value_parser};

use isle_islands::SicerConfig;

///
/// Island calling parameters shared by `sicer` and `sicer-df`.
///
pub fn sicer_param_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .long("config")
            .help("YAML file with run parameters. Flags given on the command line take precedence"),
        Arg::new("window-size")
            .long("window-size")
            .short('w')
            .value_parser(value_parser!(u32))
            .help("Window size in bp [default: 200]"),
        Arg::new("gap-size")
            .long("gap-size")
            .short('g')
            .value_parser(value_parser!(u32))
            .help("Gap size in bp, a multiple of the window size [default: 600]"),
        Arg::new("fragment-size")
            .long("fragment-size")
            .short('f')
            .value_parser(value_parser!(u32))
            .help("Fragment size in bp, reads are shifted by half of it [default: 150]"),
        Arg::new("effective-genome-fraction")
            .long("effective-genome-fraction")
            .value_parser(value_parser!(f64))
            .help("Mappable fraction of the genome [default: 0.74]"),
        Arg::new("e-value")
            .long("e-value")
            .short('e')
            .value_parser(value_parser!(f64))
            .help("Expected number of random islands at the score threshold [default: 1000]"),
        Arg::new("fdr")
            .long("fdr")
            .value_parser(value_parser!(f64))
            .help("False discovery rate cutoff of significant islands [default: 0.01]"),
        Arg::new("fdr-df")
            .long("fdr-df")
            .value_parser(value_parser!(f64))
            .help("False discovery rate cutoff of differential islands [default: 0.01]"),
        Arg::new("redundancy-threshold")
            .long("redundancy-threshold")
            .value_parser(value_parser!(u32))
            .help("Copies of identical reads to keep [default: 1]"),
        Arg::new("cpu")
            .long("cpu")
            .short('p')
            .value_parser(value_parser!(usize))
            .help("Number of worker threads [default: 1]"),
        Arg::new("min-window-count")
            .long("min-window-count")
            .value_parser(value_parser!(u32))
            .help("Use this minimum window tag count instead of the background model's"),
        Arg::new("score-threshold")
            .long("score-threshold")
            .value_parser(value_parser!(f64))
            .help("Use this island score threshold instead of the background model's"),
        Arg::new("significant-reads")
            .long("significant-reads")
            .action(ArgAction::SetTrue)
            .help("Also output the reads in significant islands and their WIG track"),
        Arg::new("progress")
            .long("progress")
            .action(ArgAction::SetTrue)
            .help("Show per-chromosome progress bars"),
    ]
}

///
/// Configuration from `--config` (or defaults) with explicit flags applied on top.
///
pub fn config_from_matches(matches: &ArgMatches) -> Result<SicerConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SicerConfig::from_yaml(Path::new(path))
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => SicerConfig::default(),
    };

    if let Some(value) = matches.get_one::<u32>("window-size") {
        config.window_size = *value;
    }
    if let Some(value) = matches.get_one::<u32>("gap-size") {
        config.gap_size = *value;
    }
    if let Some(value) = matches.get_one::<u32>("fragment-size") {
        config.fragment_size = *value;
    }
    if let Some(value) = matches.get_one::<f64>("effective-genome-fraction") {
        config.effective_genome_fraction = *value;
    }
    if let Some(value) = matches.get_one::<f64>("e-value") {
        config.e_value = *value;
    }
    if let Some(value) = matches.get_one::<f64>("fdr") {
        config.false_discovery_rate = *value;
    }
    if let Some(value) = matches.get_one::<f64>("fdr-df") {
        config.false_discovery_rate_df = *value;
    }
    if let Some(value) = matches.get_one::<u32>("redundancy-threshold") {
        config.redundancy_threshold = *value;
    }
    if let Some(value) = matches.get_one::<usize>("cpu") {
        config.cpu = *value;
    }
    if let Some(value) = matches.get_one::<u32>("min-window-count") {
        config.min_window_count = Some(*value);
    }
    if let Some(value) = matches.get_one::<f64>("score-threshold") {
        config.score_threshold = Some(*value);
    }
    if matches.get_flag("significant-reads") {
        config.significant_reads = true;
    }
    if matches.get_flag("progress") {
        config.show_progress = true;
    }

    config.validate().context("Invalid parameters")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> ArgMatches {
        Command::new("test")
            .args(sicer_param_args())
            .get_matches_from(std::iter::once("test").chain(args.iter().copied()))
    }

    #[rstest]
    fn test_defaults() {
        let config = config_from_matches(&parse(&[])).unwrap();
        assert_eq!(config, SicerConfig::default());
    }

    #[rstest]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "window_size: 100\ngap_size: 200\ncpu: 3").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = config_from_matches(&parse(&[
            "--config",
            &path,
            "--gap-size",
            "300",
            "--significant-reads",
        ]))
        .unwrap();

        assert_eq!(config.window_size, 100);
        assert_eq!(config.gap_size, 300);
        assert_eq!(config.cpu, 3);
        assert!(config.significant_reads);
    }

    #[rstest]
    fn test_invalid_parameters_are_rejected() {
        assert!(config_from_matches(&parse(&["--gap-size", "250"])).is_err());
    }
}
