mod params;
mod sicer;
mod sicer_df;
mod writers;

use anyhow::Result;
use clap::{ArgAction, Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "isle";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Identify enriched islands in ChIP-seq libraries and compare them between libraries.")
        .subcommand_required(true)
        .arg(
            arg!(-v --verbose "Log debug messages")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(sicer::cli::create_sicer_cli())
        .subcommand(sicer_df::cli::create_sicer_df_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // SICER
        //
        Some((sicer::cli::SICER_CMD, matches)) => {
            sicer::handlers::run_sicer_cmd(matches)?;
        }

        //
        // SICER-DF
        //
        Some((sicer_df::cli::SICER_DF_CMD, matches)) => {
            sicer_df::handlers::run_sicer_df_cmd(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_parse_sicer_df() {
        let matches = build_parser().get_matches_from([
            "isle",
            "sicer-df",
            "-t",
            "a.bed",
            "b.bed",
            "--chrom-sizes",
            "hg38.chrom.sizes",
            "-v",
        ]);
        assert!(matches.get_flag("verbose"));

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, sicer_df::cli::SICER_DF_CMD);
        let treatments: Vec<&String> = sub.get_many::<String>("treatment").unwrap().collect();
        assert_eq!(treatments, vec!["a.bed", "b.bed"]);
        assert_eq!(sub.get_one::<String>("output-dir").unwrap(), ".");
    }

    #[rstest]
    fn test_sicer_requires_treatment() {
        let result = build_parser().try_get_matches_from(["isle", "sicer", "--chrom-sizes", "x"]);
        assert!(result.is_err());
    }
}
