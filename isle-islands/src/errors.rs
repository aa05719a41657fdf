use isle_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IslandError {
    #[error(
        "Islands on {chrom} are not sorted: interval starting at {next_start} follows one starting at {previous_start}"
    )]
    IslandOrderViolation {
        chrom: String,
        previous_start: u32,
        next_start: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration file: {0}")]
    ConfigParseError(#[from] serde_yaml::Error),

    #[error("Library {0} has no reads left after preprocessing")]
    EmptyLibrary(String),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
