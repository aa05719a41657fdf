use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Malformed read record at line {line}: {reason}")]
    MalformedRead { line: usize, reason: String },

    #[error("Error parsing chromosome sizes at line {line}: {reason}")]
    ChromSizesParseError { line: usize, reason: String },

    #[error("Corrupted file. 0 chromosomes found in: {0}")]
    EmptyGenome(String),

    #[error("Duplicate chromosome in genome metadata: {0}")]
    DuplicateChromosome(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
