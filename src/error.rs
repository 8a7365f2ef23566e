use std::path::PathBuf;

/// Errors raised while loading or joining the input tables.
///
/// Any of these halts the pipeline; arithmetic edge cases during
/// derivation are not errors and surface as `None` instead.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("data directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("required file not found: {0}")]
    MissingFile(String),
    #[error("{file}: missing required column {column}")]
    SchemaMismatch { file: String, column: String },
    #[error("{file}: cannot parse {column} at row {row}: {value:?}")]
    DateParse {
        file: String,
        column: String,
        row: usize,
        value: String,
    },
    #[error("{file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
