use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot sample {requested} trials from a pool of {available}")]
    SampleExceedsPool { requested: usize, available: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ExperimentError> = std::result::Result<T, E>;
