use thiserror::Error;

/// A result type for surrogate benchmark errors
pub type Result<T> = std::result::Result<T, BenchError>;

/// An error raised while loading, scaling, fitting or reporting a surrogate benchmark
#[derive(Error, Debug)]
pub enum BenchError {
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When input data does not have the expected layout or values
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// When a training column cannot be scaled
    #[error("Degenerate column {column}: {reason}")]
    DegenerateColumn {
        /// Name of the offending column
        column: String,
        /// Why the column cannot be scaled
        reason: String,
    },
    /// When sampled predictions are requested before posterior sampling
    #[error("No posterior sample: {0}")]
    NotSampled(String),
    /// When GP training or prediction fails
    #[error("GP error")]
    GpError(#[from] egobox_gp::GpError),
    /// When a `linfa` error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When IO fails
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    /// When csv read or write fails
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// When numpy array write fails
    #[error("IO error")]
    WriteNpyError(#[from] ndarray_npy::WriteNpyError),
    /// When configuration (de)serialization fails
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// When the dedicated fitting thread pool cannot be built
    #[error(transparent)]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),
}
