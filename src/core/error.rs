//! Error types for the model contract and evaluation pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model not trained")]
    NotTrained,

    #[error("Operation not supported by this model: {0}")]
    Unsupported(&'static str),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Unknown class label: {0}")]
    UnknownLabel(u32),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Observer already registered")]
    DuplicateObserver,

    #[error("Observer not registered")]
    ObserverNotRegistered,

    #[error("Notification failed for {failed} of {total} observers")]
    NotifyFailed { failed: usize, total: usize },

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
