use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("cannot load model from {}: {reason}", path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("{0}")]
    Prediction(String),

    #[error("{field} must be a number between 0 and 100, got {value}")]
    InvalidInput { field: &'static str, value: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EstimatorError {
    pub fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Fatal errors stop startup; everything else is reported and the form stays usable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoad { .. } | Self::Config(_))
    }
}

pub type EstimatorResult<T> = Result<T, EstimatorError>;
