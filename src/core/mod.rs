pub mod config;
pub mod error;
pub mod types;

pub use config::{ServerSettings, Settings};
pub use error::{EstimatorError, EstimatorResult};
pub use types::{
    AccessMetrics, AdvisoryBand, Estimate, FeatureVector, FormField, Prediction, FEATURE_NAMES,
};
