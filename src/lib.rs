//! Future water use estimator.
//!
//! Collects five water-access percentages, runs them through a pre-trained
//! regression model and reports the predicted future water use together with
//! an advisory when the value is unusually high or low.

pub mod monitoring;

pub mod api;
pub mod app;
pub mod cli;
pub mod core;
pub mod ml;
pub mod report;

pub use crate::app::App;
pub use crate::core::{AccessMetrics, Estimate, EstimatorError, EstimatorResult, FeatureVector, Settings};
pub use crate::ml::{run_inference, LoadedModel, ModelLoader, Regressor};
