// HTTP surface: the HTML form and its JSON counterpart

pub mod page;
pub mod server;

use serde::Serialize;

use crate::core::Estimate;

pub use server::{EstimatorServer, handle_rejection};

/// JSON body returned for a successful prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub features: Vec<f64>,
    pub prediction: f64,
    pub formatted: String,
    pub advisory: &'static str,
    pub message: Option<&'static str>,
}

impl From<&Estimate> for PredictionResponse {
    fn from(estimate: &Estimate) -> Self {
        let prediction = &estimate.prediction;
        Self {
            features: estimate.features.as_slice().to_vec(),
            prediction: prediction.value,
            formatted: prediction.formatted(),
            advisory: prediction.band.as_str(),
            message: prediction.band.message(),
        }
    }
}

/// JSON body returned for any failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
