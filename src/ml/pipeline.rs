use tracing::debug;

use super::model::Regressor;
use crate::core::{AccessMetrics, Estimate, EstimatorError, EstimatorResult, FeatureVector, Prediction};

/// Runs one prediction for the given form values.
///
/// Errors are never fatal: out-of-range input yields
/// [`EstimatorError::InvalidInput`], anything the model does wrong yields
/// [`EstimatorError::Prediction`].
pub fn run_inference(model: &dyn Regressor, metrics: &AccessMetrics) -> EstimatorResult<Estimate> {
    crate::track_performance!("inference");

    metrics.validate()?;
    let features = FeatureVector::from(metrics);

    let output = model.predict(features.to_row().view())?;
    let value = match output.as_slice() {
        Some(&[value]) => value,
        _ => {
            return Err(EstimatorError::Prediction(format!(
                "expected a single prediction, got {}",
                output.len()
            )))
        }
    };

    if !value.is_finite() {
        return Err(EstimatorError::Prediction(format!(
            "model returned a non-finite value ({})",
            value
        )));
    }

    let prediction = Prediction::new(value);
    debug!(
        features = ?features.as_slice(),
        prediction = value,
        advisory = prediction.band.as_str(),
        "Inference completed"
    );

    Ok(Estimate { features, prediction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AdvisoryBand, FormField};
    use ndarray::{Array1, ArrayView2};
    use std::sync::Mutex;

    /// Returns a fixed output and remembers the rows it was given.
    struct StubModel {
        output: Vec<f64>,
        seen: Mutex<Vec<Vec<f64>>>,
    }

    impl StubModel {
        fn returning(output: Vec<f64>) -> Self {
            Self { output, seen: Mutex::new(Vec::new()) }
        }
    }

    impl Regressor for StubModel {
        fn n_features(&self) -> usize {
            5
        }

        fn predict(&self, rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>> {
            let mut seen = self.seen.lock().unwrap();
            seen.extend(rows.outer_iter().map(|r| r.to_vec()));
            Ok(Array1::from(self.output.clone()))
        }
    }

    struct FailingModel;

    impl Regressor for FailingModel {
        fn n_features(&self) -> usize {
            5
        }

        fn predict(&self, _rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>> {
            Err(EstimatorError::Prediction("internal model failure".to_string()))
        }
    }

    #[test]
    fn test_model_receives_single_row_in_training_order() {
        let model = StubModel::returning(vec![68.031]);
        let estimate = run_inference(&model, &AccessMetrics::default()).unwrap();

        assert_eq!(*model.seen.lock().unwrap(), vec![vec![50.0, 10.0, 70.0, 5.0, 20.0]]);
        assert_eq!(estimate.prediction.formatted(), "68.03");
        assert_eq!(estimate.prediction.band, AdvisoryBand::Normal);
    }

    #[test]
    fn test_model_failure_is_recoverable() {
        let err = run_inference(&FailingModel, &AccessMetrics::default()).unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "internal model failure");

        // the same model keeps being usable for later requests
        let stub = StubModel::returning(vec![12.0]);
        assert!(run_inference(&stub, &AccessMetrics::default()).is_ok());
    }

    #[test]
    fn test_unexpected_output_shape() {
        let model = StubModel::returning(vec![1.0, 2.0]);
        let err = run_inference(&model, &AccessMetrics::default()).unwrap_err();
        assert_eq!(err.to_string(), "expected a single prediction, got 2");

        let empty = StubModel::returning(vec![]);
        assert!(matches!(
            run_inference(&empty, &AccessMetrics::default()),
            Err(EstimatorError::Prediction(_))
        ));
    }

    #[test]
    fn test_non_finite_output() {
        let model = StubModel::returning(vec![f64::NAN]);
        let err = run_inference(&model, &AccessMetrics::default()).unwrap_err();
        assert!(matches!(err, EstimatorError::Prediction(_)));
    }

    #[test]
    fn test_invalid_input_skips_model() {
        let model = StubModel::returning(vec![50.0]);
        let mut metrics = AccessMetrics::default();
        metrics.set(FormField::NationalUnimproved, 150.0);

        let err = run_inference(&model, &metrics).unwrap_err();
        assert!(matches!(err, EstimatorError::InvalidInput { .. }));
        assert!(model.seen.lock().unwrap().is_empty());
    }
}
