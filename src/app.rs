//! Startup and the surfaces that become reachable once a model is loaded.

use std::sync::Arc;
use tracing::info;

use crate::api::EstimatorServer;
use crate::cli::InteractiveForm;
use crate::core::{AccessMetrics, Estimate, EstimatorResult, Settings};
use crate::ml::{run_inference, LoadedModel, ModelLoader};
use crate::monitoring::TelemetryManager;

/// A running estimator. Only obtainable through [`App::bootstrap`], so no
/// surface can be reached without a usable model.
pub struct App {
    settings: Settings,
    model: Arc<LoadedModel>,
    telemetry: TelemetryManager,
}

impl App {
    /// Load the model named by `settings`. Failure here is fatal to startup.
    pub fn bootstrap(settings: Settings, telemetry: TelemetryManager) -> EstimatorResult<Self> {
        let model = ModelLoader::new(&settings.model_path).load().map_err(|e| {
            telemetry.log_error(&e, "startup");
            e
        })?;

        Ok(Self {
            settings,
            model: Arc::new(model),
            telemetry,
        })
    }

    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    /// One prediction, as triggered by the `predict` subcommand.
    pub fn estimate(&self, metrics: &AccessMetrics) -> EstimatorResult<Estimate> {
        let result = run_inference(self.model.as_ref(), metrics);
        match &result {
            Ok(estimate) => self.telemetry.log_prediction("cli", estimate),
            Err(e) => self.telemetry.log_error(e, "cli prediction"),
        }
        result
    }

    pub fn form(&self) -> InteractiveForm<'_> {
        InteractiveForm::new(self.model.as_ref(), &self.telemetry)
    }

    pub fn server(&self) -> EstimatorServer {
        EstimatorServer::new(
            self.settings.server.clone(),
            self.model.clone(),
            self.telemetry.clone(),
        )
    }

    pub async fn serve(&self) -> EstimatorResult<()> {
        info!(model = %self.model.metadata.name, "Starting web form");
        self.server().start().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EstimatorError;
    use crate::monitoring::TelemetryConfig;
    use tempfile::tempdir;

    fn quiet() -> TelemetryManager {
        TelemetryManager::init(TelemetryConfig { enabled: false, ..Default::default() })
    }

    #[test]
    fn test_bootstrap_without_artifact_fails() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            model_path: dir.path().join("best_rf_model.json"),
            ..Settings::default()
        };

        match App::bootstrap(settings, quiet()) {
            Err(e @ EstimatorError::ModelLoad { .. }) => assert!(e.is_fatal()),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("bootstrap must fail without a model"),
        }
    }

    #[test]
    fn test_bootstrap_and_estimate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"kind": "linear", "coefficients": [1.0, 1.0, 1.0, 1.0, 1.0], "intercept": 0.0}"#,
        )
        .unwrap();

        let settings = Settings { model_path: path, ..Settings::default() };
        let app = App::bootstrap(settings, quiet()).unwrap();
        assert_eq!(app.model().metadata.kind, "linear");

        let estimate = app.estimate(&AccessMetrics::default()).unwrap();
        assert_eq!(estimate.prediction.formatted(), "155.00");
    }
}
