//! Loads the serialized regression model once at startup.
//!
//! A [`LoadedModel`] only exists when the artifact was found, parsed and
//! passed structural validation. Every failure is an
//! [`EstimatorError::ModelLoad`] carrying the artifact path.

use ndarray::{Array1, ArrayView2};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use super::format::ArtifactFormat;
use super::model::{ModelArtifact, Regressor};
use crate::core::{EstimatorError, EstimatorResult};

/// Descriptive information about a loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub name: String,
    pub kind: &'static str,
    pub n_trees: usize,
    pub n_features: usize,
}

/// A model ready for inference. Never mutated after load.
pub struct LoadedModel {
    pub path: PathBuf,
    pub metadata: ModelMetadata,
    regressor: Box<dyn Regressor>,
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl Regressor for LoadedModel {
    fn n_features(&self) -> usize {
        self.regressor.n_features()
    }

    fn predict(&self, rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>> {
        self.regressor.predict(rows)
    }
}

pub struct ModelLoader {
    path: PathBuf,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> EstimatorResult<LoadedModel> {
        let path = &self.path;
        debug!(path = %path.display(), "Loading model artifact");

        if !path.is_file() {
            return Err(EstimatorError::model_load(path, "model artifact not found"));
        }

        let format = ArtifactFormat::from_path(path).ok_or_else(|| {
            EstimatorError::model_load(path, "unsupported artifact format (expected .json, .json5, .toml, .yaml or .yml)")
        })?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| EstimatorError::model_load(path, e))?;

        let artifact: ModelArtifact = format
            .parse(&content)
            .map_err(|e| EstimatorError::model_load(path, e))?;

        let name = artifact.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let kind = artifact.estimator.kind();
        let n_trees = artifact.estimator.n_trees();

        let regressor = artifact
            .into_regressor()
            .map_err(|e| EstimatorError::model_load(path, e))?;

        let metadata = ModelMetadata {
            name,
            kind,
            n_trees,
            n_features: regressor.n_features(),
        };

        info!(
            path = %path.display(),
            kind = metadata.kind,
            trees = metadata.n_trees,
            "Model loaded"
        );

        Ok(LoadedModel {
            path: path.clone(),
            metadata,
            regressor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const FOREST: &str = r#"{
        "kind": "random_forest",
        "trees": [
            {"nodes": [
                {"feature": 2, "threshold": 60.0, "left": 1, "right": 2},
                {"value": 20.0},
                {"value": 80.0}
            ]},
            {"nodes": [{"value": 40.0}]}
        ]
    }"#;

    #[test]
    fn test_load_forest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best_rf_model.json");
        std::fs::write(&path, FOREST).unwrap();

        let model = ModelLoader::new(&path).load().unwrap();
        assert_eq!(model.metadata.name, "best_rf_model");
        assert_eq!(model.metadata.kind, "random_forest");
        assert_eq!(model.metadata.n_trees, 2);
        assert_eq!(model.n_features(), 5);

        let output = model.predict(array![[50.0, 10.0, 70.0, 5.0, 20.0]].view()).unwrap();
        assert_eq!(output.to_vec(), vec![60.0]);
    }

    #[test]
    fn test_load_toml_forest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best_rf_model.toml");
        std::fs::write(
            &path,
            r#"kind = "random_forest"
name = "forest"
feature_names = ["wat_bas_r", "wat_unimp_n", "wat_bas_u", "wat_lim_n", "wat_unimp_r"]

[[trees]]
nodes = [
    { feature = 4, threshold = 50.0, left = 1, right = 2 },
    { value = 12.5 },
    { value = 90 },
]

[[trees]]
nodes = [{ value = 7.5 }]
"#,
        )
        .unwrap();

        let model = ModelLoader::new(&path).load().unwrap();
        assert_eq!(model.metadata.name, "forest");
        assert_eq!(model.metadata.n_trees, 2);

        let output = model
            .predict(array![[50.0, 10.0, 70.0, 5.0, 20.0], [50.0, 10.0, 70.0, 5.0, 80.0]].view())
            .unwrap();
        assert_eq!(output.to_vec(), vec![10.0, 48.75]);
    }

    #[test]
    fn test_load_json5_linear() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.json5");
        std::fs::write(
            &path,
            r#"{
                // rural basic access only
                kind: "linear",
                coefficients: [1.0, 0.0, 0.0, 0.0, 0.0],
                intercept: 0.5,
            }"#,
        )
        .unwrap();

        let model = ModelLoader::new(&path).load().unwrap();
        assert_eq!(model.metadata.kind, "linear");

        let output = model.predict(array![[50.0, 10.0, 70.0, 5.0, 20.0]].view()).unwrap();
        assert_eq!(output.to_vec(), vec![50.5]);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempdir().unwrap();
        let err = ModelLoader::new(dir.path().join("best_rf_model.json")).load().unwrap_err();

        assert!(err.is_fatal());
        assert!(err.to_string().contains("model artifact not found"));
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{\"kind\": \"random_forest\", \"trees\": [").unwrap();

        let err = ModelLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, EstimatorError::ModelLoad { .. }));
        assert!(err.to_string().contains("invalid JSON artifact"));
    }

    #[test]
    fn test_incompatible_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("best_rf_model.pkl");
        std::fs::write(&path, [0x80u8, 0x04, 0x95]).unwrap();

        let err = ModelLoader::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("unsupported artifact format"));
    }

    #[test]
    fn test_structurally_invalid_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        std::fs::write(&path, "kind: linear\ncoefficients: [1.0, 2.0]\nintercept: 0.0\n").unwrap();

        let err = ModelLoader::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("2 coefficients, expected 5"));
    }
}
