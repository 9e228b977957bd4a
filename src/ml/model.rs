use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::core::{EstimatorError, EstimatorResult, FEATURE_NAMES};

/// Number of inputs every model must accept.
pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// A pre-trained regression model. Immutable once built.
pub trait Regressor: Send + Sync {
    /// Number of columns each input row must have.
    fn n_features(&self) -> usize;

    /// Predict one value per row.
    fn predict(&self, rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>>;
}

fn check_width(rows: &ArrayView2<'_, f64>, expected: usize) -> EstimatorResult<()> {
    if rows.ncols() == expected {
        Ok(())
    } else {
        Err(EstimatorError::Prediction(format!(
            "X has {} features, but the model expects {} features as input",
            rows.ncols(),
            expected
        )))
    }
}

/// Serialized model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub name: Option<String>,

    /// Column order the model was trained with.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,

    #[serde(flatten)]
    pub estimator: EstimatorSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    RandomForest { trees: Vec<DecisionTree> },
    Linear { coefficients: Vec<f64>, intercept: f64 },
}

impl EstimatorSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            EstimatorSpec::RandomForest { .. } => "random_forest",
            EstimatorSpec::Linear { .. } => "linear",
        }
    }

    pub fn n_trees(&self) -> usize {
        match self {
            EstimatorSpec::RandomForest { trees } => trees.len(),
            EstimatorSpec::Linear { .. } => 0,
        }
    }
}

impl ModelArtifact {
    /// Rejects artifacts whose declared column order differs from ours.
    pub fn check_feature_names(&self) -> Result<(), String> {
        match &self.feature_names {
            Some(names) if names.iter().map(String::as_str).ne(FEATURE_NAMES) => Err(format!(
                "feature names {:?} do not match the expected order {:?}",
                names, FEATURE_NAMES
            )),
            _ => Ok(()),
        }
    }

    pub fn into_regressor(self) -> Result<Box<dyn Regressor>, String> {
        self.check_feature_names()?;
        match self.estimator {
            EstimatorSpec::RandomForest { trees } => Ok(Box::new(ForestRegressor::new(trees)?)),
            EstimatorSpec::Linear { coefficients, intercept } => {
                Ok(Box::new(LinearRegressor::new(coefficients, intercept)?))
            }
        }
    }
}

/// One node of a flattened decision tree. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must point forward so traversal always terminates.
    fn validate(&self, tree: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err(format!("tree {} has no nodes", tree));
        }

        let n_nodes = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if feature >= N_FEATURES {
                        return Err(format!(
                            "tree {} node {} splits on feature {} (model has {})",
                            tree, id, feature, N_FEATURES
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("tree {} node {} has a non-finite threshold", tree, id));
                    }
                    for child in [left, right] {
                        if child <= id || child >= n_nodes {
                            return Err(format!(
                                "tree {} node {} has invalid child {}",
                                tree, id, child
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("tree {} node {} has a non-finite leaf", tree, id));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                TreeNode::Split { feature, threshold, left, right } => {
                    id = if row[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

/// Averages the outputs of its trees.
#[derive(Debug, Clone)]
pub struct ForestRegressor {
    trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("random forest has no trees".to_string());
        }
        for (index, tree) in trees.iter().enumerate() {
            tree.validate(index)?;
        }
        Ok(Self { trees })
    }
}

impl Regressor for ForestRegressor {
    fn n_features(&self) -> usize {
        N_FEATURES
    }

    fn predict(&self, rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>> {
        check_width(&rows, N_FEATURES)?;
        let n_trees = self.trees.len() as f64;
        Ok(rows
            .outer_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Array1<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coefficients.len() != N_FEATURES {
            return Err(format!(
                "linear model has {} coefficients, expected {}",
                coefficients.len(),
                N_FEATURES
            ));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err("linear model has non-finite parameters".to_string());
        }
        Ok(Self { coefficients: Array1::from(coefficients), intercept })
    }
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, rows: ArrayView2<'_, f64>) -> EstimatorResult<Array1<f64>> {
        check_width(&rows, self.coefficients.len())?;
        Ok(rows.dot(&self.coefficients) + self.intercept)
    }
}
