// Model loading and inference

pub mod format;
pub mod loader;
pub mod model;
pub mod pipeline;

pub use format::ArtifactFormat;
pub use loader::{LoadedModel, ModelLoader, ModelMetadata};
pub use model::{
    DecisionTree,
    EstimatorSpec,
    ForestRegressor,
    LinearRegressor,
    ModelArtifact,
    Regressor,
    TreeNode,
};
pub use pipeline::run_inference;
