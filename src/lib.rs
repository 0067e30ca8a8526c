//! A generic machine learning model contract and evaluation pipeline
//!
//! Provides a uniform lifecycle interface (train/predict/map/reset/
//! clear/persist) that classifiers, regressors, and clusterers all
//! implement, publish/subscribe channels streaming per-iteration
//! training progress and per-sample test outcomes, and a train/test
//! evaluation harness computing confusion-matrix metrics.

pub mod core;
pub mod data;
pub mod model;
pub mod models;
pub mod observer;
pub mod persistence;
pub mod pipeline;
pub mod scaling;

// Re-export main types for convenience
pub use crate::core::{
    ModelError, ModelKind, Prediction, Result, TestInstanceResult, TrainingResult,
};
pub use crate::data::{load_csv, LabeledDataset, LabeledSample};
pub use crate::model::{Model, ModelBase};
pub use crate::models::{
    KMeansClusterer, LmsRegressor, MajorityClassifier, NearestCentroidClassifier,
};
pub use crate::observer::{CollectingObserver, Observer, ObserverChannel, SharedObserver};
pub use crate::persistence::{ModelFile, ModelHeader};
pub use crate::pipeline::{ConfusionMatrix, EvaluationPipeline};
pub use crate::scaling::{scale, ScalingRange};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
