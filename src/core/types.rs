//! Core type definitions shared by models and the evaluation pipeline

use serde::{Deserialize, Serialize};

/// Model family tag carried by every model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ModelKind {
    /// Model family not yet established (fresh or cleared instance)
    #[default]
    NotSet,
    /// Discrete class decisions
    Classifier,
    /// Continuous output mapping
    Regressor,
    /// Unsupervised cluster assignment
    Clusterer,
}

impl ModelKind {
    pub fn is_classifier(&self) -> bool {
        matches!(self, ModelKind::Classifier)
    }

    pub fn is_regressor(&self) -> bool {
        matches!(self, ModelKind::Regressor)
    }

    pub fn is_clusterer(&self) -> bool {
        matches!(self, ModelKind::Clusterer)
    }
}

/// Progress record emitted once per training iteration
///
/// The meaning of `metric` belongs to the concrete algorithm (loss,
/// log-likelihood, centroid shift, ...). Records are appended to the
/// model's result log in iteration order and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingResult {
    /// Iteration index, starting at 0
    pub iteration: usize,
    /// Training-progress metric for this iteration
    pub metric: f64,
    /// Metric on a held-out validation set, when the algorithm tracks one
    pub validation_metric: Option<f64>,
}

impl TrainingResult {
    pub fn new(iteration: usize, metric: f64) -> Self {
        Self {
            iteration,
            metric,
            validation_metric: None,
        }
    }

    pub fn with_validation(iteration: usize, metric: f64, validation_metric: f64) -> Self {
        Self {
            iteration,
            metric,
            validation_metric: Some(validation_metric),
        }
    }
}

/// Outcome record emitted once per evaluated test sample
///
/// The model does not retain these; anything that wants test history
/// (the evaluation pipeline included) observes the test channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TestInstanceResult {
    /// Position of the sample in the test set
    pub sample_index: usize,
    /// Ground-truth class label
    pub true_label: u32,
    /// Label the model decided on
    pub predicted_label: u32,
    /// Per-class likelihoods or inverse distances, one entry per class
    /// known to the model
    pub class_likelihoods: Vec<f64>,
}

impl TestInstanceResult {
    pub fn new(
        sample_index: usize,
        true_label: u32,
        predicted_label: u32,
        class_likelihoods: Vec<f64>,
    ) -> Self {
        Self {
            sample_index,
            true_label,
            predicted_label,
            class_likelihoods,
        }
    }

    /// Whether the model got this sample right
    pub fn is_correct(&self) -> bool {
        self.true_label == self.predicted_label
    }
}

/// Value returned by a classifier's predict call
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Winning class label
    pub label: u32,
    /// Per-class likelihoods aligned with the model's class label order
    pub class_likelihoods: Vec<f64>,
}

impl Prediction {
    pub fn new(label: u32, class_likelihoods: Vec<f64>) -> Self {
        Self {
            label,
            class_likelihoods,
        }
    }

    /// Likelihood of the winning class
    pub fn confidence(&self) -> f64 {
        self.class_likelihoods
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
