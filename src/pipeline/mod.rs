//! Train/test evaluation pipeline
//!
//! The pipeline owns a single model, drives it through training and
//! evaluation, and aggregates a confusion matrix with derived metrics.
//! Test outcomes flow through the model's test observer channel: the
//! pipeline registers its own accumulator there, so any externally
//! registered observer sees the exact same per-sample stream the
//! metrics are computed from.

pub mod metrics;

pub use self::metrics::ConfusionMatrix;

use crate::core::{ModelError, Result, TestInstanceResult};
use crate::data::LabeledDataset;
use crate::model::Model;
use crate::observer::{Observer, SharedObserver};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Test-channel observer that accumulates the confusion matrix and
/// retains the per-sample results (the model itself retains neither)
struct MetricsAccumulator {
    matrix: ConfusionMatrix,
    results: Vec<TestInstanceResult>,
}

impl MetricsAccumulator {
    fn new() -> Self {
        Self {
            matrix: ConfusionMatrix::empty(),
            results: Vec::new(),
        }
    }

    /// Re-dimension for a new test run and drop prior state
    fn start_run(&mut self, class_labels: Vec<u32>) {
        self.matrix = ConfusionMatrix::new(class_labels);
        self.results.clear();
    }
}

impl Observer<TestInstanceResult> for MetricsAccumulator {
    fn notify(&mut self, result: &TestInstanceResult) -> Result<()> {
        self.matrix
            .record(result.true_label, result.predicted_label)?;
        self.results.push(result.clone());
        Ok(())
    }
}

/// Drives one model through train-then-test and exposes the metrics
pub struct EvaluationPipeline {
    model: Box<dyn Model>,
    accumulator: Arc<Mutex<MetricsAccumulator>>,
    matrix: ConfusionMatrix,
    test_results: Vec<TestInstanceResult>,
}

impl EvaluationPipeline {
    /// Take ownership of a model and subscribe the metrics accumulator
    /// to its test channel.
    pub fn new(model: Box<dyn Model>) -> Self {
        let accumulator = Arc::new(Mutex::new(MetricsAccumulator::new()));
        // A freshly created handle cannot already be registered
        if let Err(e) = model
            .base()
            .register_test_observer(accumulator.clone() as SharedObserver<TestInstanceResult>)
        {
            warn!("failed to register metrics accumulator: {e}");
        }
        Self {
            model,
            accumulator,
            matrix: ConfusionMatrix::empty(),
            test_results: Vec::new(),
        }
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    /// Train the owned model on the training subset.
    pub fn train(&mut self, training_set: &LabeledDataset) -> Result<()> {
        info!(
            "training {} on {} samples, {} dimensions",
            self.model.name(),
            training_set.len(),
            training_set.dim()
        );
        self.model.train(training_set)?;
        info!(
            "training converged after {} iterations",
            self.model.num_training_iterations_to_converge()
        );
        Ok(())
    }

    /// Evaluate the trained model on the test subset.
    ///
    /// For each sample in order: predict, publish the outcome on the
    /// model's test channel, and fold it into the confusion matrix.
    /// A sample whose true label was never seen in training aborts the
    /// run with [`ModelError::UnknownLabel`].
    pub fn test(&mut self, test_set: &LabeledDataset) -> Result<()> {
        self.model.base().ensure_trained()?;
        if test_set.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if test_set.dim() != self.model.num_input_dimensions() {
            return Err(ModelError::DimensionMismatch {
                expected: self.model.num_input_dimensions(),
                actual: test_set.dim(),
            });
        }

        let class_labels = self.model.class_labels();
        if class_labels.is_empty() {
            return Err(ModelError::Unsupported("test"));
        }

        self.lock_accumulator().start_run(class_labels.clone());

        for (index, sample) in test_set.samples().iter().enumerate() {
            if class_labels.binary_search(&sample.label).is_err() {
                return Err(ModelError::UnknownLabel(sample.label));
            }

            let prediction = self.model.predict(&sample.features)?;
            let result = TestInstanceResult::new(
                index,
                sample.label,
                prediction.label,
                prediction.class_likelihoods,
            );

            // Failures of external observers do not fail the run; the
            // accumulator itself cannot fail on a validated label.
            if let Err(e) = self.model.base().notify_test_observers(&result) {
                warn!("test observer notification failed: {e}");
            }
        }

        let (matrix, results) = {
            let accumulator = self.lock_accumulator();
            (accumulator.matrix.clone(), accumulator.results.clone())
        };
        self.matrix = matrix;
        self.test_results = results;

        debug!(
            "evaluated {} samples, accuracy {:.4}",
            self.matrix.total(),
            self.matrix.accuracy()
        );
        Ok(())
    }

    /// Overall accuracy of the last test run; 0.0 before any run
    pub fn test_accuracy(&self) -> f64 {
        self.matrix.accuracy()
    }

    /// Class labels the last test run was evaluated over
    pub fn class_labels(&self) -> &[u32] {
        self.matrix.labels()
    }

    pub fn test_precision(&self, label: u32) -> Result<f64> {
        self.matrix.precision(label)
    }

    pub fn test_recall(&self, label: u32) -> Result<f64> {
        self.matrix.recall(label)
    }

    pub fn test_f_measure(&self, label: u32) -> Result<f64> {
        self.matrix.f_measure(label)
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    /// Per-sample outcomes of the last test run, in evaluation order
    pub fn test_results(&self) -> &[TestInstanceResult] {
        &self.test_results
    }

    fn lock_accumulator(&self) -> std::sync::MutexGuard<'_, MetricsAccumulator> {
        self.accumulator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LabeledSample;
    use crate::models::MajorityClassifier;
    use crate::observer::CollectingObserver;
    use approx::assert_relative_eq;

    fn dataset(rows: &[(&[f64], u32)]) -> LabeledDataset {
        let samples = rows
            .iter()
            .map(|(f, l)| LabeledSample::new(f.to_vec(), *l))
            .collect();
        LabeledDataset::from_samples(samples).unwrap()
    }

    fn pipeline() -> EvaluationPipeline {
        EvaluationPipeline::new(Box::new(MajorityClassifier::new()))
    }

    #[test]
    fn test_untrained_test_fails() {
        let mut p = pipeline();
        let data = dataset(&[(&[1.0], 0)]);
        assert!(matches!(
            p.test(&data).unwrap_err(),
            ModelError::NotTrained
        ));
    }

    #[test]
    fn test_dimension_mismatch_detected() {
        let mut p = pipeline();
        p.train(&dataset(&[(&[1.0, 2.0], 0), (&[2.0, 3.0], 1)]))
            .unwrap();

        let bad = dataset(&[(&[1.0], 0)]);
        assert!(matches!(
            p.test(&bad).unwrap_err(),
            ModelError::DimensionMismatch { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_unknown_label_aborts() {
        let mut p = pipeline();
        p.train(&dataset(&[(&[1.0], 0), (&[2.0], 1)])).unwrap();

        let bad = dataset(&[(&[1.0], 9)]);
        assert!(matches!(
            p.test(&bad).unwrap_err(),
            ModelError::UnknownLabel(9)
        ));
    }

    #[test]
    fn test_matrix_cell_sum_matches_samples() {
        let mut p = pipeline();
        // Majority class is 1 (3 of 5 training samples)
        p.train(&dataset(&[
            (&[0.0], 0),
            (&[1.0], 0),
            (&[2.0], 1),
            (&[3.0], 1),
            (&[4.0], 1),
        ]))
        .unwrap();

        let test = dataset(&[(&[0.5], 0), (&[1.5], 0), (&[2.5], 1), (&[3.5], 1)]);
        p.test(&test).unwrap();

        assert_eq!(p.confusion_matrix().total(), 4);
        // Everything predicted as 1: two correct, two wrong
        assert_relative_eq!(p.test_accuracy(), 0.5);
        assert_relative_eq!(p.test_precision(1).unwrap(), 0.5);
        assert_relative_eq!(p.test_recall(1).unwrap(), 1.0);
        assert_relative_eq!(p.test_recall(0).unwrap(), 0.0);
        assert_eq!(p.class_labels(), &[0, 1]);
        assert_eq!(p.test_results().len(), 4);
    }

    #[test]
    fn test_external_observer_sees_same_stream() {
        let mut p = pipeline();
        let obs = Arc::new(Mutex::new(CollectingObserver::new()));
        p.model()
            .base()
            .register_test_observer(obs.clone() as SharedObserver<TestInstanceResult>)
            .unwrap();

        p.train(&dataset(&[(&[0.0], 0), (&[1.0], 1), (&[2.0], 1)]))
            .unwrap();
        let test = dataset(&[(&[0.5], 0), (&[1.5], 1)]);
        p.test(&test).unwrap();

        let seen = obs.lock().unwrap().records().to_vec();
        assert_eq!(seen.as_slice(), p.test_results());
    }

    #[test]
    fn test_second_run_replaces_first() {
        let mut p = pipeline();
        p.train(&dataset(&[(&[0.0], 0), (&[1.0], 1), (&[2.0], 1)]))
            .unwrap();

        p.test(&dataset(&[(&[0.5], 1)])).unwrap();
        assert_eq!(p.confusion_matrix().total(), 1);
        assert_relative_eq!(p.test_accuracy(), 1.0);

        p.test(&dataset(&[(&[0.5], 0), (&[1.5], 0)])).unwrap();
        assert_eq!(p.confusion_matrix().total(), 2);
        assert_relative_eq!(p.test_accuracy(), 0.0);
    }
}
