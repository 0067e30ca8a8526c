//! The model lifecycle contract
//!
//! Every trainable model (classifier, regressor, clusterer) implements
//! the [`Model`] trait and embeds a [`ModelBase`] carrying the state
//! shared across all model families: trained flag, dimensionality,
//! scaling configuration, the per-run training result log, and the two
//! observer channels. Operations a family does not support keep the
//! trait's default implementation, which reports a capability mismatch
//! instead of silently doing nothing.

use crate::core::{
    ModelError, ModelKind, Prediction, Result, TestInstanceResult, TrainingResult,
};
use crate::data::LabeledDataset;
use crate::observer::{ObserverChannel, SharedObserver};
use crate::scaling::{scale_vector, ScalingRange};
use log::warn;
use std::path::Path;

/// State shared by every model family
pub struct ModelBase {
    kind: ModelKind,
    trained: bool,
    use_scaling: bool,
    num_input_dimensions: usize,
    num_output_dimensions: usize,
    num_training_iterations_to_converge: usize,
    scaling_ranges: Vec<ScalingRange>,
    training_results: Vec<TrainingResult>,
    training_channel: ObserverChannel<TrainingResult>,
    test_channel: ObserverChannel<TestInstanceResult>,
}

impl ModelBase {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            trained: false,
            use_scaling: false,
            num_input_dimensions: 0,
            num_output_dimensions: 0,
            num_training_iterations_to_converge: 0,
            scaling_ranges: Vec::new(),
            training_results: Vec::new(),
            training_channel: ObserverChannel::new(),
            test_channel: ObserverChannel::new(),
        }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn trained(&self) -> bool {
        self.trained
    }

    pub fn scaling_enabled(&self) -> bool {
        self.use_scaling
    }

    pub fn enable_scaling(&mut self, enabled: bool) {
        self.use_scaling = enabled;
    }

    pub fn num_input_dimensions(&self) -> usize {
        self.num_input_dimensions
    }

    pub fn num_output_dimensions(&self) -> usize {
        self.num_output_dimensions
    }

    /// Iterations the last successful training run took; 0 while untrained
    pub fn num_training_iterations_to_converge(&self) -> usize {
        if self.trained {
            self.num_training_iterations_to_converge
        } else {
            0
        }
    }

    pub fn scaling_ranges(&self) -> &[ScalingRange] {
        &self.scaling_ranges
    }

    pub fn set_scaling_ranges(&mut self, ranges: Vec<ScalingRange>) {
        self.scaling_ranges = ranges;
    }

    /// Read-only snapshot of the most recent training run's result log
    pub fn training_results(&self) -> &[TrainingResult] {
        &self.training_results
    }

    /// Fail unless a training run has completed successfully
    pub fn ensure_trained(&self) -> Result<()> {
        if self.trained {
            Ok(())
        } else {
            Err(ModelError::NotTrained)
        }
    }

    /// Validate an input vector's dimensionality and apply scaling when
    /// enabled, using the ranges captured at training time.
    pub fn prepare_input(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.num_input_dimensions {
            return Err(ModelError::DimensionMismatch {
                expected: self.num_input_dimensions,
                actual: input.len(),
            });
        }
        if self.use_scaling {
            Ok(scale_vector(input, &self.scaling_ranges))
        } else {
            Ok(input.to_vec())
        }
    }

    /// Start a fresh training run: the result log covers one run only.
    pub fn begin_training_run(&mut self) {
        self.training_results.clear();
    }

    /// Append one iteration's result to the log and stream it to the
    /// training observers. Observer failures do not fail training.
    pub fn record_iteration(&mut self, result: TrainingResult) {
        if let Err(e) = self.training_channel.notify(&result) {
            warn!("training observer notification failed: {e}");
        }
        self.training_results.push(result);
    }

    /// Mark a training run as successfully completed.
    pub fn finish_training_run(
        &mut self,
        num_input_dimensions: usize,
        num_output_dimensions: usize,
        iterations: usize,
    ) {
        self.num_input_dimensions = num_input_dimensions;
        self.num_output_dimensions = num_output_dimensions;
        self.num_training_iterations_to_converge = iterations;
        self.trained = true;
    }

    /// Discard everything learned: back to the untrained defaults.
    /// Registered observers and the scaling toggle survive.
    pub fn clear_base(&mut self) {
        self.trained = false;
        self.num_input_dimensions = 0;
        self.num_output_dimensions = 0;
        self.num_training_iterations_to_converge = 0;
        self.scaling_ranges.clear();
        self.training_results.clear();
    }

    // Observer registration delegates to the two owned channels. The
    // channels are independent: notifying one never touches the other.

    pub fn register_training_observer(
        &self,
        observer: SharedObserver<TrainingResult>,
    ) -> Result<()> {
        self.training_channel.register(observer)
    }

    pub fn remove_training_observer(
        &self,
        observer: &SharedObserver<TrainingResult>,
    ) -> Result<()> {
        self.training_channel.remove(observer)
    }

    pub fn remove_all_training_observers(&self) -> Result<()> {
        self.training_channel.remove_all()
    }

    pub fn register_test_observer(
        &self,
        observer: SharedObserver<TestInstanceResult>,
    ) -> Result<()> {
        self.test_channel.register(observer)
    }

    pub fn remove_test_observer(
        &self,
        observer: &SharedObserver<TestInstanceResult>,
    ) -> Result<()> {
        self.test_channel.remove(observer)
    }

    pub fn remove_all_test_observers(&self) -> Result<()> {
        self.test_channel.remove_all()
    }

    /// Publish one test outcome to the test observers.
    pub fn notify_test_observers(&self, result: &TestInstanceResult) -> Result<()> {
        self.test_channel.notify(result)
    }
}

/// Lifecycle contract every trainable model implements
///
/// Defaults make capability gaps explicit: a family that does not
/// implement an operation reports [`ModelError::Unsupported`] rather
/// than pretending success. A failed `train` must leave the model in
/// its prior state.
pub trait Model: Send {
    fn base(&self) -> &ModelBase;
    fn base_mut(&mut self) -> &mut ModelBase;

    /// Human readable model name
    fn name(&self) -> &'static str;

    /// Train on a labeled dataset. On success the implementation marks
    /// the base trained, records dimensionality and convergence
    /// iterations, and has streamed one [`TrainingResult`] per
    /// iteration through the training channel.
    fn train(&mut self, _data: &LabeledDataset) -> Result<()> {
        Err(ModelError::Unsupported("train"))
    }

    /// Produce a discrete class decision for one input vector.
    /// Requires a trained model; inputs are scaled first when scaling
    /// is enabled.
    fn predict(&mut self, _input: &[f64]) -> Result<Prediction> {
        Err(ModelError::Unsupported("predict"))
    }

    /// Produce a continuous mapping for one input vector. Same trained
    /// precondition as `predict`.
    fn map(&mut self, _input: &[f64]) -> Result<Vec<f64>> {
        Err(ModelError::Unsupported("map"))
    }

    /// Reinitialize transient run state. Learned parameters and the
    /// trained flag survive; what counts as transient is up to each
    /// family and documented on the implementation.
    fn reset(&mut self) -> Result<()> {
        Ok(())
    }

    /// Discard learned parameters and return to the untrained state.
    fn clear(&mut self) -> Result<()> {
        self.base_mut().clear_base();
        Ok(())
    }

    /// Persist the model: shared header plus a family-specific payload.
    fn save_model(&self, _path: &Path) -> Result<()> {
        Err(ModelError::Unsupported("save_model"))
    }

    /// Restore a model persisted by `save_model`.
    fn load_model(&mut self, _path: &Path) -> Result<()> {
        Err(ModelError::Unsupported("load_model"))
    }

    /// Class labels this model can decide between, ascending. Empty for
    /// non-classifiers and untrained classifiers.
    fn class_labels(&self) -> Vec<u32> {
        Vec::new()
    }

    // Convenience accessors over the shared base state

    fn kind(&self) -> ModelKind {
        self.base().kind()
    }

    fn trained(&self) -> bool {
        self.base().trained()
    }

    fn num_input_dimensions(&self) -> usize {
        self.base().num_input_dimensions()
    }

    fn num_output_dimensions(&self) -> usize {
        self.base().num_output_dimensions()
    }

    fn num_training_iterations_to_converge(&self) -> usize {
        self.base().num_training_iterations_to_converge()
    }

    fn scaling_enabled(&self) -> bool {
        self.base().scaling_enabled()
    }

    fn enable_scaling(&mut self, enabled: bool) {
        self.base_mut().enable_scaling(enabled);
    }

    fn training_results(&self) -> &[TrainingResult] {
        self.base().training_results()
    }
}
