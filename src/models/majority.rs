//! Majority-class baseline classifier
//!
//! Always predicts the most frequent training label, with class
//! likelihoods equal to the training class frequencies. Deterministic
//! (ties break toward the smaller label), which makes it the reference
//! model for pinning exact metric values in tests.

use crate::core::{ModelError, ModelKind, Prediction, Result, TrainingResult};
use crate::data::LabeledDataset;
use crate::model::{Model, ModelBase};
use crate::scaling::fit_ranges;

pub struct MajorityClassifier {
    base: ModelBase,
    class_labels: Vec<u32>,
    class_frequencies: Vec<f64>,
    majority_label: u32,
}

impl Default for MajorityClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MajorityClassifier {
    pub fn new() -> Self {
        Self {
            base: ModelBase::new(ModelKind::Classifier),
            class_labels: Vec::new(),
            class_frequencies: Vec::new(),
            majority_label: 0,
        }
    }
}

impl Model for MajorityClassifier {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "majority"
    }

    fn train(&mut self, data: &LabeledDataset) -> Result<()> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let counts = data.class_counts();
        let total = data.len() as f64;

        let class_labels: Vec<u32> = counts.keys().copied().collect();
        let class_frequencies: Vec<f64> =
            counts.values().map(|&c| c as f64 / total).collect();

        // Labels iterate ascending; keeping strict maxima breaks ties
        // toward the smaller label
        let mut majority_label = 0;
        let mut majority_count = 0usize;
        for (&label, &count) in &counts {
            if count > majority_count {
                majority_label = label;
                majority_count = count;
            }
        }

        let ranges = fit_ranges(data.samples().iter().map(|s| s.features.as_slice()));

        self.class_labels = class_labels;
        self.class_frequencies = class_frequencies;
        self.majority_label = majority_label;

        self.base.begin_training_run();
        self.base.set_scaling_ranges(ranges);
        // Single-pass rule: one iteration, metric is its training accuracy
        self.base
            .record_iteration(TrainingResult::new(0, majority_count as f64 / total));
        self.base.finish_training_run(data.dim(), 1, 1);
        Ok(())
    }

    fn predict(&mut self, input: &[f64]) -> Result<Prediction> {
        self.base.ensure_trained()?;
        self.base.prepare_input(input)?;
        Ok(Prediction::new(
            self.majority_label,
            self.class_frequencies.clone(),
        ))
    }

    fn clear(&mut self) -> Result<()> {
        self.class_labels.clear();
        self.class_frequencies.clear();
        self.majority_label = 0;
        self.base.clear_base();
        Ok(())
    }

    fn class_labels(&self) -> Vec<u32> {
        self.class_labels.clone()
    }
}
