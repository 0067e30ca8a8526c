//! Least-mean-squares linear regressor
//!
//! Gradient-descent linear model implementing the continuous `map`
//! operation; the discrete `predict` stays at the contract default and
//! reports a capability mismatch. Sample labels are taken as numeric
//! regression targets. One [`TrainingResult`] per epoch streams the
//! mean squared error, with convergence on a small enough improvement.

use crate::core::{ModelError, ModelKind, Result, TrainingResult};
use crate::data::LabeledDataset;
use crate::model::{Model, ModelBase};
use crate::scaling::{fit_ranges, scale_vector};

pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
pub const DEFAULT_MAX_EPOCHS: usize = 500;
pub const DEFAULT_MIN_IMPROVEMENT: f64 = 1e-9;

pub struct LmsRegressor {
    base: ModelBase,
    learning_rate: f64,
    max_epochs: usize,
    min_improvement: f64,
    weights: Vec<f64>,
    bias: f64,
}

impl Default for LmsRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl LmsRegressor {
    pub fn new() -> Self {
        Self {
            base: ModelBase::new(ModelKind::Regressor),
            learning_rate: DEFAULT_LEARNING_RATE,
            max_epochs: DEFAULT_MAX_EPOCHS,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    fn output(&self, input: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }
}

impl Model for LmsRegressor {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "lms"
    }

    fn train(&mut self, data: &LabeledDataset) -> Result<()> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if self.learning_rate <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "learning rate must be positive, got: {}",
                self.learning_rate
            )));
        }

        let ranges = fit_ranges(data.samples().iter().map(|s| s.features.as_slice()));
        let inputs: Vec<Vec<f64>> = data
            .samples()
            .iter()
            .map(|s| {
                if self.base.scaling_enabled() {
                    scale_vector(&s.features, &ranges)
                } else {
                    s.features.clone()
                }
            })
            .collect();
        let targets: Vec<f64> = data.samples().iter().map(|s| s.label as f64).collect();

        let mut weights = vec![0.0; data.dim()];
        let mut bias = 0.0;
        let n = inputs.len() as f64;

        self.base.begin_training_run();
        self.base.set_scaling_ranges(ranges);

        let mut previous_mse = f64::INFINITY;
        let mut epochs = 0;
        for epoch in 0..self.max_epochs {
            epochs = epoch + 1;

            let mut sum_squared_error = 0.0;
            for (input, &target) in inputs.iter().zip(targets.iter()) {
                let predicted: f64 = weights
                    .iter()
                    .zip(input.iter())
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + bias;
                let error = target - predicted;
                sum_squared_error += error * error;

                for (w, &x) in weights.iter_mut().zip(input.iter()) {
                    *w += self.learning_rate * error * x;
                }
                bias += self.learning_rate * error;
            }

            let mse = sum_squared_error / n;
            self.base.record_iteration(TrainingResult::new(epoch, mse));

            if (previous_mse - mse).abs() < self.min_improvement {
                break;
            }
            previous_mse = mse;
        }

        self.weights = weights;
        self.bias = bias;
        self.base.finish_training_run(data.dim(), 1, epochs);
        Ok(())
    }

    fn map(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.base.ensure_trained()?;
        let input = self.base.prepare_input(input)?;
        Ok(vec![self.output(&input)])
    }

    fn clear(&mut self) -> Result<()> {
        self.weights.clear();
        self.bias = 0.0;
        self.base.clear_base();
        Ok(())
    }
}
