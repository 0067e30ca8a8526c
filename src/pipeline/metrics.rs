//! Confusion matrix and derived classification metrics

use crate::core::{ModelError, Result};

/// Square per-class count of true-vs-predicted label occurrences
///
/// Dimensioned by the class labels known to the model at training time.
/// The sum over all cells always equals the number of samples recorded
/// since the last reset.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    labels: Vec<u32>,
    /// counts[true][predicted]
    counts: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Create an all-zero matrix over the given class labels.
    /// Labels are sorted and deduplicated.
    pub fn new(mut labels: Vec<u32>) -> Self {
        labels.sort_unstable();
        labels.dedup();
        let n = labels.len();
        Self {
            labels,
            counts: vec![vec![0; n]; n],
        }
    }

    /// Empty matrix over zero classes
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Raw counts, rows are true labels, columns predicted labels
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    fn index_of(&self, label: u32) -> Result<usize> {
        self.labels
            .binary_search(&label)
            .map_err(|_| ModelError::UnknownLabel(label))
    }

    /// Count one evaluated sample.
    pub fn record(&mut self, true_label: u32, predicted_label: u32) -> Result<()> {
        let row = self.index_of(true_label)?;
        let col = self.index_of(predicted_label)?;
        self.counts[row][col] += 1;
        Ok(())
    }

    /// Zero every cell, keeping the class labels.
    pub fn reset(&mut self) {
        for row in &mut self.counts {
            row.iter_mut().for_each(|c| *c = 0);
        }
    }

    /// Total samples recorded since the last reset
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Samples on the diagonal (predicted == true)
    pub fn correct(&self) -> u64 {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Overall accuracy; 0.0 when nothing has been recorded
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Precision for one class: TP / (TP + FP); 0.0 when the class was
    /// never predicted
    pub fn precision(&self, label: u32) -> Result<f64> {
        let i = self.index_of(label)?;
        let tp = self.counts[i][i];
        let predicted: u64 = self.counts.iter().map(|row| row[i]).sum();
        Ok(ratio(tp, predicted))
    }

    /// Recall for one class: TP / (TP + FN); 0.0 when the class never
    /// occurred
    pub fn recall(&self, label: u32) -> Result<f64> {
        let i = self.index_of(label)?;
        let tp = self.counts[i][i];
        let actual: u64 = self.counts[i].iter().sum();
        Ok(ratio(tp, actual))
    }

    /// Harmonic mean of precision and recall; 0.0 when both are zero
    pub fn f_measure(&self, label: u32) -> Result<f64> {
        let p = self.precision(label)?;
        let r = self.recall(label)?;
        if p + r == 0.0 {
            Ok(0.0)
        } else {
            Ok(2.0 * p * r / (p + r))
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
