//! Labeled dataset container and train/test partitioning
//!
//! The dataset contract the rest of the crate relies on is small: an
//! ordered sequence of fixed-length numeric feature vectors, each with
//! an integer class label, plus a stratified partition operation. File
//! formats live in submodules.

pub mod csv;

pub use self::csv::load_csv;

use crate::core::{ModelError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

/// One labeled sample: a dense feature vector and its class label
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub features: Vec<f64>,
    pub label: u32,
}

impl LabeledSample {
    pub fn new(features: Vec<f64>, label: u32) -> Self {
        Self { features, label }
    }
}

/// Ordered collection of labeled samples with constant dimensionality
#[derive(Debug, Clone, Default)]
pub struct LabeledDataset {
    samples: Vec<LabeledSample>,
    num_dimensions: usize,
}

impl LabeledDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from samples, enforcing constant dimensionality.
    pub fn from_samples(samples: Vec<LabeledSample>) -> Result<Self> {
        let mut dataset = Self::new();
        for sample in samples {
            dataset.push(sample)?;
        }
        Ok(dataset)
    }

    /// Append a sample. The first sample fixes the dimensionality;
    /// every later sample must match it.
    pub fn push(&mut self, sample: LabeledSample) -> Result<()> {
        if self.samples.is_empty() {
            self.num_dimensions = sample.features.len();
        } else if sample.features.len() != self.num_dimensions {
            return Err(ModelError::DimensionMismatch {
                expected: self.num_dimensions,
                actual: sample.features.len(),
            });
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of features per sample (0 while empty)
    pub fn dim(&self) -> usize {
        self.num_dimensions
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> &LabeledSample {
        &self.samples[index]
    }

    /// Distinct class labels in ascending order
    pub fn class_labels(&self) -> Vec<u32> {
        let mut labels: Vec<u32> = self.samples.iter().map(|s| s.label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Sample count per class, keyed by label
    pub fn class_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for sample in &self.samples {
            *counts.entry(sample.label).or_insert(0) += 1;
        }
        counts
    }

    /// Split into disjoint training and test subsets, stratified by
    /// class: each class contributes `round(n_c * pct / 100)` samples
    /// to the training side (at least one to each side when the class
    /// has two or more samples), shuffled within the class by a seeded
    /// RNG so splits are reproducible.
    pub fn partition(&self, training_percentage: f64, seed: u64) -> Result<(Self, Self)> {
        if self.samples.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if !(0.0..=100.0).contains(&training_percentage) {
            return Err(ModelError::InvalidParameter(format!(
                "training percentage must be in [0, 100], got: {training_percentage}"
            )));
        }

        // Group sample indices per class, preserving dataset order
        let mut per_class: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (i, sample) in self.samples.iter().enumerate() {
            per_class.entry(sample.label).or_default().push(i);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut train_indices = Vec::new();
        let mut test_indices = Vec::new();

        for indices in per_class.values() {
            let mut shuffled = indices.clone();
            shuffled.shuffle(&mut rng);

            let n = shuffled.len();
            let mut take = (n as f64 * training_percentage / 100.0).round() as usize;
            // Classes with at least two samples land on both sides
            if n >= 2 {
                take = take.clamp(1, n - 1);
            }

            train_indices.extend_from_slice(&shuffled[..take]);
            test_indices.extend_from_slice(&shuffled[take..]);
        }

        // Restore dataset order within each subset
        train_indices.sort_unstable();
        test_indices.sort_unstable();

        let collect = |indices: &[usize]| Self {
            samples: indices.iter().map(|&i| self.samples[i].clone()).collect(),
            num_dimensions: self.num_dimensions,
        };

        Ok((collect(&train_indices), collect(&test_indices)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_dataset(per_class: usize) -> LabeledDataset {
        let mut dataset = LabeledDataset::new();
        for i in 0..per_class {
            dataset
                .push(LabeledSample::new(vec![i as f64, 0.0], 0))
                .unwrap();
            dataset
                .push(LabeledSample::new(vec![i as f64, 1.0], 1))
                .unwrap();
        }
        dataset
    }

    #[test]
    fn test_push_enforces_dimensionality() {
        let mut dataset = LabeledDataset::new();
        dataset.push(LabeledSample::new(vec![1.0, 2.0], 0)).unwrap();
        assert_eq!(dataset.dim(), 2);

        let err = dataset
            .push(LabeledSample::new(vec![1.0], 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_class_labels_sorted_distinct() {
        let dataset = LabeledDataset::from_samples(vec![
            LabeledSample::new(vec![0.0], 3),
            LabeledSample::new(vec![1.0], 1),
            LabeledSample::new(vec![2.0], 3),
            LabeledSample::new(vec![3.0], 2),
        ])
        .unwrap();
        assert_eq!(dataset.class_labels(), vec![1, 2, 3]);
    }

    #[test]
    fn test_partition_sizes() {
        let dataset = two_class_dataset(50); // 100 samples, 50/50
        let (train, test) = dataset.partition(80.0, 42).unwrap();

        assert_eq!(train.len() + test.len(), dataset.len());
        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);

        // Stratification: 40/40 train, 10/10 test
        assert_eq!(train.class_counts()[&0], 40);
        assert_eq!(train.class_counts()[&1], 40);
        assert_eq!(test.class_counts()[&0], 10);
        assert_eq!(test.class_counts()[&1], 10);
    }

    #[test]
    fn test_partition_every_class_on_both_sides() {
        // Imbalanced: a 2-sample class must still appear in both subsets
        let mut dataset = two_class_dataset(20);
        dataset.push(LabeledSample::new(vec![0.0, 2.0], 7)).unwrap();
        dataset.push(LabeledSample::new(vec![1.0, 2.0], 7)).unwrap();

        let (train, test) = dataset.partition(90.0, 1).unwrap();
        assert!(train.class_counts().contains_key(&7));
        assert!(test.class_counts().contains_key(&7));
        assert_eq!(train.len() + test.len(), dataset.len());
    }

    #[test]
    fn test_partition_is_reproducible() {
        let dataset = two_class_dataset(10);
        let (train_a, _) = dataset.partition(70.0, 99).unwrap();
        let (train_b, _) = dataset.partition(70.0, 99).unwrap();
        assert_eq!(train_a.samples(), train_b.samples());
    }

    #[test]
    fn test_partition_rejects_bad_percentage() {
        let dataset = two_class_dataset(5);
        assert!(dataset.partition(120.0, 0).is_err());
        assert!(dataset.partition(-5.0, 0).is_err());
    }

    #[test]
    fn test_partition_empty_dataset() {
        let dataset = LabeledDataset::new();
        assert!(matches!(
            dataset.partition(80.0, 0).unwrap_err(),
            ModelError::EmptyDataset
        ));
    }
}
