//! Nearest-centroid classifier
//!
//! Training computes one centroid per class; prediction picks the class
//! with the closest centroid by Euclidean distance, with likelihoods
//! derived from normalized inverse distances. This family implements
//! the full persistence contract: shared header plus a centroid payload.

use crate::core::{ModelError, ModelKind, Prediction, Result, TrainingResult};
use crate::data::LabeledDataset;
use crate::model::{Model, ModelBase};
use crate::persistence::{ModelFile, ModelHeader};
use crate::scaling::{fit_ranges, scale_vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub struct NearestCentroidClassifier {
    base: ModelBase,
    class_labels: Vec<u32>,
    centroids: Vec<Vec<f64>>,
}

/// Family-specific persisted payload
#[derive(Serialize, Deserialize)]
struct CentroidPayload {
    class_labels: Vec<u32>,
    centroids: Vec<Vec<f64>>,
}

impl Default for NearestCentroidClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestCentroidClassifier {
    pub fn new() -> Self {
        Self {
            base: ModelBase::new(ModelKind::Classifier),
            class_labels: Vec::new(),
            centroids: Vec::new(),
        }
    }

    fn distances_to_centroids(&self, input: &[f64]) -> Vec<f64> {
        self.centroids
            .iter()
            .map(|centroid| euclidean(input, centroid))
            .collect()
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Normalized inverse distances, so closer centroids score higher and
/// the vector sums to one
fn likelihoods_from_distances(distances: &[f64]) -> Vec<f64> {
    let weights: Vec<f64> = distances.iter().map(|&d| 1.0 / (d + 1e-12)).collect();
    let sum: f64 = weights.iter().sum();
    weights.iter().map(|w| w / sum).collect()
}

impl Model for NearestCentroidClassifier {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "nearest-centroid"
    }

    fn train(&mut self, data: &LabeledDataset) -> Result<()> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let ranges = fit_ranges(data.samples().iter().map(|s| s.features.as_slice()));
        let use_scaling = self.base.scaling_enabled();

        // Accumulate per-class feature sums over (optionally scaled) inputs
        let mut sums: BTreeMap<u32, (Vec<f64>, usize)> = BTreeMap::new();
        for sample in data.samples() {
            let features = if use_scaling {
                scale_vector(&sample.features, &ranges)
            } else {
                sample.features.clone()
            };
            let entry = sums
                .entry(sample.label)
                .or_insert_with(|| (vec![0.0; data.dim()], 0));
            for (acc, &x) in entry.0.iter_mut().zip(features.iter()) {
                *acc += x;
            }
            entry.1 += 1;
        }

        let class_labels: Vec<u32> = sums.keys().copied().collect();
        let centroids: Vec<Vec<f64>> = sums
            .values()
            .map(|(sum, count)| sum.iter().map(|x| x / *count as f64).collect())
            .collect();

        self.class_labels = class_labels;
        self.centroids = centroids;

        // Mean distance of each sample to its class centroid, the
        // single-pass analog of a training loss
        let mut total_distance = 0.0;
        for sample in data.samples() {
            let features = if use_scaling {
                scale_vector(&sample.features, &ranges)
            } else {
                sample.features.clone()
            };
            let index = self
                .class_labels
                .binary_search(&sample.label)
                .map_err(|_| ModelError::UnknownLabel(sample.label))?;
            total_distance += euclidean(&features, &self.centroids[index]);
        }
        let mean_distance = total_distance / data.len() as f64;

        self.base.begin_training_run();
        self.base.set_scaling_ranges(ranges);
        self.base
            .record_iteration(TrainingResult::new(0, mean_distance));
        self.base.finish_training_run(data.dim(), 1, 1);
        Ok(())
    }

    fn predict(&mut self, input: &[f64]) -> Result<Prediction> {
        self.base.ensure_trained()?;
        let input = self.base.prepare_input(input)?;

        let distances = self.distances_to_centroids(&input);
        let winner = distances
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .ok_or(ModelError::NotTrained)?;

        Ok(Prediction::new(
            self.class_labels[winner],
            likelihoods_from_distances(&distances),
        ))
    }

    fn clear(&mut self) -> Result<()> {
        self.class_labels.clear();
        self.centroids.clear();
        self.base.clear_base();
        Ok(())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        self.base.ensure_trained()?;
        let file = ModelFile::new(
            ModelHeader::from_base(&self.base),
            CentroidPayload {
                class_labels: self.class_labels.clone(),
                centroids: self.centroids.clone(),
            },
        );
        file.save_to_file(path)
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        let file: ModelFile<CentroidPayload> = ModelFile::load_from_file(path)?;
        file.header.ensure_kind(ModelKind::Classifier)?;
        if file.payload.class_labels.len() != file.payload.centroids.len() {
            return Err(ModelError::Serialization(
                "centroid count does not match class label count".to_string(),
            ));
        }
        file.header.apply_to(&mut self.base);
        self.class_labels = file.payload.class_labels;
        self.centroids = file.payload.centroids;
        Ok(())
    }

    fn class_labels(&self) -> Vec<u32> {
        self.class_labels.clone()
    }
}
