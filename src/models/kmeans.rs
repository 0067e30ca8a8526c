//! K-means clusterer
//!
//! Standard Lloyd iterations over unlabeled feature vectors (labels in
//! the training set are ignored). Each iteration streams one
//! [`TrainingResult`] whose metric is the total centroid shift, so
//! observers can watch convergence live. Cluster indices double as the
//! class labels reported to the evaluation pipeline.

use crate::core::{ModelError, ModelKind, Prediction, Result, TrainingResult};
use crate::data::LabeledDataset;
use crate::model::{Model, ModelBase};
use crate::persistence::{ModelFile, ModelHeader};
use crate::scaling::{fit_ranges, scale_vector};
use rand::rngs::StdRng;
use rand::seq::index::sample as sample_indices;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_MIN_SHIFT: f64 = 1e-6;

pub struct KMeansClusterer {
    base: ModelBase,
    num_clusters: usize,
    max_iterations: usize,
    min_shift: f64,
    seed: u64,
    centroids: Vec<Vec<f64>>,
}

#[derive(Serialize, Deserialize)]
struct KMeansPayload {
    num_clusters: usize,
    centroids: Vec<Vec<f64>>,
}

impl KMeansClusterer {
    pub fn new(num_clusters: usize) -> Self {
        Self {
            base: ModelBase::new(ModelKind::Clusterer),
            num_clusters,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            min_shift: DEFAULT_MIN_SHIFT,
            seed: 0,
            centroids: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    fn nearest(&self, point: &[f64]) -> (usize, Vec<f64>) {
        let distances: Vec<f64> = self
            .centroids
            .iter()
            .map(|c| squared_distance(point, c))
            .collect();
        let winner = distances
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        (winner, distances)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

impl Model for KMeansClusterer {
    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn train(&mut self, data: &LabeledDataset) -> Result<()> {
        if data.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if self.num_clusters == 0 || self.num_clusters > data.len() {
            return Err(ModelError::InvalidParameter(format!(
                "cluster count must be in [1, {}], got: {}",
                data.len(),
                self.num_clusters
            )));
        }

        let ranges = fit_ranges(data.samples().iter().map(|s| s.features.as_slice()));
        let points: Vec<Vec<f64>> = data
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

        // Seeded init from distinct training points
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids: Vec<Vec<f64>> =
            sample_indices(&mut rng, points.len(), self.num_clusters)
                .iter()
                .map(|i| points[i].clone())
                .collect();

        self.base.begin_training_run();
        self.base.set_scaling_ranges(ranges);

        let mut iterations = 0;
        for iteration in 0..self.max_iterations {
            iterations = iteration + 1;

            // Assign points to their nearest centroid
            let mut sums = vec![vec![0.0; data.dim()]; self.num_clusters];
            let mut counts = vec![0usize; self.num_clusters];
            for point in &points {
                let winner = centroids
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        squared_distance(point, a).total_cmp(&squared_distance(point, b))
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                for (acc, &x) in sums[winner].iter_mut().zip(point.iter()) {
                    *acc += x;
                }
                counts[winner] += 1;
            }

            // Recompute centroids; empty clusters keep their position
            let mut shift = 0.0;
            for (i, centroid) in centroids.iter_mut().enumerate() {
                if counts[i] == 0 {
                    continue;
                }
                let updated: Vec<f64> = sums[i]
                    .iter()
                    .map(|sum| sum / counts[i] as f64)
                    .collect();
                shift += squared_distance(centroid, &updated).sqrt();
                *centroid = updated;
            }

            self.base
                .record_iteration(TrainingResult::new(iteration, shift));

            if shift < self.min_shift {
                break;
            }
        }

        self.centroids = centroids;
        self.base.finish_training_run(data.dim(), 1, iterations);
        Ok(())
    }

    /// Cluster assignment presented as a class decision: the label is
    /// the cluster index, likelihoods are normalized inverse distances.
    fn predict(&mut self, input: &[f64]) -> Result<Prediction> {
        self.base.ensure_trained()?;
        let input = self.base.prepare_input(input)?;

        let (winner, distances) = self.nearest(&input);
        let weights: Vec<f64> = distances
            .iter()
            .map(|&d| 1.0 / (d.sqrt() + 1e-12))
            .collect();
        let sum: f64 = weights.iter().sum();
        let likelihoods = weights.iter().map(|w| w / sum).collect();

        Ok(Prediction::new(winner as u32, likelihoods))
    }

    // No transient run state beyond what training rebuilds; reset keeps
    // the learned centroids, per the base contract.

    fn clear(&mut self) -> Result<()> {
        self.centroids.clear();
        self.base.clear_base();
        Ok(())
    }

    fn save_model(&self, path: &Path) -> Result<()> {
        self.base.ensure_trained()?;
        ModelFile::new(
            ModelHeader::from_base(&self.base),
            KMeansPayload {
                num_clusters: self.num_clusters,
                centroids: self.centroids.clone(),
            },
        )
        .save_to_file(path)
    }

    fn load_model(&mut self, path: &Path) -> Result<()> {
        let file: ModelFile<KMeansPayload> = ModelFile::load_from_file(path)?;
        file.header.ensure_kind(ModelKind::Clusterer)?;
        file.header.apply_to(&mut self.base);
        self.num_clusters = file.payload.num_clusters;
        self.centroids = file.payload.centroids;
        Ok(())
    }

    fn class_labels(&self) -> Vec<u32> {
        if self.base.trained() {
            (0..self.num_clusters as u32).collect()
        } else {
            Vec::new()
        }
    }
}
