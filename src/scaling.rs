//! Linear range scaling
//!
//! Models that enable scaling remap each input dimension from the range
//! observed at training time to a fixed target range before any
//! computation. The remap is a plain linear transform with an optional
//! clamp at the source bounds.

use serde::{Deserialize, Serialize};

/// Target range inputs are scaled into when scaling is enabled
pub const SCALE_TARGET_MIN: f64 = 0.0;
pub const SCALE_TARGET_MAX: f64 = 1.0;

/// Linearly remap `x` from `[min_source, max_source]` to
/// `[min_target, max_target]`.
///
/// With `constrain` set, values at or below `min_source` clamp to
/// `min_target` and values at or above `max_source` clamp to
/// `max_target`. A degenerate source range (`min_source == max_source`)
/// returns `min_target`; this is defined behavior, not an error.
pub fn scale(
    x: f64,
    min_source: f64,
    max_source: f64,
    min_target: f64,
    max_target: f64,
    constrain: bool,
) -> f64 {
    if constrain {
        if x <= min_source {
            return min_target;
        }
        if x >= max_source {
            return max_target;
        }
    }
    if min_source == max_source {
        return min_target;
    }
    (x - min_source) * (max_target - min_target) / (max_source - min_source) + min_target
}

/// Observed bounds of one input dimension, captured during training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingRange {
    pub min: f64,
    pub max: f64,
}

impl ScalingRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Grow the range to include `x`
    pub fn update(&mut self, x: f64) {
        if x < self.min {
            self.min = x;
        }
        if x > self.max {
            self.max = x;
        }
    }
}

/// Compute per-dimension ranges over a set of feature vectors.
///
/// Returns an empty vector when there are no samples.
pub fn fit_ranges<'a, I>(vectors: I) -> Vec<ScalingRange>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut ranges: Vec<ScalingRange> = Vec::new();
    for vector in vectors {
        if ranges.is_empty() {
            ranges = vector
                .iter()
                .map(|&x| ScalingRange::new(x, x))
                .collect();
            continue;
        }
        for (range, &x) in ranges.iter_mut().zip(vector.iter()) {
            range.update(x);
        }
    }
    ranges
}

/// Scale a feature vector dimension-by-dimension into the standard
/// target range using ranges learned at training time.
pub fn scale_vector(input: &[f64], ranges: &[ScalingRange]) -> Vec<f64> {
    input
        .iter()
        .zip(ranges.iter())
        .map(|(&x, r)| scale(x, r.min, r.max, SCALE_TARGET_MIN, SCALE_TARGET_MAX, true))
        .collect()
}
