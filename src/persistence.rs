//! Model serialization and persistence
//!
//! Every persisted model file is a shared header (model kind, trained
//! flag, dimensionality, scaling configuration) followed by a
//! family-specific payload the base layer treats as opaque. Files are
//! JSON; a family defines its payload type and wraps both in a
//! [`ModelFile`].

use crate::core::{ModelError, ModelKind, Result};
use crate::model::ModelBase;
use crate::scaling::ScalingRange;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Shared header persisted for every model family
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelHeader {
    pub kind: ModelKind,
    pub trained: bool,
    pub num_input_dimensions: usize,
    pub num_output_dimensions: usize,
    pub num_training_iterations_to_converge: usize,
    pub use_scaling: bool,
    pub scaling_ranges: Vec<ScalingRange>,
    pub metadata: ModelMetadata,
}

/// Provenance information for tracking and validation
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Creation timestamp
    pub created_at: String,
}

impl ModelHeader {
    /// Capture the shared state of a model base.
    pub fn from_base(base: &ModelBase) -> Self {
        Self {
            kind: base.kind(),
            trained: base.trained(),
            num_input_dimensions: base.num_input_dimensions(),
            num_output_dimensions: base.num_output_dimensions(),
            num_training_iterations_to_converge: base.num_training_iterations_to_converge(),
            use_scaling: base.scaling_enabled(),
            scaling_ranges: base.scaling_ranges().to_vec(),
            metadata: ModelMetadata {
                library_version: crate::VERSION.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Fail unless the header was written by the expected model family.
    pub fn ensure_kind(&self, expected: ModelKind) -> Result<()> {
        if self.kind != expected {
            return Err(ModelError::Serialization(format!(
                "model file kind {:?} does not match expected {:?}",
                self.kind, expected
            )));
        }
        Ok(())
    }

    /// Restore the shared state onto a model base. Any previous learned
    /// state is discarded first.
    pub fn apply_to(&self, base: &mut ModelBase) {
        base.clear_base();
        base.enable_scaling(self.use_scaling);
        base.set_scaling_ranges(self.scaling_ranges.clone());
        if self.trained {
            base.finish_training_run(
                self.num_input_dimensions,
                self.num_output_dimensions,
                self.num_training_iterations_to_converge,
            );
        }
    }
}

/// A persisted model: shared header plus family-specific payload
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelFile<P> {
    pub header: ModelHeader,
    pub payload: P,
}

impl<P: Serialize + DeserializeOwned> ModelFile<P> {
    pub fn new(header: ModelHeader, payload: P) -> Self {
        Self { header, payload }
    }

    /// Save to a JSON file.
    pub fn save_to_file<Q: AsRef<Path>>(&self, path: Q) -> Result<()> {
        let file = File::create(path).map_err(ModelError::Io)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| ModelError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_from_file<Q: AsRef<Path>>(path: Q) -> Result<Self> {
        let file = File::open(path).map_err(ModelError::Io)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| ModelError::Serialization(e.to_string()))
    }
}
