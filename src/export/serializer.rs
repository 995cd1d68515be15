//! Model serialization utilities
//!
//! Every artifact on disk is a bincode-encoded [`SerializedModel`] envelope:
//! a magic tag, a format version, metadata, and the bincode payload of the
//! model or encoder itself, guarded by an FNV-1a checksum.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ForecastError, Result};

/// Model metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Artifact name
    pub name: String,
    /// Kind of payload, e.g. `linear_regression` or `label_encoder`
    pub model_type: String,
    /// Training timestamp (RFC 3339)
    pub trained_at: String,
    /// Feature names in column order
    pub feature_names: Vec<String>,
    /// Target column, empty for encoders
    pub target_name: String,
    /// Rows seen during training
    pub n_samples: usize,
    /// R² on the training data
    pub train_r2: Option<f64>,
    /// Encoder classes the model was trained against
    pub encoder_classes: Option<Vec<String>>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "model".to_string(),
            model_type: "unknown".to_string(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            feature_names: Vec::new(),
            target_name: String::new(),
            n_samples: 0,
            train_r2: None,
            encoder_classes: None,
        }
    }
}

impl ModelMetadata {
    /// Create new metadata with name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set model type
    pub fn with_model_type(mut self, model_type: impl Into<String>) -> Self {
        self.model_type = model_type.into();
        self
    }

    /// Set feature names
    pub fn with_features<S: AsRef<str>>(mut self, features: &[S]) -> Self {
        self.feature_names = features.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Set target name
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_name = target.into();
        self
    }

    /// Set training row count
    pub fn with_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Set training R²
    pub fn with_train_r2(mut self, r2: f64) -> Self {
        self.train_r2 = Some(r2);
        self
    }

    /// Record the encoder classes the model depends on
    pub fn with_encoder_classes(mut self, classes: &[String]) -> Self {
        self.encoder_classes = Some(classes.to_vec());
        self
    }
}

/// Serializable model wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Magic bytes for format detection
    pub magic: [u8; 4],
    /// Format version
    pub format_version: u32,
    /// Model metadata
    pub metadata: ModelMetadata,
    /// Serialized model data
    pub model_data: Vec<u8>,
    /// Checksum for integrity verification
    pub checksum: u64,
}

impl SerializedModel {
    /// Magic bytes for forecast artifact files
    const MAGIC: [u8; 4] = [b'P', b'F', b'C', b'M'];
    /// Current format version
    const VERSION: u32 = 1;

    /// Create new serialized model
    pub fn new(metadata: ModelMetadata, model_data: Vec<u8>) -> Self {
        let checksum = Self::compute_checksum(&model_data);
        Self {
            magic: Self::MAGIC,
            format_version: Self::VERSION,
            metadata,
            model_data,
            checksum,
        }
    }

    /// Compute checksum using FNV-1a hash
    fn compute_checksum(data: &[u8]) -> u64 {
        const FNV_OFFSET: u64 = 14695981039346656037;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for byte in data {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }

    /// Verify checksum
    pub fn verify_checksum(&self) -> bool {
        Self::compute_checksum(&self.model_data) == self.checksum
    }

    fn validate(&self) -> Result<()> {
        if self.magic != Self::MAGIC {
            return Err(ForecastError::SerializationError(
                "Not a forecast model file".to_string(),
            ));
        }
        if self.format_version != Self::VERSION {
            return Err(ForecastError::SerializationError(format!(
                "Unsupported format version {} (expected {})",
                self.format_version,
                Self::VERSION
            )));
        }
        if !self.verify_checksum() {
            return Err(ForecastError::SerializationError(
                "Checksum verification failed - file may be corrupted".to_string(),
            ));
        }
        Ok(())
    }
}

/// Save a serializable model to file
pub fn save_model<M: Serialize>(
    model: &M,
    path: impl AsRef<Path>,
    metadata: ModelMetadata,
) -> Result<()> {
    let model_data = bincode::serialize(model)?;
    let serialized = SerializedModel::new(metadata, model_data);

    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    bincode::serialize_into(&mut writer, &serialized)?;
    writer.flush()?;

    tracing::debug!(
        path = %path.as_ref().display(),
        name = %serialized.metadata.name,
        bytes = serialized.model_data.len(),
        "Saved model artifact"
    );
    Ok(())
}

/// Load a model from file
pub fn load_model<M: for<'de> Deserialize<'de>>(
    path: impl AsRef<Path>,
) -> Result<(M, ModelMetadata)> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let serialized: SerializedModel = bincode::deserialize_from(reader)?;
    serialized.validate()?;

    let model: M = bincode::deserialize(&serialized.model_data).map_err(|e| {
        ForecastError::SerializationError(format!("Failed to deserialize model: {}", e))
    })?;

    Ok((model, serialized.metadata))
}
