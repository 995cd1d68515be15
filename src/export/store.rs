//! On-disk layout of trained artifacts

use std::path::{Path, PathBuf};

pub const REVENUE_GLOBAL_FILE: &str = "revenue_model_global.bin";
pub const REVENUE_INDIA_FILE: &str = "revenue_model_india.bin";
pub const PRICE_MODEL_FILE: &str = "price_model.bin";
pub const VARIANT_ENCODER_FILE: &str = "variant_encoder.bin";

/// Artifact locations inside a models directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub revenue_global: PathBuf,
    pub revenue_india: PathBuf,
    pub price_model: PathBuf,
    pub variant_encoder: PathBuf,
}

impl ModelPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            revenue_global: dir.join(REVENUE_GLOBAL_FILE),
            revenue_india: dir.join(REVENUE_INDIA_FILE),
            price_model: dir.join(PRICE_MODEL_FILE),
            variant_encoder: dir.join(VARIANT_ENCODER_FILE),
        }
    }
}
