//! Model store
//!
//! Serializes fitted models and encoders to disk and reads them back.
//! The binary layout is internal and carries no compatibility promise
//! beyond the format version in each file.

mod serializer;
mod store;

pub use serializer::{load_model, save_model, ModelMetadata, SerializedModel};
pub use store::{
    ModelPaths, PRICE_MODEL_FILE, REVENUE_GLOBAL_FILE, REVENUE_INDIA_FILE, VARIANT_ENCODER_FILE,
};
