//! Application state management
//!
//! Models are loaded once before the listener starts and are never mutated
//! afterwards, so handlers share them through a plain `Arc` without locks.

use tracing::{info, warn};

use crate::error::{ForecastError, Result};
use crate::export::{load_model, ModelMetadata, ModelPaths};
use crate::preprocessing::LabelEncoder;
use crate::training::{schema, LinearRegression, PriceModel};

use super::ServerConfig;

/// Fitted artifacts the service predicts with
#[derive(Debug, Clone)]
pub struct LoadedModels {
    pub revenue_global: LinearRegression,
    pub revenue_india: Option<LinearRegression>,
    pub price: PriceModel,
}

impl LoadedModels {
    /// Read every artifact from the models directory.
    ///
    /// The global revenue model, the price model and the variant encoder are
    /// required. The India revenue model is optional.
    pub fn load(paths: &ModelPaths) -> Result<Self> {
        let (revenue_global, meta) = load_model::<LinearRegression>(&paths.revenue_global)?;
        log_loaded(&meta);
        check_features(&revenue_global, &meta, schema::REVENUE_FEATURES.len())?;

        let revenue_india = if paths.revenue_india.exists() {
            let (model, meta) = load_model::<LinearRegression>(&paths.revenue_india)?;
            log_loaded(&meta);
            check_features(&model, &meta, schema::REVENUE_FEATURES.len())?;
            Some(model)
        } else {
            warn!(path = %paths.revenue_india.display(), "India revenue model not found, region 'india' disabled");
            None
        };

        let (model, price_meta) = load_model::<LinearRegression>(&paths.price_model)?;
        log_loaded(&price_meta);
        check_features(&model, &price_meta, schema::PRICE_FEATURES.len())?;

        let (encoder, encoder_meta) = load_model::<LabelEncoder>(&paths.variant_encoder)?;
        log_loaded(&encoder_meta);
        if !encoder.is_fitted() {
            return Err(ForecastError::ModelNotFitted);
        }

        match price_meta.encoder_classes.as_deref() {
            Some(classes) if classes != encoder.classes() => {
                warn!(
                    model_classes = ?classes,
                    encoder_classes = ?encoder.classes(),
                    "Price model was trained with a different variant encoder"
                );
            }
            _ => {}
        }

        Ok(Self {
            revenue_global,
            revenue_india,
            price: PriceModel { model, encoder },
        })
    }
}

/// Reject an artifact whose feature count differs from the serving row layout.
fn check_features(model: &LinearRegression, meta: &ModelMetadata, expected: usize) -> Result<()> {
    match model.n_features() {
        Some(n) if n == expected => Ok(()),
        Some(n) => Err(ForecastError::ShapeError {
            expected: format!("{} features in '{}'", expected, meta.name),
            actual: format!("{} features", n),
        }),
        None => Err(ForecastError::ModelNotFitted),
    }
}

fn log_loaded(meta: &ModelMetadata) {
    info!(
        name = %meta.name,
        model_type = %meta.model_type,
        trained_at = %meta.trained_at,
        n_samples = meta.n_samples,
        "Loaded model artifact"
    );
}

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub models: LoadedModels,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, models: LoadedModels) -> Self {
        Self {
            config,
            models,
            started_at: chrono::Utc::now(),
        }
    }

    /// Load models from `config.models_dir` and build the state
    pub fn load(config: ServerConfig) -> Result<Self> {
        let models = LoadedModels::load(&ModelPaths::in_dir(&config.models_dir))?;
        Ok(Self::new(config, models))
    }
}
