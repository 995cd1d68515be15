//! phone-forecast - revenue and price regression service
//!
//! Fits ordinary least squares models on historical iPhone revenue and
//! price data and serves predictions over HTTP.
//!
//! # Modules
//!
//! - [`utils`] - CSV loading and column extraction
//! - [`preprocessing`] - Categorical label encoding
//! - [`training`] - OLS regression and the training flows
//! - [`export`] - Model artifact serialization
//! - [`server`] - HTTP prediction API
//! - [`cli`] - Command-line interface

pub mod error;

pub mod utils;
pub mod preprocessing;
pub mod training;
pub mod export;

pub mod server;
pub mod cli;

pub use error::{ForecastError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ForecastError, Result};
    pub use crate::export::{load_model, save_model, ModelMetadata, ModelPaths};
    pub use crate::preprocessing::LabelEncoder;
    pub use crate::training::{train_price, train_revenue, LinearRegression, PriceModel, TrainReport};
    pub use crate::utils::DataLoader;
}
