//! Model training module
//!
//! Ordinary least squares regression and the two training flows built on
//! it: revenue (global and India) and price per variant.

mod engine;
pub mod linear_models;
pub mod schema;

pub use engine::{
    fit_price_model, fit_revenue_models, train_price, train_revenue, PriceModel, RevenueModels,
    TrainReport,
};
pub use linear_models::LinearRegression;
