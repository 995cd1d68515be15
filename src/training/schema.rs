//! Column names of the training datasets
//!
//! The prediction service builds its feature rows in exactly this order,
//! so these lists are the contract between training and serving.

pub const FISCAL_YEAR: &str = "Fiscal Year";
pub const GLOBAL_RND: &str = "Global R&D Expense (Crore INR)";
pub const GLOBAL_REVENUE: &str = "Global iPhone Revenue (Crore INR)";
pub const INDIA_REVENUE: &str = "Estimated India Revenue (Crore INR)";

pub const YEAR: &str = "year";
pub const VARIANT: &str = "variant";
pub const VARIANT_ENCODED: &str = "variant_encoded";
pub const PRICE: &str = "price";

/// Predictors shared by both revenue models
pub const REVENUE_FEATURES: [&str; 2] = [FISCAL_YEAR, GLOBAL_RND];

/// Predictors of the price model, after encoding
pub const PRICE_FEATURES: [&str; 2] = [YEAR, VARIANT_ENCODED];
