//! Training flows for the revenue and price models
//!
//! Each flow loads a CSV, fits ordinary least squares on fixed columns and
//! writes the fitted artifacts into an output directory. A missing column,
//! an empty cell or an unparsable number aborts the whole run.

use crate::error::Result;
use crate::export::{save_model, ModelMetadata, ModelPaths};
use crate::preprocessing::LabelEncoder;
use crate::utils::{numeric_column, numeric_columns, string_column, DataLoader};
use super::linear_models::LinearRegression;
use super::schema;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// Summary of one fitted artifact
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub name: String,
    pub path: PathBuf,
    pub n_samples: usize,
    pub r2: f64,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub training_time_secs: f64,
}

/// Revenue models fitted on the same predictors
#[derive(Debug, Clone)]
pub struct RevenueModels {
    pub global: LinearRegression,
    pub india: LinearRegression,
    pub global_r2: f64,
    pub india_r2: f64,
}

/// Price model together with the encoder its codes came from
#[derive(Debug, Clone)]
pub struct PriceModel {
    pub model: LinearRegression,
    pub encoder: LabelEncoder,
}

fn fit_one(x: &Array2<f64>, y: &Array1<f64>) -> Result<(LinearRegression, f64)> {
    let mut model = LinearRegression::new();
    model.fit(x, y)?;
    let r2 = model.score(x, y)?;
    Ok((model, r2))
}

fn report(
    name: &str,
    path: PathBuf,
    model: &LinearRegression,
    n_samples: usize,
    r2: f64,
    elapsed: Duration,
) -> TrainReport {
    TrainReport {
        name: name.to_string(),
        path,
        n_samples,
        r2,
        coefficients: model
            .coefficients
            .as_ref()
            .map(|c| c.to_vec())
            .unwrap_or_default(),
        intercept: model.intercept.unwrap_or(0.0),
        training_time_secs: elapsed.as_secs_f64(),
    }
}

/// Fit the global and India revenue models on (fiscal year, R&D expense).
///
/// Every column is extracted before anything is fitted, so a bad cell in
/// either target fails the whole call.
pub fn fit_revenue_models(df: &DataFrame) -> Result<RevenueModels> {
    let x = numeric_columns(df, &schema::REVENUE_FEATURES)?;
    let y_global = numeric_column(df, schema::GLOBAL_REVENUE)?;
    let y_india = numeric_column(df, schema::INDIA_REVENUE)?;

    let (global, global_r2) = fit_one(&x, &y_global)?;
    let (india, india_r2) = fit_one(&x, &y_india)?;
    Ok(RevenueModels {
        global,
        india,
        global_r2,
        india_r2,
    })
}

/// Fit the variant encoder and the price model on (year, encoded variant).
///
/// Returns the model with its training R².
pub fn fit_price_model(df: &DataFrame) -> Result<(PriceModel, f64)> {
    let variants = string_column(df, schema::VARIANT)?;
    let years = numeric_column(df, schema::YEAR)?;
    let y = numeric_column(df, schema::PRICE)?;

    let mut encoder = LabelEncoder::new();
    let codes = encoder.fit_transform(&variants)?;

    let x = Array2::from_shape_fn((df.height(), 2), |(r, c)| match c {
        0 => years[r],
        _ => codes[r] as f64,
    });
    let (model, r2) = fit_one(&x, &y)?;
    Ok((PriceModel { model, encoder }, r2))
}

/// Train both revenue models from a CSV and save them under `out_dir`.
///
/// Nothing is written unless both models fit.
pub fn train_revenue(data_path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<Vec<TrainReport>> {
    let paths = ModelPaths::in_dir(out_dir);
    let df = DataLoader::new().load_csv(data_path.as_ref())?;
    let n_samples = df.height();
    info!(path = %data_path.as_ref().display(), rows = n_samples, "Loaded revenue data");

    let start = Instant::now();
    let models = fit_revenue_models(&df)?;
    let elapsed = start.elapsed();

    let targets = [
        ("revenue_global", schema::GLOBAL_REVENUE, paths.revenue_global, &models.global, models.global_r2),
        ("revenue_india", schema::INDIA_REVENUE, paths.revenue_india, &models.india, models.india_r2),
    ];

    let mut reports = Vec::with_capacity(targets.len());
    for (name, target, path, model, r2) in targets {
        let metadata = ModelMetadata::new(name)
            .with_model_type("linear_regression")
            .with_features(&schema::REVENUE_FEATURES)
            .with_target(target)
            .with_samples(n_samples)
            .with_train_r2(r2);
        save_model(model, &path, metadata)?;

        info!(model = name, rows = n_samples, r2, path = %path.display(), "Trained revenue model");
        reports.push(report(name, path, model, n_samples, r2, elapsed));
    }

    Ok(reports)
}

/// Train the variant encoder and price model from a CSV and save them under `out_dir`.
///
/// Nothing is written unless the encoder and the model both fit.
pub fn train_price(data_path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<Vec<TrainReport>> {
    let paths = ModelPaths::in_dir(out_dir);
    let df = DataLoader::new().load_csv(data_path.as_ref())?;
    let n_samples = df.height();
    info!(path = %data_path.as_ref().display(), rows = n_samples, "Loaded price data");

    let start = Instant::now();
    let (PriceModel { model, encoder }, r2) = fit_price_model(&df)?;
    let elapsed = start.elapsed();

    let encoder_meta = ModelMetadata::new("variant_encoder")
        .with_model_type("label_encoder")
        .with_features(&[schema::VARIANT])
        .with_samples(n_samples)
        .with_encoder_classes(encoder.classes());
    save_model(&encoder, &paths.variant_encoder, encoder_meta)?;

    let model_meta = ModelMetadata::new("price")
        .with_model_type("linear_regression")
        .with_features(&schema::PRICE_FEATURES)
        .with_target(schema::PRICE)
        .with_samples(n_samples)
        .with_train_r2(r2)
        .with_encoder_classes(encoder.classes());
    save_model(&model, &paths.price_model, model_meta)?;

    info!(
        rows = n_samples,
        r2,
        variants = encoder.classes().len(),
        model = %paths.price_model.display(),
        encoder = %paths.variant_encoder.display(),
        "Trained price model"
    );

    Ok(vec![report("price", paths.price_model, &model, n_samples, r2, elapsed)])
}
