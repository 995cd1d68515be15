//! API request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::training::LinearRegression;

/// First year of the forecast trend
pub const TREND_START_YEAR: i32 = 2024;
/// Longest trend a single request may ask for
pub const MAX_TREND_YEARS: i32 = 100;

/// Market whose revenue is predicted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Global,
    India,
}

impl Region {
    /// R&D figure (Crore INR) assumed for every year of a trend
    pub fn trend_rnd(self) -> f64 {
        match self {
            Region::Global => 200_000.0,
            Region::India => 1_200.0,
        }
    }
}

/// Round to the nearest 100, ties to even on the quotient.
pub fn round_to_hundred(value: f64) -> f64 {
    (value / 100.0).round_ties_even() * 100.0
}

/// Unwrap a JSON body; a missing, mistyped or unparsable field is a server failure.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(request)| request).map_err(ServerError::from)
}

fn revenue_model(state: &AppState, region: Region) -> Result<&LinearRegression> {
    match region {
        Region::Global => Ok(&state.models.revenue_global),
        Region::India => state
            .models
            .revenue_india
            .as_ref()
            .ok_or_else(|| ServerError::NotFound("India revenue model is not loaded".to_string())),
    }
}

// Revenue

#[derive(Debug, Deserialize)]
pub struct RevenueRequest {
    pub year: f64,
    pub rnd: f64,
    #[serde(default)]
    pub region: Region,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    pub predicted_revenue: f64,
}

pub async fn predict_revenue(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RevenueRequest>, JsonRejection>,
) -> Result<Json<RevenueResponse>> {
    let request = body(payload)?;
    let model = revenue_model(&state, request.region)?;
    let predicted_revenue = model.predict_one(&[request.year, request.rnd])?;

    tracing::debug!(
        year = request.year,
        rnd = request.rnd,
        region = ?request.region,
        predicted_revenue,
        "Revenue prediction"
    );
    Ok(Json(RevenueResponse { predicted_revenue }))
}

// Price

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    pub year: f64,
    pub variant: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub predicted_price: i64,
}

pub async fn predict_price(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>> {
    let request = body(payload)?;
    let price = &state.models.price;
    let code = price.encoder.encode(&request.variant)?;
    let raw = price.model.predict_one(&[request.year, code as f64])?;

    let rounded = round_to_hundred(raw);
    if !rounded.is_finite() {
        return Err(ServerError::Internal(format!(
            "Non-finite price prediction for variant '{}'",
            request.variant
        )));
    }

    tracing::debug!(
        year = request.year,
        variant = %request.variant,
        raw,
        rounded,
        "Price prediction"
    );
    Ok(Json(PriceResponse {
        predicted_price: rounded as i64,
    }))
}

// Revenue trend

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRequest {
    pub target_year: i32,
    #[serde(default)]
    pub region: Region,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub year: i32,
    pub value: f64,
    pub is_prediction: bool,
}

pub async fn predict_revenue_trend(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TrendRequest>, JsonRejection>,
) -> Result<Json<Vec<TrendPoint>>> {
    let request = body(payload)?;
    if request.target_year.saturating_sub(TREND_START_YEAR) >= MAX_TREND_YEARS {
        return Err(ServerError::BadRequest(format!(
            "targetYear must be before {}",
            TREND_START_YEAR + MAX_TREND_YEARS
        )));
    }

    let model = revenue_model(&state, request.region)?;
    let rnd = request.region.trend_rnd();

    let points = (TREND_START_YEAR..=request.target_year)
        .map(|year| {
            Ok(TrendPoint {
                year,
                value: model.predict_one(&[year as f64, rnd])?,
                is_prediction: true,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(points))
}

// System

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let models = &state.models;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "startedAt": state.started_at.to_rfc3339(),
        "models": {
            "revenueGlobal": true,
            "revenueIndia": models.revenue_india.is_some(),
            "price": true,
        },
        "variants": models.price.encoder.classes(),
    }))
}
