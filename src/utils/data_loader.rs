//! Data loading utilities
//!
//! Reads historical records from CSV into a polars [`DataFrame`] and pulls
//! named columns out as dense `ndarray` values. Nothing here repairs data:
//! a null or unparsable cell in a requested column fails the whole load.

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// CSV loader for training data
///
/// Column types are inferred from every row, so a float appearing late in an
/// otherwise integer column still parses.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataLoader;

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref())?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .into_reader_with_file_handle(file)
            .finish()?;

        tracing::debug!(
            path = %path.as_ref().display(),
            rows = df.height(),
            cols = df.width(),
            "Loaded CSV"
        );
        Ok(df)
    }
}

/// Extract one column as f64 values, casting integer columns as needed.
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;

    series
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| ForecastError::MissingValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Extract named columns into a row-major `(n_rows, n_cols)` matrix.
pub fn numeric_columns(df: &DataFrame, names: &[&str]) -> Result<Array2<f64>> {
    let cols: Vec<Array1<f64>> = names
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((df.height(), names.len()), |(r, c)| {
        cols[c][r]
    }))
}

/// Extract one column as owned strings.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| ForecastError::ColumnNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;

    series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| ForecastError::MissingValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}
