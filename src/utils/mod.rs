//! Utility functions and types

pub mod data_loader;

pub use data_loader::{numeric_column, numeric_columns, string_column, DataLoader};
