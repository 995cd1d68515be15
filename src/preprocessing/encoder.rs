//! Categorical label encoding

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maps category strings to integer codes.
///
/// Classes are the distinct training values in sorted order, so the code of
/// a class is its position in [`LabelEncoder::classes`]. Encoding a string
/// that was not present at fit time is an error; there is no fallback code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
    is_fitted: bool,
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelEncoder {
    /// Create an unfitted encoder
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            is_fitted: false,
        }
    }

    /// Learn the class set from the given values
    pub fn fit<S: AsRef<str>>(&mut self, values: &[S]) -> Result<&mut Self> {
        if values.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot fit encoder on empty input".to_string(),
            ));
        }

        let unique: BTreeSet<&str> = values.iter().map(|v| v.as_ref()).collect();
        self.classes = unique.into_iter().map(str::to_string).collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Encode a single value
    pub fn encode(&self, value: &str) -> Result<usize> {
        if !self.is_fitted {
            return Err(ForecastError::ModelNotFitted);
        }

        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| ForecastError::UnknownCategory(value.to_string()))
    }

    /// Encode every value, failing on the first unseen one
    pub fn transform<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<usize>> {
        values.iter().map(|v| self.encode(v.as_ref())).collect()
    }

    /// Fit and transform in one step
    pub fn fit_transform<S: AsRef<str>>(&mut self, values: &[S]) -> Result<Vec<usize>> {
        self.fit(values)?;
        self.transform(values)
    }

    /// Map a code back to its class
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        if !self.is_fitted {
            return Err(ForecastError::ModelNotFitted);
        }

        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| ForecastError::UnknownCategory(code.to_string()))
    }

    /// Classes in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_sorted() {
        let mut encoder = LabelEncoder::new();
        let codes = encoder
            .fit_transform(&["Pro Max", "Base", "Pro", "Base"])
            .unwrap();

        assert_eq!(encoder.classes(), &["Base", "Pro", "Pro Max"]);
        assert_eq!(codes, vec![2, 0, 1, 0]);
    }

    #[test]
    fn test_unknown_category() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["Base", "Pro"]).unwrap();

        let err = encoder.encode("Mini").unwrap_err();
        assert!(matches!(err, ForecastError::UnknownCategory(ref v) if v == "Mini"));
    }

    #[test]
    fn test_encoding_is_case_sensitive() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["Pro"]).unwrap();
        assert!(encoder.encode("pro").is_err());
    }

    #[test]
    fn test_unfitted_encoder() {
        let encoder = LabelEncoder::new();
        assert!(matches!(encoder.encode("Base"), Err(ForecastError::ModelNotFitted)));
    }

    #[test]
    fn test_inverse_transform() {
        let mut encoder = LabelEncoder::new();
        encoder.fit(&["Pro", "Base"]).unwrap();
        assert_eq!(encoder.inverse_transform(1).unwrap(), "Pro");
        assert!(encoder.inverse_transform(2).is_err());
    }

    #[test]
    fn test_fit_empty() {
        let mut encoder = LabelEncoder::new();
        let empty: [&str; 0] = [];
        assert!(encoder.fit(&empty).is_err());
    }
}
