//! Feature encoding for the linear models.
//!
//! Numeric features keep their name as column; text features become one-hot
//! columns named `{field}_{value}`. Columns absent from a model's weights
//! contribute nothing, so unseen labels score as the baseline category.

use std::collections::{BTreeMap, HashMap};

use crate::schema::{FeatureValue, FeatureVector};

pub fn one_hot(features: &FeatureVector) -> HashMap<String, f64> {
  features
    .iter()
    .map(|(name, value)| match value {
      FeatureValue::Number(n) => (name.to_string(), *n),
      FeatureValue::Text(s) => (format!("{}_{}", name, s), 1.0),
    })
    .collect()
}

/// `intercept + Σ weight × column`; missing columns read as zero.
pub fn linear(intercept: f64, weights: &BTreeMap<String, f64>, encoded: &HashMap<String, f64>) -> f64 {
  weights
    .iter()
    .map(|(column, weight)| weight * encoded.get(column).copied().unwrap_or(0.0))
    .fold(intercept, |acc, term| acc + term)
}

pub fn sigmoid(x: f64) -> f64 {
  1.0 / (1.0 + (-x).exp())
}
