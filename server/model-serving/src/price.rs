//! Rental price regressor.

use tracing::warn;

use crate::artifacts::PriceArtifact;
use crate::config::ServingConfig;
use crate::encode;
use crate::error::ServingError;
use crate::schema::FeatureVector;
use crate::types::PricePrediction;

/// Linear price over encoded columns, rounded to cents. Never negative: an
/// out-of-contract raw value is logged as a model error and replaced by the floor.
pub fn predict(features: &FeatureVector, artifact: &PriceArtifact, config: &ServingConfig) -> PricePrediction {
  let encoded = encode::one_hot(features);
  let raw = encode::linear(artifact.intercept, &artifact.weights, &encoded);

  let price = if raw.is_finite() && raw >= config.price_floor_usd {
    raw
  } else {
    let err = ServingError::Model(format!("price regressor returned {}", raw));
    warn!(error = %err, floor = config.price_floor_usd, "substituting price floor");
    config.price_floor_usd
  };

  PricePrediction {
    predicted_price_usd: (price * 100.0).round() / 100.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::FORECAST;
  use serde_json::json;
  use std::collections::BTreeMap;

  fn vector(periods: u32) -> FeatureVector {
    FORECAST
      .validate(&json!({"equipment_type": "Crane", "periods": periods}))
      .unwrap()
  }

  fn artifact(intercept: f64, weight: f64) -> PriceArtifact {
    PriceArtifact {
      intercept,
      weights: BTreeMap::from([("periods".to_string(), weight), ("equipment_type_Crane".to_string(), 10.0)]),
    }
  }

  #[test]
  fn linear_output_rounded_to_cents() {
    let out = predict(&vector(10), &artifact(100.123, 2.0), &ServingConfig::default());
    assert!((out.predicted_price_usd - 130.12).abs() < 1e-9);
  }

  #[test]
  fn negative_output_clamped_to_floor() {
    let out = predict(&vector(100), &artifact(0.0, -50.0), &ServingConfig::default());
    assert_eq!(out.predicted_price_usd, 0.0);
    assert!(out.predicted_price_usd.is_sign_positive());
  }

  #[test]
  fn non_finite_output_clamped_to_floor() {
    let config = ServingConfig {
      price_floor_usd: 25.0,
      ..ServingConfig::default()
    };
    let out = predict(&vector(10), &artifact(f64::INFINITY, 0.0), &config);
    assert_eq!(out.predicted_price_usd, 25.0);
  }
}
