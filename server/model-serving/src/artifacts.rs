//! Pre-trained model parameters, loaded once at startup and immutable thereafter.
//!
//! The bundle is a single JSON document with one section per predictor. A
//! default bundle is compiled in so the service runs without any files.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ServingError;

const BUILTIN_BUNDLE: &str = include_str!("../artifacts/default.json");

/// Per-column mean and sample standard deviation from the training data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureStats {
  pub mean: BTreeMap<String, f64>,
  pub std: BTreeMap<String, f64>,
}

impl FeatureStats {
  /// z-score of `value` for `column`; `None` when the column is unknown or has no variance.
  pub fn z_score(&self, column: &str, value: f64) -> Option<f64> {
    let mean = self.mean.get(column)?;
    let std = self.std.get(column)?;
    if *std <= 0.0 {
      return None;
    }
    Some((value - mean) / std)
  }

  fn validate(&self, section: &str) -> Result<(), ServingError> {
    for (column, value) in self.mean.iter().chain(self.std.iter()) {
      if !value.is_finite() {
        return Err(ServingError::artifact(format!("{}: {} is not finite", section, column)));
      }
    }
    if let Some((column, _)) = self.std.iter().find(|(_, s)| **s < 0.0) {
      return Err(ServingError::artifact(format!("{}: std of {} is negative", section, column)));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownArtifact {
  /// Probability strictly above this is labeled a likely breakdown.
  pub threshold: f64,
  pub intercept: f64,
  pub weights: BTreeMap<String, f64>,
  #[serde(default)]
  pub stats: FeatureStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceArtifact {
  pub intercept: f64,
  pub weights: BTreeMap<String, f64>,
}

/// Additive daily demand model for one equipment type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesModel {
  /// Last day of training data; forecasts start the day after.
  pub last_observed: NaiveDate,
  pub level: f64,
  pub slope_per_day: f64,
  /// Day-of-week offsets, Monday first.
  pub weekly: Vec<f64>,
  /// Residual standard deviation.
  pub sigma: f64,
  /// Normal quantile for the uncertainty interval (1.2816 ≈ 80%).
  pub interval_z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifacts {
  pub version: String,
  pub breakdown: BreakdownArtifact,
  pub price: PriceArtifact,
  /// Keyed by equipment type.
  pub demand: BTreeMap<String, SeriesModel>,
  /// Keyed by equipment type.
  pub anomaly: BTreeMap<String, FeatureStats>,
}

impl ModelArtifacts {
  pub fn builtin() -> Result<Self, ServingError> {
    Self::from_json(BUILTIN_BUNDLE)
  }

  pub fn from_json(raw: &str) -> Result<Self, ServingError> {
    let bundle: ModelArtifacts = serde_json::from_str(raw)?;
    bundle.validate()?;
    Ok(bundle)
  }

  pub fn from_path(path: &Path) -> Result<Self, ServingError> {
    let raw = std::fs::read_to_string(path)
      .map_err(|e| ServingError::artifact(format!("{}: {}", path.display(), e)))?;
    Self::from_json(&raw)
  }

  pub fn validate(&self) -> Result<(), ServingError> {
    let b = &self.breakdown;
    if !(b.threshold > 0.0 && b.threshold < 1.0) {
      return Err(ServingError::artifact("breakdown: threshold must be in (0, 1)"));
    }
    check_linear("breakdown", b.intercept, &b.weights)?;
    b.stats.validate("breakdown.stats")?;

    check_linear("price", self.price.intercept, &self.price.weights)?;

    for (kind, model) in &self.demand {
      if model.weekly.len() != 7 {
        return Err(ServingError::artifact(format!(
          "demand.{}: weekly profile needs 7 values, got {}",
          kind,
          model.weekly.len()
        )));
      }
      let finite = [model.level, model.slope_per_day, model.sigma, model.interval_z]
        .iter()
        .chain(model.weekly.iter())
        .all(|v| v.is_finite());
      if !finite {
        return Err(ServingError::artifact(format!("demand.{}: non-finite parameter", kind)));
      }
      if model.sigma < 0.0 || model.interval_z <= 0.0 {
        return Err(ServingError::artifact(format!(
          "demand.{}: sigma must be >= 0 and interval_z > 0",
          kind
        )));
      }
    }

    for (kind, stats) in &self.anomaly {
      stats.validate(&format!("anomaly.{}", kind))?;
    }
    Ok(())
  }
}

fn check_linear(section: &str, intercept: f64, weights: &BTreeMap<String, f64>) -> Result<(), ServingError> {
  if !intercept.is_finite() {
    return Err(ServingError::artifact(format!("{}: intercept is not finite", section)));
  }
  if let Some((column, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
    return Err(ServingError::artifact(format!("{}: weight {} is not finite", section, column)));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_bundle_loads() {
    let bundle = ModelArtifacts::builtin().unwrap();
    assert!((bundle.breakdown.threshold - 0.5).abs() < f64::EPSILON);
    for kind in crate::schema::EQUIPMENT_TYPES {
      assert!(bundle.demand.contains_key(*kind), "demand model for {}", kind);
      assert!(bundle.anomaly.contains_key(*kind), "anomaly stats for {}", kind);
    }
  }

  #[test]
  fn short_weekly_profile_rejected() {
    let mut bundle = ModelArtifacts::builtin().unwrap();
    bundle.demand.get_mut("Crane").unwrap().weekly.pop();
    let err = bundle.validate().unwrap_err();
    assert!(err.to_string().contains("weekly"));
  }

  #[test]
  fn threshold_outside_unit_interval_rejected() {
    let mut bundle = ModelArtifacts::builtin().unwrap();
    bundle.breakdown.threshold = 1.0;
    assert!(bundle.validate().is_err());
  }

  #[test]
  fn negative_std_rejected() {
    let mut bundle = ModelArtifacts::builtin().unwrap();
    bundle
      .anomaly
      .get_mut("Loader")
      .unwrap()
      .std
      .insert("Idle_Hours".into(), -1.0);
    assert!(bundle.validate().is_err());
  }

  #[test]
  fn zero_std_column_is_not_scored() {
    let mut stats = FeatureStats::default();
    stats.mean.insert("x".into(), 1.0);
    stats.std.insert("x".into(), 0.0);
    assert_eq!(stats.z_score("x", 5.0), None);
    assert_eq!(stats.z_score("missing", 5.0), None);
  }

  #[test]
  fn missing_file_is_artifact_error() {
    let err = ModelArtifacts::from_path(Path::new("/nonexistent/bundle.json")).unwrap_err();
    assert!(matches!(err, ServingError::Artifact(_)));
  }
}
