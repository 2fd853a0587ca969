//! Usage anomaly detector: per-type z-scores over six usage features.

use crate::artifacts::FeatureStats;
use crate::config::ServingConfig;
use crate::schema::{FeatureVector, ANOMALY_FEATURES};
use crate::types::{AnomalyReport, Verdict};

pub const NORMAL: &str = "Normal Usage";

/// Never fails on a validated vector. A type without a baseline is `Unscored`,
/// and a zero-variance column is skipped rather than divided by.
pub fn detect(features: &FeatureVector, baseline: Option<&FeatureStats>, config: &ServingConfig) -> AnomalyReport {
  let equipment_type = features.text("Type").unwrap_or_default().to_string();

  let Some(stats) = baseline else {
    return AnomalyReport {
      result_text: format!("No usage baseline for {}; reading not scored", equipment_type),
      equipment_type,
      is_anomaly: false,
      verdict: Verdict::Unscored,
    };
  };

  let flagged = ANOMALY_FEATURES.iter().copied().find(|feature| {
    features
      .number(feature)
      .and_then(|value| stats.z_score(feature, value))
      .is_some_and(|z| z.abs() > config.anomaly_z_threshold)
  });

  match flagged {
    Some(feature) => AnomalyReport {
      equipment_type,
      is_anomaly: true,
      verdict: Verdict::Anomalous,
      result_text: format!("Anomalous Usage Detected: {} is abnormal", feature),
    },
    None => AnomalyReport {
      equipment_type,
      is_anomaly: false,
      verdict: Verdict::Normal,
      result_text: NORMAL.to_string(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::ANOMALY;
  use serde_json::json;

  fn reading(operating_hours: f64, load_cycles: f64) -> FeatureVector {
    ANOMALY
      .validate(&json!({
        "Type": "Crane",
        "Operating_Hours": operating_hours,
        "Idle_Hours": 20,
        "Fuel_Consumed_Liters": 600,
        "Fuel_Efficiency_L_per_hr": 8.5,
        "Load_Cycles": load_cycles,
        "Utilization_Rate": 0.7,
      }))
      .unwrap()
  }

  fn stats() -> FeatureStats {
    let mut s = FeatureStats::default();
    for (feature, mean, std) in [("Operating_Hours", 70.0, 10.0), ("Load_Cycles", 140.0, 40.0)] {
      s.mean.insert(feature.into(), mean);
      s.std.insert(feature.into(), std);
    }
    s
  }

  #[test]
  fn within_baseline_is_normal() {
    let report = detect(&reading(75.0, 150.0), Some(&stats()), &ServingConfig::default());
    assert_eq!(report.verdict, Verdict::Normal);
    assert_eq!(report.result_text, NORMAL);
    assert!(!report.is_anomaly);
  }

  #[test]
  fn first_abnormal_feature_in_schema_order_is_named() {
    let report = detect(&reading(200.0, 1_000.0), Some(&stats()), &ServingConfig::default());
    assert_eq!(report.verdict, Verdict::Anomalous);
    assert_eq!(report.result_text, "Anomalous Usage Detected: Operating_Hours is abnormal");
  }

  #[test]
  fn z_exactly_at_threshold_is_normal() {
    let report = detect(&reading(100.0, 140.0), Some(&stats()), &ServingConfig::default());
    assert_eq!(report.verdict, Verdict::Normal);
  }

  #[test]
  fn zero_variance_column_is_skipped() {
    let mut s = stats();
    s.std.insert("Operating_Hours".into(), 0.0);
    let report = detect(&reading(9_999.0, 140.0), Some(&s), &ServingConfig::default());
    assert_eq!(report.verdict, Verdict::Normal);
  }

  #[test]
  fn missing_baseline_is_unscored() {
    let report = detect(&reading(75.0, 150.0), None, &ServingConfig::default());
    assert_eq!(report.verdict, Verdict::Unscored);
    assert_eq!(report.equipment_type, "Crane");
    assert!(report.result_text.contains("No usage baseline for Crane"));
  }
}
