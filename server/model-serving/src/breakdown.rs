//! Breakdown-risk classifier: logistic model blended with a z-score risk.

use crate::artifacts::BreakdownArtifact;
use crate::config::ServingConfig;
use crate::encode;
use crate::schema::{FeatureValue, FeatureVector};
use crate::types::BreakdownRisk;

pub const LIKELY: &str = "Likely Breakdown";
pub const UNLIKELY: &str = "No Breakdown Likely";

pub fn predict(features: &FeatureVector, artifact: &BreakdownArtifact, config: &ServingConfig) -> BreakdownRisk {
  let encoded = encode::one_hot(features);
  let ml_prob = encode::sigmoid(encode::linear(artifact.intercept, &artifact.weights, &encoded));
  let stat_prob = statistical_risk(features, artifact, config);
  let probability = ml_prob.max(stat_prob).clamp(0.0, 1.0);

  let likely = probability > artifact.threshold;
  BreakdownRisk {
    prediction: u8::from(likely),
    prediction_text: (if likely { LIKELY } else { UNLIKELY }).to_string(),
    breakdown_probability: round4(probability),
  }
}

/// Largest |z| over the numeric features that have training stats.
pub fn max_abs_z(features: &FeatureVector, artifact: &BreakdownArtifact) -> f64 {
  features
    .iter()
    .filter_map(|(name, value)| match value {
      FeatureValue::Number(n) => artifact.stats.z_score(name, *n),
      FeatureValue::Text(_) => None,
    })
    .map(f64::abs)
    .fold(0.0, f64::max)
}

/// Zero up to the z floor, rising linearly to the cap at the z ceiling.
fn statistical_risk(features: &FeatureVector, artifact: &BreakdownArtifact, config: &ServingConfig) -> f64 {
  let max_z = max_abs_z(features, artifact);
  if max_z <= config.breakdown_z_floor {
    return 0.0;
  }
  let span = config.breakdown_z_ceiling - config.breakdown_z_floor;
  let ramp = if span > 0.0 { ((max_z - config.breakdown_z_floor) / span).min(1.0) } else { 1.0 };
  ramp * config.breakdown_stat_cap
}

fn round4(v: f64) -> f64 {
  (v * 10_000.0).round() / 10_000.0
}
