//! Serving constants that are not learned parameters.

#[derive(Debug, Clone)]
pub struct ServingConfig {
  /// |z| at which the statistical breakdown risk starts rising from zero.
  pub breakdown_z_floor: f64,
  /// |z| at which the statistical breakdown risk saturates.
  pub breakdown_z_ceiling: f64,
  /// Upper bound on the statistical breakdown risk.
  pub breakdown_stat_cap: f64,
  /// |z| above which a usage reading is anomalous.
  pub anomaly_z_threshold: f64,
  /// Price substituted when the regressor returns a negative or non-finite value.
  pub price_floor_usd: f64,
}

impl Default for ServingConfig {
  fn default() -> Self {
    Self {
      breakdown_z_floor: 2.5,
      breakdown_z_ceiling: 5.0,
      breakdown_stat_cap: 0.95,
      anomaly_z_threshold: 3.0,
      price_floor_usd: 0.0,
    }
  }
}
