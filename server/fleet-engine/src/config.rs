//! Engine configuration with sane defaults.

/// Report domains and defaults.
#[derive(Debug, Clone)]
pub struct Config {
  /// Largest accepted `days_out` for the returns-due window.
  pub max_days_out: i64,
  /// Window used when the caller does not supply one.
  pub default_days_out: i64,
  /// Utilization threshold used when the caller does not supply one.
  pub default_utilization_threshold: f64,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      max_days_out: 90,
      default_days_out: 7,
      default_utilization_threshold: 0.5,
    }
  }
}
