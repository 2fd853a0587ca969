//! Daily demand forecast per equipment type.
//!
//! Each type has an additive model (level + trend + weekly offset) anchored at
//! the last observed training day. Intervals widen with the horizon.

use chrono::{Datelike, Duration};
use std::collections::BTreeMap;

use crate::artifacts::SeriesModel;
use crate::error::ServingError;
use crate::types::{DemandForecast, ForecastPoint};

/// One entry per day for `periods` days, starting the day after the anchor.
///
/// `lower <= yhat <= upper` holds for every entry: the point estimate is clamped
/// to zero first, the half-width is non-negative, and the lower bound is
/// `max(0, yhat - w)`. Rounding is monotone so it keeps the ordering.
pub fn forecast(equipment_type: &str, model: &SeriesModel, periods: u32) -> DemandForecast {
  let forecast = (1..=periods)
    .map(|h| {
      let ds = model.last_observed + Duration::days(i64::from(h));
      let weekday = ds.weekday().num_days_from_monday() as usize;
      let seasonal = model.weekly.get(weekday).copied().unwrap_or(0.0);
      let yhat = (model.level + model.slope_per_day * f64::from(h) + seasonal).max(0.0);
      let half_width = (model.interval_z * model.sigma * (1.0 + f64::from(h) / 7.0).sqrt()).abs();
      ForecastPoint {
        ds,
        yhat: round3(yhat),
        yhat_lower: round3((yhat - half_width).max(0.0)),
        yhat_upper: round3(yhat + half_width),
      }
    })
    .collect();

  DemandForecast {
    equipment_type: equipment_type.to_string(),
    forecast,
  }
}

/// Forecast from a bundle section; an unmodeled type is a caller error.
pub fn forecast_for(
  models: &BTreeMap<String, SeriesModel>,
  equipment_type: &str,
  periods: u32,
) -> Result<DemandForecast, ServingError> {
  let model = models
    .get(equipment_type)
    .ok_or_else(|| ServingError::validation("equipment_type", "no demand model for this type"))?;
  Ok(forecast(equipment_type, model, periods))
}

fn round3(v: f64) -> f64 {
  (v * 1_000.0).round() / 1_000.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn model() -> SeriesModel {
    SeriesModel {
      // A Tuesday.
      last_observed: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
      level: 2.0,
      slope_per_day: 0.0,
      weekly: vec![0.0, 0.0, 0.5, 0.0, 0.0, -1.0, -3.0],
      sigma: 1.0,
      interval_z: 1.2816,
    }
  }

  #[test]
  fn one_entry_per_day_after_anchor() {
    let out = forecast("Crane", &model(), 14);
    assert_eq!(out.forecast.len(), 14);
    assert_eq!(out.forecast[0].ds, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    assert_eq!(out.forecast[13].ds, NaiveDate::from_ymd_opt(2025, 1, 14).unwrap());
    assert!(out.forecast.windows(2).all(|w| w[0].ds < w[1].ds));
  }

  #[test]
  fn weekly_profile_applies_by_weekday() {
    let out = forecast("Crane", &model(), 7);
    // 2025-01-01 is a Wednesday.
    assert!((out.forecast[0].yhat - 2.5).abs() < 1e-9);
    // Sunday clamps at zero and keeps the lower bound at zero.
    let sunday = &out.forecast[4];
    assert_eq!(sunday.yhat, 0.0);
    assert_eq!(sunday.yhat_lower, 0.0);
    assert!(sunday.yhat_upper > 0.0);
  }

  #[test]
  fn intervals_widen_with_horizon() {
    let out = forecast("Crane", &model(), 28);
    let width = |i: usize| out.forecast[i].yhat_upper - out.forecast[i].yhat;
    assert!(width(27) > width(0));
  }

  #[test]
  fn unmodeled_type_is_validation_error() {
    let err = forecast_for(&BTreeMap::new(), "Crane", 7).unwrap_err();
    assert!(err.to_string().contains("equipment_type"));
  }
}
