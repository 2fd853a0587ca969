//! Read-only reports over projected asset state: returns due, underutilization, search.

use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::Config;
use crate::error::EngineError;
use crate::ledger::EventHistory;
use crate::types::{
  AssetState, AssetStatus, ReturnsDueReport, UnderutilizedAsset, UnderutilizedReport,
};

/// Active assets whose planned return falls within `[today, today + days_out]`.
///
/// Assets without a planned return date are skipped.
pub fn returns_due(
  states: &[AssetState],
  days_out: i64,
  today: NaiveDate,
  config: &Config,
) -> Result<ReturnsDueReport, EngineError> {
  if days_out < 1 || days_out > config.max_days_out {
    return Err(EngineError::validation(
      "days_out",
      &format!("must be between 1 and {}", config.max_days_out),
    ));
  }
  let to_date = today + Duration::days(days_out);

  let mut due: Vec<AssetState> = states
    .iter()
    .filter(|s| s.status == AssetStatus::Active)
    .filter(|s| matches!(s.planned_return_date, Some(d) if d >= today && d <= to_date))
    .cloned()
    .collect();
  due.sort_by(|a, b| {
    a.planned_return_date
      .cmp(&b.planned_return_date)
      .then_with(|| a.equipment_id.cmp(&b.equipment_id))
  });

  Ok(ReturnsDueReport {
    reminder_window_days: days_out,
    from_date: today,
    to_date,
    count: due.len(),
    assets_due_for_return: due,
  })
}

/// Assets whose mean utilization across all their events is strictly below `threshold`.
///
/// Display fields come from the asset's most recent event. Sorted by average
/// utilization ascending, then equipment ID.
pub fn underutilized(
  histories: &BTreeMap<String, EventHistory>,
  threshold: f64,
) -> Result<UnderutilizedReport, EngineError> {
  if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
    return Err(EngineError::validation("threshold", "must be in (0, 1]"));
  }

  let mut rows: Vec<UnderutilizedAsset> = histories
    .iter()
    .filter_map(|(id, history)| {
      let last = history.as_slice().last()?;
      let avg = mean_utilization(history)?;
      (avg < threshold).then(|| UnderutilizedAsset {
        equipment_id: id.clone(),
        equipment_type: last.equipment_type.clone(),
        model: last.model.clone(),
        gps_location: last.location().to_string(),
        avg_utilization: avg,
      })
    })
    .collect();
  rows.sort_by(|a, b| {
    a.avg_utilization
      .partial_cmp(&b.avg_utilization)
      .unwrap_or(std::cmp::Ordering::Equal)
      .then_with(|| a.equipment_id.cmp(&b.equipment_id))
  });

  Ok(UnderutilizedReport {
    threshold,
    count: rows.len(),
    underutilized_assets: rows,
  })
}

/// Mean utilization rate; `None` when the asset has no events.
pub fn mean_utilization(history: &EventHistory) -> Option<f64> {
  if history.is_empty() {
    return None;
  }
  let sum: f64 = history.iter().map(|e| e.metrics.utilization_rate).sum();
  Some(sum / history.len() as f64)
}

/// Case-insensitive substring match on ID or type, intersected with optional
/// status/location equality filters. `"All"` (or `None`) disables a filter.
pub fn search(
  states: &[AssetState],
  term: &str,
  status_filter: Option<&str>,
  location_filter: Option<&str>,
) -> Result<Vec<AssetState>, EngineError> {
  let status = match status_filter.map(str::trim) {
    None | Some("") => None,
    Some(s) if s.eq_ignore_ascii_case("all") => None,
    Some(s) => Some(
      AssetStatus::from_str_loose(s)
        .ok_or_else(|| EngineError::validation("status", "expected All|Active|Idle"))?,
    ),
  };
  let location = match location_filter.map(str::trim) {
    None | Some("") => None,
    Some(l) if l.eq_ignore_ascii_case("all") => None,
    Some(l) => Some(l),
  };
  let term = term.trim().to_lowercase();

  Ok(
    states
      .iter()
      .filter(|s| status.map_or(true, |want| s.status == want))
      .filter(|s| location.map_or(true, |want| s.last_known_location == want))
      .filter(|s| {
        term.is_empty()
          || s.equipment_id.to_lowercase().contains(&term)
          || s.equipment_type.to_lowercase().contains(&term)
      })
      .cloned()
      .collect(),
  )
}

/// Distinct non-empty last-known locations, sorted.
pub fn locations(states: &[AssetState]) -> Vec<String> {
  states
    .iter()
    .map(|s| s.last_known_location.as_str())
    .filter(|l| !l.is_empty())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(str::to_string)
    .collect()
}
