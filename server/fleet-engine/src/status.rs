//! Asset state projection: current Active/Idle status per equipment ID.

use std::collections::BTreeMap;
use tracing::warn;

use crate::ledger::EventHistory;
use crate::types::{AssetState, AssetStatus, RentalEvent};

/// Project one asset's events into its current state.
///
/// - Active iff an open event exists; displayed fields come from the open event.
/// - With several open events, the most recently checked-out one wins and the
///   condition is logged as a ledger integrity violation.
/// - Idle assets show the most recent closed event's location and return date.
///
/// Returns `None` for an empty event list.
pub fn project(equipment_id: &str, events: &[RentalEvent]) -> Option<AssetState> {
  let open: Vec<&RentalEvent> = events.iter().filter(|e| e.is_open()).collect();
  if open.len() > 1 {
    warn!(
      equipment_id = %equipment_id,
      open_rentals = open.len(),
      "ledger integrity violation: multiple open rentals for one asset"
    );
  }

  // Events are in checkout order, so the last match is the most recent.
  if let Some(current) = open.last() {
    return Some(AssetState {
      equipment_id: equipment_id.to_string(),
      status: AssetStatus::Active,
      equipment_type: current.equipment_type.clone(),
      model: current.model.clone(),
      equipment_age_years: current.equipment_age_years,
      last_known_location: current.location().to_string(),
      current_customer_id: Some(current.customer_id.clone()),
      planned_return_date: current.planned_return_date,
      last_returned_on: None,
      last_operating_hours: current.metrics.operating_hours,
      last_utilization_rate: current.metrics.utilization_rate,
      breakdowns_on_last_rental: current.metrics.breakdowns,
    });
  }

  let last = events.last()?;
  Some(AssetState {
    equipment_id: equipment_id.to_string(),
    status: AssetStatus::Idle,
    equipment_type: last.equipment_type.clone(),
    model: last.model.clone(),
    equipment_age_years: last.equipment_age_years,
    last_known_location: last.location().to_string(),
    current_customer_id: None,
    planned_return_date: None,
    last_returned_on: last.checkin_date,
    last_operating_hours: last.metrics.operating_hours,
    last_utilization_rate: last.metrics.utilization_rate,
    breakdowns_on_last_rental: last.metrics.breakdowns,
  })
}

/// One state per known equipment ID, ordered by ID.
pub fn asset_statuses(histories: &BTreeMap<String, EventHistory>) -> Vec<AssetState> {
  histories
    .iter()
    .filter_map(|(id, history)| project(id, history.as_slice()))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;
  use std::io;
  use std::sync::{Arc, Mutex};
  use tracing_subscriber::fmt::MakeWriter;

  fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
  }

  fn event(customer: &str, out: u32, back: Option<u32>, site: &str) -> RentalEvent {
    let json = serde_json::json!({
      "Equipment_ID": "EQ0001",
      "Type": "Loader",
      "Model": "950GC",
      "Customer_ID": customer,
      "GPS_Location": site,
      "CheckOut_Date": date(out),
      "CheckIn_Date": back.map(date),
      "Planned_Return_Date": date(out + 7),
    });
    serde_json::from_value(json).unwrap()
  }

  #[test]
  fn open_event_makes_asset_active() {
    let events = vec![
      event("C1", 1, Some(3), "Site_A"),
      event("C2", 5, None, "Site_B"),
    ];
    let state = project("EQ0001", &events).unwrap();
    assert_eq!(state.status, AssetStatus::Active);
    assert_eq!(state.current_customer_id.as_deref(), Some("C2"));
    assert_eq!(state.last_known_location, "Site_B");
    assert_eq!(state.planned_return_date, Some(date(12)));
    assert_eq!(state.last_returned_on, None);
  }

  #[test]
  fn closed_events_make_asset_idle_at_last_location() {
    let events = vec![
      event("C1", 1, Some(3), "Site_A"),
      event("C2", 5, Some(8), "Site_C"),
    ];
    let state = project("EQ0001", &events).unwrap();
    assert_eq!(state.status, AssetStatus::Idle);
    assert_eq!(state.last_known_location, "Site_C");
    assert_eq!(state.current_customer_id, None);
    assert_eq!(state.planned_return_date, None);
    assert_eq!(state.last_returned_on, Some(date(8)));
  }

  #[test]
  fn multiple_open_events_latest_checkout_wins() {
    let events = vec![
      event("C1", 1, None, "Site_A"),
      event("C2", 9, None, "Site_D"),
    ];
    let state = project("EQ0001", &events).unwrap();
    assert_eq!(state.status, AssetStatus::Active);
    assert_eq!(state.current_customer_id.as_deref(), Some("C2"));
    assert_eq!(state.last_known_location, "Site_D");
  }

  #[derive(Clone, Default)]
  struct Captured(Arc<Mutex<Vec<u8>>>);

  impl Captured {
    fn text(&self) -> String {
      String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
  }

  impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
      self.clone()
    }
  }

  fn project_with_logs(events: &[RentalEvent]) -> String {
    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(logs.clone())
      .with_ansi(false)
      .finish();
    tracing::subscriber::with_default(subscriber, || project("EQ0001", events));
    logs.text()
  }

  #[test]
  fn multiple_open_events_log_integrity_violation() {
    let logs = project_with_logs(&[
      event("C1", 1, None, "Site_A"),
      event("C2", 9, None, "Site_D"),
    ]);
    assert!(logs.contains("WARN"));
    assert!(logs.contains("ledger integrity violation"));
    assert!(logs.contains("equipment_id=EQ0001"));
    assert!(logs.contains("open_rentals=2"));
  }

  #[test]
  fn single_open_event_logs_nothing() {
    let logs = project_with_logs(&[
      event("C1", 1, Some(3), "Site_A"),
      event("C2", 5, None, "Site_B"),
    ]);
    assert!(logs.is_empty(), "unexpected log output: {}", logs);
  }

  #[test]
  fn empty_history_projects_nothing() {
    assert!(project("EQ0001", &[]).is_none());
  }
}
