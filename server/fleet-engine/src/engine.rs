//! Core engine: owns the ledger and serves every projection over it.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::EngineError;
use crate::history;
use crate::ledger::{EventHistory, Ledger};
use crate::reports;
use crate::status;
use crate::types::*;

/// The fleet analytics engine. Safe to share across threads; every read is a
/// projection of the ledger at call time.
#[derive(Debug, Default)]
pub struct FleetEngine {
  config: Config,
  ledger: Ledger,
}

impl FleetEngine {
  pub fn new(config: Config) -> Self {
    Self {
      config,
      ledger: Ledger::new(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn ledger(&self) -> &Ledger {
    &self.ledger
  }

  // -------------------------------------------------------------------------
  // Writes
  // -------------------------------------------------------------------------

  pub fn checkout(&self, rental: NewRental) -> Result<RentalEvent, EngineError> {
    let equipment_id = rental.equipment_id.clone();
    let result = self.ledger.append(rental);
    match &result {
      Ok(event) => debug!(equipment_id = %event.equipment_id, rental_id = %event.rental_id, "rental opened"),
      Err(e) => warn!(equipment_id = %equipment_id, error = %e, "checkout rejected"),
    }
    result
  }

  pub fn checkin(&self, equipment_id: &str, checkin: CheckIn) -> Result<RentalEvent, EngineError> {
    let result = self
      .ledger
      .close(equipment_id, checkin.checkin_date, checkin.metrics);
    match &result {
      Ok(event) => debug!(equipment_id = %equipment_id, rental_id = %event.rental_id, "rental closed"),
      Err(e) => warn!(equipment_id = %equipment_id, error = %e, "checkin rejected"),
    }
    result
  }

  pub fn restore<I>(&self, records: I) -> usize
  where
    I: IntoIterator<Item = RentalEvent>,
  {
    self.ledger.restore(records)
  }

  // -------------------------------------------------------------------------
  // Reads
  // -------------------------------------------------------------------------

  pub fn events_for(&self, equipment_id: &str) -> EventHistory {
    self.ledger.events_for(equipment_id)
  }

  pub fn asset_statuses(&self) -> Vec<AssetState> {
    status::asset_statuses(&self.ledger.histories())
  }

  pub fn status_report(&self, status_date: NaiveDate) -> AssetStatusReport {
    let assets = self.asset_statuses();
    AssetStatusReport {
      status_date,
      asset_count: assets.len(),
      assets,
    }
  }

  /// Summary + ordered events for one asset; `NotFound` when it has no events.
  pub fn history_for(&self, equipment_id: &str) -> Result<AssetHistory, EngineError> {
    let events = self.ledger.events_for(equipment_id);
    if events.is_empty() {
      return Err(EngineError::no_history(equipment_id));
    }
    Ok(AssetHistory {
      equipment_id: equipment_id.to_string(),
      summary: history::summarize(events.as_slice()),
      events: events.as_slice().to_vec(),
    })
  }

  pub fn returns_due(&self, days_out: i64, today: NaiveDate) -> Result<ReturnsDueReport, EngineError> {
    reports::returns_due(&self.asset_statuses(), days_out, today, &self.config)
  }

  pub fn underutilized(&self, threshold: f64) -> Result<UnderutilizedReport, EngineError> {
    reports::underutilized(&self.ledger.histories(), threshold)
  }

  pub fn search(
    &self,
    term: &str,
    status_filter: Option<&str>,
    location_filter: Option<&str>,
  ) -> Result<Vec<AssetState>, EngineError> {
    reports::search(&self.asset_statuses(), term, status_filter, location_filter)
  }

  pub fn locations(&self) -> Vec<String> {
    reports::locations(&self.asset_statuses())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
  }

  fn rental(id: &str, out: NaiveDate, planned: Option<NaiveDate>) -> NewRental {
    serde_json::from_value(serde_json::json!({
      "Equipment_ID": id,
      "Type": "DumpTruck",
      "Model": "773G",
      "Customer_ID": "CUST9",
      "GPS_Location": "Site_F",
      "CheckOut_Date": out,
      "Planned_Return_Date": planned,
    }))
    .unwrap()
  }

  #[test]
  fn checkout_then_checkin_flips_status() {
    let engine = FleetEngine::with_defaults();
    engine.checkout(rental("EQ0100", date(5, 1), Some(date(5, 10)))).unwrap();
    assert_eq!(engine.asset_statuses()[0].status, AssetStatus::Active);

    engine
      .checkin(
        "EQ0100",
        CheckIn {
          checkin_date: date(5, 9),
          metrics: UsageMetrics { operating_hours: 64.0, ..Default::default() },
        },
      )
      .unwrap();
    let state = &engine.asset_statuses()[0];
    assert_eq!(state.status, AssetStatus::Idle);
    assert_eq!(state.last_returned_on, Some(date(5, 9)));
    assert!((state.last_operating_hours - 64.0).abs() < f64::EPSILON);
  }

  #[test]
  fn history_for_unknown_id_is_not_found() {
    let engine = FleetEngine::with_defaults();
    let err = engine.history_for("EQ404").unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(err.to_string().contains("EQ404"));
  }

  #[test]
  fn returns_due_reads_through_statuses() {
    let engine = FleetEngine::with_defaults();
    engine.checkout(rental("EQ1", date(5, 1), Some(date(5, 5)))).unwrap();
    engine.checkout(rental("EQ2", date(5, 1), None)).unwrap();
    let report = engine.returns_due(7, date(5, 2)).unwrap();
    assert_eq!(report.count, 1);
    assert_eq!(report.assets_due_for_return[0].equipment_id, "EQ1");
  }

  #[test]
  fn status_report_counts_assets() {
    let engine = FleetEngine::with_defaults();
    engine.checkout(rental("EQ1", date(5, 1), None)).unwrap();
    engine.checkout(rental("EQ2", date(5, 1), None)).unwrap();
    let report = engine.status_report(date(5, 3));
    assert_eq!(report.asset_count, 2);
    assert_eq!(report.status_date, date(5, 3));
    assert_eq!(engine.locations(), vec!["Site_F".to_string()]);
  }
}
