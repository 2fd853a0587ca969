//! Core types for the fleet engine (ledger records + JSON contracts).
//!
//! Field names on the wire follow the rental dataset columns
//! (`Equipment_ID`, `CheckOut_Date`, ...), which is what the dashboard consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

/// Usage counters and model feature fields recorded per rental.
///
/// Finalized once on check-in. Missing fields deserialize as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
  #[serde(rename = "Operating_Hours", default)]
  pub operating_hours: f64,
  #[serde(rename = "Idle_Hours", default)]
  pub idle_hours: f64,
  #[serde(rename = "Breakdowns", default, deserialize_with = "count")]
  pub breakdowns: u32,
  #[serde(rename = "Fuel_Consumed_Liters", default)]
  pub fuel_consumed_liters: f64,
  #[serde(rename = "Fuel_Efficiency_L_per_hr", default)]
  pub fuel_efficiency_l_per_hr: f64,
  #[serde(rename = "Distance_Traveled_km", default)]
  pub distance_traveled_km: f64,
  #[serde(rename = "Load_Cycles", default, deserialize_with = "count")]
  pub load_cycles: u32,
  #[serde(rename = "Engine_Temp_Max", default)]
  pub engine_temp_max: f64,
  #[serde(rename = "Hydraulic_Pressure_Max", default)]
  pub hydraulic_pressure_max: f64,
  #[serde(rename = "Rental_Cost_USD", default)]
  pub rental_cost_usd: f64,
  #[serde(rename = "Utilization_Rate", default)]
  pub utilization_rate: f64,
}

/// One rental of one asset. `checkin_date == None` marks the asset's current rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalEvent {
  #[serde(rename = "Rental_ID", default)]
  pub rental_id: String,
  #[serde(rename = "Equipment_ID")]
  pub equipment_id: String,
  #[serde(rename = "Type", default)]
  pub equipment_type: String,
  #[serde(rename = "Model", default)]
  pub model: String,
  #[serde(rename = "Manufacture_Year", default)]
  pub manufacture_year: Option<i32>,
  #[serde(rename = "Equipment_Age_Years", default)]
  pub equipment_age_years: Option<f64>,
  #[serde(rename = "Maintenance_Flag", default)]
  pub maintenance_flag: Option<String>,
  #[serde(rename = "Customer_ID", default)]
  pub customer_id: String,
  #[serde(rename = "GPS_Location", default, serialize_with = "empty_if_none")]
  pub gps_location: Option<String>,
  #[serde(rename = "CheckOut_Date")]
  pub checkout_date: NaiveDate,
  #[serde(rename = "Planned_Return_Date", default)]
  pub planned_return_date: Option<NaiveDate>,
  #[serde(rename = "CheckIn_Date", default)]
  pub checkin_date: Option<NaiveDate>,
  #[serde(flatten)]
  pub metrics: UsageMetrics,
}

impl RentalEvent {
  pub fn is_open(&self) -> bool {
    self.checkin_date.is_none()
  }

  /// Whole days between checkout and checkin; `None` while the rental is open.
  pub fn rental_days(&self) -> Option<i64> {
    self
      .checkin_date
      .map(|checkin| (checkin - self.checkout_date).num_days())
  }

  /// Location for display; a record without one renders as empty.
  pub fn location(&self) -> &str {
    self.gps_location.as_deref().unwrap_or("")
  }
}

/// Checkout request: opens a new rental for an asset.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRental {
  #[serde(rename = "Equipment_ID")]
  pub equipment_id: String,
  #[serde(rename = "Type", default)]
  pub equipment_type: String,
  #[serde(rename = "Model", default)]
  pub model: String,
  #[serde(rename = "Manufacture_Year", default)]
  pub manufacture_year: Option<i32>,
  #[serde(rename = "Equipment_Age_Years", default)]
  pub equipment_age_years: Option<f64>,
  #[serde(rename = "Maintenance_Flag", default)]
  pub maintenance_flag: Option<String>,
  #[serde(rename = "Customer_ID")]
  pub customer_id: String,
  #[serde(rename = "GPS_Location", default)]
  pub gps_location: Option<String>,
  #[serde(rename = "CheckOut_Date")]
  pub checkout_date: NaiveDate,
  #[serde(rename = "Planned_Return_Date", default)]
  pub planned_return_date: Option<NaiveDate>,
  #[serde(flatten)]
  pub metrics: UsageMetrics,
}

impl NewRental {
  pub fn validate(&self) -> Result<(), EngineError> {
    if self.equipment_id.trim().is_empty() {
      return Err(EngineError::validation("Equipment_ID", "must not be empty"));
    }
    if self.customer_id.trim().is_empty() {
      return Err(EngineError::validation("Customer_ID", "must not be empty"));
    }
    if let Some(planned) = self.planned_return_date {
      if planned < self.checkout_date {
        return Err(EngineError::validation(
          "Planned_Return_Date",
          "must not be before CheckOut_Date",
        ));
      }
    }
    Ok(())
  }

  /// Convert into an open ledger event. `rental_id` is left empty; the
  /// ledger assigns it on append.
  pub fn into_event(self) -> RentalEvent {
    let equipment_id = self.equipment_id.trim().to_string();
    let customer_id = self.customer_id.trim().to_string();
    RentalEvent {
      rental_id: String::new(),
      equipment_id,
      equipment_type: self.equipment_type,
      model: self.model,
      manufacture_year: self.manufacture_year,
      equipment_age_years: self.equipment_age_years,
      maintenance_flag: self.maintenance_flag,
      customer_id,
      gps_location: self.gps_location,
      checkout_date: self.checkout_date,
      planned_return_date: self.planned_return_date,
      checkin_date: None,
      metrics: self.metrics,
    }
  }
}

/// Check-in request: closes the asset's open rental and finalizes its counters.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckIn {
  #[serde(rename = "CheckIn_Date")]
  pub checkin_date: NaiveDate,
  #[serde(flatten)]
  pub metrics: UsageMetrics,
}

/// Rental ID: hash of equipment ID + checkout date + customer + the event's
/// ordinal within the asset's history. The ordinal keeps a same-day reopen by
/// the same customer distinct.
pub fn rental_id(equipment_id: &str, checkout_date: NaiveDate, customer_id: &str, ordinal: usize) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(equipment_id.as_bytes());
  hasher.update(b"|");
  hasher.update(checkout_date.format("%Y-%m-%d").to_string().as_bytes());
  hasher.update(b"|");
  hasher.update(customer_id.as_bytes());
  hasher.update(b"|");
  hasher.update(&(ordinal as u64).to_le_bytes());
  let hex = hasher.finalize().to_hex();
  format!("rent-{}", &hex[..16])
}

/// Whole-number counter that also accepts integral floats (`1.0`), which is
/// how dataframe exports write integer columns.
fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = f64::deserialize(deserializer)?;
  if raw.fract() != 0.0 || raw < 0.0 || raw > f64::from(u32::MAX) {
    return Err(serde::de::Error::custom(format!("expected a non-negative whole number, got {}", raw)));
  }
  Ok(raw as u32)
}

fn empty_if_none<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
  S: Serializer,
{
  serializer.serialize_str(value.as_deref().unwrap_or(""))
}

// ---------------------------------------------------------------------------
// Asset state (derived)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
  Active,
  Idle,
}

impl AssetStatus {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "active" | "rented" => Some(Self::Active),
      "idle" | "available" => Some(Self::Idle),
      _ => None,
    }
  }
}

/// Current status of one asset, projected from its ledger events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetState {
  #[serde(rename = "Equipment_ID")]
  pub equipment_id: String,
  #[serde(rename = "Status")]
  pub status: AssetStatus,
  #[serde(rename = "Type")]
  pub equipment_type: String,
  #[serde(rename = "Model")]
  pub model: String,
  #[serde(rename = "Equipment_Age_Years")]
  pub equipment_age_years: Option<f64>,
  #[serde(rename = "Last_Known_Location")]
  pub last_known_location: String,
  #[serde(rename = "Current_Customer_ID")]
  pub current_customer_id: Option<String>,
  #[serde(rename = "Planned_Return_Date")]
  pub planned_return_date: Option<NaiveDate>,
  #[serde(rename = "Last_Returned_On")]
  pub last_returned_on: Option<NaiveDate>,
  #[serde(rename = "Last_Operating_Hours")]
  pub last_operating_hours: f64,
  #[serde(rename = "Last_Utilization_Rate")]
  pub last_utilization_rate: f64,
  #[serde(rename = "Breakdowns_on_Last_Rental")]
  pub breakdowns_on_last_rental: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetStatusReport {
  pub status_date: NaiveDate,
  pub asset_count: usize,
  pub assets: Vec<AssetState>,
}

// ---------------------------------------------------------------------------
// History (derived)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetHistorySummary {
  pub total_rentals: usize,
  pub total_rental_days: i64,
  pub total_operating_hours: f64,
  pub total_idle_hours: f64,
  pub total_fuel_consumed_liters: f64,
  pub lifetime_breakdowns: u64,
  pub rentals_per_site: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetHistory {
  pub equipment_id: String,
  pub summary: AssetHistorySummary,
  /// Ascending checkout-date order.
  #[serde(rename = "rental_history")]
  pub events: Vec<RentalEvent>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReturnsDueReport {
  pub reminder_window_days: i64,
  pub from_date: NaiveDate,
  pub to_date: NaiveDate,
  pub count: usize,
  pub assets_due_for_return: Vec<AssetState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderutilizedAsset {
  #[serde(rename = "Equipment_ID")]
  pub equipment_id: String,
  #[serde(rename = "Type")]
  pub equipment_type: String,
  #[serde(rename = "Model")]
  pub model: String,
  #[serde(rename = "GPS_Location")]
  pub gps_location: String,
  #[serde(rename = "Average_Utilization_Rate")]
  pub avg_utilization: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnderutilizedReport {
  pub threshold: f64,
  pub count: usize,
  pub underutilized_assets: Vec<UnderutilizedAsset>,
}

// ---------------------------------------------------------------------------
// CLI / boundary error wrapper
// ---------------------------------------------------------------------------

/// Structured error body for invalid input.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}

impl From<&EngineError> for ErrorOutput {
  fn from(err: &EngineError) -> Self {
    match err {
      EngineError::Validation { field, reason } => {
        ErrorOutput::new(reason.clone()).with_field(field.clone())
      }
      other => ErrorOutput::new(other.to_string()),
    }
  }
}
