//! Versioned feature schemas, one per inference endpoint.
//!
//! A schema is an ordered field list. Validation checks presence, JSON type,
//! numeric range and categorical membership, and yields a [`FeatureVector`] in
//! schema order. Fields not named by the schema are ignored.

use serde_json::Value;

use crate::error::ServingError;

pub const EQUIPMENT_TYPES: &[&str] = &["Bulldozer", "Crane", "DumpTruck", "Excavator", "Loader"];
pub const MAINTENANCE_FLAGS: &[&str] = &["No", "Yes"];

/// Usage features scored by the anomaly detector, in reporting order.
pub const ANOMALY_FEATURES: &[&str] = &[
  "Operating_Hours",
  "Idle_Hours",
  "Fuel_Consumed_Liters",
  "Fuel_Efficiency_L_per_hr",
  "Load_Cycles",
  "Utilization_Rate",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
  Number { min: f64, max: f64 },
  Integer { min: i64, max: i64 },
  /// Closed set of labels.
  Category(&'static [&'static str]),
  /// Free-text label; one-hot encoded, unseen values fall back to the baseline column.
  Label,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
  pub name: &'static str,
  pub kind: FieldKind,
}

const fn number(name: &'static str, min: f64, max: f64) -> FieldSpec {
  FieldSpec { name, kind: FieldKind::Number { min, max } }
}

const fn integer(name: &'static str, min: i64, max: i64) -> FieldSpec {
  FieldSpec { name, kind: FieldKind::Integer { min, max } }
}

const fn category(name: &'static str, values: &'static [&'static str]) -> FieldSpec {
  FieldSpec { name, kind: FieldKind::Category(values) }
}

const fn label(name: &'static str) -> FieldSpec {
  FieldSpec { name, kind: FieldKind::Label }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schema {
  pub name: &'static str,
  pub version: u32,
  pub fields: &'static [FieldSpec],
}

pub const BREAKDOWN: Schema = Schema {
  name: "breakdown",
  version: 1,
  fields: &[
    category("Type", EQUIPMENT_TYPES),
    label("Model"),
    integer("Manufacture_Year", 1950, 2100),
    number("Operating_Hours", 0.0, 10_000.0),
    number("Idle_Hours", 0.0, 10_000.0),
    number("Fuel_Consumed_Liters", 0.0, 1_000_000.0),
    number("Fuel_Efficiency_L_per_hr", 0.0, 1_000.0),
    number("Distance_Traveled_km", 0.0, 100_000.0),
    number("Load_Cycles", 0.0, 1_000_000.0),
    label("GPS_Location"),
    category("Maintenance_Flag", MAINTENANCE_FLAGS),
    number("Engine_Temp_Max", -50.0, 300.0),
    number("Hydraulic_Pressure_Max", 0.0, 1_000.0),
    number("Rental_Cost_USD", 0.0, 10_000_000.0),
    integer("Rental_Duration_Days", 0, 3_650),
    integer("Planned_Duration_Days", 0, 3_650),
    integer("Overdue_Days", 0, 3_650),
    number("Equipment_Age_Years", 0.0, 100.0),
    number("Utilization_Rate", 0.0, 1.0),
  ],
};

pub const PRICE: Schema = Schema {
  name: "price",
  version: 1,
  fields: &[
    category("Type", EQUIPMENT_TYPES),
    label("Model"),
    integer("Manufacture_Year", 1950, 2100),
    number("Operating_Hours", 0.0, 10_000.0),
    number("Idle_Hours", 0.0, 10_000.0),
    number("Fuel_Consumed_Liters", 0.0, 1_000_000.0),
    number("Fuel_Efficiency_L_per_hr", 0.0, 1_000.0),
    number("Distance_Traveled_km", 0.0, 100_000.0),
    number("Load_Cycles", 0.0, 1_000_000.0),
    label("GPS_Location"),
    category("Maintenance_Flag", MAINTENANCE_FLAGS),
    number("Engine_Temp_Max", -50.0, 300.0),
    number("Hydraulic_Pressure_Max", 0.0, 1_000.0),
    integer("Rental_Duration_Days", 0, 3_650),
    integer("Planned_Duration_Days", 0, 3_650),
    integer("Overdue_Days", 0, 3_650),
    number("Equipment_Age_Years", 0.0, 100.0),
    number("Utilization_Rate", 0.0, 1.0),
  ],
};

pub const FORECAST: Schema = Schema {
  name: "forecast",
  version: 1,
  fields: &[
    category("equipment_type", EQUIPMENT_TYPES),
    integer("periods", 7, 365),
  ],
};

pub const ANOMALY: Schema = Schema {
  name: "anomaly",
  version: 1,
  fields: &[
    category("Type", EQUIPMENT_TYPES),
    number("Operating_Hours", 0.0, 10_000.0),
    number("Idle_Hours", 0.0, 10_000.0),
    number("Fuel_Consumed_Liters", 0.0, 1_000_000.0),
    number("Fuel_Efficiency_L_per_hr", 0.0, 1_000.0),
    number("Load_Cycles", 0.0, 1_000_000.0),
    number("Utilization_Rate", 0.0, 1.0),
  ],
};

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
  Number(f64),
  Text(String),
}

/// Validated features in schema order. Exists for the duration of one inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
  schema: &'static str,
  values: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
  pub fn schema(&self) -> &'static str {
    self.schema
  }

  pub fn get(&self, name: &str) -> Option<&FeatureValue> {
    self
      .values
      .iter()
      .find(|(field, _)| *field == name)
      .map(|(_, value)| value)
  }

  pub fn number(&self, name: &str) -> Option<f64> {
    match self.get(name)? {
      FeatureValue::Number(n) => Some(*n),
      FeatureValue::Text(_) => None,
    }
  }

  pub fn text(&self, name: &str) -> Option<&str> {
    match self.get(name)? {
      FeatureValue::Text(s) => Some(s),
      FeatureValue::Number(_) => None,
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
    self.values.iter().map(|(name, value)| (*name, value))
  }
}

impl Schema {
  /// Validate a JSON payload against this schema.
  pub fn validate(&self, payload: &Value) -> Result<FeatureVector, ServingError> {
    let object = payload
      .as_object()
      .ok_or_else(|| ServingError::validation("body", "expected a JSON object"))?;

    let mut values = Vec::with_capacity(self.fields.len());
    for field in self.fields {
      let raw = match object.get(field.name) {
        None | Some(Value::Null) => {
          return Err(ServingError::validation(field.name, "missing required field"))
        }
        Some(v) => v,
      };
      values.push((field.name, check_field(field, raw)?));
    }

    Ok(FeatureVector {
      schema: self.name,
      values,
    })
  }

  pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
    self.fields.iter().map(|f| f.name)
  }
}

fn check_field(field: &FieldSpec, raw: &Value) -> Result<FeatureValue, ServingError> {
  match field.kind {
    FieldKind::Number { min, max } => {
      let n = raw
        .as_f64()
        .ok_or_else(|| ServingError::validation(field.name, "expected a number"))?;
      if n < min || n > max {
        return Err(ServingError::validation(
          field.name,
          &format!("out of range [{}, {}]", min, max),
        ));
      }
      Ok(FeatureValue::Number(n))
    }
    FieldKind::Integer { min, max } => {
      let n = raw
        .as_i64()
        .or_else(|| raw.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| ServingError::validation(field.name, "expected an integer"))?;
      if n < min || n > max {
        return Err(ServingError::validation(
          field.name,
          &format!("out of range [{}, {}]", min, max),
        ));
      }
      Ok(FeatureValue::Number(n as f64))
    }
    FieldKind::Category(allowed) => {
      let s = raw
        .as_str()
        .ok_or_else(|| ServingError::validation(field.name, "expected a string"))?;
      if !allowed.contains(&s) {
        return Err(ServingError::validation(
          field.name,
          &format!("expected one of {}", allowed.join("|")),
        ));
      }
      Ok(FeatureValue::Text(s.to_string()))
    }
    FieldKind::Label => {
      let s = raw
        .as_str()
        .map(str::trim)
        .ok_or_else(|| ServingError::validation(field.name, "expected a string"))?;
      if s.is_empty() {
        return Err(ServingError::validation(field.name, "must not be empty"));
      }
      Ok(FeatureValue::Text(s.to_string()))
    }
  }
}
