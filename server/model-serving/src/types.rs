//! Prediction outputs (JSON contract) and endpoint identifiers.

use chrono::NaiveDate;
use serde::Serialize;

use crate::schema::{self, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Breakdown,
  Price,
  Forecast,
  Anomaly,
}

impl Endpoint {
  pub const ALL: [Endpoint; 4] = [Self::Breakdown, Self::Price, Self::Forecast, Self::Anomaly];

  /// Route name, e.g. `predict_breakdown`.
  pub fn name(self) -> &'static str {
    match self {
      Self::Breakdown => "predict_breakdown",
      Self::Price => "predict_price",
      Self::Forecast => "forecast_demand",
      Self::Anomaly => "detect_anomaly",
    }
  }

  pub fn from_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|e| e.name() == name.trim_start_matches('/'))
  }

  pub fn schema(self) -> &'static Schema {
    match self {
      Self::Breakdown => &schema::BREAKDOWN,
      Self::Price => &schema::PRICE,
      Self::Forecast => &schema::FORECAST,
      Self::Anomaly => &schema::ANOMALY,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRisk {
  pub prediction: u8,
  pub prediction_text: String,
  pub breakdown_probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePrediction {
  pub predicted_price_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
  pub ds: NaiveDate,
  pub yhat: f64,
  pub yhat_lower: f64,
  pub yhat_upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandForecast {
  pub equipment_type: String,
  pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
  Normal,
  Anomalous,
  /// No baseline exists for the equipment type.
  Unscored,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
  pub equipment_type: String,
  pub is_anomaly: bool,
  pub verdict: Verdict,
  pub result_text: String,
}

/// Output of one inference call. Serialized without a tag so each endpoint
/// keeps its flat response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResult {
  BreakdownRisk(BreakdownRisk),
  Price(PricePrediction),
  Forecast(DemandForecast),
  Anomaly(AnomalyReport),
}

impl PredictionResult {
  /// Human-readable label for display.
  pub fn label(&self) -> String {
    match self {
      Self::BreakdownRisk(r) => r.prediction_text.clone(),
      Self::Price(p) => format!("${:.2}", p.predicted_price_usd),
      Self::Forecast(f) => format!("{}-day demand forecast for {}", f.forecast.len(), f.equipment_type),
      Self::Anomaly(a) => a.result_text.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_names_round_trip() {
    for endpoint in Endpoint::ALL {
      assert_eq!(Endpoint::from_name(endpoint.name()), Some(endpoint));
    }
    assert_eq!(Endpoint::from_name("/predict_price"), Some(Endpoint::Price));
    assert_eq!(Endpoint::from_name("predict_weather"), None);
  }

  #[test]
  fn untagged_serialization_keeps_flat_shape() {
    let result = PredictionResult::Price(PricePrediction { predicted_price_usd: 12.5 });
    assert_eq!(serde_json::to_value(&result).unwrap(), serde_json::json!({"predicted_price_usd": 12.5}));
    assert_eq!(result.label(), "$12.50");
  }
}
