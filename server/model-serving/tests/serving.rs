//! End-to-end inference over the compiled-in artifact bundle.

use model_serving::types::Verdict;
use model_serving::{Endpoint, ModelRegistry, PredictionResult, ServingError};
use proptest::prelude::*;
use serde_json::{json, Value};

fn registry() -> ModelRegistry {
  ModelRegistry::builtin().unwrap()
}

fn breakdown_form() -> Value {
  json!({
    "Type": "Excavator",
    "Model": "320D2",
    "Manufacture_Year": 2020,
    "Operating_Hours": 100,
    "Idle_Hours": 20,
    "Fuel_Consumed_Liters": 1100,
    "Fuel_Efficiency_L_per_hr": 11,
    "Distance_Traveled_km": 50,
    "Load_Cycles": 300,
    "GPS_Location": "Site_A",
    "Maintenance_Flag": "No",
    "Engine_Temp_Max": 95,
    "Hydraulic_Pressure_Max": 340,
    "Rental_Cost_USD": 5000,
    "Rental_Duration_Days": 10,
    "Planned_Duration_Days": 10,
    "Overdue_Days": 0,
    "Equipment_Age_Years": 5,
    "Utilization_Rate": 0.83,
  })
}

fn price_form() -> Value {
  json!({
    "Type": "Excavator",
    "Model": "320D2",
    "Manufacture_Year": 2021,
    "Operating_Hours": 80,
    "Idle_Hours": 15,
    "Fuel_Consumed_Liters": 950,
    "Fuel_Efficiency_L_per_hr": 11.8,
    "Distance_Traveled_km": 0,
    "Load_Cycles": 0,
    "GPS_Location": "Site_C",
    "Maintenance_Flag": "No",
    "Engine_Temp_Max": 92,
    "Hydraulic_Pressure_Max": 340,
    "Rental_Duration_Days": 10,
    "Planned_Duration_Days": 10,
    "Overdue_Days": 0,
    "Equipment_Age_Years": 4,
    "Utilization_Rate": 0.84,
  })
}

fn anomaly_form() -> Value {
  json!({
    "Type": "Excavator",
    "Operating_Hours": 80,
    "Idle_Hours": 20,
    "Fuel_Consumed_Liters": 900,
    "Fuel_Efficiency_L_per_hr": 11.25,
    "Load_Cycles": 250,
    "Utilization_Rate": 0.8,
  })
}

#[test]
fn default_breakdown_form_is_low_risk() {
  let risk = registry().predict_breakdown(&breakdown_form()).unwrap();
  assert_eq!(risk.prediction, 0);
  assert_eq!(risk.prediction_text, "No Breakdown Likely");
  assert!(risk.breakdown_probability > 0.0 && risk.breakdown_probability < 0.5);
}

#[test]
fn maintenance_flag_tips_breakdown_risk() {
  let mut form = breakdown_form();
  form["Maintenance_Flag"] = json!("Yes");
  let risk = registry().predict_breakdown(&form).unwrap();
  assert_eq!(risk.prediction, 1);
  assert_eq!(risk.prediction_text, "Likely Breakdown");
}

#[test]
fn overheated_engine_raises_statistical_risk() {
  let mut form = breakdown_form();
  form["Engine_Temp_Max"] = json!(130);
  let risk = registry().predict_breakdown(&form).unwrap();
  assert_eq!(risk.prediction, 1);
  assert!((risk.breakdown_probability - 0.95).abs() < 1e-9);
}

#[test]
fn unseen_model_label_still_scores() {
  let mut form = breakdown_form();
  form["Model"] = json!("PROTOTYPE-9");
  assert!(registry().predict_breakdown(&form).is_ok());
}

#[test]
fn default_price_form_is_positive() {
  let out = registry().predict_price(&price_form()).unwrap();
  assert!((out.predicted_price_usd - 7856.0).abs() < 1e-6);
}

#[test]
fn negative_implying_price_form_is_clamped() {
  let mut form = price_form();
  form["Idle_Hours"] = json!(10_000);
  form["Equipment_Age_Years"] = json!(100);
  let out = registry().predict_price(&form).unwrap();
  assert!(out.predicted_price_usd >= 0.0);
  assert_eq!(out.predicted_price_usd, 0.0);
}

#[test]
fn price_ignores_rental_cost_field() {
  let mut form = price_form();
  let base = registry().predict_price(&form).unwrap();
  form["Rental_Cost_USD"] = json!(1_000_000);
  assert_eq!(registry().predict_price(&form).unwrap(), base);
}

#[test]
fn default_anomaly_form_is_normal() {
  let report = registry().detect_anomaly(&anomaly_form()).unwrap();
  assert_eq!(report.verdict, Verdict::Normal);
  assert_eq!(report.result_text, "Normal Usage");
}

#[test]
fn extreme_operating_hours_are_anomalous() {
  let mut form = anomaly_form();
  form["Operating_Hours"] = json!(200);
  let report = registry().detect_anomaly(&form).unwrap();
  assert!(report.is_anomaly);
  assert_eq!(report.result_text, "Anomalous Usage Detected: Operating_Hours is abnormal");
}

#[test]
fn missing_field_reports_field_name() {
  let mut form = breakdown_form();
  form.as_object_mut().unwrap().remove("Overdue_Days");
  match registry().predict(Endpoint::Breakdown, &form) {
    Err(ServingError::Validation { field, .. }) => assert_eq!(field, "Overdue_Days"),
    other => panic!("expected validation error, got {:?}", other),
  }
}

#[test]
fn forecast_rejects_out_of_range_horizon() {
  let err = registry()
    .forecast_demand(&json!({"equipment_type": "Crane", "periods": 400}))
    .unwrap_err();
  assert!(matches!(err, ServingError::Validation { ref field, .. } if field == "periods"));
}

#[test]
fn label_renders_for_every_endpoint() {
  let registry = registry();
  let price = registry.predict(Endpoint::Price, &price_form()).unwrap();
  assert_eq!(price.label(), "$7856.00");
  let forecast = registry
    .predict(Endpoint::Forecast, &json!({"equipment_type": "Crane", "periods": 7}))
    .unwrap();
  assert!(matches!(forecast, PredictionResult::Forecast(_)));
  assert_eq!(forecast.label(), "7-day demand forecast for Crane");
}

proptest! {
  #[test]
  fn forecast_bounds_always_ordered(
    kind in prop::sample::select(vec!["Bulldozer", "Crane", "DumpTruck", "Excavator", "Loader"]),
    periods in 7u32..=365,
  ) {
    let out = registry()
      .forecast_demand(&json!({"equipment_type": kind, "periods": periods}))
      .unwrap();
    prop_assert_eq!(out.forecast.len(), periods as usize);
    for point in &out.forecast {
      prop_assert!(point.yhat_lower <= point.yhat);
      prop_assert!(point.yhat <= point.yhat_upper);
      prop_assert!(point.yhat_lower >= 0.0);
    }
  }

  #[test]
  fn anomaly_never_fails_on_in_range_payloads(
    hours in 0.0f64..10_000.0,
    idle in 0.0f64..10_000.0,
    fuel in 0.0f64..1_000_000.0,
    efficiency in 0.0f64..1_000.0,
    cycles in 0.0f64..1_000_000.0,
    utilization in 0.0f64..=1.0,
  ) {
    let report = registry().detect_anomaly(&json!({
      "Type": "Loader",
      "Operating_Hours": hours,
      "Idle_Hours": idle,
      "Fuel_Consumed_Liters": fuel,
      "Fuel_Efficiency_L_per_hr": efficiency,
      "Load_Cycles": cycles,
      "Utilization_Rate": utilization,
    }));
    prop_assert!(report.is_ok());
    prop_assert!(!report.unwrap().result_text.is_empty());
  }
}
