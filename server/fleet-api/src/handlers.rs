//! HTTP handlers for the fleet API.

use axum::{
  extract::{rejection::JsonRejection, Path, Query, State},
  http::StatusCode,
  Json,
};
use fleet_engine::types::{AssetHistory, AssetStatusReport, ReturnsDueReport, UnderutilizedReport};
use fleet_engine::{CheckIn, NewRental, RentalEvent};
use model_serving::{Endpoint, PredictionResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
  LocationsResponse, ReturnsDueQuery, SearchQuery, SearchResponse, UnderutilizedQuery,
};

pub async fn root() -> &'static str {
  "Fleet Analytics & Model-Serving API"
}

pub async fn health() -> &'static str {
  "ok"
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

pub async fn asset_status(State(state): State<Arc<AppState>>) -> Json<AssetStatusReport> {
  Json(state.engine.status_report(state.today()))
}

pub async fn asset_history(
  State(state): State<Arc<AppState>>,
  Path(equipment_id): Path<String>,
) -> Result<Json<AssetHistory>, ApiError> {
  Ok(Json(state.engine.history_for(&equipment_id)?))
}

pub async fn returns_due_soon(
  State(state): State<Arc<AppState>>,
  Query(query): Query<ReturnsDueQuery>,
) -> Result<Json<ReturnsDueReport>, ApiError> {
  let default = state.engine.config().default_days_out;
  let days_out = parse_param("days_out", query.days_out.as_deref(), default)?;
  Ok(Json(state.engine.returns_due(days_out, state.today())?))
}

pub async fn underutilized_assets(
  State(state): State<Arc<AppState>>,
  Query(query): Query<UnderutilizedQuery>,
) -> Result<Json<UnderutilizedReport>, ApiError> {
  let default = state.engine.config().default_utilization_threshold;
  let threshold = parse_param("threshold", query.threshold.as_deref(), default)?;
  Ok(Json(state.engine.underutilized(threshold)?))
}

pub async fn asset_search(
  State(state): State<Arc<AppState>>,
  Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
  let assets = state
    .engine
    .search(&query.term, query.status.as_deref(), query.location.as_deref())?;
  Ok(Json(SearchResponse {
    count: assets.len(),
    assets,
  }))
}

pub async fn locations(State(state): State<Arc<AppState>>) -> Json<LocationsResponse> {
  Json(LocationsResponse {
    locations: state.engine.locations(),
  })
}

// ---------------------------------------------------------------------------
// Ledger writes
// ---------------------------------------------------------------------------

pub async fn create_rental(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<RentalEvent>), ApiError> {
  let rental: NewRental = decode_body(body)?;
  let event = state.engine.checkout(rental)?;
  info!(equipment_id = %event.equipment_id, rental_id = %event.rental_id, "rental created");
  Ok((StatusCode::CREATED, Json(event)))
}

pub async fn checkin_rental(
  State(state): State<Arc<AppState>>,
  Path(equipment_id): Path<String>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RentalEvent>, ApiError> {
  let checkin: CheckIn = decode_body(body)?;
  let event = state.engine.checkin(&equipment_id, checkin)?;
  info!(equipment_id = %equipment_id, rental_id = %event.rental_id, "rental checked in");
  Ok(Json(event))
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

pub async fn predict_breakdown(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
  predict(&state, Endpoint::Breakdown, body)
}

pub async fn predict_price(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
  predict(&state, Endpoint::Price, body)
}

pub async fn forecast_demand(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
  predict(&state, Endpoint::Forecast, body)
}

pub async fn detect_anomaly(
  State(state): State<Arc<AppState>>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
  predict(&state, Endpoint::Anomaly, body)
}

fn predict(
  state: &AppState,
  endpoint: Endpoint,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
  let payload = json_body(body)?;
  Ok(Json(state.models.predict(endpoint, &payload)?))
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
  body
    .map(|Json(value)| value)
    .map_err(|rejection| ApiError::validation("body", &rejection.body_text()))
}

fn decode_body<T: DeserializeOwned>(body: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
  let value = json_body(body)?;
  serde_json::from_value(value).map_err(|e| ApiError::validation("body", &e.to_string()))
}

/// Absent or blank means `default`; anything unparsable is a 400 naming the parameter.
fn parse_param<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> Result<T, ApiError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(default),
    Some(s) => s
      .parse()
      .map_err(|_| ApiError::validation(name, &format!("{:?} is not a valid value", s))),
  }
}
