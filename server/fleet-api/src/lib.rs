//! Fleet API
//!
//! HTTP service over the fleet engine (ledger, status, history, reports) and
//! model serving (four inference endpoints). Bind to 127.0.0.1 by default.

pub mod config;
pub mod error;
mod handlers;
pub mod state;
pub mod telemetry;
pub mod types;

use axum::{
  routing::{get, post},
  Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use config::{Settings, SettingsError};
pub use error::ApiError;
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
  let timeout = state.settings.request_timeout;
  Router::new()
    .route("/", get(handlers::root))
    .route("/health", get(handlers::health))
    .route("/asset_status", get(handlers::asset_status))
    .route("/asset_history/:equipment_id", get(handlers::asset_history))
    .route("/returns_due_soon", get(handlers::returns_due_soon))
    .route("/underutilized_assets", get(handlers::underutilized_assets))
    .route("/asset_search", get(handlers::asset_search))
    .route("/locations", get(handlers::locations))
    .route("/rentals", post(handlers::create_rental))
    .route("/rentals/:equipment_id/checkin", post(handlers::checkin_rental))
    .route("/predict_breakdown", post(handlers::predict_breakdown))
    .route("/predict_price", post(handlers::predict_price))
    .route("/forecast_demand", post(handlers::forecast_demand))
    .route("/detect_anomaly", post(handlers::detect_anomaly))
    .layer(TimeoutLayer::new(timeout))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
