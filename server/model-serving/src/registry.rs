//! Process-wide model registry: validates payloads and dispatches to predictors.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::anomaly;
use crate::artifacts::ModelArtifacts;
use crate::breakdown;
use crate::config::ServingConfig;
use crate::error::ServingError;
use crate::forecast;
use crate::price;
use crate::schema;
use crate::types::*;

/// Loaded artifacts plus serving constants. Immutable after construction, so
/// clones share one bundle and inference needs no locking.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
  artifacts: Arc<ModelArtifacts>,
  config: ServingConfig,
}

impl ModelRegistry {
  pub fn new(artifacts: ModelArtifacts, config: ServingConfig) -> Self {
    Self {
      artifacts: Arc::new(artifacts),
      config,
    }
  }

  /// Registry over the compiled-in bundle.
  pub fn builtin() -> Result<Self, ServingError> {
    Ok(Self::new(ModelArtifacts::builtin()?, ServingConfig::default()))
  }

  pub fn artifacts(&self) -> &ModelArtifacts {
    &self.artifacts
  }

  pub fn config(&self) -> &ServingConfig {
    &self.config
  }

  pub fn predict(&self, endpoint: Endpoint, payload: &Value) -> Result<PredictionResult, ServingError> {
    let result = match endpoint {
      Endpoint::Breakdown => PredictionResult::BreakdownRisk(self.predict_breakdown(payload)?),
      Endpoint::Price => PredictionResult::Price(self.predict_price(payload)?),
      Endpoint::Forecast => PredictionResult::Forecast(self.forecast_demand(payload)?),
      Endpoint::Anomaly => PredictionResult::Anomaly(self.detect_anomaly(payload)?),
    };
    debug!(endpoint = endpoint.name(), label = %result.label(), "inference served");
    Ok(result)
  }

  pub fn predict_breakdown(&self, payload: &Value) -> Result<BreakdownRisk, ServingError> {
    let features = schema::BREAKDOWN.validate(payload)?;
    Ok(breakdown::predict(&features, &self.artifacts.breakdown, &self.config))
  }

  pub fn predict_price(&self, payload: &Value) -> Result<PricePrediction, ServingError> {
    let features = schema::PRICE.validate(payload)?;
    Ok(price::predict(&features, &self.artifacts.price, &self.config))
  }

  pub fn forecast_demand(&self, payload: &Value) -> Result<DemandForecast, ServingError> {
    let features = schema::FORECAST.validate(payload)?;
    let equipment_type = features.text("equipment_type").unwrap_or_default();
    // Range-checked by the schema.
    let periods = features.number("periods").unwrap_or_default() as u32;
    forecast::forecast_for(&self.artifacts.demand, equipment_type, periods)
  }

  pub fn detect_anomaly(&self, payload: &Value) -> Result<AnomalyReport, ServingError> {
    let features = schema::ANOMALY.validate(payload)?;
    let baseline = features.text("Type").and_then(|kind| self.artifacts.anomaly.get(kind));
    Ok(anomaly::detect(&features, baseline, &self.config))
  }
}
