//! Structured error types for the fleet engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: equipment {0} already has an open rental")]
  Conflict(String),

  #[error("parse: {0}")]
  Parse(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }

  pub fn no_history(equipment_id: &str) -> Self {
    Self::NotFound(format!("no history for equipment {}", equipment_id))
  }

  pub fn no_open_rental(equipment_id: &str) -> Self {
    Self::NotFound(format!("no open rental for equipment {}", equipment_id))
  }
}
