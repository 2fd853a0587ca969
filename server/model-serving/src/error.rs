//! Structured error types for model serving.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServingError {
  /// Payload failed schema validation. The only error a caller can cause.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  /// Inference produced an out-of-contract value.
  #[error("model: {0}")]
  Model(String),

  /// Artifact bundle could not be read or is inconsistent.
  #[error("artifact: {0}")]
  Artifact(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ServingError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn artifact(msg: impl Into<String>) -> Self {
    Self::Artifact(msg.into())
  }
}
