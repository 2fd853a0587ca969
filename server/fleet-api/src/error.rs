//! API error type and its HTTP mapping.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use fleet_engine::types::ErrorOutput;
use fleet_engine::EngineError;
use model_serving::ServingError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error(transparent)]
  Serving(#[from] ServingError),

  /// Malformed request parameters or body caught before reaching a component.
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },
}

impl ApiError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) => match e {
        EngineError::Validation { .. } | EngineError::Parse(_) | EngineError::Json(_) => {
          StatusCode::BAD_REQUEST
        }
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
      },
      ApiError::Serving(e) => match e {
        ServingError::Validation { .. } | ServingError::Json(_) => StatusCode::BAD_REQUEST,
        ServingError::Model(_) | ServingError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  /// Machine-readable body; server faults carry a generic message.
  pub fn body(&self) -> ErrorOutput {
    match self {
      ApiError::Validation { field, reason }
      | ApiError::Serving(ServingError::Validation { field, reason }) => {
        ErrorOutput::new(reason.clone()).with_field(field.clone())
      }
      ApiError::Engine(e) => ErrorOutput::from(e),
      _ if self.status().is_server_error() => ErrorOutput::new("internal server error"),
      other => ErrorOutput::new(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(self.body())).into_response()
  }
}
