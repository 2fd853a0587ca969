//! Binary entrypoint: `model-serving <endpoint>` reads one JSON payload from
//! stdin and writes the prediction to stdout.

use model_serving::{Endpoint, ModelArtifacts, ModelRegistry, ServingConfig, ServingError};
use serde_json::{json, Value};
use std::io::{self, Read, Write};
use std::path::Path;

fn main() {
  if let Err(e) = run_binary() {
    let body = match &e {
      ServingError::Validation { field, reason } => json!({"error": true, "message": reason, "field": field}),
      other => json!({"error": true, "message": other.to_string()}),
    };
    let _ = writeln!(io::stdout(), "{}", body);
    let _ = writeln!(io::stderr(), "model-serving error: {}", e);
    std::process::exit(1);
  }
}

fn run_binary() -> Result<(), ServingError> {
  let name = std::env::args().nth(1).unwrap_or_default();
  let endpoint = Endpoint::from_name(&name).ok_or_else(|| {
    ServingError::validation(
      "endpoint",
      "expected predict_breakdown|predict_price|forecast_demand|detect_anomaly",
    )
  })?;

  let artifacts = match std::env::var("MODEL_ARTIFACTS_PATH") {
    Ok(path) if !path.trim().is_empty() => ModelArtifacts::from_path(Path::new(path.trim()))?,
    _ => ModelArtifacts::builtin()?,
  };
  let registry = ModelRegistry::new(artifacts, ServingConfig::default());

  let mut raw = String::new();
  io::stdin()
    .lock()
    .read_to_string(&mut raw)
    .map_err(|e| ServingError::validation("body", &e.to_string()))?;
  let payload: Value = serde_json::from_str(&raw)?;

  let out = registry.predict(endpoint, &payload)?;
  let json = serde_json::to_vec(&out)?;
  io::stdout()
    .write_all(&json)
    .map_err(|e| ServingError::Model(format!("stdout: {}", e)))?;
  Ok(())
}
