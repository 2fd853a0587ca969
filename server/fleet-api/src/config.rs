//! Process settings, read once at startup.

use chrono::NaiveDate;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use fleet_engine::date;

#[derive(Debug, Error)]
pub enum SettingsError {
  #[error("invalid {key}: {reason}")]
  Invalid { key: &'static str, reason: String },
}

impl SettingsError {
  fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
    Self::Invalid {
      key,
      reason: reason.into(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Settings {
  pub host: String,
  pub port: u16,
  /// JSON-lines rental records restored into the ledger at startup.
  pub ledger_seed_path: Option<PathBuf>,
  /// Artifact bundle; the compiled-in bundle is used when unset.
  pub model_artifacts_path: Option<PathBuf>,
  /// Pins "today" for report windows.
  pub as_of: Option<NaiveDate>,
  pub request_timeout: Duration,
  pub log_json: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      host: "127.0.0.1".into(),
      port: 5000,
      ledger_seed_path: None,
      model_artifacts_path: None,
      as_of: None,
      request_timeout: Duration::from_secs(10),
      log_json: false,
    }
  }
}

impl Settings {
  pub fn from_env() -> Result<Self, SettingsError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; blank values count as unset.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut settings = Settings::default();

    if let Some(host) = get("HOST") {
      settings.host = host;
    }
    if let Some(port) = get("PORT") {
      settings.port = port
        .parse()
        .map_err(|_| SettingsError::invalid("PORT", format!("{:?} is not a valid port", port)))?;
    }
    settings.ledger_seed_path = get("LEDGER_SEED_PATH").map(PathBuf::from);
    settings.model_artifacts_path = get("MODEL_ARTIFACTS_PATH").map(PathBuf::from);
    if let Some(raw) = get("FLEET_AS_OF") {
      settings.as_of = Some(
        date::parse_as_of(&raw)
          .ok_or_else(|| SettingsError::invalid("FLEET_AS_OF", format!("{:?} is not YYYY-MM-DD or RFC3339", raw)))?,
      );
    }
    if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
      let secs: u64 = raw
        .parse()
        .ok()
        .filter(|s| *s > 0)
        .ok_or_else(|| SettingsError::invalid("REQUEST_TIMEOUT_SECS", "expected a positive integer"))?;
      settings.request_timeout = Duration::from_secs(secs);
    }
    settings.log_json = get("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

    Ok(settings)
  }

  pub fn socket_addr(&self) -> Result<SocketAddr, SettingsError> {
    let ip: IpAddr = self
      .host
      .parse()
      .map_err(|_| SettingsError::invalid("HOST", format!("{:?} is not an IP address", self.host)))?;
    Ok(SocketAddr::new(ip, self.port))
  }

  pub fn today(&self) -> NaiveDate {
    date::today(self.as_of)
  }
}
