//! Shared application state.

use anyhow::Context;
use chrono::NaiveDate;
use fleet_engine::{ledger, FleetEngine};
use model_serving::{ModelArtifacts, ModelRegistry, ServingConfig};
use std::fs::File;
use std::io::BufReader;
use tracing::info;

use crate::config::Settings;

pub struct AppState {
  pub engine: FleetEngine,
  pub models: ModelRegistry,
  pub settings: Settings,
}

impl AppState {
  pub fn new(engine: FleetEngine, models: ModelRegistry, settings: Settings) -> Self {
    Self {
      engine,
      models,
      settings,
    }
  }

  /// Load artifacts and the optional ledger seed named by `settings`.
  pub fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
    let artifacts = match &settings.model_artifacts_path {
      Some(path) => ModelArtifacts::from_path(path)
        .with_context(|| format!("loading model artifacts from {}", path.display()))?,
      None => ModelArtifacts::builtin().context("loading built-in model artifacts")?,
    };
    info!(
      version = %artifacts.version,
      demand_models = artifacts.demand.len(),
      anomaly_baselines = artifacts.anomaly.len(),
      "model artifacts loaded"
    );

    let engine = FleetEngine::with_defaults();
    if let Some(path) = &settings.ledger_seed_path {
      let file = File::open(path).with_context(|| format!("opening ledger seed {}", path.display()))?;
      let records = ledger::load_json_lines(BufReader::new(file))
        .with_context(|| format!("reading ledger seed {}", path.display()))?;
      let restored = engine.restore(records);
      info!(path = %path.display(), restored, assets = engine.ledger().equipment_ids().len(), "ledger seeded");
    }

    Ok(Self::new(engine, ModelRegistry::new(artifacts, ServingConfig::default()), settings))
  }

  pub fn today(&self) -> NaiveDate {
    self.settings.today()
  }
}
