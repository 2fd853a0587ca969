//! Request/response types for the fleet API.

use fleet_engine::AssetState;
use serde::{Deserialize, Serialize};

/// Query values arrive as raw strings so a bad number can be reported by name.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnsDueQuery {
  pub days_out: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnderutilizedQuery {
  pub threshold: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub term: String,
  pub status: Option<String>,
  pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  pub count: usize,
  pub assets: Vec<AssetState>,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
  pub locations: Vec<String>,
}
