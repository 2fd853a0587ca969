//! Fleet model serving: schema-validated inference over pre-trained artifacts.
//! Used by the HTTP API; the binary serves one request over stdin/stdout.

pub mod anomaly;
pub mod artifacts;
pub mod breakdown;
pub mod config;
pub mod encode;
pub mod error;
pub mod forecast;
pub mod price;
pub mod registry;
pub mod schema;
pub mod types;

pub use artifacts::ModelArtifacts;
pub use config::ServingConfig;
pub use error::ServingError;
pub use registry::ModelRegistry;
pub use schema::{FeatureValue, FeatureVector, Schema};
pub use types::{Endpoint, PredictionResult};
