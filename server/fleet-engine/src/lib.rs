//! Fleet Analytics Engine: ledger-to-state aggregation and windowed reporting.
//!
//! The ledger is the only mutable component. Asset status, history summaries
//! and reports are pure projections of its contents at read time.
//!
//! No DB, no network; pure computation + in-memory state.

pub mod config;
pub mod date;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod reports;
pub mod status;
pub mod types;

pub use config::Config;
pub use engine::FleetEngine;
pub use error::EngineError;
pub use ledger::Ledger;
pub use types::{AssetState, AssetStatus, CheckIn, NewRental, RentalEvent, UsageMetrics};
