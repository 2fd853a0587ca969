//! Binary entrypoint for the fleet API.

use std::sync::Arc;
use tracing::{info, warn};

use fleet_api::{telemetry, AppState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let settings = Settings::from_env()?;
  telemetry::init(settings.log_json);

  let addr = settings.socket_addr()?;
  let state = Arc::new(AppState::bootstrap(settings)?);
  let app = fleet_api::router(state);

  info!(%addr, "fleet-api listening");
  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("fleet-api stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutdown signal received");
}
