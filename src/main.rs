//! RoboStage · Competition Backend
//!
//! - Axum HTTP + WebSocket API (scoring, rankings, robot path simulation)
//! - Static front end fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   ROBOSTAGE_CONFIG_PATH : path to TOML config (field, robot start, playback, mission asset)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use robostage_backend::routes::build_router;
use robostage_backend::state::AppState;
use robostage_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config, mission set and shared state.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "robostage_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(target: "robostage_backend", error = %e, "Failed to listen for shutdown signal");
      }
      info!(target: "robostage_backend", "Shutdown requested");
    })
    .await?;
  Ok(())
}
