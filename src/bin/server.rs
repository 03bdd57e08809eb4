//! act-engine HTTP server binary.
//!
//! Serves the ACT operations and server-held conversations over HTTP.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `ACT_DATA_DIR` — extra `dictionaries/` and `equations/` YAML (optional)
//! - `ACT_DEFAULT_DICTIONARY` — dictionary used when a request names none (default: us_2015)
//! - `ACT_LOOKUP_TIMEOUT_MS`, `ACT_LOOKUP_RETRIES` — dictionary call budget
//! - `RUST_LOG` — Tracing filter (default: "info,act_engine=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use act_engine::config::EngineConfig;
use act_engine::server::{app_router, AppState};
use act_engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,act_engine=debug".into()),
        )
        .init();

    let config = EngineConfig::from_env().context("reading configuration")?;
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let engine = Engine::from_config(config).context("loading equation and dictionary data")?;
    let state = AppState::new(engine);
    let app = app_router(state);

    tracing::info!("act-engine server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              — liveness probe");
    tracing::info!("  GET  /tools               — operation catalogue");
    tracing::info!("  POST /tools/:name         — call an operation");
    tracing::info!("  POST /conversations       — start a conversation");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
