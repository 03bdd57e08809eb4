//! act-engine MCP server binary.
//!
//! Speaks line-delimited JSON-RPC on stdin/stdout. Logs go to stderr so
//! they never interleave with protocol output.
//!
//! Reads the same `ACT_*` environment variables as the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use act_engine::config::EngineConfig;
use act_engine::mcp::McpServer;
use act_engine::Engine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,act_engine=debug".into()),
        )
        .init();

    let config = EngineConfig::from_env().context("reading configuration")?;
    let engine = Engine::from_config(config).context("loading equation and dictionary data")?;
    let server = McpServer::new(Arc::new(engine));

    tracing::info!("act-engine MCP server ready on stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    server
        .run(stdin, tokio::io::stdout())
        .await
        .context("MCP server failed")?;
    Ok(())
}
