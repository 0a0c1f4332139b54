//! W3C Trace Context forwarding test server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Test harness                 ┌──────────────────────────────────────────┐
//!     ────────────────────────────▶│ http::server   POST /test                │
//!     traceparent / tracestate     │      │                                   │
//!                                  │      ▼                                   │
//!                                  │ context::TraceContext::from_headers      │
//!                                  │      │   ├─ traceparent (fixed grammar)  │
//!                                  │      │   └─ tracestate  (member list)    │
//!                                  │      ▼                                   │
//!                                  │ http::forward  new span id per item      │──────▶ next hop
//!                                  │      set_headers → POST arguments        │
//!                                  └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use tracecontext::config::{load_config, validation::validate_config, ConfigError, ServerConfig};
use tracecontext::lifecycle::Shutdown;
use tracecontext::observability::init_logging;
use tracecontext::HttpServer;

#[derive(Parser)]
#[command(name = "tracecontext")]
#[command(about = "Forwarding server for the W3C Trace Context test suite", long_about = None)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    }
    .with_port_override(std::env::var("PORT").ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    init_logging(&config.observability.log_level);

    tracing::info!("tracecontext v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown.trigger_on_ctrl_c().await;
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
