//! SSE relay.
//!
//! Browsers cannot attach custom headers to an `EventSource`, so this service
//! opens the authenticated upstream stream for them and relays it.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                    SSE RELAY                      │
//!   Browser           │  ┌─────────┐   ┌───────────┐   ┌──────────────┐  │
//!   EventSource ──────┼─▶│  http   │──▶│  relay    │──▶│  upstream    │──┼──▶ Event
//!                     │  │ server  │   │  handler  │   │  client      │  │    router
//!                     │  └─────────┘   └─────┬─────┘   └──────┬───────┘  │
//!                     │                      ▼                │          │
//!   ◀─────────────────┼──── event-stream ◀── session ◀────────┘          │
//!                     │             (connected / data / ping / closed)   │
//!                     │                                                  │
//!                     │  config · security · observability · lifecycle   │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use sse_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use sse_relay::lifecycle::{signals, Shutdown};
use sse_relay::observability::{logging, metrics};
use sse_relay::HttpServer;

#[derive(Parser)]
#[command(name = "sse-relay", version)]
#[command(about = "Relays an authenticated upstream SSE stream to browsers", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind.
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on (default 3000).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

impl Cli {
    fn resolve_config(&self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };
        if let Some(host) = &self.host {
            config.listener.host = host.clone();
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(&config.observability);
    tracing::info!("sse-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        keepalive_secs = config.session.keepalive_secs,
        upstream_scheme = %config.upstream.scheme,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "SSE relay listening");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = signals::wait_for_signal() => shutdown.trigger(),
    }

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
