//! OAI-PMH XSLT adapter.
//!
//! Sits between an OAI-PMH harvester and a DSpace repository.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  XSLT ADAPTER                    │
//!                        │                                                  │
//!   GET /oai/request     │  ┌────────┐   ┌─────────┐   ┌──────────┐         │
//!   ─────────────────────┼─▶│  http  │──▶│  query  │──▶│ upstream │─────────┼──▶ DSpace
//!                        │  │ server │   │ rewrite │   │  client  │         │    /server/oai/request
//!                        │  └────────┘   └─────────┘   └────┬─────┘         │
//!                        │                                  ▼               │
//!                        │                            ┌───────────┐         │
//!                        │                            │ validator │         │
//!                        │                            └─────┬─────┘         │
//!                        │              ┌──────────────┬────┴──────┐        │
//!                        │              ▼              ▼           ▼        │
//!   text/xml response    │      ┌─────────────┐  ┌──────────┐ ┌──────────┐  │
//!   ◀────────────────────┼──────│ stylesheet  │  │ envelope │ │ forward  │  │
//!                        │      │ + transform │  │  (error) │ │ non-200  │  │
//!                        │      └─────────────┘  └──────────┘ └──────────┘  │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use oai_xslt_adapter::config::load_config;
use oai_xslt_adapter::lifecycle::{signals, Shutdown};
use oai_xslt_adapter::observability::logging;
use oai_xslt_adapter::HttpServer;

#[derive(Parser)]
#[command(name = "oai-xslt-adapter")]
#[command(about = "OAI-PMH adapter that rewrites DSpace responses with XSLT", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_tracing(&config.observability);

    tracing::info!("oai-xslt-adapter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %format!("{}:{}{}", config.upstream.host, config.upstream.port, config.upstream.path),
        default_stylesheet = %config.stylesheets.default_file,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
