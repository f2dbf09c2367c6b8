//! Page router server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                     PAGE ROUTER                      │
//!   Client Request   │  ┌─────────┐   ┌────────────┐   ┌────────────────┐   │
//!   ─────────────────┼─▶│  http   │──▶│ deployment │──▶│    routing     │   │
//!                    │  │ server  │   │ (context   │   │ table lookup + │   │
//!                    │  └─────────┘   │   path)    │   │ slash redirect │   │
//!                    │       ▲        └────────────┘   └───────┬────────┘   │
//!   Client Response  │       │                                 ▼            │
//!   ◀────────────────┼───────┴──── 200 page │ 3xx Location │ 404 ◀── page   │
//!                    │                                        renderer      │
//!                    │  ┌────────────────────────────────────────────────┐  │
//!                    │  │ config (TOML + watcher) │ observability │ life- │  │
//!                    │  │ → redeploy via ArcSwap  │ logs, metrics │ cycle │  │
//!                    │  └────────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use page_router::config::load_config;
use page_router::config::watcher::ConfigWatcher;
use page_router::lifecycle::signals::spawn_signal_handler;
use page_router::observability::{logging, metrics};
use page_router::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "page-router")]
#[command(about = "Serve app pages from URI templates", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "page-router.toml")]
    config: PathBuf,

    /// Disable hot reload even if the config enables it.
    #[arg(long)]
    no_watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "page-router starting");

    tracing::info!(
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        apps = config.apps.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = if config.reload.watch && !args.no_watch {
        let interval = Duration::from_secs(config.reload.poll_interval_secs);
        let (watcher, updates) = ConfigWatcher::new(&args.config, interval);
        (Some(watcher.run()?), updates)
    } else {
        let (_, updates) = mpsc::unbounded_channel();
        (None, updates)
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
