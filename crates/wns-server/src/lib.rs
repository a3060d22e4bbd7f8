//! Static file server with live reload for watch-n-serve.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Files from a root directory, with `index.html` for directory paths
//! - WebSocket endpoint for live reload during development
//!
//! HTML pages served with live reload enabled get a small script injected
//! that connects to the WebSocket endpoint and reloads the page whenever a
//! message arrives.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use wns_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("public"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (wns-server)
//!                        │
//!                        ├─► Static files (root directory, script injection)
//!                        │
//!                        └─► WebSocket (/.watch_n_serve/events)
//!                                │
//!                                └─► BroadcastSet ◄── ChangeWatcher ◄── notify
//! ```

mod app;
mod error;
mod inject;
mod live_reload;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use state::AppState;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use live_reload::{Changed, ChangeWatcher, DEFAULT_DEBOUNCE, EVENTS_PATH};

/// Default host name.
pub const DEFAULT_HOST: &str = "localhost";

/// Default port.
pub const DEFAULT_PORT: u16 = 8888;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to, also used in the injected script.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve and watch.
    pub root_dir: PathBuf,
    /// Enable live reload.
    pub live_reload_enabled: bool,
    /// Quiet period before a burst of changes triggers a reload.
    pub debounce: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            root_dir: PathBuf::from("."),
            live_reload_enabled: true,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Run the server.
///
/// Serves until Ctrl-C is received.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the watcher cannot be started or the listener cannot
/// be bound.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let shutdown = CancellationToken::new();

    // Create live reload manager if enabled
    let live_reload = if config.live_reload_enabled {
        let watcher = ChangeWatcher::new(vec![config.root_dir.clone()], config.debounce)
            .with_cancellation(shutdown.clone());
        let mut manager = live_reload::LiveReloadManager::new(watcher);
        manager.start()?;
        Some(manager)
    } else {
        None
    };

    let state = Arc::new(AppState::new(
        config.root_dir.clone(),
        &config.host,
        config.port,
        live_reload,
    ));
    let app = app::create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C), then stop watching.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
    shutdown.cancel();
}
