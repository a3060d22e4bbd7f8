//! Serve command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use wns_server::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig, run_server};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for serving a directory.
#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Directory to serve.
    root: PathBuf,

    /// Host to bind to.
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Quiet period in milliseconds before a burst of changes reloads pages.
    #[arg(long, default_value_t = 200)]
    debounce_ms: u64,

    /// Disable live reload.
    #[arg(long)]
    no_watch: bool,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or the server fails
    /// to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.into_config()?;
        tracing::debug!(?config, "Resolved server configuration");

        output.field("Root", &config.root_dir.display().to_string());
        output.field(
            "Live reload",
            if config.live_reload_enabled {
                "enabled"
            } else {
                "disabled"
            },
        );
        output.address(&format!("http://{}:{}/", config.host, config.port));

        run_server(config).await?;

        Ok(())
    }

    /// Build the server configuration, validating the root directory.
    fn into_config(self) -> Result<ServerConfig, CliError> {
        if !self.root.is_dir() {
            return Err(CliError::Validation(format!(
                "Root directory not found: {}",
                self.root.display()
            )));
        }

        Ok(ServerConfig {
            host: self.host,
            port: self.port,
            root_dir: self.root,
            live_reload_enabled: !self.no_watch,
            debounce: Duration::from_millis(self.debounce_ms),
        })
    }
}
