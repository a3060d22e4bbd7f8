//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

use crate::inject::reload_script;
use crate::live_reload::LiveReloadManager;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Directory files are served from.
    pub(crate) root_dir: PathBuf,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
    /// Script injected into HTML pages.
    pub(crate) reload_script: String,
}

impl AppState {
    pub(crate) fn new(
        root_dir: PathBuf,
        host: &str,
        port: u16,
        live_reload: Option<LiveReloadManager>,
    ) -> Self {
        Self {
            root_dir,
            live_reload,
            reload_script: reload_script(host, port),
        }
    }

    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
