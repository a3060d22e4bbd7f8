//! Live reload: file watching, debouncing and push clients.

mod clients;
mod debouncer;
mod manager;
mod watcher;
mod websocket;

pub use debouncer::Changed;
#[cfg(test)]
pub(crate) use clients::BroadcastSet;
pub(crate) use manager::LiveReloadManager;
#[cfg(test)]
pub(crate) use manager::RELOAD_MESSAGE;
pub use watcher::{ChangeWatcher, DEFAULT_DEBOUNCE};
pub(crate) use websocket::ws_handler;

/// Path of the push channel endpoint.
pub const EVENTS_PATH: &str = "/.watch_n_serve/events";
