//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::live_reload::{self, EVENTS_PATH};
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    // WebSocket for live reload
    if let Some(manager) = &state.live_reload {
        let clients = manager.clients();
        router = router.route(
            EVENTS_PATH,
            get(move |ws: WebSocketUpgrade| live_reload::ws_handler(ws, clients)),
        );
    }

    // Everything else is a file under the root
    router
        .route("/", get(static_files::serve_file))
        .route("/{*path}", get(static_files::serve_file))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
