//! WebSocket handler for live reload.
//!
//! Upgrades requests on the events path and forwards broadcast messages to
//! the socket until the client goes away.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;

use super::clients::{BroadcastSet, PushClient};

/// Handle WebSocket upgrade for live reload.
pub(crate) async fn ws_handler(ws: WebSocketUpgrade, clients: Arc<BroadcastSet>) -> Response {
    ws.on_failed_upgrade(|err| tracing::warn!(error = %err, "Push upgrade failed"))
        .on_upgrade(move |socket| handle_socket(socket, clients))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, clients: Arc<BroadcastSet>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let client = PushClient::new(tx);
    let id = client.id();

    clients.insert(client);
    tracing::info!(client = %id, connected = clients.len(), "Push client connected");

    loop {
        tokio::select! {
            // Forward broadcast messages to the client
            Some(message) = rx.recv() => {
                if let Err(err) = socket.send(Message::Text(message.into())).await {
                    tracing::debug!(client = %id, error = %err, "Push send failed");
                    break;
                }
            }
            // Client messages carry no meaning, only close matters
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    clients.remove(id);
    tracing::info!(client = %id, connected = clients.len(), "Push client disconnected");
}
