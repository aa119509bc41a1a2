use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use lectern_core::ClientMessage;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::dispatch::ConnContext;
use crate::registry::ConnectionHandle;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (handle, mut rx) = ConnectionHandle::new(state.config.outbound_queue_capacity);
    let mut ctx = ConnContext::new(handle);
    info!(connection = %ctx.handle.id(), "new signaling connection");

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(frame) => state.router.handle_message(&mut ctx, frame),
                // A single bad frame must not cost the whole session.
                Err(e) => warn!(connection = %ctx.handle.id(), error = %e, "malformed frame dropped"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Runs for unclean closes too, before the task is torn down.
    state.router.handle_disconnect(&ctx);
    send_task.abort();
    debug!(connection = %ctx.handle.id(), "signaling connection closed");
}
