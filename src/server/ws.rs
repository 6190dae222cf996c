//! Websocket endpoint: broadcast fan-out plus client refresh requests.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;

use super::AppState;
use crate::notifications::WsMessage;

/// `GET /ws`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut rx = state.broadcaster.subscribe();
    crate::debug_event!(
        "ws",
        "connected",
        "{} clients",
        state.broadcaster.subscriber_count()
    );

    loop {
        tokio::select! {
            message = rx.recv() => {
                match message {
                    Ok(text) => {
                        if socket.send(Message::Text(text.as_ref().into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!("[ws] client lagged by {n} messages");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&state, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        crate::debug_event!("ws", "receive error", "{e}");
                        break;
                    }
                }
            }
        }
    }

    crate::debug_event!("ws", "disconnected");
}

/// Act on one client frame. Only `refresh-index` does anything.
pub async fn handle_client_message(state: &AppState, text: &str) {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::RefreshIndex) => {
            refresh_index(state).await;
        }
        Ok(_) => {
            crate::debug_event!("ws", "ignored", "{text}");
        }
        Err(e) => {
            crate::debug_event!("ws", "invalid message", "{e}");
        }
    }
}

/// Rebuild the index off the async runtime and broadcast the result.
///
/// Returns `false` if the rebuild failed; the old index stays in place.
pub async fn refresh_index(state: &AppState) -> bool {
    let index = state.index.clone();
    match tokio::task::spawn_blocking(move || index.rebuild()).await {
        Ok(Ok(_)) => {
            crate::log_event!("ws", "refreshed", "{} terms", state.index.term_count());
            state
                .broadcaster
                .send(&WsMessage::IndexUpdated(state.index.snapshot()));
            true
        }
        Ok(Err(e)) => {
            tracing::error!("[ws] rebuild failed: {e}");
            false
        }
        Err(e) => {
            tracing::error!("[ws] rebuild task failed: {e}");
            false
        }
    }
}
