//! WebSocket session: writer task, turn worker, reader loop.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use journey_types::ServerEvent;
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use super::{ChannelHandler, Outbound};
use crate::state::AppState;

const OUTBOUND_BUFFER: usize = 256;
pub const TURN_QUEUE: usize = 16;
pub const QUEUE_FULL_MESSAGE: &str = "Too many messages are waiting; please wait for the current reply.";

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path((handler, user_id, thread_id)): Path<(String, String, String)>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, handler, user_id, thread_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, handler_name: String, user_id: String, thread_id: String) {
    let (mut sink, mut stream) = socket.split();

    let handler = match state.handlers.resolve(&handler_name) {
        Ok(handler) => handler,
        Err(e) => {
            tracing::warn!(handler = %handler_name, %thread_id, "Unknown WebSocket handler");
            let _ = sink.send(Message::Text(e.to_string())).await;
            let _ = sink
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "unknown handler".into(),
                })))
                .await;
            return;
        }
    };

    let (out_tx, out_rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);
    let writer = tokio::spawn(write_loop(sink, out_rx));

    let connection_id = match state.connections.accept(&user_id, &thread_id, out_tx.clone()).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(%thread_id, error = %e, "Connection rejected");
            drop(out_tx);
            let _ = writer.await;
            return;
        }
    };
    handler.on_connect(&thread_id, &user_id).await;

    let cancel = CancellationToken::new();
    let (turn_tx, turn_rx) = mpsc::channel::<Value>(TURN_QUEUE);
    let worker = tokio::spawn(turn_worker(
        handler,
        thread_id.clone(),
        user_id.clone(),
        turn_rx,
        cancel.clone(),
    ));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                // Never block the reader on the queue, or a disconnect goes unseen.
                Ok(payload) => match turn_tx.try_send(payload) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(%thread_id, "Turn queue full, dropping message");
                        state
                            .connections
                            .send(&thread_id, &ServerEvent::error(QUEUE_FULL_MESSAGE))
                            .await;
                    }
                    Err(TrySendError::Closed(_)) => break,
                },
                Err(e) => tracing::warn!(%thread_id, error = %e, "Ignoring non-JSON frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(%thread_id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    tracing::info!(%thread_id, %user_id, "Client disconnected");
    cancel.cancel();
    drop(turn_tx);
    if let Err(e) = worker.await {
        tracing::error!(%thread_id, error = %e, "Turn worker panicked");
    }
    state.connections.release(&thread_id, connection_id).await;
    drop(out_tx);
    let _ = writer.await;
}

/// Runs queued turns one at a time until the queue closes or a turn is cancelled.
async fn turn_worker(
    handler: Arc<dyn ChannelHandler>,
    thread_id: String,
    user_id: String,
    mut payloads: mpsc::Receiver<Value>,
    cancel: CancellationToken,
) {
    while let Some(payload) = payloads.recv().await {
        if cancel.is_cancelled() {
            break;
        }
        if handler.handle(&thread_id, &user_id, payload, &cancel).await.is_err() {
            break;
        }
    }
}

async fn write_loop(mut sink: SplitSink<WebSocket, Message>, mut frames: mpsc::Receiver<Outbound>) {
    while let Some(frame) = frames.recv().await {
        let (message, closing) = match frame {
            Outbound::Text(text) => (Message::Text(text), false),
            Outbound::Close { code, reason } => (
                Message::Close(Some(CloseFrame {
                    code,
                    reason: reason.into(),
                })),
                true,
            ),
        };
        if sink.send(message).await.is_err() || closing {
            break;
        }
    }
    let _ = sink.close().await;
}
