//! One live connection per thread, addressed by thread id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use journey_types::ServerEvent;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};

/// Close code sent to a connection displaced by a newer one for the same thread.
pub const CLOSE_REPLACED: u16 = 4000;
pub const CLOSE_NORMAL: u16 = 1000;

/// Frame handed to a connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

pub type OutboundSender = mpsc::Sender<Outbound>;
pub type ConnectionId = u64;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("connection for thread {0} closed before the handshake completed")]
    HandshakeFailed(String),

    #[error("failed to serialize outbound event: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct Connection {
    id: ConnectionId,
    user_id: String,
    sink: OutboundSender,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `sink` to `thread_id` and acknowledge with a `connection` event.
    ///
    /// A connection already bound to the thread is told to close with
    /// [`CLOSE_REPLACED`]. If the acknowledgment cannot be delivered the new
    /// binding is removed again and the error returned.
    pub async fn accept(
        &self,
        user_id: &str,
        thread_id: &str,
        sink: OutboundSender,
    ) -> Result<ConnectionId, RegistryError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let ack = serde_json::to_string(&ServerEvent::connected(thread_id))?;

        let previous = self.connections.write().await.insert(
            thread_id.to_string(),
            Connection {
                id,
                user_id: user_id.to_string(),
                sink: sink.clone(),
            },
        );

        if let Some(previous) = previous {
            tracing::info!(
                thread_id,
                old_user_id = %previous.user_id,
                new_user_id = user_id,
                "Replacing live connection"
            );
            let _ = previous
                .sink
                .send(Outbound::Close {
                    code: CLOSE_REPLACED,
                    reason: "replaced".to_string(),
                })
                .await;
        }

        if sink.send(Outbound::Text(ack)).await.is_err() {
            self.release(thread_id, id).await;
            tracing::warn!(thread_id, user_id, "Connection dropped during handshake");
            return Err(RegistryError::HandshakeFailed(thread_id.to_string()));
        }

        tracing::info!(thread_id, user_id, connection_id = id, "Connection accepted");
        Ok(id)
    }

    /// Deliver one event. `false` when no connection is bound or delivery
    /// failed; a failed binding is dropped.
    pub async fn send(&self, thread_id: &str, event: &ServerEvent) -> bool {
        let Some((id, sink)) = self
            .connections
            .read()
            .await
            .get(thread_id)
            .map(|c| (c.id, c.sink.clone()))
        else {
            tracing::debug!(thread_id, event_type = event.event_type(), "No connection for event");
            return false;
        };

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(thread_id, error = %e, "Failed to serialize event");
                return false;
            }
        };

        if sink.send(Outbound::Text(payload)).await.is_err() {
            tracing::warn!(thread_id, event_type = event.event_type(), "Send failed, dropping connection");
            self.release(thread_id, id).await;
            return false;
        }
        true
    }

    /// Close and forget the thread's connection. Safe to repeat.
    pub async fn disconnect(&self, thread_id: &str) {
        let removed = self.connections.write().await.remove(thread_id);
        if let Some(connection) = removed {
            let _ = connection
                .sink
                .send(Outbound::Close {
                    code: CLOSE_NORMAL,
                    reason: "closed".to_string(),
                })
                .await;
            tracing::info!(thread_id, connection_id = connection.id, "Connection closed");
        }
    }

    /// Remove the binding only if it still belongs to connection `id`.
    pub async fn release(&self, thread_id: &str, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        if connections.get(thread_id).is_some_and(|c| c.id == id) {
            connections.remove(thread_id);
            true
        } else {
            false
        }
    }

    /// Best-effort delivery to every connection. Returns how many succeeded.
    pub async fn broadcast(&self, event: &ServerEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize broadcast event");
                return 0;
            }
        };
        let targets: Vec<(String, OutboundSender)> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(thread_id, c)| (thread_id.clone(), c.sink.clone()))
            .collect();

        let mut delivered = 0;
        for (thread_id, sink) in targets {
            match sink.send(Outbound::Text(payload.clone())).await {
                Ok(()) => delivered += 1,
                Err(_) => tracing::warn!(%thread_id, "Broadcast delivery failed"),
            }
        }
        delivered
    }

    pub async fn is_connected(&self, thread_id: &str) -> bool {
        self.connections.read().await.contains_key(thread_id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (OutboundSender, mpsc::Receiver<Outbound>) {
        mpsc::channel(16)
    }

    fn text(frame: Outbound) -> serde_json::Value {
        match frame {
            Outbound::Text(raw) => serde_json::from_str(&raw).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_accept_sends_ack() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();

        registry.accept("u1", "t1", tx).await.unwrap();

        let ack = text(rx.recv().await.unwrap());
        assert_eq!(ack["type"], "connection");
        assert_eq!(ack["status"], "connected");
        assert_eq!(ack["thread_id"], "t1");
        assert!(registry.is_connected("t1").await);
    }

    #[tokio::test]
    async fn test_accept_fails_when_transport_is_gone() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = channel();
        drop(rx);

        let result = registry.accept("u1", "t1", tx).await;
        assert!(matches!(result, Err(RegistryError::HandshakeFailed(_))));
        assert!(!registry.is_connected("t1").await);
    }

    #[tokio::test]
    async fn test_new_connection_replaces_old_with_close_code() {
        let registry = ConnectionRegistry::new();
        let (old_tx, mut old_rx) = channel();
        let (new_tx, mut new_rx) = channel();

        let old_id = registry.accept("u1", "t1", old_tx).await.unwrap();
        let _ = old_rx.recv().await;
        let new_id = registry.accept("u1", "t1", new_tx).await.unwrap();

        assert_eq!(
            old_rx.recv().await.unwrap(),
            Outbound::Close {
                code: CLOSE_REPLACED,
                reason: "replaced".into()
            }
        );
        assert_eq!(text(new_rx.recv().await.unwrap())["type"], "connection");
        assert_eq!(registry.len().await, 1);

        // The displaced connection's cleanup must not unbind the new one.
        assert!(!registry.release("t1", old_id).await);
        assert!(registry.is_connected("t1").await);
        assert!(registry.release("t1", new_id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_send_to_missing_thread_is_false() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send("nope", &ServerEvent::processing("x")).await);
    }

    #[tokio::test]
    async fn test_send_failure_drops_binding() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        registry.accept("u1", "t1", tx).await.unwrap();
        let _ = rx.recv().await;
        drop(rx);

        assert!(!registry.send("t1", &ServerEvent::processing("x")).await);
        assert!(!registry.is_connected("t1").await);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        registry.accept("u1", "t1", tx).await.unwrap();
        let _ = rx.recv().await;

        registry.disconnect("t1").await;
        registry.disconnect("t1").await;

        assert!(matches!(rx.recv().await, Some(Outbound::Close { code: CLOSE_NORMAL, .. })));
        assert!(!registry.is_connected("t1").await);
    }

    #[tokio::test]
    async fn test_broadcast_skips_failed_connections() {
        let registry = ConnectionRegistry::new();
        let (a_tx, mut a_rx) = channel();
        let (b_tx, mut b_rx) = channel();
        let (c_tx, mut c_rx) = channel();
        registry.accept("u", "a", a_tx).await.unwrap();
        registry.accept("u", "b", b_tx).await.unwrap();
        registry.accept("u", "c", c_tx).await.unwrap();
        let _ = a_rx.recv().await;
        let _ = c_rx.recv().await;
        drop(b_rx.recv().await);
        drop(b_rx);

        let delivered = registry.broadcast(&ServerEvent::error("maintenance")).await;
        assert_eq!(delivered, 2);
        assert_eq!(text(a_rx.recv().await.unwrap())["type"], "error");
        assert_eq!(text(c_rx.recv().await.unwrap())["type"], "error");
    }
}
