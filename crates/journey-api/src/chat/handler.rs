use std::sync::Arc;

use async_trait::async_trait;
use journey_persist::ConversationStore;
use journey_types::ServerEvent;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::coordinator::{StreamCoordinator, TurnCancelled};
use crate::ws::{ChannelHandler, ConnectionRegistry};

/// The `chat` channel: replays history on connect and runs one turn per message.
pub struct ChatHandler {
    coordinator: Arc<StreamCoordinator>,
    connections: Arc<ConnectionRegistry>,
    conversations: Arc<dyn ConversationStore>,
}

impl ChatHandler {
    pub fn new(
        coordinator: Arc<StreamCoordinator>,
        connections: Arc<ConnectionRegistry>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            coordinator,
            connections,
            conversations,
        }
    }
}

#[async_trait]
impl ChannelHandler for ChatHandler {
    async fn on_connect(&self, thread_id: &str, _user_id: &str) {
        match self.conversations.history(thread_id).await {
            Ok(history) if !history.is_empty() => {
                tracing::debug!(thread_id, messages = history.len(), "Replaying history");
                self.connections
                    .send(thread_id, &ServerEvent::previous_messages(history))
                    .await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(thread_id, error = %e, "Could not load history for replay"),
        }
    }

    async fn handle(
        &self,
        thread_id: &str,
        user_id: &str,
        payload: Value,
        cancel: &CancellationToken,
    ) -> Result<(), TurnCancelled> {
        let query = extract_query(&payload);
        if query.is_empty() {
            tracing::debug!(thread_id, "Ignoring message without query text");
            return Ok(());
        }
        self.coordinator
            .run_turn(thread_id, user_id, &query, cancel)
            .await
            .map(|_| ())
    }
}

/// Query text of an inbound payload: `query`, else `message`, else a bare
/// JSON string. Anything else is empty.
pub fn extract_query(payload: &Value) -> String {
    let text = match payload {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => ["query", "message"]
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty()),
        _ => None,
    };
    text.map(str::trim).unwrap_or_default().to_string()
}
