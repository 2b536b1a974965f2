use chrono::{DateTime, Utc};
use journey_types::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::store::Session;

/// Message as embedded in a thread document. Ids and timestamps are stored
/// as strings so documents stay readable from the shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<MongoMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub bucket: String,
    pub key: String,
    pub value: String,
}

impl HashEntry {
    pub fn new(bucket: &str, key: &str, value: String) -> Self {
        Self {
            id: format!("{}:{}", bucket, key),
            bucket: bucket.to_string(),
            key: key.to_string(),
            value,
        }
    }
}

impl From<ChatMessage> for MongoMessage {
    fn from(msg: ChatMessage) -> Self {
        Self {
            id: msg.id.to_string(),
            role: msg.role,
            content: msg.content,
            timestamp: msg.timestamp,
            user_id: msg.user_id,
        }
    }
}

impl TryFrom<MongoMessage> for ChatMessage {
    type Error = PersistError;

    fn try_from(msg: MongoMessage) -> Result<Self> {
        let id = Uuid::parse_str(&msg.id)
            .map_err(|e| PersistError::Internal(format!("invalid message id {}: {}", msg.id, e)))?;
        Ok(Self {
            id,
            role: msg.role,
            content: msg.content,
            timestamp: msg.timestamp,
            user_id: msg.user_id,
        })
    }
}

impl TryFrom<MongoThread> for Session {
    type Error = PersistError;

    fn try_from(thread: MongoThread) -> Result<Self> {
        let messages = thread
            .messages
            .into_iter()
            .map(ChatMessage::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            thread_id: thread.id,
            thread_name: thread.thread_name,
            user_id: thread.user_id,
            messages,
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        })
    }
}
