use async_trait::async_trait;
use chrono::{DateTime, Utc};
use journey_types::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Name every thread carries until it is auto-named.
pub const DEFAULT_THREAD_NAME: &str = "New Conversation";

/// Snapshot of one thread: metadata plus its ordered message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub thread_id: String,
    pub thread_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(thread_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id: thread_id.into(),
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            user_id: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_default_name(&self) -> bool {
        self.thread_name == DEFAULT_THREAD_NAME
    }

    /// First message the human sent in this thread.
    pub fn first_human_message(&self) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.is_human())
    }

    /// Append and stamp the thread owner from the first message that carries one.
    pub(crate) fn push(&mut self, message: ChatMessage) {
        if self.user_id.is_none() {
            self.user_id = message.user_id.clone();
        }
        self.updated_at = message.timestamp.max(self.updated_at);
        self.messages.push(message);
    }
}

/// Per-thread ordered message log with thread metadata.
///
/// `append` is the only way message content enters a thread; nothing is
/// edited or removed afterwards.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Return the thread, creating an empty one on first access.
    async fn get_or_create_session(&self, thread_id: &str) -> Result<Session>;

    /// The thread if it exists; never creates one.
    async fn session(&self, thread_id: &str) -> Result<Option<Session>>;

    /// Append to the thread's log, creating the thread if absent.
    async fn append(&self, thread_id: &str, message: ChatMessage) -> Result<()>;

    /// Ordered messages; empty for unknown threads.
    async fn history(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;

    /// Set the thread name. Returns `false` (and changes nothing) when the
    /// thread does not exist.
    async fn rename(&self, thread_id: &str, new_name: &str) -> Result<bool>;

    /// Short label for logs and health output.
    fn backend_name(&self) -> &'static str;
}
