use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use journey_types::ChatMessage;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::hash::HashStore;
use crate::store::{ConversationStore, Session};

/// Process-local conversation store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryConversationStore {
    threads: RwLock<HashMap<String, Session>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create_session(&self, thread_id: &str) -> Result<Session> {
        if let Some(session) = self.threads.read().await.get(thread_id) {
            return Ok(session.clone());
        }

        let mut threads = self.threads.write().await;
        let session = threads.entry(thread_id.to_string()).or_insert_with(|| {
            tracing::debug!(thread_id, "Created thread");
            Session::new(thread_id)
        });
        Ok(session.clone())
    }

    async fn session(&self, thread_id: &str) -> Result<Option<Session>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn append(&self, thread_id: &str, message: ChatMessage) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads
            .entry(thread_id.to_string())
            .or_insert_with(|| Session::new(thread_id))
            .push(message);
        Ok(())
    }

    async fn history(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .map(|s| s.messages.clone())
            .unwrap_or_default())
    }

    async fn rename(&self, thread_id: &str, new_name: &str) -> Result<bool> {
        let mut threads = self.threads.write().await;
        match threads.get_mut(thread_id) {
            Some(session) => {
                session.thread_name = new_name.to_string();
                session.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Default)]
pub struct InMemoryHashStore {
    buckets: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl InMemoryHashStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    async fn hset(&self, bucket: &str, key: &str, value: String) -> Result<()> {
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn hget(&self, bucket: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(bucket)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn hgetall(&self, bucket: &str) -> Result<Vec<(String, String)>> {
        Ok(self
            .buckets
            .read()
            .await
            .get(bucket)
            .map(|entries| entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }
}
