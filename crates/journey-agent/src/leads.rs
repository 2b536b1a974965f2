//! Lead capture: summarize a thread and file it in the leads hash.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use journey_persist::{ConversationStore, HashStore};
use serde_json::{Map, Value};

use crate::services::ConversationSummarizer;

pub const LEADS_BUCKET: &str = "leads_generated";
pub const CONVERSATIONS_BUCKET: &str = "conversations";
pub const LEAD_KEY_FIELD: &str = "customer_company_name_with_appointment_datetime_with_specialist_name";

pub struct LeadRecorder {
    conversations: Arc<dyn ConversationStore>,
    summarizer: Arc<dyn ConversationSummarizer>,
    hashes: Arc<dyn HashStore>,
}

impl LeadRecorder {
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        summarizer: Arc<dyn ConversationSummarizer>,
        hashes: Arc<dyn HashStore>,
    ) -> Self {
        Self {
            conversations,
            summarizer,
            hashes,
        }
    }

    /// Summarize the thread and store the lead. Returns the lead key, or
    /// `None` when there was nothing to summarize.
    pub async fn record(&self, thread_id: &str) -> Result<Option<String>> {
        let history = self.conversations.history(thread_id).await?;
        if history.is_empty() {
            return Ok(None);
        }

        self.hashes
            .hset(CONVERSATIONS_BUCKET, thread_id, serde_json::to_string(&history)?)
            .await?;

        let Some(mut summary) = self.summarizer.summarize(&history).await? else {
            tracing::warn!(thread_id, "No lead summary produced");
            return Ok(None);
        };

        let key = summary
            .get(LEAD_KEY_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .unwrap_or(thread_id)
            .to_string();
        summary.insert("thread_id".into(), Value::String(thread_id.to_string()));
        summary.insert("conversation_time".into(), Value::String(Utc::now().to_rfc3339()));

        self.hashes
            .hset(LEADS_BUCKET, &key, serde_json::to_string(&summary)?)
            .await?;
        tracing::info!(thread_id, lead_key = %key, "Lead recorded");
        Ok(Some(key))
    }

    /// Every stored lead, ordered by key. Entries that are not JSON objects are skipped.
    pub async fn leads(&self) -> Result<Vec<Map<String, Value>>> {
        let entries = self.hashes.hgetall(LEADS_BUCKET).await?;
        Ok(entries
            .into_iter()
            .filter_map(|(key, raw)| match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => {
                    tracing::warn!(lead_key = %key, "Skipping malformed lead entry");
                    None
                }
            })
            .collect())
    }
}
