use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use journey_agent::{ConversationSummarizer, LeadRecorder, CONVERSATIONS_BUCKET, LEADS_BUCKET, LEAD_KEY_FIELD};
use journey_persist::{ConversationStore, HashStore, InMemoryConversationStore, InMemoryHashStore};
use journey_types::ChatMessage;
use serde_json::{json, Map, Value};

struct FixedSummary(Option<Value>);

#[async_trait]
impl ConversationSummarizer for FixedSummary {
    async fn summarize(&self, _messages: &[ChatMessage]) -> Result<Option<Map<String, Value>>> {
        Ok(self.0.as_ref().and_then(|v| v.as_object().cloned()))
    }
}

fn lead_summary(summary: &str, key: &str) -> Value {
    let mut map = Map::new();
    map.insert("summary".into(), json!(summary));
    map.insert(LEAD_KEY_FIELD.into(), json!(key));
    Value::Object(map)
}

async fn seeded_store() -> Arc<InMemoryConversationStore> {
    let store = Arc::new(InMemoryConversationStore::new());
    store
        .append("t-1", ChatMessage::human("Book me with a cloud architect").with_user("u-1"))
        .await
        .unwrap();
    store
        .append("t-1", ChatMessage::assistant("Booked for Monday 11:00"))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_lead_is_keyed_by_summary_field() {
    let hashes = Arc::new(InMemoryHashStore::new());
    let summary = lead_summary("Booked a call", "Acme_2030-03-04 11:00_Dana");
    let recorder = LeadRecorder::new(seeded_store().await, Arc::new(FixedSummary(Some(summary))), hashes.clone());

    let key = recorder.record("t-1").await.unwrap();
    assert_eq!(key.as_deref(), Some("Acme_2030-03-04 11:00_Dana"));

    let stored: Value = serde_json::from_str(
        &hashes.hget(LEADS_BUCKET, "Acme_2030-03-04 11:00_Dana").await.unwrap().unwrap(),
    )
    .unwrap();
    assert_eq!(stored["thread_id"], "t-1");
    assert!(stored["conversation_time"].is_string());

    let snapshot = hashes.hget(CONVERSATIONS_BUCKET, "t-1").await.unwrap().unwrap();
    assert!(snapshot.contains("cloud architect"));

    let leads = recorder.leads().await.unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0]["summary"], "Booked a call");
}

#[tokio::test]
async fn test_lead_falls_back_to_thread_id_key() {
    let hashes = Arc::new(InMemoryHashStore::new());
    let summary = lead_summary("Asked about pricing", "  ");
    let recorder = LeadRecorder::new(seeded_store().await, Arc::new(FixedSummary(Some(summary))), hashes.clone());

    assert_eq!(recorder.record("t-1").await.unwrap().as_deref(), Some("t-1"));
    assert!(hashes.hget(LEADS_BUCKET, "t-1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_no_summary_or_empty_thread_records_nothing() {
    let hashes = Arc::new(InMemoryHashStore::new());
    let recorder = LeadRecorder::new(seeded_store().await, Arc::new(FixedSummary(None)), hashes.clone());

    assert_eq!(recorder.record("t-1").await.unwrap(), None);
    assert_eq!(recorder.record("unknown").await.unwrap(), None);
    assert!(hashes.hgetall(LEADS_BUCKET).await.unwrap().is_empty());
}
