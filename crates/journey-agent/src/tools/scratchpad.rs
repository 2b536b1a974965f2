use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use journey_types::ToolName;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use super::{parse_args, AgentTool, ToolContext};

/// Per-thread key/value notes the planner keeps between turns.
#[derive(Default)]
pub struct Scratchpad {
    threads: RwLock<HashMap<String, Map<String, Value>>>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn store(&self, thread_id: &str, key: String, value: Value) {
        self.threads
            .write()
            .await
            .entry(thread_id.to_string())
            .or_default()
            .insert(key, value);
    }

    pub async fn get(&self, thread_id: &str, key: &str) -> Option<Value> {
        self.threads.read().await.get(thread_id)?.get(key).cloned()
    }

    pub async fn all(&self, thread_id: &str) -> Map<String, Value> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes one key, or the whole thread when `key` is `None`. Returns
    /// whether anything was removed.
    pub async fn clear(&self, thread_id: &str, key: Option<&str>) -> bool {
        let mut threads = self.threads.write().await;
        match key {
            Some(key) => threads
                .get_mut(thread_id)
                .and_then(|data| data.remove(key))
                .is_some(),
            None => threads.remove(thread_id).is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StoreArgs {
    key: String,
    value: Value,
}

#[derive(Debug, Default, Deserialize)]
struct KeyArgs {
    #[serde(default)]
    key: Option<String>,
}

fn optional_key_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "key": { "type": "string" } }
    })
}

pub struct StoreConversationDataTool {
    pad: Arc<Scratchpad>,
}

impl StoreConversationDataTool {
    pub fn new(pad: Arc<Scratchpad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl AgentTool for StoreConversationDataTool {
    fn name(&self) -> ToolName {
        ToolName::StoreConversationData
    }

    fn description(&self) -> &'static str {
        "Remember a value for this conversation (customer details, chosen slot, preferences)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "value": { "description": "Any JSON value" }
            },
            "required": ["key", "value"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: StoreArgs = parse_args(self.name(), args)?;
        let key = args.key.clone();
        self.pad.store(&ctx.thread_id, args.key, args.value).await;
        Ok(json!({ "status": "stored", "key": key }))
    }
}

pub struct GetConversationDataTool {
    pad: Arc<Scratchpad>,
}

impl GetConversationDataTool {
    pub fn new(pad: Arc<Scratchpad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl AgentTool for GetConversationDataTool {
    fn name(&self) -> ToolName {
        ToolName::GetConversationData
    }

    fn description(&self) -> &'static str {
        "Read a remembered value for this conversation, or everything when no key is given."
    }

    fn parameters(&self) -> Value {
        optional_key_schema()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: KeyArgs = parse_args(self.name(), args)?;
        match args.key {
            Some(key) => match self.pad.get(&ctx.thread_id, &key).await {
                Some(value) => Ok(json!({ "key": key, "value": value })),
                None => Ok(json!({ "key": key, "value": null, "message": "Nothing stored under this key" })),
            },
            None => Ok(json!({ "data": self.pad.all(&ctx.thread_id).await })),
        }
    }
}

pub struct ClearConversationDataTool {
    pad: Arc<Scratchpad>,
}

impl ClearConversationDataTool {
    pub fn new(pad: Arc<Scratchpad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl AgentTool for ClearConversationDataTool {
    fn name(&self) -> ToolName {
        ToolName::ClearConversationData
    }

    fn description(&self) -> &'static str {
        "Forget one remembered value, or all of them when no key is given."
    }

    fn parameters(&self) -> Value {
        optional_key_schema()
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: KeyArgs = parse_args(self.name(), args)?;
        let removed = self.pad.clear(&ctx.thread_id, args.key.as_deref()).await;
        Ok(json!({ "status": if removed { "cleared" } else { "nothing_to_clear" } }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(thread: &str) -> ToolContext {
        ToolContext {
            thread_id: thread.into(),
            user_id: "u".into(),
        }
    }

    #[tokio::test]
    async fn test_data_is_scoped_per_thread() {
        let pad = Arc::new(Scratchpad::new());
        let store = StoreConversationDataTool::new(pad.clone());
        let get = GetConversationDataTool::new(pad.clone());

        store
            .call(&ctx("a"), json!({"key": "company", "value": "Acme"}))
            .await
            .unwrap();

        let hit = get.call(&ctx("a"), json!({"key": "company"})).await.unwrap();
        assert_eq!(hit["value"], "Acme");

        let miss = get.call(&ctx("b"), json!({"key": "company"})).await.unwrap();
        assert!(miss["value"].is_null());
    }

    #[tokio::test]
    async fn test_clear_key_then_thread() {
        let pad = Arc::new(Scratchpad::new());
        pad.store("a", "x".into(), json!(1)).await;
        pad.store("a", "y".into(), json!(2)).await;
        let clear = ClearConversationDataTool::new(pad.clone());

        let out = clear.call(&ctx("a"), json!({"key": "x"})).await.unwrap();
        assert_eq!(out["status"], "cleared");
        assert_eq!(pad.all("a").await.len(), 1);

        clear.call(&ctx("a"), json!({})).await.unwrap();
        let out = clear.call(&ctx("a"), json!({})).await.unwrap();
        assert_eq!(out["status"], "nothing_to_clear");
    }
}
