use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use journey_types::{ChatMessage, LifecycleEvent, RunConfig};

pub type LifecycleStream = Pin<Box<dyn Stream<Item = Result<LifecycleEvent>> + Send>>;

/// Input of one agent execution.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub messages: Vec<ChatMessage>,
    pub thread_id: String,
    pub user_id: String,
    pub config: RunConfig,
}

impl AgentRequest {
    pub fn new(
        messages: Vec<ChatMessage>,
        thread_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            thread_id: thread_id.into(),
            user_id: user_id.into(),
            config: RunConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }
}

/// Something that executes an agent and reports its progress as lifecycle
/// events. An `Err` item ends the run; dropping the stream abandons it.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn stream_events(&self, request: AgentRequest) -> Result<LifecycleStream>;

    /// Name reported as `agent` on outbound responses.
    fn agent_name(&self) -> &str {
        "planner"
    }
}
