use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use journey_types::ToolName;
use serde_json::{json, Value};

use super::{AgentTool, ToolContext};
use crate::leads::LeadRecorder;

/// Lets the planner file the current conversation as a lead on request.
pub struct SummarizeConversationTool {
    recorder: Arc<LeadRecorder>,
}

impl SummarizeConversationTool {
    pub fn new(recorder: Arc<LeadRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl AgentTool for SummarizeConversationTool {
    fn name(&self) -> ToolName {
        ToolName::SummarizeConversation
    }

    fn description(&self) -> &'static str {
        "Summarize this conversation and save it for the sales team."
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &ToolContext, _args: Value) -> Result<Value> {
        match self.recorder.record(&ctx.thread_id).await? {
            Some(lead_key) => Ok(json!({ "status": "saved", "lead_key": lead_key })),
            None => Ok(json!({ "status": "skipped", "message": "Nothing to summarize yet" })),
        }
    }
}
