use journey_llm::{Message, ToolCall};
use journey_types::{ChatMessage, RunConfig};

use crate::tools::ToolContext;

/// Mutable state of one planner run.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub run_id: String,
    pub thread_id: String,
    pub user_id: String,
    pub messages: Vec<Message>,
    pub config: RunConfig,
}

impl AgentState {
    pub fn new(
        system_prompt: String,
        history: &[ChatMessage],
        thread_id: String,
        user_id: String,
        config: RunConfig,
    ) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(history.iter().filter(|m| m.has_content()).map(Message::from));

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            thread_id,
            user_id,
            messages,
            config,
        }
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        !self.pending_tool_calls().is_empty()
    }

    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        match self.messages.last() {
            Some(Message::AI {
                tool_calls: Some(calls),
                ..
            }) => calls.clone(),
            _ => Vec::new(),
        }
    }

    pub fn add_tool_result(&mut self, tool_call_id: String, result: String) {
        self.messages.push(Message::tool_result(tool_call_id, result));
    }

    pub fn tool_context(&self) -> ToolContext {
        ToolContext {
            thread_id: self.thread_id.clone(),
            user_id: self.user_id.clone(),
        }
    }

    /// Conversation without the system prompt, as emitted on chain end.
    pub fn transcript(&self) -> serde_json::Value {
        let visible: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| !matches!(m, Message::System { .. }))
            .collect();
        serde_json::json!({ "messages": visible })
    }
}
