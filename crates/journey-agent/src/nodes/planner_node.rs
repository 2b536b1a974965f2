use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use journey_llm::{ChatClient, ChatOptions, ChatRequest, EventStream, Message, StreamEvent, ToolCall, ToolChoice};
use journey_types::{assistant_output, LLMConfig, LifecycleEvent};
use serde_json::json;

use crate::node::{emit, EventSender, Node, NodeType};
use crate::state::AgentState;
use crate::tools::ToolRegistry;

/// Calls the model with the running transcript and forwards its deltas as
/// token events.
pub struct PlannerNode {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    llm_config: LLMConfig,
}

impl PlannerNode {
    pub fn new(client: Arc<dyn ChatClient>, tools: Arc<ToolRegistry>, llm_config: LLMConfig) -> Self {
        Self {
            client,
            tools,
            llm_config,
        }
    }

    async fn open_stream(&self, state: &AgentState) -> Result<EventStream> {
        let mut options = ChatOptions::new().tools(self.tools.definitions());
        if !self.tools.is_empty() {
            options = options.tool_choice(ToolChoice::auto());
        }
        if let Some(temp) = self.llm_config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = self.llm_config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        let request = ChatRequest::new(self.llm_config.model.clone(), state.messages.clone())
            .with_options(options);
        self.client.chat_stream(request).await
    }
}

/// Collects streamed tool-call fragments by index.
#[derive(Default)]
struct ToolCallBuffer {
    calls: BTreeMap<u32, (Option<String>, Option<String>, String)>,
}

impl ToolCallBuffer {
    fn push(&mut self, index: u32, id: Option<String>, name: Option<String>, arguments: Option<String>) {
        let entry = self.calls.entry(index).or_default();
        if let Some(id) = id {
            entry.0 = Some(id);
        }
        if let Some(name) = name {
            entry.1 = Some(name);
        }
        if let Some(args) = arguments {
            entry.2.push_str(&args);
        }
    }

    fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_values()
            .filter_map(|(id, name, arguments)| match (id, name) {
                (Some(id), Some(name)) => Some(ToolCall::new(id, name, arguments)),
                (_, name) => {
                    tracing::warn!(?name, "Dropping incomplete tool call from stream");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl Node for PlannerNode {
    async fn execute(&self, state: &mut AgentState, event_tx: &EventSender) -> Result<()> {
        let step = self.node_type().step_name();
        let step_run_id = uuid::Uuid::new_v4().to_string();
        emit(event_tx, LifecycleEvent::step_start(step, &step_run_id)).await?;

        let mut stream = self.open_stream(state).await?;
        let mut content = String::new();
        let mut tool_calls = ToolCallBuffer::default();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content: delta } => {
                    content.push_str(&delta);
                    emit(event_tx, LifecycleEvent::token(step, &step_run_id, delta)).await?;
                }
                StreamEvent::ToolCall {
                    index,
                    id,
                    name,
                    arguments,
                } => tool_calls.push(index, id, name, arguments),
                StreamEvent::Usage { usage } => {
                    tracing::debug!(
                        thread_id = %state.thread_id,
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "Planner token usage"
                    );
                }
                StreamEvent::Done { .. } => {}
            }
        }

        let tool_calls = tool_calls.finish();
        let message = if tool_calls.is_empty() {
            Message::ai(content.clone())
        } else {
            Message::ai_with_tools(Some(content.clone()), tool_calls)
        };
        state.add_message(message);

        emit(
            event_tx,
            LifecycleEvent::step_end(step, &step_run_id, Some(json!({ "messages": [assistant_output(&content)] }))),
        )
        .await
    }

    fn node_type(&self) -> NodeType {
        NodeType::Planner
    }
}
