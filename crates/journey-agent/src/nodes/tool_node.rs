use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use journey_types::LifecycleEvent;
use serde_json::{json, Value};

use crate::node::{emit, EventSender, Node, NodeType};
use crate::state::AgentState;
use crate::tools::ToolRegistry;

/// Executes the tool calls requested by the last planner message.
///
/// A failing tool produces an error result for the model to read; it never
/// fails the run.
pub struct ToolNode {
    tools: Arc<ToolRegistry>,
}

impl ToolNode {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn execute(&self, state: &mut AgentState, event_tx: &EventSender) -> Result<()> {
        let tool_calls = state.pending_tool_calls();
        if tool_calls.is_empty() {
            return Ok(());
        }

        let step = self.node_type().step_name();
        let step_run_id = uuid::Uuid::new_v4().to_string();
        emit(event_tx, LifecycleEvent::step_start(step, &step_run_id)).await?;

        let ctx = state.tool_context();
        for call in tool_calls {
            let name = call.function.name.clone();
            let start = Instant::now();

            let output = match call.arguments_value() {
                Ok(args) => {
                    emit(event_tx, LifecycleEvent::tool_start(&name, &call.id, args.clone())).await?;
                    match self.tools.execute(&name, &ctx, args).await {
                        Ok(value) => value,
                        Err(e) => {
                            tracing::warn!(tool = %name, thread_id = %ctx.thread_id, error = %e, "Tool execution failed");
                            json!({ "error": format!("Tool execution failed: {}", e) })
                        }
                    }
                }
                Err(e) => {
                    emit(
                        event_tx,
                        LifecycleEvent::tool_start(&name, &call.id, Value::String(call.function.arguments.clone())),
                    )
                    .await?;
                    json!({ "error": format!("Invalid tool arguments: {}", e) })
                }
            };

            tracing::debug!(
                tool = %name,
                duration_ms = start.elapsed().as_millis() as u64,
                "Tool finished"
            );
            emit(event_tx, LifecycleEvent::tool_end(&name, &call.id, output.clone())).await?;

            let content = match &output {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            state.add_tool_result(call.id, content);
        }

        emit(event_tx, LifecycleEvent::step_end(step, &step_run_id, None)).await
    }

    fn node_type(&self) -> NodeType {
        NodeType::Tools
    }
}
