use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use journey_llm::ChatClient;
use journey_types::{LLMConfig, LifecycleEvent};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::node::{emit, EventSender, Node, NodeType};
use crate::nodes::{PlannerNode, ToolNode};
use crate::prompt::PromptContext;
use crate::router::{NextNode, Router, SimpleRouter};
use crate::runner::{AgentRequest, AgentRunner, LifecycleStream};
use crate::state::AgentState;
use crate::tools::ToolRegistry;

/// Name of the whole run on the final chain-end event.
pub const CHAIN_NAME: &str = "journey_planner";

/// ReAct planner: alternates model calls and tool execution until the model
/// answers without requesting tools.
pub struct PlannerAgent {
    client: Arc<dyn ChatClient>,
    tools: Arc<ToolRegistry>,
    llm_config: LLMConfig,
    prompt: PromptContext,
}

impl PlannerAgent {
    pub fn new(
        client: Arc<dyn ChatClient>,
        tools: Arc<ToolRegistry>,
        llm_config: LLMConfig,
        prompt: PromptContext,
    ) -> Self {
        Self {
            client,
            tools,
            llm_config,
            prompt,
        }
    }

    /// Spawn execution in the background and return the event receiver.
    ///
    /// Dropping the receiver stops the run at its next emitted event.
    pub fn spawn_run(&self, request: AgentRequest) -> mpsc::Receiver<Result<LifecycleEvent>> {
        let (tx, rx) = mpsc::channel(256);

        let today = chrono::Local::now().date_naive();
        let state = AgentState::new(
            self.prompt.system_prompt(today),
            &request.messages,
            request.thread_id,
            request.user_id,
            request.config,
        );
        let planner = PlannerNode::new(self.client.clone(), self.tools.clone(), self.llm_config.clone());
        let tool_node = ToolNode::new(self.tools.clone());

        tokio::spawn(async move {
            let thread_id = state.thread_id.clone();
            if let Err(e) = Self::execute_loop(state, &planner, &tool_node, &tx).await {
                if tx.is_closed() {
                    tracing::debug!(%thread_id, "Planner run abandoned by consumer");
                } else {
                    tracing::error!(%thread_id, error = %e, "Planner run failed");
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        rx
    }

    async fn execute_loop(
        mut state: AgentState,
        planner: &PlannerNode,
        tool_node: &ToolNode,
        event_tx: &EventSender,
    ) -> Result<()> {
        let start = Instant::now();
        let router = SimpleRouter;
        let mut current = NodeType::Planner;
        let mut steps = 0usize;

        loop {
            if steps >= state.config.recursion_limit {
                anyhow::bail!(
                    "Recursion limit of {} reached without a final answer",
                    state.config.recursion_limit
                );
            }
            steps += 1;

            match current {
                NodeType::Planner => planner.execute(&mut state, event_tx).await?,
                NodeType::Tools => tool_node.execute(&mut state, event_tx).await?,
            }

            current = match router.next(&state, current) {
                NextNode::Planner => NodeType::Planner,
                NextNode::Tools => NodeType::Tools,
                NextNode::End => break,
            };
        }

        tracing::info!(
            thread_id = %state.thread_id,
            run_id = %state.run_id,
            steps,
            duration_ms = start.elapsed().as_millis() as u64,
            "Planner run finished"
        );

        emit(
            event_tx,
            LifecycleEvent::chain_end(CHAIN_NAME, &state.run_id, state.transcript()),
        )
        .await
    }
}

#[async_trait]
impl AgentRunner for PlannerAgent {
    async fn stream_events(&self, request: AgentRequest) -> Result<LifecycleStream> {
        Ok(Box::pin(ReceiverStream::new(self.spawn_run(request))))
    }
}
