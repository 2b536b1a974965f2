use anyhow::Result;
use async_trait::async_trait;
use journey_types::LifecycleEvent;
use tokio::sync::mpsc;

use crate::state::AgentState;

pub type EventSender = mpsc::Sender<Result<LifecycleEvent>>;

/// A single step of the planner graph.
#[async_trait]
pub trait Node: Send + Sync {
    /// Run the step, mutating state and reporting progress through `event_tx`.
    async fn execute(&self, state: &mut AgentState, event_tx: &EventSender) -> Result<()>;

    fn node_type(&self) -> NodeType;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Planner,
    Tools,
}

impl NodeType {
    /// Step name used on lifecycle events.
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Tools => "tools",
        }
    }
}

/// Send one event; a closed channel means the consumer went away.
pub async fn emit(event_tx: &EventSender, event: LifecycleEvent) -> Result<()> {
    event_tx
        .send(Ok(event))
        .await
        .map_err(|_| anyhow::anyhow!("lifecycle event consumer dropped"))
}
