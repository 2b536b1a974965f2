use crate::node::NodeType;
use crate::state::AgentState;

/// Decides which node runs next.
pub trait Router: Send + Sync {
    fn next(&self, state: &AgentState, current: NodeType) -> NextNode;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextNode {
    Planner,
    Tools,
    End,
}

/// ReAct loop: planner, then tools while the planner keeps requesting them.
pub struct SimpleRouter;

impl Router for SimpleRouter {
    fn next(&self, state: &AgentState, current: NodeType) -> NextNode {
        match current {
            NodeType::Planner if state.has_pending_tool_calls() => NextNode::Tools,
            NodeType::Planner => NextNode::End,
            NodeType::Tools => NextNode::Planner,
        }
    }
}
