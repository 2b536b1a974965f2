pub mod planner_node;
pub mod tool_node;

pub use planner_node::PlannerNode;
pub use tool_node::ToolNode;
