mod appointments;
mod catalog;
mod customers;
mod registry;
pub mod schedule;
mod scratchpad;
mod summarize;

pub use appointments::{Appointment, AppointmentBook, BookAppointmentTool, CheckAvailabilityTool, SpecialistAvailabilityTool, Specialist};
pub use catalog::{Catalog, CatalogTool};
pub use customers::{Customer, OnboardCustomerTool};
pub use registry::ToolRegistry;
pub use scratchpad::{ClearConversationDataTool, GetConversationDataTool, Scratchpad, StoreConversationDataTool};
pub use summarize::SummarizeConversationTool;

use anyhow::Result;
use async_trait::async_trait;
use journey_llm::Tool;
use journey_types::ToolName;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Identity of the conversation a tool call belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContext {
    pub thread_id: String,
    pub user_id: String,
}

/// A tool callable by the planner through a fixed JSON contract.
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> ToolName;

    fn description(&self) -> &'static str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> Value;

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value>;

    fn definition(&self) -> Tool {
        Tool::function(self.name().as_str(), self.description(), self.parameters())
    }
}

/// Deserialize tool arguments, naming the tool on failure.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: ToolName, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| anyhow::anyhow!("invalid arguments for {}: {}", tool, e))
}
