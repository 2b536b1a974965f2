use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use journey_llm::Tool;
use journey_types::ToolName;
use serde_json::Value;

use super::{
    AgentTool, AppointmentBook, BookAppointmentTool, Catalog, CatalogTool, CheckAvailabilityTool,
    ClearConversationDataTool, GetConversationDataTool, OnboardCustomerTool, Scratchpad,
    SpecialistAvailabilityTool, StoreConversationDataTool, SummarizeConversationTool, ToolContext,
};
use crate::leads::LeadRecorder;

/// Tools available to the planner, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<ToolName, Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every journey tool, backed by JSON files under `data_dir`.
    pub fn standard(data_dir: &Path, scratchpad: Arc<Scratchpad>, recorder: Arc<LeadRecorder>) -> Self {
        let book = Arc::new(AppointmentBook::new(
            data_dir.join("specialists.json"),
            data_dir.join("appointments.json"),
        ));

        let mut registry = Self::new();
        registry.register(CatalogTool::new(
            ToolName::CaseStudies,
            Catalog::new(data_dir.join("case_studies.json")),
        ));
        registry.register(CatalogTool::new(
            ToolName::Testimonials,
            Catalog::new(data_dir.join("testimonials.json")),
        ));
        registry.register(OnboardCustomerTool::new(data_dir.join("customer_profiles.json")));
        registry.register(SpecialistAvailabilityTool::new(book.clone()));
        registry.register(CheckAvailabilityTool::new(book.clone()));
        registry.register(BookAppointmentTool::new(book));
        registry.register(StoreConversationDataTool::new(scratchpad.clone()));
        registry.register(GetConversationDataTool::new(scratchpad.clone()));
        registry.register(ClearConversationDataTool::new(scratchpad));
        registry.register(SummarizeConversationTool::new(recorder));
        registry
    }

    pub fn register(&mut self, tool: impl AgentTool + 'static) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions for the model, in a stable order.
    pub fn definitions(&self) -> Vec<Tool> {
        ToolName::ALL
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    pub async fn execute(&self, name: &str, ctx: &ToolContext, args: Value) -> Result<Value> {
        let tool = name
            .parse::<ToolName>()
            .ok()
            .and_then(|tool_name| self.tools.get(&tool_name))
            .ok_or_else(|| anyhow::anyhow!("Tool '{}' not found", name))?;

        tracing::info!(tool = name, thread_id = %ctx.thread_id, "Executing tool");
        tool.call(ctx, args).await
    }
}
