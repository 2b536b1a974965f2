pub mod leads;
pub mod node;
pub mod nodes;
pub mod planner;
pub mod prompt;
pub mod router;
pub mod runner;
pub mod services;
pub mod state;
pub mod tools;

pub use leads::{LeadRecorder, CONVERSATIONS_BUCKET, LEADS_BUCKET, LEAD_KEY_FIELD};
pub use planner::PlannerAgent;
pub use prompt::PromptContext;
pub use runner::{AgentRequest, AgentRunner, LifecycleStream};
pub use services::{ConversationSummarizer, LlmConversationSummarizer, LlmTitleGenerator, TitleGenerator};
pub use tools::{AgentTool, ToolContext, ToolRegistry};
