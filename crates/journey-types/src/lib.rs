pub mod config;
pub mod events;
pub mod message;
pub mod outbound;
pub mod tools;

pub use config::{HistoryMode, LLMConfig, RunConfig};
pub use events::{assistant_output, last_assistant_content, EventData, EventKind, LifecycleEvent};
pub use message::{ChatMessage, MessageRole};
pub use outbound::{ServerEvent, ToolInfo};
pub use tools::{ToolName, UnknownTool};
