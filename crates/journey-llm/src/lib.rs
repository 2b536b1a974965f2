pub mod client;
pub mod openai;
pub mod streaming;
pub mod types;

pub use client::{ChatClient, ChatOptions, ChatRequest, ChatResponse, EventStream, TokenUsage};
pub use openai::OpenAIClient;
pub use streaming::{parse_sse_stream, StreamEvent};
pub use types::{FunctionCall, Message, Tool, ToolCall, ToolChoice};
