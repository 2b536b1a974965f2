use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Marker prefix on tags of events that belong to a tool invocation.
pub const TOOL_TAG_PREFIX: &str = "tool:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StepStart,
    StepEnd,
    ToolStart,
    ToolEnd,
    TokenChunk,
    ChainEnd,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepStart => "step_start",
            Self::StepEnd => "step_end",
            Self::ToolStart => "tool_start",
            Self::ToolEnd => "tool_end",
            Self::TokenChunk => "token_chunk",
            Self::ChainEnd => "chain_end",
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Self::ToolStart | Self::ToolEnd)
    }
}

/// Kind-specific payload. Only the field matching the kind is populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// One notification from a running agent: a step or tool starting or
/// ending, a token fragment, or the end of the whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub kind: EventKind,
    #[serde(default)]
    pub name: Option<String>,
    pub run_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub data: EventData,
}

impl LifecycleEvent {
    pub fn new(kind: EventKind, name: impl Into<String>, run_id: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind,
            name: (!name.is_empty()).then_some(name),
            run_id: run_id.into(),
            tags: Vec::new(),
            data: EventData::default(),
        }
    }

    pub fn step_start(name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self::new(EventKind::StepStart, name, run_id)
    }

    pub fn step_end(name: impl Into<String>, run_id: impl Into<String>, output: Option<Value>) -> Self {
        let mut event = Self::new(EventKind::StepEnd, name, run_id);
        event.data.output = output;
        event
    }

    pub fn tool_start(name: impl Into<String>, run_id: impl Into<String>, input: Value) -> Self {
        let mut event = Self::new(EventKind::ToolStart, name, run_id).tagged_as_tool();
        event.data.input = Some(input);
        event
    }

    pub fn tool_end(name: impl Into<String>, run_id: impl Into<String>, output: Value) -> Self {
        let mut event = Self::new(EventKind::ToolEnd, name, run_id).tagged_as_tool();
        event.data.output = Some(output);
        event
    }

    pub fn token(name: impl Into<String>, run_id: impl Into<String>, chunk: impl Into<String>) -> Self {
        let mut event = Self::new(EventKind::TokenChunk, name, run_id);
        event.data.chunk = Some(chunk.into());
        event
    }

    pub fn chain_end(name: impl Into<String>, run_id: impl Into<String>, output: Value) -> Self {
        let mut event = Self::new(EventKind::ChainEnd, name, run_id);
        event.data.output = Some(output);
        event
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    fn tagged_as_tool(self) -> Self {
        let tag = format!("{}{}", TOOL_TAG_PREFIX, self.name());
        self.with_tag(tag)
    }

    /// Step or tool name, empty when the emitter did not supply one.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// True for tool-start/tool-end, and for any event tagged as part of a tool call.
    pub fn is_tool_event(&self) -> bool {
        self.kind.is_tool() || self.tags.iter().any(|t| t.starts_with(TOOL_TAG_PREFIX))
    }

    /// `kind:name:run_id`, the identity used to drop repeats within a turn.
    pub fn dedup_key(&self) -> String {
        format!("{}:{}:{}", self.kind.as_str(), self.name(), self.run_id)
    }

    /// Non-empty token fragment, if this is a token event.
    pub fn token_chunk(&self) -> Option<&str> {
        match self.kind {
            EventKind::TokenChunk => self.data.chunk.as_deref().filter(|c| !c.is_empty()),
            _ => None,
        }
    }

    /// Message list carried by an end-of-step or end-of-chain output.
    pub fn output_messages(&self) -> Option<&Vec<Value>> {
        if !matches!(self.kind, EventKind::StepEnd | EventKind::ChainEnd) {
            return None;
        }
        self.data.output.as_ref()?.get("messages")?.as_array()
    }

    /// Non-text final payload carried by an end-of-step or end-of-chain output.
    pub fn structured_output(&self) -> Option<&Value> {
        if !matches!(self.kind, EventKind::StepEnd | EventKind::ChainEnd) {
            return None;
        }
        self.data
            .output
            .as_ref()?
            .get("structured_response")
            .filter(|v| !v.is_null())
    }
}

/// Serialized form of an assistant entry inside an output message list.
pub fn assistant_output(content: &str) -> Value {
    json!({ "role": "assistant", "content": content })
}

/// Content of the last assistant-authored entry with non-empty text.
pub fn last_assistant_content(messages: &[Value]) -> Option<&str> {
    messages.iter().rev().find_map(|m| {
        let role = m.get("role").and_then(Value::as_str)?;
        if role != "assistant" && role != "ai" {
            return None;
        }
        m.get("content")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
    })
}
