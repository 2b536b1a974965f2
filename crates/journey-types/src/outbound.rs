use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::ChatMessage;

/// Truncated previews of a tool call, attached to tool `agent_event`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Every JSON message the server pushes over a chat connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Connection {
        status: String,
        thread_id: String,
    },

    PreviousMessages {
        message_list: Vec<ChatMessage>,
        timestamp: DateTime<Utc>,
    },

    Processing {
        message: String,
        timestamp: DateTime<Utc>,
    },

    MsgStreamStart {
        timestamp: DateTime<Utc>,
    },

    MsgStream {
        message: String,
        timestamp: DateTime<Utc>,
    },

    MsgStreamEnd {
        timestamp: DateTime<Utc>,
    },

    AgentEvent {
        event_type: String,
        node_name: String,
        display_name: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_info: Option<ToolInfo>,
        event_order: usize,
        timestamp: DateTime<Utc>,
    },

    StructuredResponse {
        data: Value,
        timestamp: DateTime<Utc>,
    },

    ThreadNameUpdated {
        thread_id: String,
        name: String,
        timestamp: DateTime<Utc>,
    },

    AgentResponse {
        content: String,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    Completed {
        thread_id: String,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ServerEvent {
    pub fn connected(thread_id: impl Into<String>) -> Self {
        Self::Connection {
            status: "connected".to_string(),
            thread_id: thread_id.into(),
        }
    }

    pub fn previous_messages(message_list: Vec<ChatMessage>) -> Self {
        Self::PreviousMessages {
            message_list,
            timestamp: Utc::now(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn stream_start() -> Self {
        Self::MsgStreamStart { timestamp: Utc::now() }
    }

    pub fn stream_chunk(message: impl Into<String>) -> Self {
        Self::MsgStream {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn stream_end() -> Self {
        Self::MsgStreamEnd { timestamp: Utc::now() }
    }

    pub fn structured_response(data: Value) -> Self {
        Self::StructuredResponse {
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn thread_name_updated(thread_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ThreadNameUpdated {
            thread_id: thread_id.into(),
            name: name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent_response(content: impl Into<String>, agent: impl Into<String>) -> Self {
        Self::AgentResponse {
            content: content.into(),
            agent: agent.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn completed(thread_id: impl Into<String>, agent: impl Into<String>) -> Self {
        Self::Completed {
            thread_id: thread_id.into(),
            agent: agent.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Wire name of the `type` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::PreviousMessages { .. } => "previous_messages",
            Self::Processing { .. } => "processing",
            Self::MsgStreamStart { .. } => "msg_stream_start",
            Self::MsgStream { .. } => "msg_stream",
            Self::MsgStreamEnd { .. } => "msg_stream_end",
            Self::AgentEvent { .. } => "agent_event",
            Self::StructuredResponse { .. } => "structured_response",
            Self::ThreadNameUpdated { .. } => "thread_name_updated",
            Self::AgentResponse { .. } => "agent_response",
            Self::Completed { .. } => "completed",
            Self::Error { .. } => "error",
        }
    }
}
