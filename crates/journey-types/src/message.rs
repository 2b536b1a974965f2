use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Assistant,
}

/// One entry of a thread's message log. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    /// Assistant content stays `None` until the turn resolves it
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            user_id: None,
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Human, Some(content.into()))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, Some(content.into()))
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn is_human(&self) -> bool {
        self.role == MessageRole::Human
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Content or the empty string.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    pub fn has_content(&self) -> bool {
        !self.text().trim().is_empty()
    }
}

impl From<&ChatMessage> for journey_llm::Message {
    fn from(message: &ChatMessage) -> Self {
        match message.role {
            MessageRole::Human => journey_llm::Message::human(message.text()),
            MessageRole::Assistant => journey_llm::Message::ai(message.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::human("hello").with_user("u-1");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "human");
        assert_eq!(json["user_id"], "u-1");
    }

    #[test]
    fn test_pending_assistant_message_has_no_text() {
        let msg = ChatMessage::new(MessageRole::Assistant, None);
        assert_eq!(msg.text(), "");
        assert!(!msg.has_content());
    }

    #[test]
    fn test_conversion_to_llm_message() {
        let llm: journey_llm::Message = (&ChatMessage::assistant("Hi")).into();
        assert_eq!(llm.role(), "assistant");
        assert_eq!(llm.text(), Some("Hi"));
    }
}
