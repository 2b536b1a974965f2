use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use journey_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use journey_types::ChatMessage;
use serde_json::{Map, Value};

use super::render_transcript;
use crate::leads::LEAD_KEY_FIELD;

/// Turns a finished conversation into a structured lead record.
#[async_trait]
pub trait ConversationSummarizer: Send + Sync {
    /// `None` when the model could not produce a usable summary.
    async fn summarize(&self, messages: &[ChatMessage]) -> Result<Option<Map<String, Value>>>;
}

pub struct LlmConversationSummarizer {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl LlmConversationSummarizer {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn prompt(transcript: &str) -> String {
        format!(
            r#"You are reviewing a sales conversation between a customer and our assistant.
Return ONLY a JSON object with these fields:
{{
  "summary": "two or three sentence summary",
  "customer_info": {{"name": "", "company": "", "domain": "", "email": "", "topic": ""}},
  "specialist_info": {{"name": "", "designation": "", "expertise": ""}},
  "customer_sentiment": "positive | neutral | negative",
  "minutes_of_meeting": ["key point", "..."],
  "{key}": "<customer company name>_<appointment datetime>_<specialist name>"
}}
Use empty strings for anything the conversation does not mention.

Conversation:
{transcript}"#,
            key = LEAD_KEY_FIELD,
            transcript = transcript
        )
    }
}

#[async_trait]
impl ConversationSummarizer for LlmConversationSummarizer {
    async fn summarize(&self, messages: &[ChatMessage]) -> Result<Option<Map<String, Value>>> {
        let transcript = render_transcript(messages);
        if transcript.is_empty() {
            return Ok(None);
        }

        let request = ChatRequest::new(self.model.clone(), vec![Message::human(Self::prompt(&transcript))])
            .with_options(ChatOptions::new().temperature(0.0));
        let response = self.client.chat(request).await?;
        Ok(response.text().and_then(parse_summary))
    }
}

/// Parse the model's JSON object, tolerating a markdown code fence. Empty
/// output, non-objects and objects carrying an `error` key yield `None`.
pub fn parse_summary(raw: &str) -> Option<Map<String, Value>> {
    let mut body = raw.trim();
    if let Some(inner) = body.strip_prefix("```") {
        body = inner.strip_suffix("```").unwrap_or(inner).trim();
        body = body.strip_prefix("json").unwrap_or(body).trim();
    }
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) if !map.contains_key("error") => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Summary output was not valid JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_summary_strips_fence() {
        let raw = "```json\n{\"summary\": \"Booked a call\"}\n```";
        let map = parse_summary(raw).unwrap();
        assert_eq!(map["summary"], "Booked a call");
    }

    #[test]
    fn test_parse_summary_rejects_unusable_output() {
        assert!(parse_summary("").is_none());
        assert!(parse_summary("```\n```").is_none());
        assert!(parse_summary("not json").is_none());
        assert!(parse_summary("[1, 2]").is_none());
        assert!(parse_summary(r#"{"error": "no conversation"}"#).is_none());
    }
}
