use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use journey_llm::{ChatClient, ChatOptions, ChatRequest, Message};

const MAX_TITLE_WORDS: usize = 6;

/// Produces a short human-readable thread name from the first exchange.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate_title(&self, user_message: &str, assistant_message: &str) -> Result<String>;
}

pub struct LlmTitleGenerator {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl LlmTitleGenerator {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TitleGenerator for LlmTitleGenerator {
    async fn generate_title(&self, user_message: &str, assistant_message: &str) -> Result<String> {
        let prompt = format!(
            "Generate a concise title (max {} words) for the following conversation:\n\nUser: {}\nAssistant: {}\n\nTitle:",
            MAX_TITLE_WORDS, user_message, assistant_message
        );
        let request = ChatRequest::new(self.model.clone(), vec![Message::human(prompt)])
            .with_options(ChatOptions::new().temperature(0.3).max_tokens(20));

        let response = self.client.chat(request).await?;
        let raw = response
            .text()
            .ok_or_else(|| anyhow::anyhow!("title model returned no text"))?;
        clean_title(raw).ok_or_else(|| anyhow::anyhow!("title model returned an empty title"))
    }
}

/// First line, without quotes or a leading `Title:`, capped at six words.
pub fn clean_title(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|line| !line.is_empty())?;
    let line = line
        .strip_prefix("Title:")
        .or_else(|| line.strip_prefix("title:"))
        .unwrap_or(line);
    let line = line.trim().trim_matches(|c| c == '"' || c == '\'' || c == '*').trim();

    let title = line.split_whitespace().take(MAX_TITLE_WORDS).collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}
