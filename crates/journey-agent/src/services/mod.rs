//! One-shot LLM calls made outside the planner loop.

mod summary;
mod title;

pub use summary::{parse_summary, ConversationSummarizer, LlmConversationSummarizer};
pub use title::{clean_title, LlmTitleGenerator, TitleGenerator};

use journey_types::ChatMessage;

/// `Customer:` / `Assistant:` lines for prompt embedding; empty messages are skipped.
pub(crate) fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .filter(|m| m.has_content())
        .map(|m| {
            let speaker = if m.is_human() { "Customer" } else { "Assistant" };
            format!("{}: {}", speaker, m.text())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
