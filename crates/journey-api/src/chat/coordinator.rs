//! Drives one agent turn and fans its lifecycle events out to the client.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use journey_agent::{AgentRequest, AgentRunner, TitleGenerator};
use journey_persist::{ConversationStore, DEFAULT_THREAD_NAME};
use journey_types::{last_assistant_content, ChatMessage, EventKind, HistoryMode, LifecycleEvent, RunConfig, ServerEvent};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::leads::LeadSummaryTrigger;
use super::turn::{TurnPhase, TurnState};
use crate::ws::ConnectionRegistry;

pub const ERROR_FALLBACK: &str =
    "I apologize, but I encountered an error while processing your request. How else can I help you?";
pub const EMPTY_FALLBACK: &str = "I'm sorry, I wasn't able to generate a response. How else can I help you?";

/// The turn stopped because its connection went away. Nothing after the
/// cancellation point was sent or persisted.
#[derive(Debug, Error)]
#[error("turn cancelled")]
pub struct TurnCancelled;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    Errored,
}

enum TurnFailure {
    Cancelled,
    Failed(anyhow::Error),
}

impl From<anyhow::Error> for TurnFailure {
    fn from(e: anyhow::Error) -> Self {
        Self::Failed(e)
    }
}

impl From<journey_persist::PersistError> for TurnFailure {
    fn from(e: journey_persist::PersistError) -> Self {
        Self::Failed(e.into())
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub chatbot_name: String,
    pub history_mode: HistoryMode,
    pub recursion_limit: usize,
}

pub struct StreamCoordinator {
    connections: Arc<ConnectionRegistry>,
    conversations: Arc<dyn ConversationStore>,
    agent: Arc<dyn AgentRunner>,
    titles: Arc<dyn TitleGenerator>,
    leads: LeadSummaryTrigger,
    settings: CoordinatorSettings,
}

impl StreamCoordinator {
    pub fn new(
        connections: Arc<ConnectionRegistry>,
        conversations: Arc<dyn ConversationStore>,
        agent: Arc<dyn AgentRunner>,
        titles: Arc<dyn TitleGenerator>,
        leads: LeadSummaryTrigger,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            connections,
            conversations,
            agent,
            titles,
            leads,
            settings,
        }
    }

    /// Run one turn for `query`.
    ///
    /// Every turn that is not cancelled ends with exactly one `completed`
    /// event. A cancelled turn gets a best-effort `msg_stream_end` and no
    /// `completed`.
    pub async fn run_turn(
        &self,
        thread_id: &str,
        user_id: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, TurnCancelled> {
        let started = Instant::now();
        let mut turn = TurnState::new();
        tracing::info!(thread_id, user_id, query_len = query.len(), "Turn started");

        let outcome = match self.drive(&mut turn, thread_id, user_id, query, cancel).await {
            Ok(()) => {
                turn.set_phase(TurnPhase::Completed);
                TurnOutcome::Completed
            }
            Err(TurnFailure::Cancelled) => {
                turn.set_phase(TurnPhase::Cancelled);
                if turn.end_stream() {
                    let _ = self.send(thread_id, &ServerEvent::stream_end()).await;
                }
                tracing::info!(
                    thread_id,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Turn cancelled"
                );
                return Err(TurnCancelled);
            }
            Err(TurnFailure::Failed(e)) => {
                self.recover(&mut turn, thread_id, user_id, &e).await;
                turn.set_phase(TurnPhase::Errored);
                TurnOutcome::Errored
            }
        };

        self.send(thread_id, &ServerEvent::completed(thread_id, self.agent.agent_name()))
            .await;
        tracing::info!(
            thread_id,
            ?outcome,
            agent_events = turn.classifier.emitted(),
            tools_used = turn.tools_used(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Turn finished"
        );
        Ok(outcome)
    }

    async fn drive(
        &self,
        turn: &mut TurnState,
        thread_id: &str,
        user_id: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<(), TurnFailure> {
        let message = ChatMessage::human(query).with_user(user_id);
        self.conversations.append(thread_id, message.clone()).await?;

        let messages = match self.settings.history_mode {
            HistoryMode::Full => self.conversations.history(thread_id).await?,
            HistoryMode::Latest => vec![message],
        };
        let config = RunConfig::default()
            .with_recursion_limit(self.settings.recursion_limit)
            .with_metadata("user_id", serde_json::Value::String(user_id.to_string()));
        let request = AgentRequest::new(messages, thread_id, user_id).with_config(config);

        self.send(
            thread_id,
            &ServerEvent::processing(format!("{} is thinking...", self.settings.chatbot_name)),
        )
        .await;

        let mut events = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TurnFailure::Cancelled),
            opened = self.agent.stream_events(request) => opened?,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TurnFailure::Cancelled),
                next = events.next() => next,
            };
            let Some(event) = next else { break };
            self.handle_event(turn, thread_id, &event?).await;
        }

        self.finalize(turn, thread_id, user_id).await
    }

    async fn handle_event(&self, turn: &mut TurnState, thread_id: &str, event: &LifecycleEvent) {
        if let Some(chunk) = event.token_chunk() {
            if turn.push_token(chunk) {
                self.send(thread_id, &ServerEvent::stream_start()).await;
            }
            self.send(thread_id, &ServerEvent::stream_chunk(chunk)).await;
            return;
        }

        if let Some(content) = event.output_messages().and_then(|m| last_assistant_content(m)) {
            turn.record_final(content);
        }
        if let Some(data) = event.structured_output() {
            if turn.claim_structured() {
                self.send(thread_id, &ServerEvent::structured_response(data.clone()))
                    .await;
            }
        }

        match event.kind {
            EventKind::ToolStart => turn.capture_input(event.name(), event.data.input.as_ref()),
            EventKind::ToolEnd => {
                let capture = turn.capture_output(event.name(), event.data.output.as_ref());
                tracing::debug!(
                    thread_id,
                    tool = event.name(),
                    input = ?capture.input,
                    output = ?capture.output,
                    "Tool finished"
                );
                if self.leads.fires_on(event) {
                    self.leads.fire(thread_id).await;
                }
            }
            _ => {}
        }

        if let Some(notice) = turn.classifier.classify(event) {
            self.send(thread_id, &notice).await;
        }
    }

    async fn finalize(&self, turn: &mut TurnState, thread_id: &str, user_id: &str) -> Result<(), TurnFailure> {
        turn.set_phase(TurnPhase::Finalizing);
        if turn.end_stream() {
            self.send(thread_id, &ServerEvent::stream_end()).await;
        }

        let content = match turn.resolved_content() {
            Some(content) => {
                self.conversations
                    .append(thread_id, ChatMessage::assistant(content.clone()).with_user(user_id))
                    .await?;
                self.name_thread(thread_id, &content).await;
                Some(content)
            }
            None => {
                let history = self.conversations.history(thread_id).await?;
                if replied_since_first_human(&history) {
                    tracing::warn!(thread_id, "Agent produced no content this turn");
                    None
                } else {
                    tracing::warn!(thread_id, "Agent produced no content, storing fallback reply");
                    self.conversations
                        .append(thread_id, ChatMessage::assistant(EMPTY_FALLBACK).with_user(user_id))
                        .await?;
                    Some(EMPTY_FALLBACK.to_string())
                }
            }
        };

        if let Some(content) = content {
            self.send(thread_id, &ServerEvent::agent_response(content, self.agent.agent_name()))
                .await;
        }
        Ok(())
    }

    /// Give a still-default thread a generated title. Failures only log.
    async fn name_thread(&self, thread_id: &str, reply: &str) {
        let session = match self.conversations.session(thread_id).await {
            Ok(Some(session)) if session.has_default_name() => session,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "Could not load thread for naming");
                return;
            }
        };
        let Some(first_question) = session.first_human_message() else {
            return;
        };

        let title = match self.titles.generate_title(first_question.text(), reply).await {
            Ok(title) if !title.trim().is_empty() && title != DEFAULT_THREAD_NAME => title,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "Title generation failed");
                return;
            }
        };

        match self.conversations.rename(thread_id, &title).await {
            Ok(true) => {
                tracing::info!(thread_id, %title, "Thread renamed");
                self.send(thread_id, &ServerEvent::thread_name_updated(thread_id, title))
                    .await;
            }
            Ok(false) => tracing::warn!(thread_id, "Thread vanished before rename"),
            Err(e) => tracing::warn!(thread_id, error = %e, "Thread rename failed"),
        }
    }

    async fn recover(&self, turn: &mut TurnState, thread_id: &str, user_id: &str, error: &anyhow::Error) {
        tracing::error!(
            thread_id,
            user_id,
            phase = ?turn.phase(),
            streamed_chars = turn.streamed_text().len(),
            error = ?error,
            "Turn failed"
        );

        if turn.end_stream() {
            self.send(thread_id, &ServerEvent::stream_end()).await;
        }
        self.send(thread_id, &ServerEvent::error(format!("Processing error: {}", error)))
            .await;

        let history = match self.conversations.history(thread_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(thread_id, error = %e, "Could not read history after failure");
                return;
            }
        };
        // An assistant message after the latest human one means the turn
        // already answered; only an unanswered question gets the fallback.
        if replied_since_last_human(&history) {
            return;
        }
        match self
            .conversations
            .append(thread_id, ChatMessage::assistant(ERROR_FALLBACK).with_user(user_id))
            .await
        {
            Ok(()) => {
                self.send(
                    thread_id,
                    &ServerEvent::agent_response(ERROR_FALLBACK, self.agent.agent_name()),
                )
                .await;
            }
            Err(e) => tracing::error!(thread_id, error = %e, "Could not store fallback reply"),
        }
    }

    async fn send(&self, thread_id: &str, event: &ServerEvent) -> bool {
        self.connections.send(thread_id, event).await
    }
}

fn replied_since_first_human(history: &[ChatMessage]) -> bool {
    history
        .iter()
        .skip_while(|m| !m.is_human())
        .any(ChatMessage::is_assistant)
}

fn replied_since_last_human(history: &[ChatMessage]) -> bool {
    history
        .iter()
        .rev()
        .take_while(|m| !m.is_human())
        .any(ChatMessage::is_assistant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_detection() {
        let history = vec![
            ChatMessage::human("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::human("book me"),
        ];
        assert!(replied_since_first_human(&history));
        assert!(!replied_since_last_human(&history));

        let answered = vec![ChatMessage::human("hi"), ChatMessage::assistant("hello")];
        assert!(replied_since_last_human(&answered));

        assert!(!replied_since_first_human(&[ChatMessage::human("hi")]));
    }
}
