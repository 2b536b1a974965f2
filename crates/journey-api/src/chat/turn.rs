use std::collections::HashMap;

use serde_json::Value;

use super::classifier::EventClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    StreamingTokens,
    Finalizing,
    Completed,
    Cancelled,
    Errored,
}

/// Input and output seen for one tool during the turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCapture {
    pub input: Option<Value>,
    pub output: Option<Value>,
}

/// Ephemeral bookkeeping for a single turn.
#[derive(Debug)]
pub struct TurnState {
    phase: TurnPhase,
    streamed: bool,
    stream_open: bool,
    buffer: String,
    final_content: Option<String>,
    structured_sent: bool,
    tools: HashMap<String, ToolCapture>,
    pub classifier: EventClassifier,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::Idle,
            streamed: false,
            stream_open: false,
            buffer: String::new(),
            final_content: None,
            structured_sent: false,
            tools: HashMap::new(),
            classifier: EventClassifier::new(),
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
    }

    /// Append a token fragment. Returns `true` for the first fragment of the turn.
    pub fn push_token(&mut self, chunk: &str) -> bool {
        let first = !self.streamed;
        if first {
            self.streamed = true;
            self.stream_open = true;
            self.phase = TurnPhase::StreamingTokens;
        }
        self.buffer.push_str(chunk);
        first
    }

    /// Close the token stream. `true` only for the call that actually closed
    /// it, so the end marker goes out once.
    pub fn end_stream(&mut self) -> bool {
        std::mem::replace(&mut self.stream_open, false)
    }

    pub fn streamed_text(&self) -> &str {
        &self.buffer
    }

    /// Later calls override earlier ones.
    pub fn record_final(&mut self, content: &str) {
        self.final_content = Some(content.to_string());
    }

    /// Claim the single structured response slot of the turn.
    pub fn claim_structured(&mut self) -> bool {
        !std::mem::replace(&mut self.structured_sent, true)
    }

    pub fn capture_input(&mut self, tool: &str, input: Option<&Value>) {
        self.tools.entry(tool.to_string()).or_default().input = input.cloned();
    }

    /// Record a tool result and return the complete capture for that tool.
    pub fn capture_output(&mut self, tool: &str, output: Option<&Value>) -> &ToolCapture {
        let capture = self.tools.entry(tool.to_string()).or_default();
        capture.output = output.cloned();
        capture
    }

    pub fn tools_used(&self) -> usize {
        self.tools.len()
    }

    /// Canonical final content, else whatever was streamed.
    pub fn resolved_content(&self) -> Option<String> {
        self.final_content
            .clone()
            .or_else(|| (!self.buffer.trim().is_empty()).then(|| self.buffer.clone()))
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_token_starts_streaming() {
        let mut turn = TurnState::new();
        assert!(turn.push_token("Hel"));
        assert!(!turn.push_token("lo"));
        assert_eq!(turn.phase(), TurnPhase::StreamingTokens);
        assert_eq!(turn.streamed_text(), "Hello");
    }

    #[test]
    fn test_stream_ends_once() {
        let mut turn = TurnState::new();
        assert!(!turn.end_stream());
        turn.push_token("a");
        assert!(turn.end_stream());
        assert!(!turn.end_stream());
        // A late fragment does not reopen the stream.
        assert!(!turn.push_token("b"));
        assert!(!turn.end_stream());
    }

    #[test]
    fn test_final_content_overrides_buffer() {
        let mut turn = TurnState::new();
        assert_eq!(turn.resolved_content(), None);

        turn.push_token("partial");
        assert_eq!(turn.resolved_content().as_deref(), Some("partial"));

        turn.record_final("first");
        turn.record_final("Full answer");
        assert_eq!(turn.resolved_content().as_deref(), Some("Full answer"));
    }

    #[test]
    fn test_structured_slot_is_claimed_once() {
        let mut turn = TurnState::new();
        assert!(turn.claim_structured());
        assert!(!turn.claim_structured());
    }

    #[test]
    fn test_tool_capture() {
        let mut turn = TurnState::new();
        turn.capture_input("book_appointment", Some(&json!({"specialist_id": "ps-301"})));
        let capture = turn.capture_output("book_appointment", Some(&json!({"status": "confirmed"})));

        assert_eq!(capture.input.as_ref().unwrap()["specialist_id"], "ps-301");
        assert_eq!(capture.output.as_ref().unwrap()["status"], "confirmed");
        assert_eq!(turn.tools_used(), 1);
    }
}
