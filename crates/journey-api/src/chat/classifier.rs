//! Maps agent lifecycle events to the user-facing `agent_event` envelope.

use std::collections::HashSet;

use chrono::Utc;
use journey_types::{EventKind, LifecycleEvent, ServerEvent, ToolInfo, ToolName};
use serde_json::Value;

const PREVIEW_LIMIT: usize = 100;

/// Per-turn classifier. Remembers which `kind:name:run_id` triples it has
/// already emitted so repeats are dropped.
#[derive(Debug, Default)]
pub struct EventClassifier {
    seen: HashSet<String>,
}

impl EventClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one event. `None` means suppressed: internal noise, an
    /// unknown tool, or a repeat of an emitted event.
    pub fn classify(&mut self, event: &LifecycleEvent) -> Option<ServerEvent> {
        let key = event.dedup_key();
        if self.seen.contains(&key) {
            return None;
        }

        let message = status_message(event)?;
        let node_name = event.name().to_string();
        let tool_info = match event.kind {
            EventKind::ToolStart => Some(ToolInfo {
                name: node_name.clone(),
                input: event.data.input.as_ref().map(preview),
                output: None,
            }),
            EventKind::ToolEnd => Some(ToolInfo {
                name: node_name.clone(),
                input: None,
                output: event.data.output.as_ref().map(preview),
            }),
            _ => None,
        };

        self.seen.insert(key);
        Some(ServerEvent::AgentEvent {
            event_type: event.kind.as_str().to_string(),
            display_name: display_name(&node_name),
            node_name,
            message,
            tool_info,
            event_order: self.seen.len(),
            timestamp: Utc::now(),
        })
    }

    /// Number of events emitted so far this turn.
    pub fn emitted(&self) -> usize {
        self.seen.len()
    }
}

/// Status line for an event, `None` when it should not reach the user.
pub fn status_message(event: &LifecycleEvent) -> Option<String> {
    let name = event.name();
    let tool_tagged = event.is_tool_event();

    if name.is_empty() {
        return (event.kind == EventKind::StepStart && !tool_tagged).then(|| "Starting...".to_string());
    }

    match event.kind {
        EventKind::StepStart if !tool_tagged => {
            let lower = name.to_lowercase();
            if lower.contains("planner") || lower.contains("agent") {
                Some("Planning...".to_string())
            } else if lower.contains("fetch") || lower.contains("search") {
                Some(format!("Starting search: {}...", title_case(name)))
            } else {
                None
            }
        }
        EventKind::ToolStart => name
            .parse::<ToolName>()
            .ok()
            .and_then(|tool| tool.status_message())
            .map(str::to_string),
        _ => None,
    }
}

/// `check_appointment_availability` -> `Check Appointment Availability`.
pub fn display_name(name: &str) -> String {
    if name.is_empty() {
        "Graph".to_string()
    } else {
        title_case(name)
    }
}

fn title_case(name: &str) -> String {
    name.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Compact text of a tool payload, cut at 100 characters with `...`.
pub fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > PREVIEW_LIMIT {
        let mut cut: String = text.chars().take(PREVIEW_LIMIT).collect();
        cut.push_str("...");
        cut
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_start_messages() {
        assert_eq!(
            status_message(&LifecycleEvent::step_start("planner", "r")).as_deref(),
            Some("Planning...")
        );
        assert_eq!(
            status_message(&LifecycleEvent::step_start("fetch_case_studies", "r")).as_deref(),
            Some("Starting search: Fetch Case Studies...")
        );
        assert_eq!(status_message(&LifecycleEvent::step_start("tools", "r")), None);
        assert_eq!(
            status_message(&LifecycleEvent::step_start("", "r")).as_deref(),
            Some("Starting...")
        );
    }

    #[test]
    fn test_ends_are_suppressed() {
        assert_eq!(status_message(&LifecycleEvent::step_end("planner", "r", None)), None);
        assert_eq!(status_message(&LifecycleEvent::step_end("", "r", None)), None);
        assert_eq!(
            status_message(&LifecycleEvent::tool_end("book_appointment", "r", json!({}))),
            None
        );
        assert_eq!(status_message(&LifecycleEvent::chain_end("journey_planner", "r", json!({}))), None);
        assert_eq!(status_message(&LifecycleEvent::token("planner", "r", "hi")), None);
    }

    #[test]
    fn test_tool_start_uses_status_table() {
        assert_eq!(
            status_message(&LifecycleEvent::tool_start("book_appointment", "r", json!({}))).as_deref(),
            Some("Booking Appointment...")
        );
        assert_eq!(
            status_message(&LifecycleEvent::tool_start("web_search", "r", json!({}))),
            None
        );
        assert_eq!(
            status_message(&LifecycleEvent::tool_start("store_conversation_data", "r", json!({}))),
            None
        );
    }

    #[test]
    fn test_tool_tagged_step_is_never_a_step() {
        let event = LifecycleEvent::step_start("search_agent", "r").with_tag("tool:search_agent");
        assert_eq!(status_message(&event), None);
    }

    #[test]
    fn test_duplicates_are_dropped_and_order_counts_up() {
        let mut classifier = EventClassifier::new();
        let planner = LifecycleEvent::step_start("planner", "run-1");

        let first = classifier.classify(&planner).unwrap();
        assert!(matches!(first, ServerEvent::AgentEvent { event_order: 1, .. }));
        assert!(classifier.classify(&planner).is_none());

        let next = classifier.classify(&LifecycleEvent::step_start("planner", "run-2")).unwrap();
        assert!(matches!(next, ServerEvent::AgentEvent { event_order: 2, .. }));
        assert_eq!(classifier.emitted(), 2);
    }

    #[test]
    fn test_suppressed_events_are_not_remembered() {
        let mut classifier = EventClassifier::new();
        let end = LifecycleEvent::tool_end("book_appointment", "r", json!({}));
        assert!(classifier.classify(&end).is_none());
        assert_eq!(classifier.emitted(), 0);
    }

    #[test]
    fn test_tool_event_carries_truncated_input() {
        let mut classifier = EventClassifier::new();
        let long_query = "x".repeat(150);
        let event = LifecycleEvent::tool_start("case_studies_tool", "call-1", json!({ "query": long_query }));

        match classifier.classify(&event).unwrap() {
            ServerEvent::AgentEvent {
                event_type,
                node_name,
                display_name,
                tool_info: Some(info),
                ..
            } => {
                assert_eq!(event_type, "tool_start");
                assert_eq!(node_name, "case_studies_tool");
                assert_eq!(display_name, "Case Studies Tool");
                let input = info.input.unwrap();
                assert_eq!(input.chars().count(), 103);
                assert!(input.ends_with("..."));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_preview_keeps_short_text() {
        assert_eq!(preview(&json!("short")), "short");
        assert_eq!(preview(&json!({"a": 1})), "{\"a\":1}");
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name(""), "Graph");
        assert_eq!(display_name("BOOK_appointment"), "Book Appointment");
    }
}
