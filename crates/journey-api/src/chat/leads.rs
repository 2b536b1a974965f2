use std::sync::Arc;

use journey_agent::LeadRecorder;
use journey_types::{EventKind, LifecycleEvent, ToolName};

/// Files a lead whenever the booking tool finishes. Best-effort: failures
/// are logged and never reach the turn.
#[derive(Clone)]
pub struct LeadSummaryTrigger {
    recorder: Arc<LeadRecorder>,
    tool: ToolName,
}

impl LeadSummaryTrigger {
    pub fn new(recorder: Arc<LeadRecorder>) -> Self {
        Self {
            recorder,
            tool: ToolName::BookAppointment,
        }
    }

    pub fn fires_on(&self, event: &LifecycleEvent) -> bool {
        event.kind == EventKind::ToolEnd && event.name() == self.tool.as_str()
    }

    pub async fn fire(&self, thread_id: &str) {
        match self.recorder.record(thread_id).await {
            Ok(Some(lead_key)) => tracing::info!(thread_id, %lead_key, "Lead summary stored"),
            Ok(None) => tracing::info!(thread_id, "Lead summary skipped"),
            Err(e) => tracing::warn!(thread_id, error = %e, "Lead summary failed"),
        }
    }
}
