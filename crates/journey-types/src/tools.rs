use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of tools the planner can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    #[serde(rename = "case_studies_tool")]
    CaseStudies,
    #[serde(rename = "testimonials_tool")]
    Testimonials,
    OnboardCustomer,
    SummarizeConversation,
    #[serde(rename = "get_specialist_availability")]
    SpecialistAvailability,
    BookAppointment,
    CheckAppointmentAvailability,
    StoreConversationData,
    GetConversationData,
    ClearConversationData,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl ToolName {
    pub const ALL: [ToolName; 10] = [
        ToolName::CaseStudies,
        ToolName::Testimonials,
        ToolName::OnboardCustomer,
        ToolName::SummarizeConversation,
        ToolName::SpecialistAvailability,
        ToolName::BookAppointment,
        ToolName::CheckAppointmentAvailability,
        ToolName::StoreConversationData,
        ToolName::GetConversationData,
        ToolName::ClearConversationData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CaseStudies => "case_studies_tool",
            Self::Testimonials => "testimonials_tool",
            Self::OnboardCustomer => "onboard_customer",
            Self::SummarizeConversation => "summarize_conversation",
            Self::SpecialistAvailability => "get_specialist_availability",
            Self::BookAppointment => "book_appointment",
            Self::CheckAppointmentAvailability => "check_appointment_availability",
            Self::StoreConversationData => "store_conversation_data",
            Self::GetConversationData => "get_conversation_data",
            Self::ClearConversationData => "clear_conversation_data",
        }
    }

    /// User-facing status line shown while the tool runs. Scratch-state
    /// tools have none and stay invisible.
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            Self::CaseStudies => Some("Searching relevant case studies..."),
            Self::Testimonials => Some("Finding customer testimonials..."),
            Self::OnboardCustomer => Some("Setting up your customer profile..."),
            Self::SummarizeConversation => Some("Summarizing our conversation..."),
            Self::SpecialistAvailability => Some("Getting specialist availability..."),
            Self::BookAppointment => Some("Booking Appointment..."),
            Self::CheckAppointmentAvailability => Some("Checking appointment availability..."),
            Self::StoreConversationData
            | Self::GetConversationData
            | Self::ClearConversationData => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}
