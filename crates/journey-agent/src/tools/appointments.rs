use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Utc};
use journey_persist::JsonTable;
use journey_types::ToolName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::schedule::{self, DEFAULT_WINDOW_DAYS};
use super::{parse_args, AgentTool, ToolContext};

const MAX_SLOTS_PER_SPECIALIST: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    pub specialist_id: String,
    pub name: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
}

impl Specialist {
    fn relevance(&self, query: &str) -> usize {
        let haystack = format!(
            "{} {} {} {}",
            self.designation,
            self.expertise.join(" "),
            self.industries.join(" "),
            self.name
        )
        .to_lowercase();
        query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.len() > 2)
            .filter(|word| haystack.contains(&word.to_lowercase()))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: String,
    pub specialist_id: String,
    pub specialist_name: String,
    pub customer_id: String,
    /// `YYYY-MM-DD HH:MM:SS`, local time
    pub slot_datetime: String,
    pub duration_minutes: u32,
    pub reason: String,
    pub status: String,
    pub thread_id: String,
    pub booked_at: chrono::DateTime<Utc>,
}

/// Specialists catalog plus the appointments ledger.
pub struct AppointmentBook {
    specialists: JsonTable<Specialist>,
    appointments: JsonTable<Appointment>,
}

impl AppointmentBook {
    pub fn new(specialists: impl Into<PathBuf>, appointments: impl Into<PathBuf>) -> Self {
        Self {
            specialists: JsonTable::new(specialists),
            appointments: JsonTable::new(appointments),
        }
    }

    pub async fn specialists(&self) -> Result<Vec<Specialist>> {
        Ok(self.specialists.load().await?)
    }

    pub async fn specialist(&self, specialist_id: &str) -> Result<Option<Specialist>> {
        Ok(self
            .specialists()
            .await?
            .into_iter()
            .find(|s| s.specialist_id.eq_ignore_ascii_case(specialist_id)))
    }

    async fn booked(&self) -> Result<HashSet<(String, String)>> {
        Ok(self
            .appointments
            .load()
            .await?
            .into_iter()
            .filter(|a| a.status != "cancelled")
            .map(|a| (a.specialist_id, a.slot_datetime))
            .collect())
    }

    /// Free slots for one specialist across `days`.
    pub async fn open_slots(&self, specialist: &Specialist, days: &[NaiveDate]) -> Result<Vec<Value>> {
        let booked = self.booked().await?;
        Ok(days
            .iter()
            .flat_map(|day| schedule::slots_on(*day))
            .filter(|slot| {
                !booked.contains(&(specialist.specialist_id.clone(), schedule::format_datetime(*slot)))
            })
            .take(MAX_SLOTS_PER_SPECIALIST)
            .map(|slot| {
                json!({
                    "slot_id": schedule::slot_id(&specialist.specialist_id, slot),
                    "slot_datetime": schedule::format_datetime(slot),
                })
            })
            .collect())
    }

    /// Book a slot; returns `None` when someone took it first.
    pub async fn book(
        &self,
        specialist: &Specialist,
        at: NaiveDateTime,
        customer_id: &str,
        reason: &str,
        thread_id: &str,
    ) -> Result<Option<Appointment>> {
        let slot = schedule::format_datetime(at);
        let appointment = self
            .appointments
            .update(|rows| {
                let taken = rows.iter().any(|a| {
                    a.status != "cancelled" && a.specialist_id == specialist.specialist_id && a.slot_datetime == slot
                });
                if taken {
                    return None;
                }
                let appointment = Appointment {
                    appointment_id: format!("APT-{}", rows.len() + 1000),
                    specialist_id: specialist.specialist_id.clone(),
                    specialist_name: specialist.name.clone(),
                    customer_id: customer_id.to_string(),
                    slot_datetime: slot.clone(),
                    duration_minutes: schedule::SLOT_MINUTES,
                    reason: reason.to_string(),
                    status: "confirmed".to_string(),
                    thread_id: thread_id.to_string(),
                    booked_at: Utc::now(),
                };
                rows.push(appointment.clone());
                Some(appointment)
            })
            .await?;
        Ok(appointment)
    }
}

fn default_window() -> (NaiveDate, NaiveDate) {
    let tomorrow = Local::now().date_naive() + Duration::days(1);
    (tomorrow, tomorrow + Duration::days(DEFAULT_WINDOW_DAYS - 1))
}

fn resolve_window(start: Option<&str>, end: Option<&str>) -> Result<Vec<NaiveDate>> {
    let (default_start, _) = default_window();
    let start = match start {
        Some(raw) => schedule::parse_date(raw)
            .ok_or_else(|| anyhow::anyhow!("start_date must be YYYY-MM-DD, got '{}'", raw))?,
        None => default_start,
    };
    let end = match end {
        Some(raw) => schedule::parse_date(raw)
            .ok_or_else(|| anyhow::anyhow!("end_date must be YYYY-MM-DD, got '{}'", raw))?,
        None => start + Duration::days(DEFAULT_WINDOW_DAYS - 1),
    };
    Ok(schedule::days_between(start, end))
}

#[derive(Debug, Deserialize)]
struct SpecialistSearchArgs {
    search_query: String,
}

/// Picks the specialist best matching the customer's need and lists their
/// open slots for the coming week.
pub struct SpecialistAvailabilityTool {
    book: Arc<AppointmentBook>,
}

impl SpecialistAvailabilityTool {
    pub fn new(book: Arc<AppointmentBook>) -> Self {
        Self { book }
    }
}

#[async_trait]
impl AgentTool for SpecialistAvailabilityTool {
    fn name(&self) -> ToolName {
        ToolName::SpecialistAvailability
    }

    fn description(&self) -> &'static str {
        "Match one specialist to the customer's need (domain, expertise, industry) and return their open slots for the next week."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "search_query": { "type": "string", "description": "Customer need, domain or expertise wanted" }
            },
            "required": ["search_query"]
        })
    }

    async fn call(&self, _ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: SpecialistSearchArgs = parse_args(self.name(), args)?;
        let specialists = self.book.specialists().await?;

        let best = specialists
            .iter()
            .enumerate()
            .max_by_key(|(position, s)| (s.relevance(&args.search_query), std::cmp::Reverse(*position)))
            .map(|(_, s)| s.clone());

        let Some(specialist) = best else {
            return Ok(json!({ "message": "No specialists are configured" }));
        };

        let (from, to) = default_window();
        let slots = self
            .book
            .open_slots(&specialist, &schedule::days_between(from, to))
            .await?;
        Ok(json!({ "specialist": specialist, "available_slots": slots }))
    }
}

#[derive(Debug, Deserialize)]
struct CheckArgs {
    #[serde(default)]
    specialist_id: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

/// Lists open slots for one or all specialists across a date range.
pub struct CheckAvailabilityTool {
    book: Arc<AppointmentBook>,
}

impl CheckAvailabilityTool {
    pub fn new(book: Arc<AppointmentBook>) -> Self {
        Self { book }
    }
}

#[async_trait]
impl AgentTool for CheckAvailabilityTool {
    fn name(&self) -> ToolName {
        ToolName::CheckAppointmentAvailability
    }

    fn description(&self) -> &'static str {
        "Check open appointment slots (weekdays 11:00-18:00, lunch 14:00-15:00 excluded). Dates are YYYY-MM-DD; defaults to the next 7 days."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "specialist_id": { "type": "string" },
                "start_date": { "type": "string", "description": "YYYY-MM-DD" },
                "end_date": { "type": "string", "description": "YYYY-MM-DD" }
            }
        })
    }

    async fn call(&self, _ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: CheckArgs = parse_args(self.name(), args)?;
        let days = resolve_window(args.start_date.as_deref(), args.end_date.as_deref())?;

        let specialists: Vec<Specialist> = match args.specialist_id.as_deref() {
            Some(id) => match self.book.specialist(id).await? {
                Some(s) => vec![s],
                None => return Ok(json!({ "error": format!("Unknown specialist_id '{}'", id) })),
            },
            None => self.book.specialists().await?,
        };

        let mut availability = Vec::with_capacity(specialists.len());
        for specialist in &specialists {
            let slots = self.book.open_slots(specialist, &days).await?;
            availability.push(json!({
                "specialist_id": specialist.specialist_id,
                "specialist_name": specialist.name,
                "available_slots": slots,
            }));
        }
        Ok(json!({ "availability": availability }))
    }
}

#[derive(Debug, Deserialize)]
struct BookArgs {
    specialist_id: String,
    slot_datetime: String,
    customer_id: String,
    #[serde(default)]
    reason: String,
}

pub struct BookAppointmentTool {
    book: Arc<AppointmentBook>,
}

impl BookAppointmentTool {
    pub fn new(book: Arc<AppointmentBook>) -> Self {
        Self { book }
    }
}

#[async_trait]
impl AgentTool for BookAppointmentTool {
    fn name(&self) -> ToolName {
        ToolName::BookAppointment
    }

    fn description(&self) -> &'static str {
        "Book a 30 minute appointment with a specialist for an onboarded customer. slot_datetime is YYYY-MM-DD HH:MM:SS."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "specialist_id": { "type": "string" },
                "slot_datetime": { "type": "string", "description": "YYYY-MM-DD HH:MM:SS" },
                "customer_id": { "type": "string" },
                "reason": { "type": "string", "description": "Topic of the meeting" }
            },
            "required": ["specialist_id", "slot_datetime", "customer_id"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: BookArgs = parse_args(self.name(), args)?;

        let Some(at) = schedule::parse_datetime(&args.slot_datetime) else {
            return Ok(json!({
                "status": "rejected",
                "reason": format!("slot_datetime must be YYYY-MM-DD HH:MM:SS, got '{}'", args.slot_datetime),
            }));
        };
        if let Err(rejection) = schedule::validate_slot(at) {
            return Ok(json!({ "status": "rejected", "reason": rejection.reason() }));
        }
        let Some(specialist) = self.book.specialist(&args.specialist_id).await? else {
            return Ok(json!({
                "status": "rejected",
                "reason": format!("Unknown specialist_id '{}'", args.specialist_id),
            }));
        };

        match self
            .book
            .book(&specialist, at, &args.customer_id, &args.reason, &ctx.thread_id)
            .await?
        {
            Some(appointment) => {
                tracing::info!(
                    appointment_id = %appointment.appointment_id,
                    specialist_id = %appointment.specialist_id,
                    thread_id = %ctx.thread_id,
                    "Appointment booked"
                );
                Ok(json!({ "status": "confirmed", "appointment": appointment }))
            }
            None => Ok(json!({
                "status": "rejected",
                "reason": "That slot was just booked; offer another one",
            })),
        }
    }
}
