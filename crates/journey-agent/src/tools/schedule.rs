//! Appointment slot rules: weekdays, 30 minute slots between 11:00 and
//! 18:00, no slots during the 14:00-15:00 lunch break.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

pub const SLOT_HOURS: [u32; 6] = [11, 12, 13, 15, 16, 17];
pub const SLOT_MINUTES: u32 = 30;
pub const DEFAULT_WINDOW_DAYS: i64 = 7;
pub const MAX_WINDOW_DAYS: i64 = 31;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRejection {
    Weekend,
    OffGrid,
    OutsideHours,
    LunchBreak,
}

impl SlotRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Weekend => "Appointments are only available on weekdays",
            Self::OffGrid => "Appointments start on the hour or half hour",
            Self::OutsideHours => "Appointments are available between 11:00 and 18:00",
            Self::LunchBreak => "No appointments during the 14:00-15:00 lunch break",
        }
    }
}

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn format_datetime(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn validate_slot(at: NaiveDateTime) -> Result<(), SlotRejection> {
    if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
        return Err(SlotRejection::Weekend);
    }
    if at.minute() % SLOT_MINUTES != 0 || at.second() != 0 {
        return Err(SlotRejection::OffGrid);
    }
    if at.hour() == 14 {
        return Err(SlotRejection::LunchBreak);
    }
    if !SLOT_HOURS.contains(&at.hour()) {
        return Err(SlotRejection::OutsideHours);
    }
    Ok(())
}

/// Every bookable start time on `date`; empty on weekends.
pub fn slots_on(date: NaiveDate) -> Vec<NaiveDateTime> {
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return Vec::new();
    }
    SLOT_HOURS
        .iter()
        .flat_map(|&hour| [0, SLOT_MINUTES].map(move |minute| (hour, minute)))
        .filter_map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0))
        .map(|time| date.and_time(time))
        .collect()
}

/// Inclusive date range, clamped to `MAX_WINDOW_DAYS`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let last = to.min(from + Duration::days(MAX_WINDOW_DAYS - 1));
    from.iter_days().take_while(|day| *day <= last).collect()
}

pub fn slot_id(specialist_id: &str, at: NaiveDateTime) -> String {
    format!("SLOT-{}-{}", specialist_id, at.format("%Y%m%d%H%M"))
}
