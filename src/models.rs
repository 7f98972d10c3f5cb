//! Data models for the clinic agenda.
//!
//! This module defines the core data structures used throughout the system:
//! - ClockTime: Time of day at minute precision, written as HH:MM
//! - AppointmentType / AppointmentStatus: Closed enums with display tables
//! - Unit, Professional, Patient: Read-only reference data
//! - Appointment: A booked visit
//! - WaitingListEntry: A patient waiting for a free slot

use crate::constants::SLOT_MINUTES;
use crate::error::{AgendaError, AgendaResult};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Colour family a status or priority is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Muted,
    Primary,
}

impl Tone {
    pub fn name(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Error => "error",
            Tone::Muted => "muted",
            Tone::Primary => "primary",
        }
    }
}

/// Time of day at minute precision.
///
/// Arithmetic wraps at midnight: `23:50` plus twenty minutes is `00:10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(ClockTime)
    }

    /// Time `minutes` after midnight, wrapping at one day.
    pub fn from_minutes(minutes: u32) -> Self {
        ClockTime(NaiveTime::default()).plus_minutes(minutes % (24 * 60))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Add `minutes`, rolling over past midnight.
    pub fn plus_minutes(&self, minutes: u32) -> Self {
        let (time, _) = self
            .0
            .overflowing_add_signed(Duration::minutes(i64::from(minutes)));
        ClockTime(time)
    }

    /// Whether the time sits on a slot boundary (minute divisible by the slot length).
    pub fn is_on_slot_boundary(&self) -> bool {
        self.minute() % SLOT_MINUTES == 0
    }
}

impl FromStr for ClockTime {
    type Err = AgendaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .map(ClockTime)
            .map_err(|_| AgendaError::InvalidTime(value.to_string()))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a calendar date written as `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> AgendaResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AgendaError::InvalidDate(value.to_string()))
}

/// End of an appointment that starts at `start` and lasts `duration_minutes`.
pub fn end_time_for(start: ClockTime, duration_minutes: u32) -> ClockTime {
    start.plus_minutes(duration_minutes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentType {
    Consultation,
    Exam,
    FollowUp,
    Emergency,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 4] = [
        AppointmentType::Consultation,
        AppointmentType::Exam,
        AppointmentType::FollowUp,
        AppointmentType::Emergency,
    ];

    /// Convert a string to an AppointmentType value.
    pub fn from_string(value: &str) -> AgendaResult<Self> {
        match value.to_lowercase().trim() {
            "consultation" => Ok(AppointmentType::Consultation),
            "exam" => Ok(AppointmentType::Exam),
            "follow-up" | "followup" => Ok(AppointmentType::FollowUp),
            "emergency" => Ok(AppointmentType::Emergency),
            _ => Err(AgendaError::InvalidInput(format!(
                "invalid appointment type: '{}'. Must be one of: consultation, exam, follow-up, emergency",
                value
            ))),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppointmentType::Consultation => "consultation",
            AppointmentType::Exam => "exam",
            AppointmentType::FollowUp => "follow-up",
            AppointmentType::Emergency => "emergency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::Consultation => "Consultation",
            AppointmentType::Exam => "Exam",
            AppointmentType::FollowUp => "Follow-up",
            AppointmentType::Emergency => "Emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Confirmed,
    Pending,
    Absent,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Confirmed,
        AppointmentStatus::Pending,
        AppointmentStatus::Absent,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    pub fn from_string(value: &str) -> AgendaResult<Self> {
        match value.to_lowercase().trim() {
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "pending" => Ok(AppointmentStatus::Pending),
            "absent" => Ok(AppointmentStatus::Absent),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            _ => Err(AgendaError::InvalidInput(format!(
                "invalid status: '{}'. Must be one of: confirmed, pending, absent, cancelled, completed",
                value
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Absent => "Absent",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            AppointmentStatus::Confirmed => Tone::Success,
            AppointmentStatus::Pending => Tone::Warning,
            AppointmentStatus::Absent => Tone::Error,
            AppointmentStatus::Cancelled => Tone::Muted,
            AppointmentStatus::Completed => Tone::Primary,
        }
    }
}

/// Priority of a waiting-list entry.
///
/// Ordered so that `High` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitingPriority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl WaitingPriority {
    pub fn from_string(value: &str) -> AgendaResult<Self> {
        match value.to_lowercase().trim() {
            "high" => Ok(WaitingPriority::High),
            "medium" => Ok(WaitingPriority::Medium),
            "low" => Ok(WaitingPriority::Low),
            _ => Err(AgendaError::InvalidInput(format!(
                "invalid priority: '{}'. Must be one of: high, medium, low",
                value
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WaitingPriority::High => "HIGH",
            WaitingPriority::Medium => "MEDIUM",
            WaitingPriority::Low => "LOW",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            WaitingPriority::High => Tone::Error,
            WaitingPriority::Medium => Tone::Warning,
            WaitingPriority::Low => Tone::Success,
        }
    }
}

/// A clinic location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// A member of staff who sees patients at one or more units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub crm: String,
    pub email: String,
    pub phone: String,
    pub unit_ids: Vec<String>,
}

impl Professional {
    pub fn serves(&self, unit_id: &str) -> bool {
        self.unit_ids.iter().any(|id| id == unit_id)
    }
}

/// Represents a patient in the clinic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub cpf: String,
    pub phone: String,
}

impl Patient {
    /// Case-insensitive name match, or plain substring match on the CPF.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim();
        term.is_empty()
            || self.name.to_lowercase().contains(&term.to_lowercase())
            || self.cpf.contains(term)
    }
}

/// Represents a booked appointment.
///
/// The `*_name` fields are display snapshots of the referenced records,
/// refreshed whenever the appointment is saved through the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub professional_id: String,
    pub professional_name: String,
    pub unit_id: String,
    pub unit_name: String,
    pub date: NaiveDate,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
    pub confirmation_sent: bool,
    pub reminder_sent: bool,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Appointment {
    /// End time implied by the start time and duration.
    pub fn derived_end_time(&self) -> ClockTime {
        end_time_for(self.start_time, self.duration)
    }

    pub fn has_consistent_end_time(&self) -> bool {
        self.end_time == self.derived_end_time()
    }

    /// Check if this appointment starts exactly at the given date and time.
    pub fn starts_at(&self, date: NaiveDate, time: ClockTime) -> bool {
        self.date == date && self.start_time == time
    }
}

/// A patient waiting for a slot to open up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingListEntry {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub professional_id: String,
    pub preferred_dates: Vec<NaiveDate>,
    pub preferred_times: Vec<ClockTime>,
    #[serde(rename = "type")]
    pub kind: AppointmentType,
    pub priority: WaitingPriority,
    pub created_at: DateTime<Local>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(value: &str) -> ClockTime {
        value.parse().unwrap()
    }

    #[test]
    fn end_time_adds_duration() {
        assert_eq!(end_time_for(hm("09:00"), 30), hm("09:30"));
        assert_eq!(end_time_for(hm("10:50"), 20), hm("11:10"));
    }

    #[test]
    fn end_time_rolls_over_midnight() {
        assert_eq!(end_time_for(hm("23:50"), 20), hm("00:10"));
        assert_eq!(end_time_for(hm("23:50"), 20).to_string(), "00:10");
    }

    #[test]
    fn clock_time_rejects_garbage() {
        assert!("".parse::<ClockTime>().is_err());
        assert!("25:00".parse::<ClockTime>().is_err());
        assert!("nine".parse::<ClockTime>().is_err());
    }

    #[test]
    fn slot_boundary_is_ten_minutes() {
        assert!(hm("07:10").is_on_slot_boundary());
        assert!(!hm("07:15").is_on_slot_boundary());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!(
            AppointmentType::from_string("Follow-Up").unwrap(),
            AppointmentType::FollowUp
        );
        assert_eq!(
            AppointmentStatus::from_string(" CONFIRMED ").unwrap(),
            AppointmentStatus::Confirmed
        );
        assert_eq!(
            WaitingPriority::from_string("high").unwrap(),
            WaitingPriority::High
        );
        assert!(WaitingPriority::from_string("urgent").is_err());
    }

    #[test]
    fn every_status_has_a_label_and_tone() {
        for status in AppointmentStatus::ALL {
            assert!(!status.label().is_empty());
            let _ = status.tone();
        }
        assert_eq!(AppointmentStatus::Absent.tone(), Tone::Error);
        assert_eq!(AppointmentStatus::Completed.tone(), Tone::Primary);
    }

    #[test]
    fn priority_orders_high_first() {
        assert!(WaitingPriority::High > WaitingPriority::Medium);
        assert!(WaitingPriority::Medium > WaitingPriority::Low);
    }

    #[test]
    fn patient_search_matches_name_or_cpf() {
        let patient = Patient {
            id: "1".into(),
            name: "João Silva".into(),
            cpf: "123.456.789-00".into(),
            phone: "(11) 98888-0000".into(),
        };

        assert!(patient.matches_search("joão"));
        assert!(patient.matches_search("456.789"));
        assert!(patient.matches_search(""));
        assert!(!patient.matches_search("Maria"));
    }

    #[test]
    fn appointment_serializes_with_original_keys() {
        let now = crate::seed::fixed_now();
        let appointment = Appointment {
            id: "1".into(),
            patient_id: "1".into(),
            patient_name: "João Silva".into(),
            professional_id: "1".into(),
            professional_name: "Dr. Carlos Silva".into(),
            unit_id: "1".into(),
            unit_name: "Unidade Central".into(),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: hm("09:00"),
            end_time: hm("09:30"),
            duration: 30,
            kind: AppointmentType::FollowUp,
            status: AppointmentStatus::Confirmed,
            observations: None,
            confirmation_sent: true,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["patientId"], "1");
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["startTime"], "09:00");
        assert_eq!(json["type"], "follow-up");
        assert_eq!(json["status"], "confirmed");
        assert!(json.get("observations").is_none());

        let back: Appointment = serde_json::from_value(json).unwrap();
        assert!(back.has_consistent_end_time());
    }
}
