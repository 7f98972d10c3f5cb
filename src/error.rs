//! Error types for the agenda.
//!
//! `AgendaError` covers operational failures (unknown ids, malformed text,
//! bad configuration). Form submission failures are reported separately as
//! `ValidationErrors`, one entry per offending field, so that a caller can
//! show each message next to its input.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum AgendaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid time '{0}': expected HH:MM")]
    InvalidTime(String),
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),
    #[error("waiting list entry not found: {0}")]
    WaitingEntryNotFound(String),
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },
    #[error("form has {} invalid field(s)", .0.len())]
    Validation(#[from] ValidationErrors),
}

pub type AgendaResult<T> = std::result::Result<T, AgendaError>;

/// Editor field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Patient,
    Professional,
    Unit,
    Date,
    StartTime,
    Duration,
    Phone,
    PreferredDates,
    PreferredTimes,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Patient => "patient",
            Field::Professional => "professional",
            Field::Unit => "unit",
            Field::Date => "date",
            Field::StartTime => "startTime",
            Field::Duration => "duration",
            Field::Phone => "phone",
            Field::PreferredDates => "preferredDates",
            Field::PreferredTimes => "preferredTimes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// Every field-level failure found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// `Ok(())` when nothing was recorded, the collected errors otherwise.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field.name(), e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
