//! Waiting list panel.
//!
//! Patients wait here until someone calls them. The panel filters the list,
//! announces its length, places (simulated) calls and adds new entries.
//! Removal goes through the store and is gated on confirmation by the page.

use crate::error::{Field, ValidationErrors};
use crate::models::{AppointmentType, ClockTime, Professional, WaitingListEntry, WaitingPriority};
use crate::notices::{Notice, NoticeBoard};
use crate::store::ClinicStore;
use chrono::{DateTime, Duration, Local, NaiveDate};
use tracing::info;
use uuid::Uuid;

/// Free-text, professional and priority filter. Empty parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaitingListFilter {
    pub search: String,
    pub professional_id: Option<String>,
    pub priority: Option<WaitingPriority>,
}

impl WaitingListFilter {
    pub fn matches(&self, entry: &WaitingListEntry) -> bool {
        let term = self.search.trim();
        let matches_search = term.is_empty()
            || entry
                .patient_name
                .to_lowercase()
                .contains(&term.to_lowercase())
            || entry.patient_phone.contains(term);
        let matches_professional = self
            .professional_id
            .as_deref()
            .map_or(true, |id| entry.professional_id == id);
        let matches_priority = self.priority.map_or(true, |p| entry.priority == p);

        matches_search && matches_professional && matches_priority
    }
}

pub fn filter_entries<'a>(
    entries: &'a [WaitingListEntry],
    filter: &WaitingListFilter,
) -> Vec<&'a WaitingListEntry> {
    entries.iter().filter(|e| filter.matches(e)).collect()
}

/// A listed entry with its professional looked up.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitingRow<'a> {
    pub entry: &'a WaitingListEntry,
    pub professional: Option<&'a Professional>,
}

pub fn rows<'a>(store: &'a ClinicStore, filter: &WaitingListFilter) -> Vec<WaitingRow<'a>> {
    filter_entries(store.waiting_list(), filter)
        .into_iter()
        .map(|entry| WaitingRow {
            entry,
            professional: store.professional(&entry.professional_id),
        })
        .collect()
}

pub fn announcement(waiting: usize) -> String {
    format!("Waiting list: {} patients waiting", waiting)
}

/// Place a simulated call: notify now, and confirm once `delay` has passed.
pub fn call_patient(
    entry: &WaitingListEntry,
    board: &mut NoticeBoard,
    now: DateTime<Local>,
    delay: Duration,
) {
    info!(id = %entry.id, patient = %entry.patient_name, "calling waiting patient");
    board.post(Notice::new(
        "Calling patient",
        format!("Calling {} - {}", entry.patient_name, entry.patient_phone),
    ));
    board.post_after(
        Notice::new(
            "Patient contacted",
            format!(
                "{} was contacted and confirmed attendance.",
                entry.patient_name
            ),
        ),
        now,
        delay,
    );
}

/// Details of a patient to put on the waiting list.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWaitingEntry {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    pub professional_id: String,
    pub preferred_dates: Vec<NaiveDate>,
    pub preferred_times: Vec<ClockTime>,
    pub kind: AppointmentType,
    pub priority: WaitingPriority,
}

/// Validate a new entry and give it an identity and creation time.
pub fn create_waiting_entry(
    request: NewWaitingEntry,
    store: &ClinicStore,
    now: DateTime<Local>,
) -> Result<WaitingListEntry, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if request.patient_id.trim().is_empty() || request.patient_name.trim().is_empty() {
        errors.push(Field::Patient, "Select a patient");
    }
    if request.patient_phone.trim().is_empty() {
        errors.push(Field::Phone, "Enter a phone number");
    }
    if request.professional_id.trim().is_empty() {
        errors.push(Field::Professional, "Select a professional");
    } else if store.professional(&request.professional_id).is_none() {
        errors.push(Field::Professional, "Unknown professional");
    }
    if request.preferred_dates.is_empty() {
        errors.push(Field::PreferredDates, "Choose at least one date");
    }
    if request.preferred_times.is_empty() {
        errors.push(Field::PreferredTimes, "Choose at least one time");
    }
    errors.into_result()?;

    Ok(WaitingListEntry {
        id: Uuid::new_v4().to_string(),
        patient_id: request.patient_id,
        patient_name: request.patient_name,
        patient_phone: request.patient_phone,
        professional_id: request.professional_id,
        preferred_dates: request.preferred_dates,
        preferred_times: request.preferred_times,
        kind: request.kind,
        priority: request.priority,
        created_at: now,
    })
}
