//! Appointment editor form.
//!
//! The editor holds the raw state of the booking form. It is opened either on
//! an existing appointment (edit) or on an empty calendar cell (create with the
//! cell's date and time preselected). `submit` validates every field at once
//! and, when all pass, emits the complete record. The caller merges it into the
//! store; the editor never mutates the store itself.

use crate::constants::{
    DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES, SLOT_MINUTES,
};
use crate::error::{Field, ValidationErrors};
use crate::models::{
    end_time_for, Appointment, AppointmentStatus, AppointmentType, ClockTime, Patient,
    Professional,
};
use crate::store::ClinicStore;
use chrono::{DateTime, Local, NaiveDate};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentEditor {
    editing: Option<Appointment>,
    patient_id: String,
    professional_id: String,
    unit_id: String,
    date: Option<NaiveDate>,
    start_time: String,
    duration: u32,
    kind: AppointmentType,
    observations: String,
    patient_search: String,
}

impl Default for AppointmentEditor {
    fn default() -> Self {
        AppointmentEditor {
            editing: None,
            patient_id: String::new(),
            professional_id: String::new(),
            unit_id: String::new(),
            date: None,
            start_time: String::new(),
            duration: DEFAULT_DURATION_MINUTES,
            kind: AppointmentType::Consultation,
            observations: String::new(),
            patient_search: String::new(),
        }
    }
}

impl AppointmentEditor {
    /// A blank form for a new appointment.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new appointment with the clicked cell's date and time filled in.
    pub fn for_slot(date: NaiveDate, time: ClockTime) -> Self {
        AppointmentEditor {
            date: Some(date),
            start_time: time.to_string(),
            ..Self::default()
        }
    }

    /// A form loaded from an existing appointment.
    pub fn for_appointment(appointment: &Appointment) -> Self {
        AppointmentEditor {
            editing: Some(appointment.clone()),
            patient_id: appointment.patient_id.clone(),
            professional_id: appointment.professional_id.clone(),
            unit_id: appointment.unit_id.clone(),
            date: Some(appointment.date),
            start_time: appointment.start_time.to_string(),
            duration: appointment.duration,
            kind: appointment.kind,
            observations: appointment.observations.clone().unwrap_or_default(),
            patient_search: String::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|a| a.id.as_str())
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn professional_id(&self) -> &str {
        &self.professional_id
    }

    pub fn unit_id(&self) -> &str {
        &self.unit_id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn kind(&self) -> AppointmentType {
        self.kind
    }

    pub fn select_patient(&mut self, patient_id: impl Into<String>) {
        self.patient_id = patient_id.into();
    }

    /// Choose a unit. Any previously chosen professional is cleared, since the
    /// professional list is scoped to the unit.
    pub fn select_unit(&mut self, unit_id: impl Into<String>) {
        self.unit_id = unit_id.into();
        if !self.professional_id.is_empty() {
            debug!(unit = %self.unit_id, "unit changed, professional cleared");
        }
        self.professional_id.clear();
    }

    pub fn select_professional(&mut self, professional_id: impl Into<String>) {
        self.professional_id = professional_id.into();
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.date = date;
    }

    pub fn set_start_time(&mut self, start_time: impl Into<String>) {
        self.start_time = start_time.into();
    }

    pub fn set_duration(&mut self, minutes: u32) {
        self.duration = minutes;
    }

    pub fn set_kind(&mut self, kind: AppointmentType) {
        self.kind = kind;
    }

    pub fn set_observations(&mut self, observations: impl Into<String>) {
        self.observations = observations.into();
    }

    pub fn set_patient_search(&mut self, term: impl Into<String>) {
        self.patient_search = term.into();
    }

    /// Professionals selectable for the current unit.
    pub fn professional_options<'a>(&self, store: &'a ClinicStore) -> Vec<&'a Professional> {
        let unit = Some(self.unit_id.as_str()).filter(|id| !id.is_empty());
        store.professionals_in_unit(unit)
    }

    /// Patients matching the search box.
    pub fn patient_options<'a>(&self, store: &'a ClinicStore) -> Vec<&'a Patient> {
        store.search_patients(&self.patient_search)
    }

    /// Validate the form and build the normalized record.
    ///
    /// On failure every offending field is reported and nothing is built.
    pub fn submit(
        &self,
        store: &ClinicStore,
        now: DateTime<Local>,
    ) -> Result<Appointment, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let patient = if self.patient_id.trim().is_empty() {
            errors.push(Field::Patient, "Select a patient");
            None
        } else {
            let found = store.patient(&self.patient_id);
            if found.is_none() {
                errors.push(Field::Patient, "Unknown patient");
            }
            found
        };

        let unit = if self.unit_id.trim().is_empty() {
            errors.push(Field::Unit, "Select a unit");
            None
        } else {
            let found = store.unit(&self.unit_id);
            if found.is_none() {
                errors.push(Field::Unit, "Unknown unit");
            }
            found
        };

        let professional = if self.professional_id.trim().is_empty() {
            errors.push(Field::Professional, "Select a professional");
            None
        } else {
            match store.professional(&self.professional_id) {
                None => {
                    errors.push(Field::Professional, "Unknown professional");
                    None
                }
                Some(p) if unit.map_or(false, |u| !p.serves(&u.id)) => {
                    errors.push(
                        Field::Professional,
                        "Professional does not serve the selected unit",
                    );
                    None
                }
                Some(p) => Some(p),
            }
        };

        if self.date.is_none() {
            errors.push(Field::Date, "Select a date");
        }

        let start_time = if self.start_time.trim().is_empty() {
            errors.push(Field::StartTime, "Select a time");
            None
        } else {
            match self.start_time.parse::<ClockTime>() {
                Ok(time) if time.is_on_slot_boundary() => Some(time),
                Ok(_) => {
                    errors.push(
                        Field::StartTime,
                        format!("Time must fall on a {}-minute boundary", SLOT_MINUTES),
                    );
                    None
                }
                Err(_) => {
                    errors.push(Field::StartTime, "Time must be written as HH:MM");
                    None
                }
            }
        };

        if self.duration < MIN_DURATION_MINUTES {
            errors.push(
                Field::Duration,
                format!("Minimum duration is {} minutes", MIN_DURATION_MINUTES),
            );
        } else if self.duration > MAX_DURATION_MINUTES {
            errors.push(
                Field::Duration,
                format!("Maximum duration is {} minutes", MAX_DURATION_MINUTES),
            );
        }

        let (Some(patient), Some(professional), Some(unit), Some(date), Some(start_time)) =
            (patient, professional, unit, self.date, start_time)
        else {
            warn!(invalid = errors.len(), "appointment submission blocked");
            return Err(errors);
        };
        if !errors.is_empty() {
            warn!(invalid = errors.len(), "appointment submission blocked");
            return Err(errors);
        }

        let observations = Some(self.observations.trim().to_string()).filter(|o| !o.is_empty());
        let (id, created_at, status, confirmation_sent, reminder_sent) = match &self.editing {
            Some(existing) => (
                existing.id.clone(),
                existing.created_at,
                existing.status,
                existing.confirmation_sent,
                existing.reminder_sent,
            ),
            None => (
                Uuid::new_v4().to_string(),
                now,
                AppointmentStatus::Pending,
                false,
                false,
            ),
        };

        Ok(Appointment {
            id,
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            professional_id: professional.id.clone(),
            professional_name: professional.name.clone(),
            unit_id: unit.id.clone(),
            unit_name: unit.name.clone(),
            date,
            start_time,
            end_time: end_time_for(start_time, self.duration),
            duration: self.duration,
            kind: self.kind,
            status,
            observations,
            confirmation_sent,
            reminder_sent,
            created_at,
            updated_at: now,
        })
    }
}
