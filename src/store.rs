//! In-memory clinic repository.
//!
//! `ClinicStore` owns every collection the agenda works with: reference data
//! (units, professionals, patients), appointments, and the waiting list. The
//! page holds one store and lends it to the calendar, editor and waiting-list
//! views, so there is a single copy of each collection.

use crate::error::{AgendaError, AgendaResult};
use crate::models::{
    Appointment, AppointmentStatus, AppointmentType, Patient, Professional, Unit,
    WaitingListEntry,
};
use chrono::NaiveDate;
use tracing::info;

/// Filter shape for appointment queries. Unset parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub unit_id: Option<String>,
    pub professional_id: Option<String>,
    pub statuses: Vec<AppointmentStatus>,
    pub kinds: Vec<AppointmentType>,
    /// Inclusive on both ends.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl AppointmentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, unit_id: impl Into<String>) -> Self {
        self.unit_id = Some(unit_id.into());
        self
    }

    pub fn professional(mut self, professional_id: impl Into<String>) -> Self {
        self.professional_id = Some(professional_id.into());
        self
    }

    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn kind(mut self, kind: AppointmentType) -> Self {
        self.kinds.push(kind);
        self
    }

    pub fn between(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn on(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.unit_id
            .as_deref()
            .map_or(true, |id| appointment.unit_id == id)
            && self
                .professional_id
                .as_deref()
                .map_or(true, |id| appointment.professional_id == id)
            && (self.statuses.is_empty() || self.statuses.contains(&appointment.status))
            && (self.kinds.is_empty() || self.kinds.contains(&appointment.kind))
            && self
                .date_range
                .map_or(true, |(start, end)| start <= appointment.date && appointment.date <= end)
    }
}

/// What `save_appointment` did with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct ClinicStore {
    units: Vec<Unit>,
    professionals: Vec<Professional>,
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    waiting_list: Vec<WaitingListEntry>,
}

impl ClinicStore {
    pub fn new(units: Vec<Unit>, professionals: Vec<Professional>, patients: Vec<Patient>) -> Self {
        ClinicStore {
            units,
            professionals,
            patients,
            appointments: Vec::new(),
            waiting_list: Vec::new(),
        }
    }

    pub fn with_appointments(mut self, appointments: Vec<Appointment>) -> Self {
        self.appointments = appointments;
        self
    }

    pub fn with_waiting_list(mut self, waiting_list: Vec<WaitingListEntry>) -> Self {
        self.waiting_list = waiting_list;
        self
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn professionals(&self) -> &[Professional] {
        &self.professionals
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// All appointments in insertion order.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn waiting_list(&self) -> &[WaitingListEntry] {
        &self.waiting_list
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn professional(&self, id: &str) -> Option<&Professional> {
        self.professionals.iter().find(|p| p.id == id)
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    /// Professionals serving `unit_id`, or every professional when no unit is given.
    pub fn professionals_in_unit(&self, unit_id: Option<&str>) -> Vec<&Professional> {
        self.professionals
            .iter()
            .filter(|p| unit_id.map_or(true, |id| p.serves(id)))
            .collect()
    }

    pub fn search_patients(&self, term: &str) -> Vec<&Patient> {
        self.patients
            .iter()
            .filter(|p| p.matches_search(term))
            .collect()
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn query(&self, query: &AppointmentQuery) -> Vec<&Appointment> {
        self.appointments
            .iter()
            .filter(|a| query.matches(a))
            .collect()
    }

    /// Insert when the identity is new, replace when it already exists.
    pub fn save_appointment(&mut self, appointment: Appointment) -> SaveOutcome {
        match self.appointments.iter().position(|a| a.id == appointment.id) {
            Some(index) => {
                info!(id = %appointment.id, "appointment replaced");
                self.appointments[index] = appointment;
                SaveOutcome::Updated
            }
            None => {
                info!(
                    id = %appointment.id,
                    date = %appointment.date,
                    start = %appointment.start_time,
                    "appointment created"
                );
                self.appointments.push(appointment);
                SaveOutcome::Inserted
            }
        }
    }

    /// Patient name as currently recorded, falling back to the appointment's snapshot.
    pub fn patient_name_for<'a>(&'a self, appointment: &'a Appointment) -> &'a str {
        self.patient(&appointment.patient_id)
            .map_or(appointment.patient_name.as_str(), |p| p.name.as_str())
    }

    pub fn professional_name_for<'a>(&'a self, appointment: &'a Appointment) -> &'a str {
        self.professional(&appointment.professional_id)
            .map_or(appointment.professional_name.as_str(), |p| p.name.as_str())
    }

    pub fn unit_name_for<'a>(&'a self, appointment: &'a Appointment) -> &'a str {
        self.unit(&appointment.unit_id)
            .map_or(appointment.unit_name.as_str(), |u| u.name.as_str())
    }

    pub fn waiting_entry(&self, id: &str) -> Option<&WaitingListEntry> {
        self.waiting_list.iter().find(|e| e.id == id)
    }

    pub fn add_waiting_entry(&mut self, entry: WaitingListEntry) {
        info!(id = %entry.id, patient = %entry.patient_name, "waiting list entry added");
        self.waiting_list.push(entry);
    }

    pub fn remove_waiting_entry(&mut self, id: &str) -> AgendaResult<WaitingListEntry> {
        let index = self
            .waiting_list
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| AgendaError::WaitingEntryNotFound(id.to_string()))?;
        let entry = self.waiting_list.remove(index);
        info!(id = %entry.id, patient = %entry.patient_name, "waiting list entry removed");
        Ok(entry)
    }
}
