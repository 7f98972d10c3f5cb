//! Clinic agenda: calendar grid, slot occupancy, appointment editor and
//! waiting list for a multi-unit clinic.

pub mod agenda;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod models;
pub mod notices;
pub mod occupancy;
pub mod render;
pub mod seed;
pub mod store;
pub mod waiting_list;

pub use agenda::{AgendaPage, Event, Outcome, PageMode};
pub use calendar::{Direction, Navigator, ViewMode};
pub use config::AgendaConfig;
pub use editor::AppointmentEditor;
pub use error::{AgendaError, AgendaResult, Field, ValidationErrors};
pub use models::{
    Appointment, AppointmentStatus, AppointmentType, ClockTime, Patient, Professional, Unit,
    WaitingListEntry, WaitingPriority,
};
pub use store::{AppointmentQuery, ClinicStore, SaveOutcome};
