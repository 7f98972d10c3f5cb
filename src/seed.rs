//! Demo data loaded into the store at startup.
//!
//! Appointment and waiting-list dates are relative to `now`, so the calendar
//! always opens on a populated day.

use crate::models::{
    end_time_for, Appointment, AppointmentStatus, AppointmentType, ClockTime, Patient,
    Professional, Unit, WaitingListEntry, WaitingPriority,
};
use crate::store::ClinicStore;
use chrono::{DateTime, Duration, Local, NaiveDate};

fn hm(hour: u32, minute: u32) -> ClockTime {
    ClockTime::from_minutes(hour * 60 + minute)
}

pub fn units() -> Vec<Unit> {
    vec![
        Unit {
            id: "1".into(),
            name: "Unidade Central".into(),
            address: "Rua das Flores, 123 - Centro".into(),
        },
        Unit {
            id: "2".into(),
            name: "Unidade Zona Norte".into(),
            address: "Av. dos Palmares, 456 - Zona Norte".into(),
        },
        Unit {
            id: "3".into(),
            name: "Unidade Shopping".into(),
            address: "Shopping Center, Loja 789 - Zona Sul".into(),
        },
    ]
}

pub fn professionals() -> Vec<Professional> {
    let professional = |id: &str, name: &str, specialty: &str, crm: &str, email: &str, phone: &str, units: &[&str]| {
        Professional {
            id: id.into(),
            name: name.into(),
            specialty: specialty.into(),
            crm: crm.into(),
            email: email.into(),
            phone: phone.into(),
            unit_ids: units.iter().map(|u| u.to_string()).collect(),
        }
    };

    vec![
        professional("1", "Dr. Carlos Silva", "Cardiologia", "CRM-SP 123456", "carlos.silva@clinica.com", "(11) 99999-1111", &["1", "2"]),
        professional("2", "Dra. Ana Santos", "Pediatria", "CRM-SP 234567", "ana.santos@clinica.com", "(11) 99999-2222", &["1", "3"]),
        professional("3", "Dr. Paulo Oliveira", "Ortopedia", "CRM-SP 345678", "paulo.oliveira@clinica.com", "(11) 99999-3333", &["2", "3"]),
        professional("4", "Dra. Maria Costa", "Ginecologia", "CRM-SP 456789", "maria.costa@clinica.com", "(11) 99999-4444", &["1"]),
    ]
}

pub fn patients() -> Vec<Patient> {
    let patient = |id: &str, name: &str, cpf: &str, phone: &str| Patient {
        id: id.into(),
        name: name.into(),
        cpf: cpf.into(),
        phone: phone.into(),
    };

    vec![
        patient("1", "João Silva", "123.456.789-00", "(11) 98765-4321"),
        patient("2", "Maria Santos", "987.654.321-00", "(11) 91234-5678"),
        patient("3", "Pedro Costa", "456.789.123-00", "(11) 99876-5432"),
        patient("4", "Ana Ferreira", "321.654.987-00", "(11) 98888-1111"),
        patient("5", "Carlos Souza", "654.321.987-00", "(11) 98888-2222"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn appointment(
    id: &str,
    (patient_id, patient_name): (&str, &str),
    (professional_id, professional_name): (&str, &str),
    (unit_id, unit_name): (&str, &str),
    date: NaiveDate,
    start_time: ClockTime,
    duration: u32,
    kind: AppointmentType,
    status: AppointmentStatus,
    observations: &str,
    confirmation_sent: bool,
    now: DateTime<Local>,
) -> Appointment {
    Appointment {
        id: id.into(),
        patient_id: patient_id.into(),
        patient_name: patient_name.into(),
        professional_id: professional_id.into(),
        professional_name: professional_name.into(),
        unit_id: unit_id.into(),
        unit_name: unit_name.into(),
        date,
        start_time,
        end_time: end_time_for(start_time, duration),
        duration,
        kind,
        status,
        observations: Some(observations.into()),
        confirmation_sent,
        reminder_sent: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn appointments(now: DateTime<Local>) -> Vec<Appointment> {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);

    vec![
        appointment(
            "1",
            ("1", "João Silva"),
            ("1", "Dr. Carlos Silva"),
            ("1", "Unidade Central"),
            today,
            hm(9, 0),
            30,
            AppointmentType::Consultation,
            AppointmentStatus::Confirmed,
            "Consulta de rotina",
            true,
            now,
        ),
        appointment(
            "2",
            ("2", "Maria Santos"),
            ("2", "Dra. Ana Santos"),
            ("1", "Unidade Central"),
            today,
            hm(10, 30),
            30,
            AppointmentType::FollowUp,
            AppointmentStatus::Pending,
            "Retorno pediatria",
            false,
            now,
        ),
        appointment(
            "3",
            ("3", "Pedro Costa"),
            ("3", "Dr. Paulo Oliveira"),
            ("2", "Unidade Zona Norte"),
            tomorrow,
            hm(14, 0),
            30,
            AppointmentType::Exam,
            AppointmentStatus::Confirmed,
            "Raio-X joelho",
            true,
            now,
        ),
    ]
}

pub fn waiting_list(now: DateTime<Local>) -> Vec<WaitingListEntry> {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);

    vec![
        WaitingListEntry {
            id: "1".into(),
            patient_id: "4".into(),
            patient_name: "Ana Ferreira".into(),
            patient_phone: "(11) 98888-1111".into(),
            professional_id: "1".into(),
            preferred_dates: vec![today],
            preferred_times: vec![hm(9, 0), hm(10, 0), hm(11, 0)],
            kind: AppointmentType::Consultation,
            priority: WaitingPriority::High,
            created_at: now,
        },
        WaitingListEntry {
            id: "2".into(),
            patient_id: "5".into(),
            patient_name: "Carlos Souza".into(),
            patient_phone: "(11) 98888-2222".into(),
            professional_id: "2".into(),
            preferred_dates: vec![today, tomorrow],
            preferred_times: vec![hm(14, 0), hm(15, 0), hm(16, 0)],
            kind: AppointmentType::FollowUp,
            priority: WaitingPriority::Medium,
            created_at: now,
        },
    ]
}

/// Fixed instant used as "now" by the unit tests.
#[cfg(test)]
pub(crate) fn fixed_now() -> DateTime<Local> {
    use chrono::TimeZone;
    Local.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap()
}

/// A store holding every demo collection.
pub fn clinic_store(now: DateTime<Local>) -> ClinicStore {
    ClinicStore::new(units(), professionals(), patients())
        .with_appointments(appointments(now))
        .with_waiting_list(waiting_list(now))
}
