use chrono::{Duration, Local, NaiveDate, TimeZone};
use clinic_agenda::render;
use clinic_agenda::seed;
use clinic_agenda::waiting_list::NewWaitingEntry;
use clinic_agenda::{
    AgendaConfig, AgendaPage, AppointmentStatus, AppointmentType, ClockTime, Direction, Event,
    Field, Outcome, PageMode, SaveOutcome, ViewMode, WaitingPriority,
};

fn hm(value: &str) -> ClockTime {
    value.parse().unwrap()
}

fn fixed_now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 31, 8, 0, 0).unwrap()
}

fn page_at(now: chrono::DateTime<Local>) -> AgendaPage {
    AgendaPage::new(seed::clinic_store(now), AgendaConfig::default(), now.date_naive())
}

#[test]
fn month_navigation_round_trips_through_short_month() {
    let now = fixed_now();
    let mut page = page_at(now);
    page.handle(Event::SetViewMode(ViewMode::Month), now).unwrap();

    page.handle(Event::Navigate(Direction::Next), now).unwrap();
    assert_eq!(page.pivot(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(page.title(), "February 2024");

    page.handle(Event::Navigate(Direction::Prev), now).unwrap();
    assert_eq!(page.pivot(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
}

#[test]
fn week_view_starts_on_sunday() {
    let now = fixed_now();
    let page = page_at(now);
    let days = page.calendar_days(now.date_naive());

    assert_eq!(days.len(), 7);
    assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
    assert!(days[3].is_today);
    assert_eq!(page.title(), "28/01 - 03/02/2024");
}

#[test]
fn booking_then_editing_an_appointment() {
    let now = fixed_now();
    let mut page = page_at(now);
    let date = now.date_naive();

    page.handle(Event::ClickSlot { date, time: hm("13:00") }, now).unwrap();
    {
        let editor = page.editor_mut().unwrap();
        editor.select_patient("3");
        editor.select_unit("2");
        editor.select_professional("3");
        editor.set_duration(45);
        editor.set_kind(AppointmentType::Exam);
    }
    let id = match page.handle(Event::Submit, now).unwrap() {
        Outcome::Saved { id, outcome: SaveOutcome::Inserted } => id,
        other => panic!("expected insert, got {:?}", other),
    };

    let saved = page.store().appointment(&id).unwrap().clone();
    assert_eq!(saved.status, AppointmentStatus::Pending);
    assert_eq!(saved.end_time, hm("13:45"));
    assert_eq!(saved.patient_name, "Pedro Costa");
    assert_eq!(saved.unit_name, "Unidade Zona Norte");

    let later = now + Duration::minutes(5);
    page.handle(Event::ClickSlot { date, time: hm("13:00") }, later).unwrap();
    assert_eq!(page.editor().unwrap().editing_id(), Some(id.as_str()));
    page.editor_mut().unwrap().set_start_time("13:20");
    assert_eq!(
        page.handle(Event::Submit, later).unwrap(),
        Outcome::Saved { id: id.clone(), outcome: SaveOutcome::Updated }
    );

    let updated = page.store().appointment(&id).unwrap();
    assert_eq!(updated.created_at, saved.created_at);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.end_time, hm("14:05"));
    assert_eq!(page.store().appointments().len(), 4);
}

#[test]
fn blocked_submit_reports_every_field() {
    let now = fixed_now();
    let mut page = page_at(now);
    page.handle(Event::NewAppointment, now).unwrap();
    {
        let editor = page.editor_mut().unwrap();
        editor.set_start_time("09:05");
        editor.set_duration(5);
    }

    let errors = match page.handle(Event::Submit, now).unwrap() {
        Outcome::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {:?}", other),
    };
    assert!(errors.has(Field::Patient));
    assert!(errors.has(Field::Unit));
    assert!(errors.has(Field::Professional));
    assert_eq!(
        errors.message_for(Field::StartTime),
        Some("Time must fall on a 10-minute boundary")
    );
    assert_eq!(errors.message_for(Field::Duration), Some("Minimum duration is 10 minutes"));
    assert_eq!(page.mode(), PageMode::Form);
    assert_eq!(page.store().appointments().len(), 3);
}

#[test]
fn filters_hide_other_units_in_the_grid() {
    let now = fixed_now();
    let mut page = page_at(now);
    page.handle(Event::SetViewMode(ViewMode::Day), now).unwrap();

    let all = render::page(&page, now.date_naive());
    assert!(all.contains("João Silva"));
    assert!(all.contains("Maria Santos"));

    page.handle(Event::SetProfessionalFilter(Some("2".into())), now).unwrap();
    let filtered = render::page(&page, now.date_naive());
    assert!(!filtered.contains("João Silva"));
    assert!(filtered.contains("Maria Santos"));
    assert!(filtered.contains("Legend: "));
}

#[test]
fn waiting_list_flow() {
    let now = fixed_now();
    let mut page = page_at(now);
    page.handle(Event::OpenWaitingList, now).unwrap();

    let request = NewWaitingEntry {
        patient_id: "3".into(),
        patient_name: "Pedro Costa".into(),
        patient_phone: "(11) 99876-5432".into(),
        professional_id: "3".into(),
        preferred_dates: vec![now.date_naive()],
        preferred_times: vec![hm("08:00")],
        kind: AppointmentType::Exam,
        priority: WaitingPriority::Low,
    };
    assert_eq!(page.handle(Event::AddToWaitingList(request), now).unwrap(), Outcome::Changed);
    assert_eq!(
        page.handle(Event::Key('F'), now).unwrap(),
        Outcome::Announcement("Waiting list: 3 patients waiting".into())
    );

    page.handle(Event::CallPatient("1".into()), now).unwrap();
    page.take_notices();
    page.handle(Event::Tick, now + Duration::seconds(2)).unwrap();
    let notices = page.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(
        notices[0].description,
        "Ana Ferreira was contacted and confirmed attendance."
    );

    page.handle(Event::RequestRemoval("1".into()), now).unwrap();
    page.handle(Event::ConfirmRemoval, now).unwrap();
    let text = render::page(&page, now.date_naive());
    assert!(text.starts_with("Waiting list (2)"));
    assert!(!text.contains("Ana Ferreira"));
}

#[test]
fn oversized_duration_is_rejected_and_grid_still_renders() {
    let now = fixed_now();
    let mut page = page_at(now);
    let date = now.date_naive();

    page.handle(Event::ClickSlot { date, time: hm("13:00") }, now).unwrap();
    {
        let editor = page.editor_mut().unwrap();
        editor.select_patient("3");
        editor.select_unit("2");
        editor.select_professional("3");
        editor.set_duration(100_000_000);
    }
    let errors = match page.handle(Event::Submit, now).unwrap() {
        Outcome::Invalid(errors) => errors,
        other => panic!("expected validation errors, got {:?}", other),
    };
    assert_eq!(errors.message_for(Field::Duration), Some("Maximum duration is 1440 minutes"));
    assert_eq!(page.store().appointments().len(), 3);

    page.handle(Event::Cancel, now).unwrap();
    assert_eq!(page.day_columns(date).len(), 7);
    assert!(render::page(&page, date).contains("Legend: "));
}
