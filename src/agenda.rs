//! The appointment page.
//!
//! `AgendaPage` owns the clinic store and every piece of view state (current
//! screen, pivot date, view mode, filters, open editor, pending confirmation)
//! and applies one discrete user event at a time. Nothing is asynchronous:
//! the only deferred effect is the scheduled call confirmation, delivered by
//! the notice board whenever an event is handled at or after its due time.

use crate::calendar::{calendar_days, header_title, CalendarDay, Direction, Navigator, ViewMode};
use crate::config::AgendaConfig;
use crate::editor::AppointmentEditor;
use crate::error::{AgendaError, AgendaResult, ValidationErrors};
use crate::models::{ClockTime, Professional};
use crate::notices::{Notice, NoticeBoard};
use crate::occupancy::{
    day_column, month_cell, resolve_slot_click, DayColumn, MonthCell, SlotClick, SlotFilter,
};
use crate::store::{ClinicStore, SaveOutcome};
use crate::waiting_list::{
    self, announcement, call_patient, create_waiting_entry, NewWaitingEntry, WaitingListFilter,
    WaitingRow,
};
use chrono::{DateTime, Local, NaiveDate};
use tracing::debug;

/// Screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Calendar,
    Form,
    WaitingList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(char),
    Navigate(Direction),
    Today,
    GoTo(NaiveDate),
    SetViewMode(ViewMode),
    SetUnitFilter(Option<String>),
    SetProfessionalFilter(Option<String>),
    ClickSlot { date: NaiveDate, time: ClockTime },
    ClickAppointment(String),
    ClickDay(NaiveDate),
    NewAppointment,
    Submit,
    Cancel,
    OpenWaitingList,
    ShowCalendar,
    SetWaitingFilter(WaitingListFilter),
    CallPatient(String),
    RequestRemoval(String),
    ConfirmRemoval,
    DeclineRemoval,
    AddToWaitingList(NewWaitingEntry),
    Tick,
}

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The event does not apply to the current screen.
    Ignored,
    Changed,
    EditorOpened,
    Saved { id: String, outcome: SaveOutcome },
    Invalid(ValidationErrors),
    Announcement(String),
    ConfirmationRequired(String),
    Removed(String),
    /// A pending confirmation was declined; nothing was changed.
    Aborted,
}

pub struct AgendaPage {
    config: AgendaConfig,
    store: ClinicStore,
    mode: PageMode,
    view_mode: ViewMode,
    navigator: Navigator,
    filter: SlotFilter,
    editor: Option<AppointmentEditor>,
    waiting_filter: WaitingListFilter,
    pending_removal: Option<String>,
    notices: NoticeBoard,
}

impl AgendaPage {
    pub fn new(store: ClinicStore, config: AgendaConfig, today: NaiveDate) -> Self {
        let view_mode = config.default_view();
        AgendaPage {
            config,
            store,
            mode: PageMode::Calendar,
            view_mode,
            navigator: Navigator::new(today),
            filter: SlotFilter::default(),
            editor: None,
            waiting_filter: WaitingListFilter::default(),
            pending_removal: None,
            notices: NoticeBoard::new(),
        }
    }

    pub fn store(&self) -> &ClinicStore {
        &self.store
    }

    pub fn config(&self) -> &AgendaConfig {
        &self.config
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn pivot(&self) -> NaiveDate {
        self.navigator.pivot()
    }

    pub fn filter(&self) -> &SlotFilter {
        &self.filter
    }

    pub fn editor(&self) -> Option<&AppointmentEditor> {
        self.editor.as_ref()
    }

    /// The open form, for field-by-field edits between events.
    pub fn editor_mut(&mut self) -> Option<&mut AppointmentEditor> {
        self.editor.as_mut()
    }

    pub fn waiting_filter(&self) -> &WaitingListFilter {
        &self.waiting_filter
    }

    pub fn pending_removal(&self) -> Option<&str> {
        self.pending_removal.as_deref()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn title(&self) -> String {
        header_title(self.pivot(), self.view_mode)
    }

    pub fn calendar_days(&self, today: NaiveDate) -> Vec<CalendarDay> {
        calendar_days(self.pivot(), self.view_mode, today)
    }

    /// Professionals offered by the calendar's professional filter.
    pub fn professional_filter_options(&self) -> Vec<&Professional> {
        self.store.professionals_in_unit(self.filter.unit_id.as_deref())
    }

    /// Slot columns for the day and week views.
    pub fn day_columns(&self, today: NaiveDate) -> Vec<DayColumn<'_>> {
        self.calendar_days(today)
            .into_iter()
            .map(|day| day_column(self.store.appointments(), day, &self.filter, &self.config))
            .collect()
    }

    /// Day cells for the month view.
    pub fn month_cells(&self, today: NaiveDate) -> Vec<MonthCell<'_>> {
        self.calendar_days(today)
            .into_iter()
            .map(|day| month_cell(self.store.appointments(), day, &self.filter, &self.config))
            .collect()
    }

    pub fn waiting_rows(&self) -> Vec<WaitingRow<'_>> {
        waiting_list::rows(&self.store, &self.waiting_filter)
    }

    /// Apply one user event.
    ///
    /// Notices that have come due by `now` are delivered first. Validation
    /// failures are reported as `Outcome::Invalid`; unknown ids are errors.
    pub fn handle(&mut self, event: Event, now: DateTime<Local>) -> AgendaResult<Outcome> {
        let delivered = self.notices.tick(now);
        debug!(?event, mode = ?self.mode, "handling event");

        match event {
            Event::Tick => Ok(if delivered > 0 {
                Outcome::Changed
            } else {
                Outcome::Ignored
            }),
            Event::Key(key) => Ok(self.handle_key(key, now)),
            Event::Navigate(direction) => {
                if self.mode != PageMode::Calendar {
                    return Ok(Outcome::Ignored);
                }
                self.navigator.navigate(self.view_mode, direction);
                Ok(Outcome::Changed)
            }
            Event::Today => {
                if self.mode != PageMode::Calendar {
                    return Ok(Outcome::Ignored);
                }
                self.navigator.go_to_today(now.date_naive());
                Ok(Outcome::Changed)
            }
            Event::GoTo(date) => {
                self.navigator.set_pivot(date);
                Ok(Outcome::Changed)
            }
            Event::SetViewMode(view_mode) => {
                debug!(?view_mode, "view mode changed");
                self.view_mode = view_mode;
                Ok(Outcome::Changed)
            }
            Event::SetUnitFilter(unit_id) => {
                self.set_unit_filter(unit_id);
                Ok(Outcome::Changed)
            }
            Event::SetProfessionalFilter(professional_id) => {
                debug!(professional = ?professional_id, "professional filter changed");
                self.filter.professional_id = professional_id.filter(|id| !id.is_empty());
                Ok(Outcome::Changed)
            }
            Event::ClickSlot { date, time } => Ok(self.click_slot(date, time)),
            Event::ClickAppointment(id) => {
                let appointment = self
                    .store
                    .appointment(&id)
                    .ok_or(AgendaError::AppointmentNotFound(id))?;
                self.editor = Some(AppointmentEditor::for_appointment(appointment));
                self.mode = PageMode::Form;
                Ok(Outcome::EditorOpened)
            }
            Event::ClickDay(date) => {
                if self.mode != PageMode::Calendar || self.view_mode != ViewMode::Month {
                    return Ok(Outcome::Ignored);
                }
                self.navigator.set_pivot(date);
                self.view_mode = ViewMode::Day;
                Ok(Outcome::Changed)
            }
            Event::NewAppointment => {
                let mut editor = AppointmentEditor::new();
                editor.set_date(Some(self.pivot()));
                self.editor = Some(editor);
                self.mode = PageMode::Form;
                Ok(Outcome::EditorOpened)
            }
            Event::Submit => Ok(self.submit(now)),
            Event::Cancel => {
                if self.mode != PageMode::Form {
                    return Ok(Outcome::Ignored);
                }
                self.close_editor();
                Ok(Outcome::Changed)
            }
            Event::OpenWaitingList => {
                self.mode = PageMode::WaitingList;
                Ok(Outcome::Changed)
            }
            Event::ShowCalendar => {
                self.close_editor();
                Ok(Outcome::Changed)
            }
            Event::SetWaitingFilter(filter) => {
                self.waiting_filter = filter;
                Ok(Outcome::Changed)
            }
            Event::CallPatient(id) => {
                if self.mode != PageMode::WaitingList {
                    return Ok(Outcome::Ignored);
                }
                let entry = self
                    .store
                    .waiting_entry(&id)
                    .ok_or(AgendaError::WaitingEntryNotFound(id))?;
                call_patient(
                    entry,
                    &mut self.notices,
                    now,
                    self.config.call_confirmation_delay(),
                );
                Ok(Outcome::Changed)
            }
            Event::RequestRemoval(id) => {
                if self.mode != PageMode::WaitingList {
                    return Ok(Outcome::Ignored);
                }
                let entry = self
                    .store
                    .waiting_entry(&id)
                    .ok_or_else(|| AgendaError::WaitingEntryNotFound(id.clone()))?;
                let question = format!("Remove {} from the waiting list?", entry.patient_name);
                self.pending_removal = Some(id);
                Ok(Outcome::ConfirmationRequired(question))
            }
            Event::ConfirmRemoval => {
                let Some(id) = self.pending_removal.take() else {
                    return Ok(Outcome::Ignored);
                };
                self.store.remove_waiting_entry(&id)?;
                self.notices.post(Notice::new(
                    "Patient removed",
                    "Patient was removed from the waiting list.",
                ));
                Ok(Outcome::Removed(id))
            }
            Event::DeclineRemoval => Ok(match self.pending_removal.take() {
                Some(_) => Outcome::Aborted,
                None => Outcome::Ignored,
            }),
            Event::AddToWaitingList(request) => {
                match create_waiting_entry(request, &self.store, now) {
                    Ok(entry) => {
                        self.notices.post(Notice::new(
                            "Added to waiting list",
                            format!("{} is now waiting for a slot.", entry.patient_name),
                        ));
                        self.store.add_waiting_entry(entry);
                        Ok(Outcome::Changed)
                    }
                    Err(errors) => Ok(Outcome::Invalid(errors)),
                }
            }
        }
    }

    fn handle_key(&mut self, key: char, now: DateTime<Local>) -> Outcome {
        match (self.mode, key) {
            (PageMode::Calendar, 'c' | 'C') => {
                self.navigator.go_to_today(now.date_naive());
                Outcome::Changed
            }
            (PageMode::WaitingList, 'f' | 'F') => {
                let waiting = self.waiting_rows().len();
                Outcome::Announcement(announcement(waiting))
            }
            _ => Outcome::Ignored,
        }
    }

    /// Change the unit filter, dropping a professional who does not work there.
    fn set_unit_filter(&mut self, unit_id: Option<String>) {
        let unit_id = unit_id.filter(|id| !id.is_empty());
        debug!(unit = ?unit_id, "unit filter changed");

        let keep_professional = match (unit_id.as_deref(), self.filter.professional_id.as_deref()) {
            (Some(unit), Some(professional_id)) => self
                .store
                .professional(professional_id)
                .map_or(false, |p| p.serves(unit)),
            _ => true,
        };
        if !keep_professional {
            self.filter.professional_id = None;
        }
        self.filter.unit_id = unit_id;
    }

    fn click_slot(&mut self, date: NaiveDate, time: ClockTime) -> Outcome {
        if self.mode != PageMode::Calendar || self.view_mode == ViewMode::Month {
            return Outcome::Ignored;
        }

        let editor = match resolve_slot_click(self.store.appointments(), date, time, &self.filter) {
            SlotClick::Empty { date, time } => AppointmentEditor::for_slot(date, time),
            SlotClick::Appointment(appointment) => AppointmentEditor::for_appointment(appointment),
        };
        self.editor = Some(editor);
        self.mode = PageMode::Form;
        Outcome::EditorOpened
    }

    fn submit(&mut self, now: DateTime<Local>) -> Outcome {
        let Some(editor) = self.editor.as_ref() else {
            return Outcome::Ignored;
        };

        match editor.submit(&self.store, now) {
            Ok(appointment) => {
                let id = appointment.id.clone();
                let notice = match editor.is_editing() {
                    true => Notice::new(
                        "Appointment updated",
                        format!("{}'s appointment was updated.", appointment.patient_name),
                    ),
                    false => Notice::new(
                        "Appointment created",
                        format!(
                            "{}'s appointment was booked for {} at {}.",
                            appointment.patient_name, appointment.date, appointment.start_time
                        ),
                    ),
                };
                let outcome = self.store.save_appointment(appointment);
                self.notices.post(notice);
                self.close_editor();
                Outcome::Saved { id, outcome }
            }
            Err(errors) => Outcome::Invalid(errors),
        }
    }

    fn close_editor(&mut self) {
        self.editor = None;
        self.mode = PageMode::Calendar;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;
    use crate::seed;
    use chrono::Duration;

    fn page() -> (AgendaPage, DateTime<Local>) {
        let now = seed::fixed_now();
        let page = AgendaPage::new(seed::clinic_store(now), AgendaConfig::default(), now.date_naive());
        (page, now)
    }

    fn hm(value: &str) -> ClockTime {
        value.parse().unwrap()
    }

    #[test]
    fn starts_on_week_calendar_at_today() {
        let (page, now) = page();
        assert_eq!(page.mode(), PageMode::Calendar);
        assert_eq!(page.view_mode(), ViewMode::Week);
        assert_eq!(page.pivot(), now.date_naive());
        assert_eq!(page.day_columns(now.date_naive()).len(), 7);
    }

    #[test]
    fn c_key_jumps_back_to_today() {
        let (mut page, now) = page();
        page.handle(Event::Navigate(Direction::Next), now).unwrap();
        assert_ne!(page.pivot(), now.date_naive());

        assert_eq!(page.handle(Event::Key('C'), now).unwrap(), Outcome::Changed);
        assert_eq!(page.pivot(), now.date_naive());
    }

    #[test]
    fn c_key_is_ignored_outside_calendar() {
        let (mut page, now) = page();
        page.handle(Event::OpenWaitingList, now).unwrap();
        assert_eq!(page.handle(Event::Key('c'), now).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn empty_slot_opens_create_form() {
        let (mut page, now) = page();
        let today = now.date_naive();
        let outcome = page
            .handle(Event::ClickSlot { date: today, time: hm("09:10") }, now)
            .unwrap();

        assert_eq!(outcome, Outcome::EditorOpened);
        let editor = page.editor().unwrap();
        assert!(!editor.is_editing());
        assert_eq!(editor.start_time(), "09:10");
        assert_eq!(editor.date(), Some(today));
    }

    #[test]
    fn occupied_slot_opens_edit_form() {
        let (mut page, now) = page();
        page.handle(Event::ClickSlot { date: now.date_naive(), time: hm("09:00") }, now)
            .unwrap();
        assert_eq!(page.editor().unwrap().editing_id(), Some("1"));
    }

    #[test]
    fn invalid_submit_keeps_form_and_store() {
        let (mut page, now) = page();
        page.handle(Event::ClickSlot { date: now.date_naive(), time: hm("12:00") }, now)
            .unwrap();

        match page.handle(Event::Submit, now).unwrap() {
            Outcome::Invalid(errors) => assert!(errors.has(Field::Patient)),
            other => panic!("expected invalid, got {:?}", other),
        }
        assert_eq!(page.mode(), PageMode::Form);
        assert_eq!(page.store().appointments().len(), 3);
    }

    #[test]
    fn valid_submit_saves_and_returns_to_calendar() {
        let (mut page, now) = page();
        page.handle(Event::ClickSlot { date: now.date_naive(), time: hm("12:00") }, now)
            .unwrap();
        {
            let editor = page.editor_mut().unwrap();
            editor.select_patient("5");
            editor.select_unit("3");
            editor.select_professional("2");
        }

        let outcome = page.handle(Event::Submit, now).unwrap();
        assert!(matches!(outcome, Outcome::Saved { outcome: SaveOutcome::Inserted, .. }));
        assert_eq!(page.mode(), PageMode::Calendar);
        assert_eq!(page.store().appointments().len(), 4);
        assert_eq!(page.notices().visible()[0].title, "Appointment created");
    }

    #[test]
    fn editing_replaces_in_place() {
        let (mut page, now) = page();
        page.handle(Event::ClickAppointment("2".into()), now).unwrap();
        page.editor_mut().unwrap().set_duration(60);

        let outcome = page.handle(Event::Submit, now).unwrap();
        assert_eq!(
            outcome,
            Outcome::Saved { id: "2".into(), outcome: SaveOutcome::Updated }
        );
        let updated = page.store().appointment("2").unwrap();
        assert_eq!(updated.end_time, hm("11:30"));
        assert_eq!(page.store().appointments().len(), 3);
    }

    #[test]
    fn new_appointment_starts_on_pivot() {
        let (mut page, now) = page();
        let target = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        page.handle(Event::GoTo(target), now).unwrap();

        assert_eq!(page.handle(Event::NewAppointment, now).unwrap(), Outcome::EditorOpened);
        let editor = page.editor().unwrap();
        assert_eq!(editor.date(), Some(target));
        assert_eq!(editor.start_time(), "");

        page.handle(Event::Cancel, now).unwrap();
        assert_eq!(page.mode(), PageMode::Calendar);
        assert!(page.editor().is_none());
    }

    #[test]
    fn unknown_appointment_is_an_error() {
        let (mut page, now) = page();
        assert!(matches!(
            page.handle(Event::ClickAppointment("nope".into()), now),
            Err(AgendaError::AppointmentNotFound(_))
        ));
    }

    #[test]
    fn month_day_click_switches_to_day_view() {
        let (mut page, now) = page();
        page.handle(Event::SetViewMode(ViewMode::Month), now).unwrap();
        let target = now.date_naive() + Duration::days(1);

        page.handle(Event::ClickDay(target), now).unwrap();
        assert_eq!(page.view_mode(), ViewMode::Day);
        assert_eq!(page.pivot(), target);
        assert!(page.editor().is_none());
    }

    #[test]
    fn slot_clicks_do_nothing_in_month_view() {
        let (mut page, now) = page();
        page.handle(Event::SetViewMode(ViewMode::Month), now).unwrap();
        let outcome = page
            .handle(Event::ClickSlot { date: now.date_naive(), time: hm("09:00") }, now)
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored);
    }

    #[test]
    fn unit_filter_drops_professional_outside_unit() {
        let (mut page, now) = page();
        page.handle(Event::SetProfessionalFilter(Some("4".into())), now).unwrap();
        page.handle(Event::SetUnitFilter(Some("1".into())), now).unwrap();
        assert_eq!(page.filter().professional_id.as_deref(), Some("4"));

        page.handle(Event::SetUnitFilter(Some("2".into())), now).unwrap();
        assert_eq!(page.filter().professional_id, None);
        let options: Vec<&str> = page
            .professional_filter_options()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(options, vec!["1", "3"]);
    }

    #[test]
    fn removal_requires_confirmation() {
        let (mut page, now) = page();
        page.handle(Event::OpenWaitingList, now).unwrap();

        let outcome = page.handle(Event::RequestRemoval("1".into()), now).unwrap();
        assert_eq!(
            outcome,
            Outcome::ConfirmationRequired("Remove Ana Ferreira from the waiting list?".into())
        );
        assert_eq!(page.handle(Event::DeclineRemoval, now).unwrap(), Outcome::Aborted);
        assert_eq!(page.store().waiting_list().len(), 2);

        page.handle(Event::RequestRemoval("1".into()), now).unwrap();
        assert_eq!(
            page.handle(Event::ConfirmRemoval, now).unwrap(),
            Outcome::Removed("1".into())
        );
        assert_eq!(page.store().waiting_list().len(), 1);
    }

    #[test]
    fn waiting_list_actions_need_the_waiting_list_screen() {
        let (mut page, now) = page();
        assert_eq!(
            page.handle(Event::CallPatient("2".into()), now).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(
            page.handle(Event::RequestRemoval("1".into()), now).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(page.handle(Event::ConfirmRemoval, now).unwrap(), Outcome::Ignored);
        assert!(page.notices().visible().is_empty());
        assert_eq!(page.notices().pending(), 0);
        assert_eq!(page.store().waiting_list().len(), 2);
    }

    #[test]
    fn today_is_ignored_off_the_calendar() {
        let (mut page, now) = page();
        let target = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        page.handle(Event::GoTo(target), now).unwrap();
        page.handle(Event::OpenWaitingList, now).unwrap();

        assert_eq!(page.handle(Event::Today, now).unwrap(), Outcome::Ignored);
        assert_eq!(page.pivot(), target);

        page.handle(Event::ShowCalendar, now).unwrap();
        assert_eq!(page.handle(Event::Today, now).unwrap(), Outcome::Changed);
        assert_eq!(page.pivot(), now.date_naive());
    }

    #[test]
    fn week_view_at_the_last_representable_date() {
        let (mut page, now) = page();
        page.handle(Event::GoTo(NaiveDate::MAX), now).unwrap();

        let columns = page.day_columns(now.date_naive());
        assert!(!columns.is_empty() && columns.len() <= 7);
        assert!(page.title().ends_with(&NaiveDate::MAX.format("%d/%m/%Y").to_string()));
        assert_eq!(page.handle(Event::Navigate(Direction::Next), now).unwrap(), Outcome::Changed);
        assert_eq!(page.pivot(), NaiveDate::MAX);
    }

    #[test]
    fn call_confirmation_arrives_after_delay() {
        let (mut page, now) = page();
        page.handle(Event::OpenWaitingList, now).unwrap();
        page.handle(Event::CallPatient("2".into()), now).unwrap();
        assert_eq!(page.notices().visible().len(), 1);

        assert_eq!(
            page.handle(Event::Tick, now + Duration::milliseconds(1_999)).unwrap(),
            Outcome::Ignored
        );
        assert_eq!(
            page.handle(Event::Tick, now + Duration::seconds(2)).unwrap(),
            Outcome::Changed
        );
        let titles: Vec<String> = page.take_notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Calling patient", "Patient contacted"]);
    }

    #[test]
    fn f_key_announces_filtered_count() {
        let (mut page, now) = page();
        page.handle(Event::OpenWaitingList, now).unwrap();
        page.handle(
            Event::SetWaitingFilter(WaitingListFilter {
                priority: Some(crate::models::WaitingPriority::High),
                ..WaitingListFilter::default()
            }),
            now,
        )
        .unwrap();

        assert_eq!(
            page.handle(Event::Key('f'), now).unwrap(),
            Outcome::Announcement("Waiting list: 1 patients waiting".into())
        );
    }
}
