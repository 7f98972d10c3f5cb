//! Plain-text rendering of the agenda for the terminal.

use crate::agenda::{AgendaPage, PageMode};
use crate::calendar::{month_rows, time_axis, CalendarDay, ViewMode};
use crate::constants::{DURATION_PRESETS, WEEKDAY_HEADERS};
use crate::editor::AppointmentEditor;
use crate::models::{Appointment, AppointmentStatus, AppointmentType};
use crate::occupancy::{DayColumn, MonthCell};
use crate::store::ClinicStore;
use crate::waiting_list::WaitingRow;
use chrono::{Datelike, NaiveDate};

const CELL_WIDTH: usize = 16;
const TIME_WIDTH: usize = 5;

/// Truncate or pad `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    format!("{:<width$}", cut, width = width)
}

fn day_heading(day: &CalendarDay) -> String {
    let marker = if day.is_today { "*" } else { "" };
    format!("{}{}", day.date.format("%a %d/%m"), marker)
}

pub fn legend() -> String {
    let entries: Vec<String> = AppointmentStatus::ALL
        .iter()
        .map(|status| format!("{} ({})", status.label(), status.tone().name()))
        .collect();
    format!("Legend: {}", entries.join(" | "))
}

/// One line describing an appointment, with names resolved live.
pub fn appointment_line(appointment: &Appointment, store: &ClinicStore) -> String {
    format!(
        "{} {} {}-{}  {}  {} @ {}  {} [{}]",
        appointment.id,
        appointment.date.format("%d/%m/%Y"),
        appointment.start_time,
        appointment.end_time,
        store.patient_name_for(appointment),
        store.professional_name_for(appointment),
        store.unit_name_for(appointment),
        appointment.kind.label(),
        appointment.status.label(),
    )
}

/// Day or week grid: the time axis down the side, one column per date.
///
/// Only the starting cell of an appointment shows it; further occupants of
/// the same cell are summarized as `+N`.
pub fn time_grid(title: &str, columns: &[DayColumn<'_>], store: &ClinicStore) -> String {
    let mut out = format!("{}\n", title);

    out.push_str(&fit("", TIME_WIDTH));
    for column in columns {
        out.push_str(" | ");
        out.push_str(&fit(&day_heading(&column.day), CELL_WIDTH));
    }
    out.push('\n');
    out.push_str(&"-".repeat(TIME_WIDTH + columns.len() * (CELL_WIDTH + 3)));
    out.push('\n');

    for (row, time) in time_axis().into_iter().enumerate() {
        out.push_str(&time.to_string());
        for column in columns {
            out.push_str(" | ");
            let placed = column.cells.get(row).map_or(&[][..], |cell| &cell.placed[..]);
            let text = match placed {
                [] => String::new(),
                [only] => store.patient_name_for(only.appointment).to_string(),
                [.., top] => format!(
                    "{} +{}",
                    store.patient_name_for(top.appointment),
                    placed.len() - 1
                ),
            };
            out.push_str(&fit(&text, CELL_WIDTH));
        }
        out.push('\n');
    }
    out
}

/// Month grid: week rows of day cells with a short appointment preview.
pub fn month_grid(title: &str, cells: &[MonthCell<'_>], store: &ClinicStore) -> String {
    let mut out = format!("{}\n", title);
    let headers: Vec<String> = WEEKDAY_HEADERS.iter().map(|h| fit(h, CELL_WIDTH)).collect();
    out.push_str(&headers.join(" | "));
    out.push('\n');

    let days: Vec<CalendarDay> = cells.iter().map(|cell| cell.day).collect();
    for week in month_rows(&days) {
        let lines: Vec<Vec<String>> = week
            .iter()
            .map(|slot| match slot {
                Some(day) => cells
                    .iter()
                    .find(|cell| cell.day.date == day.date)
                    .map(|cell| month_cell_lines(cell, store))
                    .unwrap_or_default(),
                None => Vec::new(),
            })
            .collect();
        let height = lines.iter().map(Vec::len).max().unwrap_or(0);

        for line in 0..height {
            let row: Vec<String> = lines
                .iter()
                .map(|cell| fit(cell.get(line).map_or("", String::as_str), CELL_WIDTH))
                .collect();
            out.push_str(row.join(" | ").trim_end());
            out.push('\n');
        }
        out.push_str(&"-".repeat(7 * CELL_WIDTH + 18));
        out.push('\n');
    }
    out
}

fn month_cell_lines(cell: &MonthCell<'_>, store: &ClinicStore) -> Vec<String> {
    let mut day = format!("{:>2}", cell.day.date.day());
    if cell.day.is_today {
        day.push('*');
    }
    if !cell.day.is_current_month {
        day = format!("({})", day.trim());
    }

    let mut lines = vec![day];
    lines.extend(
        cell.preview
            .iter()
            .map(|a| format!("{} {}", a.start_time, store.patient_name_for(a))),
    );
    if cell.overflow > 0 {
        lines.push(format!("+{} more", cell.overflow));
    }
    lines
}

pub fn waiting_list(rows: &[WaitingRow<'_>]) -> String {
    if rows.is_empty() {
        return "No patients waiting.\n".to_string();
    }

    let mut out = String::new();
    for row in rows {
        let entry = row.entry;
        let professional = row.professional.map_or_else(
            || "Unknown professional".to_string(),
            |p| format!("{} - {}", p.name, p.specialty),
        );
        let dates: Vec<String> = entry
            .preferred_dates
            .iter()
            .map(|d| d.format("%d/%m").to_string())
            .collect();
        let times: Vec<String> = entry.preferred_times.iter().map(|t| t.to_string()).collect();

        out.push_str(&format!(
            "{:<3} [{}] {}  {}\n      {}  {}  dates: {}  times: {}\n",
            entry.id,
            entry.priority.name(),
            entry.patient_name,
            entry.patient_phone,
            professional,
            entry.kind.label(),
            dates.join(", "),
            times.join(", "),
        ));
    }
    out
}

pub fn editor_form(editor: &AppointmentEditor, store: &ClinicStore) -> String {
    let title = if editor.is_editing() {
        "Edit appointment"
    } else {
        "New appointment"
    };
    let name_or_dash = |name: Option<&str>| name.unwrap_or("-").to_string();

    let patient = name_or_dash(store.patient(editor.patient_id()).map(|p| p.name.as_str()));
    let unit = name_or_dash(store.unit(editor.unit_id()).map(|u| u.name.as_str()));
    let professional = name_or_dash(
        store
            .professional(editor.professional_id())
            .map(|p| p.name.as_str()),
    );
    let date = editor
        .date()
        .map_or_else(|| "-".to_string(), |d| d.format("%d/%m/%Y").to_string());
    let presets: Vec<String> = DURATION_PRESETS.iter().map(|m| m.to_string()).collect();
    let kinds: Vec<&str> = AppointmentType::ALL.iter().map(|k| k.label()).collect();

    let mut out = format!("{}\n", title);
    out.push_str(&format!("  Patient:      {}\n", patient));
    out.push_str(&format!("  Unit:         {}\n", unit));
    out.push_str(&format!("  Professional: {}\n", professional));
    out.push_str(&format!("  Date:         {}\n", date));
    out.push_str(&format!("  Time:         {}\n", editor.start_time()));
    out.push_str(&format!(
        "  Duration:     {} min (presets: {})\n",
        editor.duration(),
        presets.join(", ")
    ));
    out.push_str(&format!(
        "  Type:         {} ({})\n",
        editor.kind().label(),
        kinds.join(", ")
    ));
    out
}

/// Whatever the page currently shows.
pub fn page(page: &AgendaPage, today: NaiveDate) -> String {
    match page.mode() {
        PageMode::Form => match page.editor() {
            Some(editor) => editor_form(editor, page.store()),
            None => String::new(),
        },
        PageMode::WaitingList => {
            let rows = page.waiting_rows();
            format!("Waiting list ({})\n{}", rows.len(), waiting_list(&rows))
        }
        PageMode::Calendar => {
            let body = match page.view_mode() {
                ViewMode::Month => {
                    month_grid(&page.title(), &page.month_cells(today), page.store())
                }
                ViewMode::Day | ViewMode::Week => {
                    time_grid(&page.title(), &page.day_columns(today), page.store())
                }
            };
            format!("{}{}\n", body, legend())
        }
    }
}
