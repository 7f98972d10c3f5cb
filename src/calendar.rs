//! Calendar grid construction for the agenda.
//!
//! Given a pivot date and a view mode this module produces the dates to
//! draw, the fixed time-of-day axis, and the navigation rules that move the
//! pivot backwards and forwards.

use crate::constants::{AXIS_START_HOUR, SLOT_COUNT, SLOT_MINUTES};
use crate::error::{AgendaError, AgendaResult};
use crate::models::ClockTime;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

impl ViewMode {
    pub fn from_string(value: &str) -> AgendaResult<Self> {
        match value.to_lowercase().trim() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            _ => Err(AgendaError::InvalidInput(format!(
                "invalid view mode: '{}'. Must be one of: day, week, month",
                value
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Day => "Day",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// First day (Sunday) of the week containing `date`.
///
/// Clamped to the earliest representable date.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date.checked_sub_signed(Duration::days(i64::from(offset)))
        .unwrap_or(NaiveDate::MIN)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = month_start(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        None => 31,
    }
}

/// Dates shown for `mode` around `pivot`, ascending and contiguous.
///
/// Dates past the end of the representable range are left out.
pub fn visible_dates(pivot: NaiveDate, mode: ViewMode) -> Vec<NaiveDate> {
    let (start, count) = match mode {
        ViewMode::Day => (pivot, 1),
        ViewMode::Week => (week_start(pivot), 7),
        ViewMode::Month => (month_start(pivot), days_in_month(pivot)),
    };

    (0..count)
        .map_while(|offset| start.checked_add_signed(Duration::days(i64::from(offset))))
        .collect()
}

/// One rendered date with the flags the grid needs to highlight it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub is_today: bool,
    pub is_current_month: bool,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, pivot: NaiveDate, today: NaiveDate) -> Self {
        CalendarDay {
            date,
            weekday: date.weekday(),
            is_today: date == today,
            is_current_month: date.year() == pivot.year() && date.month() == pivot.month(),
        }
    }
}

pub fn calendar_days(pivot: NaiveDate, mode: ViewMode, today: NaiveDate) -> Vec<CalendarDay> {
    visible_dates(pivot, mode)
        .into_iter()
        .map(|date| CalendarDay::new(date, pivot, today))
        .collect()
}

/// Lay month days out in Sunday-first rows of seven.
///
/// Cells before the first and after the last day of the month are `None`.
pub fn month_rows(days: &[CalendarDay]) -> Vec<[Option<CalendarDay>; 7]> {
    let mut rows = Vec::new();
    let mut row: [Option<CalendarDay>; 7] = [None; 7];

    for day in days {
        let column = day.weekday.num_days_from_sunday() as usize;
        if column == 0 && row.iter().any(Option::is_some) {
            rows.push(row);
            row = [None; 7];
        }
        row[column] = Some(*day);
    }

    if row.iter().any(Option::is_some) {
        rows.push(row);
    }

    rows
}

/// Heading shown above the grid.
pub fn header_title(pivot: NaiveDate, mode: ViewMode) -> String {
    match mode {
        ViewMode::Day => pivot.format("%d/%m/%Y").to_string(),
        ViewMode::Week => {
            let start = week_start(pivot);
            let end = start
                .checked_add_signed(Duration::days(6))
                .unwrap_or(NaiveDate::MAX);
            format!("{} - {}", start.format("%d/%m"), end.format("%d/%m/%Y"))
        }
        ViewMode::Month => pivot.format("%B %Y").to_string(),
    }
}

/// Time of the slot at `index` on the axis.
pub fn slot_time(index: usize) -> Option<ClockTime> {
    if index >= SLOT_COUNT {
        return None;
    }
    let per_hour = (60 / SLOT_MINUTES) as usize;
    let hour = AXIS_START_HOUR + (index / per_hour) as u32;
    let minute = (index % per_hour) as u32 * SLOT_MINUTES;
    ClockTime::from_hm(hour, minute)
}

/// The fixed time-of-day axis shared by the day and week views.
pub fn time_axis() -> Vec<ClockTime> {
    (0..SLOT_COUNT).filter_map(slot_time).collect()
}

/// Holds the pivot date and moves it according to the view mode.
///
/// Month steps keep the day-of-month the navigation started from, clamped
/// to the length of the target month, so stepping back and forth always
/// returns to the starting date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    pivot: NaiveDate,
    anchor_day: u32,
}

impl Navigator {
    pub fn new(pivot: NaiveDate) -> Self {
        Navigator {
            pivot,
            anchor_day: pivot.day(),
        }
    }

    pub fn pivot(&self) -> NaiveDate {
        self.pivot
    }

    pub fn set_pivot(&mut self, pivot: NaiveDate) {
        self.pivot = pivot;
        self.anchor_day = pivot.day();
    }

    /// Reset the pivot to `today`.
    pub fn go_to_today(&mut self, today: NaiveDate) {
        debug!(%today, "calendar jumped to today");
        self.set_pivot(today);
    }

    pub fn navigate(&mut self, mode: ViewMode, direction: Direction) -> NaiveDate {
        let step = match direction {
            Direction::Prev => -1,
            Direction::Next => 1,
        };

        match mode {
            ViewMode::Day => self.shift_days(step),
            ViewMode::Week => self.shift_days(7 * step),
            ViewMode::Month => {
                let first = month_start(self.pivot);
                let target = match direction {
                    Direction::Prev => first.checked_sub_months(Months::new(1)),
                    Direction::Next => first.checked_add_months(Months::new(1)),
                }
                .unwrap_or(first);
                let day = self.anchor_day.min(days_in_month(target));
                self.pivot = target.with_day(day).unwrap_or(target);
            }
        }

        debug!(pivot = %self.pivot, ?mode, ?direction, "calendar navigated");
        self.pivot
    }

    fn shift_days(&mut self, days: i64) {
        let shifted = self
            .pivot
            .checked_add_signed(Duration::days(days))
            .unwrap_or(self.pivot);
        self.set_pivot(shifted);
    }
}
