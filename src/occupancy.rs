//! Slot occupancy: which appointments sit in which calendar cell.
//!
//! Appointments are matched to a cell by exact (date, start time) identity.
//! An appointment longer than one slot is placed once, in its starting cell,
//! with a block height proportional to its duration. Several appointments in
//! the same cell are all kept and stacked; nothing here rejects a double
//! booking.

use crate::calendar::{time_axis, CalendarDay};
use crate::config::AgendaConfig;
use crate::constants::{BASE_Z_INDEX, BLOCK_GAP_PX, SLOT_MINUTES};
use crate::models::{Appointment, ClockTime};
use chrono::NaiveDate;

/// Optional unit and professional restriction applied to every cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotFilter {
    pub unit_id: Option<String>,
    pub professional_id: Option<String>,
}

impl SlotFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        self.unit_id
            .as_deref()
            .map_or(true, |id| appointment.unit_id == id)
            && self
                .professional_id
                .as_deref()
                .map_or(true, |id| appointment.professional_id == id)
    }
}

/// Appointments starting exactly at `time` on `date`, in collection order.
pub fn occupants<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    time: ClockTime,
    filter: &SlotFilter,
) -> Vec<&'a Appointment> {
    appointments
        .iter()
        .filter(|a| a.starts_at(date, time) && filter.matches(a))
        .collect()
}

/// Appointments on `date`, ordered by start time.
pub fn day_appointments<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    filter: &SlotFilter,
) -> Vec<&'a Appointment> {
    let mut found: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.date == date && filter.matches(a))
        .collect();
    found.sort_by_key(|a| a.start_time);
    found
}

/// Pixel placement of an appointment block inside its starting cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub top_px: u32,
    pub height_px: u32,
    pub z_index: u32,
}

/// Layout of the `stack_index`-th block in a cell.
///
/// Values saturate at `u32::MAX` instead of overflowing.
pub fn block_layout(stack_index: usize, duration_minutes: u32, config: &AgendaConfig) -> BlockLayout {
    let full_height = u64::from(duration_minutes)
        .saturating_mul(u64::from(config.row_height_px()))
        / u64::from(SLOT_MINUTES);
    let index = u32::try_from(stack_index).unwrap_or(u32::MAX);

    BlockLayout {
        top_px: index.saturating_mul(config.stack_offset_px()),
        height_px: clamp_px(full_height).saturating_sub(BLOCK_GAP_PX),
        z_index: BASE_Z_INDEX.saturating_add(index),
    }
}

fn clamp_px(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAppointment<'a> {
    pub appointment: &'a Appointment,
    pub layout: BlockLayout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotCell<'a> {
    pub time: ClockTime,
    pub placed: Vec<PlacedAppointment<'a>>,
}

impl SlotCell<'_> {
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

/// One date of the day or week view: a cell per axis slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn<'a> {
    pub day: CalendarDay,
    pub cells: Vec<SlotCell<'a>>,
}

pub fn day_column<'a>(
    appointments: &'a [Appointment],
    day: CalendarDay,
    filter: &SlotFilter,
    config: &AgendaConfig,
) -> DayColumn<'a> {
    let cells = time_axis()
        .into_iter()
        .map(|time| {
            let placed = occupants(appointments, day.date, time, filter)
                .into_iter()
                .enumerate()
                .map(|(index, appointment)| PlacedAppointment {
                    appointment,
                    layout: block_layout(index, appointment.duration, config),
                })
                .collect();
            SlotCell { time, placed }
        })
        .collect();

    DayColumn { day, cells }
}

/// One date of the month view: a short preview plus how many were left out.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell<'a> {
    pub day: CalendarDay,
    pub preview: Vec<&'a Appointment>,
    pub overflow: usize,
}

pub fn month_cell<'a>(
    appointments: &'a [Appointment],
    day: CalendarDay,
    filter: &SlotFilter,
    config: &AgendaConfig,
) -> MonthCell<'a> {
    let mut all = day_appointments(appointments, day.date, filter);
    let limit = config.month_preview_limit();
    let overflow = all.len().saturating_sub(limit);
    all.truncate(limit);

    MonthCell {
        day,
        preview: all,
        overflow,
    }
}

/// What a click on a day/week cell lands on.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotClick<'a> {
    Empty { date: NaiveDate, time: ClockTime },
    Appointment(&'a Appointment),
}

/// Resolve a click on the cell at (`date`, `time`).
///
/// An occupied cell yields the top-most block, which is the last one stacked.
pub fn resolve_slot_click<'a>(
    appointments: &'a [Appointment],
    date: NaiveDate,
    time: ClockTime,
    filter: &SlotFilter,
) -> SlotClick<'a> {
    match occupants(appointments, date, time, filter).last() {
        Some(top) => SlotClick::Appointment(top),
        None => SlotClick::Empty { date, time },
    }
}
