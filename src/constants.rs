//! Fixed scheduling constants shared by the calendar axis and the editor.

/// Hour of the first slot on the time axis.
pub const AXIS_START_HOUR: u32 = 7;

/// Length of one slot, in minutes.
pub const SLOT_MINUTES: u32 = 10;

/// Number of slots on the time axis (07:00 through 15:50).
pub const SLOT_COUNT: usize = 54;

/// Shortest bookable appointment, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 10;

/// Longest bookable appointment, in minutes (one day).
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Duration the editor starts with when nothing else is known.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Durations offered by the editor, in minutes.
pub const DURATION_PRESETS: [u32; 7] = [10, 20, 30, 45, 60, 90, 120];

/// Base z-order of an appointment block; stacked blocks count up from here.
pub const BASE_Z_INDEX: u32 = 10;

/// Gap left at the bottom of an appointment block, in pixels.
pub const BLOCK_GAP_PX: u32 = 2;

pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
