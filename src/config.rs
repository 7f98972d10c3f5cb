//! Agenda runtime configuration.
//!
//! Configuration is resolved once at startup and passed into the page. Library
//! code never reads process environment variables itself; the binary hands a
//! lookup function to [`AgendaConfig::from_env_values`] after loading `.env`.

use crate::calendar::ViewMode;
use crate::error::{AgendaError, AgendaResult};
use chrono::Duration;

pub const ENV_ROW_HEIGHT_PX: &str = "AGENDA_ROW_HEIGHT_PX";
pub const ENV_STACK_OFFSET_PX: &str = "AGENDA_STACK_OFFSET_PX";
pub const ENV_MONTH_PREVIEW_LIMIT: &str = "AGENDA_MONTH_PREVIEW_LIMIT";
pub const ENV_CALL_DELAY_MS: &str = "AGENDA_CALL_DELAY_MS";
pub const ENV_DEFAULT_VIEW: &str = "AGENDA_DEFAULT_VIEW";

/// Longest accepted call confirmation delay (one day).
pub const MAX_CALL_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Presentation and timer settings for the agenda.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgendaConfig {
    row_height_px: u32,
    stack_offset_px: u32,
    month_preview_limit: usize,
    call_delay_ms: u64,
    default_view: ViewMode,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            row_height_px: 48,
            stack_offset_px: 4,
            month_preview_limit: 3,
            call_delay_ms: 2_000,
            default_view: ViewMode::Week,
        }
    }
}

impl AgendaConfig {
    pub fn new(
        row_height_px: u32,
        stack_offset_px: u32,
        month_preview_limit: usize,
        call_delay_ms: u64,
        default_view: ViewMode,
    ) -> AgendaResult<Self> {
        if row_height_px == 0 {
            return Err(AgendaError::InvalidConfig {
                key: ENV_ROW_HEIGHT_PX.into(),
                message: "row height must be positive".into(),
            });
        }
        if month_preview_limit == 0 {
            return Err(AgendaError::InvalidConfig {
                key: ENV_MONTH_PREVIEW_LIMIT.into(),
                message: "month preview limit must be positive".into(),
            });
        }
        if call_delay_ms > MAX_CALL_DELAY_MS {
            return Err(AgendaError::InvalidConfig {
                key: ENV_CALL_DELAY_MS.into(),
                message: format!("call delay must not exceed {} ms", MAX_CALL_DELAY_MS),
            });
        }

        Ok(AgendaConfig {
            row_height_px,
            stack_offset_px,
            month_preview_limit,
            call_delay_ms,
            default_view,
        })
    }

    /// Build a configuration from raw variable values.
    ///
    /// `lookup` returns the value of a variable if set. Missing or blank values
    /// fall back to the defaults; anything else must parse.
    pub fn from_env_values(lookup: impl Fn(&str) -> Option<String>) -> AgendaResult<Self> {
        let defaults = AgendaConfig::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let row_height_px = parse_number(ENV_ROW_HEIGHT_PX, value(ENV_ROW_HEIGHT_PX))?
            .unwrap_or(defaults.row_height_px);
        let stack_offset_px = parse_number(ENV_STACK_OFFSET_PX, value(ENV_STACK_OFFSET_PX))?
            .unwrap_or(defaults.stack_offset_px);
        let month_preview_limit =
            parse_number(ENV_MONTH_PREVIEW_LIMIT, value(ENV_MONTH_PREVIEW_LIMIT))?
                .unwrap_or(defaults.month_preview_limit);
        let call_delay_ms = parse_number(ENV_CALL_DELAY_MS, value(ENV_CALL_DELAY_MS))?
            .unwrap_or(defaults.call_delay_ms);
        let default_view = match value(ENV_DEFAULT_VIEW) {
            Some(raw) => ViewMode::from_string(&raw).map_err(|e| AgendaError::InvalidConfig {
                key: ENV_DEFAULT_VIEW.into(),
                message: e.to_string(),
            })?,
            None => defaults.default_view,
        };

        AgendaConfig::new(
            row_height_px,
            stack_offset_px,
            month_preview_limit,
            call_delay_ms,
            default_view,
        )
    }

    pub fn row_height_px(&self) -> u32 {
        self.row_height_px
    }

    pub fn stack_offset_px(&self) -> u32 {
        self.stack_offset_px
    }

    pub fn month_preview_limit(&self) -> usize {
        self.month_preview_limit
    }

    /// Delay before the "patient contacted" notice of a call is delivered.
    pub fn call_confirmation_delay(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.call_delay_ms).unwrap_or(i64::MAX))
    }

    pub fn default_view(&self) -> ViewMode {
        self.default_view
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: Option<String>) -> AgendaResult<Option<T>> {
    raw.map(|v| {
        v.parse::<T>().map_err(|_| AgendaError::InvalidConfig {
            key: key.into(),
            message: format!("'{}' is not a valid number", v),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = AgendaConfig::from_env_values(lookup(&[])).unwrap();
        assert_eq!(config, AgendaConfig::default());
        assert_eq!(config.call_confirmation_delay(), Duration::seconds(2));
        assert_eq!(config.default_view(), ViewMode::Week);
    }

    #[test]
    fn values_override_defaults() {
        let config = AgendaConfig::from_env_values(lookup(&[
            (ENV_ROW_HEIGHT_PX, "12"),
            (ENV_MONTH_PREVIEW_LIMIT, " 5 "),
            (ENV_DEFAULT_VIEW, "month"),
            (ENV_CALL_DELAY_MS, ""),
        ]))
        .unwrap();

        assert_eq!(config.row_height_px(), 12);
        assert_eq!(config.month_preview_limit(), 5);
        assert_eq!(config.default_view(), ViewMode::Month);
        assert_eq!(config.call_confirmation_delay(), Duration::seconds(2));
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = AgendaConfig::from_env_values(lookup(&[(ENV_STACK_OFFSET_PX, "four")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_STACK_OFFSET_PX));

        assert!(AgendaConfig::from_env_values(lookup(&[(ENV_DEFAULT_VIEW, "year")])).is_err());
        assert!(AgendaConfig::from_env_values(lookup(&[(ENV_ROW_HEIGHT_PX, "0")])).is_err());
    }

    #[test]
    fn call_delay_is_bounded_to_a_day() {
        let err = AgendaConfig::from_env_values(lookup(&[(
            ENV_CALL_DELAY_MS,
            "9223372036854775807",
        )]))
        .unwrap_err();
        assert!(matches!(err, AgendaError::InvalidConfig { ref key, .. } if key == ENV_CALL_DELAY_MS));

        let longest =
            AgendaConfig::from_env_values(lookup(&[(ENV_CALL_DELAY_MS, "86400000")])).unwrap();
        assert_eq!(longest.call_confirmation_delay(), Duration::days(1));
    }
}
