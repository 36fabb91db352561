//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! timezone = "Europe/Berlin"
//! conflict_mode = "pairwise"
//!
//! [envelope]
//! start = "07:00"
//! end = "21:30"
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::conflict::ConflictMode;
use crate::error::{Result, ScheduleError};
use crate::suggest::DEFAULT_SUGGESTION_LIMIT;
use crate::window::DayEnvelope;

/// Effective length of a block whose end is missing or unparseable.
pub const DEFAULT_OPEN_ENDED_MINUTES: i64 = 45;
/// Length of a created block when neither an end nor a duration is given.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;
/// Upper bound for both configured block lengths: one day.
pub const MAX_BLOCK_MINUTES: i64 = 24 * 60;
/// Row cap for owner-scoped block queries.
pub const DEFAULT_QUERY_LIMIT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Zone that defines calendar days and the envelope's wall-clock times.
    pub timezone: Tz,
    pub envelope: DayEnvelope,
    pub open_ended_minutes: i64,
    pub default_duration_minutes: i64,
    pub conflict_mode: ConflictMode,
    pub suggestion_limit: usize,
    pub query_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            envelope: DayEnvelope::default(),
            open_ended_minutes: DEFAULT_OPEN_ENDED_MINUTES,
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            conflict_mode: ConflictMode::default(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            query_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(raw).map_err(|e| ScheduleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScheduleError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    /// Reject durations and limits that would make the engine misbehave.
    pub fn validate(&self) -> Result<()> {
        for (key, minutes) in [
            ("open_ended_minutes", self.open_ended_minutes),
            ("default_duration_minutes", self.default_duration_minutes),
        ] {
            if !(1..=MAX_BLOCK_MINUTES).contains(&minutes) {
                return Err(ScheduleError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    key, MAX_BLOCK_MINUTES, minutes
                )));
            }
        }
        if self.query_limit == 0 {
            return Err(ScheduleError::Config(
                "query_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse an IANA zone name.
    pub fn parse_timezone(name: &str) -> Result<Tz> {
        name.parse::<Tz>()
            .map_err(|_| ScheduleError::Config(format!("unknown timezone: {}", name)))
    }
}
