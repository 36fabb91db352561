//! Error types for schedule engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::block::{BlockId, UserId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// A window whose start is not strictly before its end.
    #[error("Invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A timestamp or time-of-day string that could not be parsed.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A custom block was submitted without a usable title.
    #[error("A title is required when creating a custom schedule block")]
    MissingHabitReference,

    /// The candidate window overlaps block `existing` of the same owner.
    #[error("Schedule conflicts with existing block {existing}")]
    ScheduleConflict { existing: BlockId },

    #[error("Schedule block not found: {0}")]
    NotFound(BlockId),

    /// Unexpected persistence failure.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScheduleError {
    /// HTTP status a routing layer should answer with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ScheduleError::InvalidWindow { .. }
            | ScheduleError::InvalidTime(_)
            | ScheduleError::InvalidEnvelope(_)
            | ScheduleError::MissingHabitReference => 400,
            ScheduleError::UserNotFound(_) | ScheduleError::NotFound(_) => 404,
            ScheduleError::ScheduleConflict { .. } => 409,
            ScheduleError::Storage(_) | ScheduleError::Config(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
