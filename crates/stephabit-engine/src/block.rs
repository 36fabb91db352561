//! Schedule blocks: one materialized occurrence of a habit or a custom busy event.

use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::window::{parse_instant, TimeWindow};

pub type UserId = u64;
pub type BlockId = u64;
pub type HabitId = u64;

/// What a block is an occurrence of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Habit(HabitId),
    /// A custom event. Blocks created through the service link the habit
    /// found or created for `title`.
    Custom {
        title: String,
        habit_id: Option<HabitId>,
    },
}

/// Recurrence metadata. The engine works on single occurrences and never
/// expands these.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    #[default]
    Once,
    Daily,
    Weekly,
    Custom(Vec<Weekday>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub id: BlockId,
    pub owner_id: UserId,
    pub window: TimeWindow,
    pub kind: BlockKind,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub notes: Option<String>,
    /// Display title: the joined habit title, or the custom title.
    #[serde(default)]
    pub title: Option<String>,
}

impl ScheduleBlock {
    pub fn start(&self) -> DateTime<Utc> {
        self.window.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.window.end()
    }

    /// The block as a loose record, with RFC 3339 timestamps.
    pub fn to_record(&self) -> BlockRecord {
        let (habit_id, title) = match &self.kind {
            BlockKind::Habit(id) => (Some(*id), self.title.clone()),
            BlockKind::Custom { title, habit_id } => (*habit_id, Some(title.clone())),
        };
        BlockRecord {
            id: Some(self.id),
            owner_id: self.owner_id,
            start: self.start().to_rfc3339(),
            end: Some(self.end().to_rfc3339()),
            habit_id,
            title,
            custom: matches!(self.kind, BlockKind::Custom { .. }),
            repeat: self.repeat.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// A block as it arrives from outside: string timestamps, optional end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(default)]
    pub id: Option<BlockId>,
    pub owner_id: UserId,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub habit_id: Option<HabitId>,
    #[serde(default)]
    pub title: Option<String>,
    /// Marks a custom event even when it links a habit.
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BlockRecord {
    /// Materialize the record into a block with id `id`.
    ///
    /// A missing or unparseable end falls back to `start + open_ended_minutes`.
    ///
    /// # Errors
    /// - `InvalidTime` when the start cannot be parsed.
    /// - `InvalidWindow` when an explicit end is not after the start.
    /// - `MissingHabitReference` when the record has neither a habit nor a title.
    pub fn into_block(self, id: BlockId, tz: Tz, open_ended_minutes: i64) -> Result<ScheduleBlock> {
        let start = parse_instant(&self.start, tz)?;
        let window = match self.end.as_deref().map(|end| parse_instant(end, tz)) {
            Some(Ok(end)) => TimeWindow::new(start, end)?,
            _ => TimeWindow::starting_at(start, open_ended_minutes)?,
        };

        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let kind = match (self.habit_id, title.clone()) {
            (Some(habit_id), Some(title)) if self.custom => BlockKind::Custom {
                title,
                habit_id: Some(habit_id),
            },
            (Some(habit_id), _) => BlockKind::Habit(habit_id),
            (None, Some(title)) => BlockKind::Custom {
                title,
                habit_id: None,
            },
            (None, None) => return Err(ScheduleError::MissingHabitReference),
        };

        Ok(ScheduleBlock {
            id: self.id.unwrap_or(id),
            owner_id: self.owner_id,
            window,
            kind,
            repeat: self.repeat,
            notes: self.notes,
            title,
        })
    }
}

/// How a creation candidate references its habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    Habit(HabitId),
    /// Custom event; the title is find-or-created as a habit of the owner.
    Custom { title: Option<String> },
}

/// A block submitted for creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub owner_id: UserId,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub kind: CandidateKind,
    pub repeat: Repeat,
    pub notes: Option<String>,
}

impl NewBlock {
    /// Candidate with an explicit end and default metadata.
    pub fn new(owner_id: UserId, start: DateTime<Utc>, end: DateTime<Utc>, kind: CandidateKind) -> Self {
        Self {
            owner_id,
            start,
            end: Some(end),
            duration_minutes: None,
            kind,
            repeat: Repeat::Once,
            notes: None,
        }
    }

    /// Explicit end, else `start + duration_minutes`, else `start + default_minutes`.
    pub fn resolve_window(&self, default_minutes: i64) -> Result<TimeWindow> {
        match (self.end, self.duration_minutes) {
            (Some(end), _) => TimeWindow::new(self.start, end),
            (None, Some(minutes)) => TimeWindow::starting_at(self.start, minutes),
            (None, None) => TimeWindow::starting_at(self.start, default_minutes),
        }
    }
}

/// A validated block ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDraft {
    pub owner_id: UserId,
    pub window: TimeWindow,
    pub kind: BlockKind,
    pub repeat: Repeat,
    pub notes: Option<String>,
    pub title: Option<String>,
}

impl BlockDraft {
    pub fn into_block(self, id: BlockId) -> ScheduleBlock {
        ScheduleBlock {
            id,
            owner_id: self.owner_id,
            window: self.window,
            kind: self.kind,
            repeat: self.repeat,
            notes: self.notes,
            title: self.title,
        }
    }
}
