//! JSON shapes printed by the CLI.
//!
//! Days are `YYYY-MM-DD`, times of day `HH:MM` in the configured zone,
//! durations whole minutes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use stephabit_engine::window::format_time_of_day;
use stephabit_engine::{
    BlockKind, Conflict, FreeWindow, Repeat, SchedulePlan, ScheduleBlock, Suggestion,
};

#[derive(Serialize)]
pub struct BlockView {
    id: u64,
    owner_id: u64,
    #[serde(rename = "type")]
    kind: &'static str,
    habit_id: Option<u64>,
    title: Option<String>,
    day: String,
    start: String,
    end: String,
    duration_minutes: i64,
    repeat: Repeat,
    notes: Option<String>,
}

impl BlockView {
    pub fn new(block: &ScheduleBlock, tz: Tz) -> Self {
        let (kind, habit_id) = match &block.kind {
            BlockKind::Habit(id) => ("habit", Some(*id)),
            BlockKind::Custom { habit_id, .. } => ("custom", *habit_id),
        };
        Self {
            id: block.id,
            owner_id: block.owner_id,
            kind,
            habit_id,
            title: block.title.clone(),
            day: block.start().with_timezone(&tz).date_naive().to_string(),
            start: format_time_of_day(block.start(), tz),
            end: format_time_of_day(block.end(), tz),
            duration_minutes: block.window.duration_minutes(),
            repeat: block.repeat.clone(),
            notes: block.notes.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct FreeWindowView {
    day: String,
    start: String,
    end: String,
    duration_minutes: i64,
}

impl FreeWindowView {
    pub fn new(window: &FreeWindow, tz: Tz) -> Self {
        Self {
            day: window.day.to_string(),
            start: format_time_of_day(window.window.start(), tz),
            end: format_time_of_day(window.window.end(), tz),
            duration_minutes: window.duration_minutes,
        }
    }
}

#[derive(Serialize)]
pub struct ConflictView {
    day: String,
    first: BlockView,
    second: BlockView,
    overlap_minutes: i64,
}

impl ConflictView {
    pub fn new(conflict: &Conflict, tz: Tz) -> Self {
        Self {
            day: conflict.day.to_string(),
            first: BlockView::new(&conflict.first, tz),
            second: BlockView::new(&conflict.second, tz),
            overlap_minutes: conflict.overlap_minutes,
        }
    }
}

#[derive(Serialize)]
pub struct SuggestionView {
    id: String,
    title: String,
    suggested_start: String,
    suggested_end: String,
    duration_minutes: i64,
}

impl SuggestionView {
    pub fn new(suggestion: &Suggestion, tz: Tz) -> Self {
        Self {
            id: suggestion.id.clone(),
            title: suggestion.title.clone(),
            suggested_start: local_stamp(suggestion.window.start(), tz),
            suggested_end: local_stamp(suggestion.window.end(), tz),
            duration_minutes: suggestion.duration_minutes,
        }
    }
}

#[derive(Serialize)]
pub struct PlanView {
    owner_id: u64,
    free_windows: Vec<FreeWindowView>,
    conflicts: Vec<ConflictView>,
    suggestions: Vec<SuggestionView>,
}

impl PlanView {
    pub fn new(plan: &SchedulePlan, tz: Tz) -> Self {
        Self {
            owner_id: plan.owner_id,
            free_windows: plan.free_windows.iter().map(|w| FreeWindowView::new(w, tz)).collect(),
            conflicts: plan.conflicts.iter().map(|c| ConflictView::new(c, tz)).collect(),
            suggestions: plan.suggestions.iter().map(|s| SuggestionView::new(s, tz)).collect(),
        }
    }
}

/// `YYYY-MM-DDTHH:MM` in `tz`.
fn local_stamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%Y-%m-%dT%H:%M").to_string()
}
