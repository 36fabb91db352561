//! Turn free windows into suggested activities.
//!
//! The policy is a placeholder: categories alternate by position, with no
//! weighting by window length, time of day or history.

use serde::{Deserialize, Serialize};

use crate::freebusy::FreeWindow;
use crate::window::TimeWindow;

/// Default number of suggestions returned.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    DeepWork,
    MovementBreak,
}

impl SuggestionCategory {
    /// Even positions get deep work, odd positions a movement break.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            SuggestionCategory::DeepWork
        } else {
            SuggestionCategory::MovementBreak
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SuggestionCategory::DeepWork => "Deep Work",
            SuggestionCategory::MovementBreak => "Movement break",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// `"{day}-{index}"`.
    pub id: String,
    pub title: String,
    pub category: SuggestionCategory,
    pub window: TimeWindow,
    pub duration_minutes: i64,
}

/// Map the first `limit` free windows to suggestions.
pub fn suggest_blocks(windows: &[FreeWindow], limit: usize) -> Vec<Suggestion> {
    windows
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, slot)| {
            let category = SuggestionCategory::for_index(index);
            Suggestion {
                id: format!("{}-{}", slot.day, index),
                title: category.title().to_string(),
                category,
                window: slot.window,
                duration_minutes: slot.duration_minutes,
            }
        })
        .collect()
}
