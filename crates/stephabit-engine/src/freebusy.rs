//! Compute free windows from a day's schedule blocks.
//!
//! Walks the day's blocks in start order with a cursor that begins at the
//! envelope start. Every gap between the cursor and the next block start is a
//! free window; the cursor then jumps to the furthest block end seen so far.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::block::ScheduleBlock;
use crate::bucket::DayBuckets;
use crate::error::Result;
use crate::window::{DayEnvelope, TimeWindow};

/// An uncovered stretch of a day's envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub day: NaiveDate,
    pub window: TimeWindow,
    pub duration_minutes: i64,
}

impl FreeWindow {
    fn between(day: NaiveDate, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let window = TimeWindow::new(start, end)?;
        Ok(Self {
            day,
            window,
            duration_minutes: window.duration_minutes(),
        })
    }
}

/// Find the free windows of `day` within `envelope`.
///
/// `blocks` should all belong to `day`; they are walked in `(start, id)` order
/// regardless of the order given. A block nested inside an earlier one adds no
/// gap. A day without blocks yields one window spanning the whole envelope.
/// Gaps never extend past the envelope end.
pub fn find_free_windows(
    day: NaiveDate,
    blocks: &[ScheduleBlock],
    envelope: &DayEnvelope,
    tz: Tz,
) -> Result<Vec<FreeWindow>> {
    let bounds = envelope.bounds(day, tz)?;

    let mut ordered: Vec<&ScheduleBlock> = blocks.iter().collect();
    ordered.sort_by_key(|b| (b.start(), b.id));

    let mut windows = Vec::new();
    let mut cursor = bounds.start();

    for block in ordered {
        let gap_end = block.start().min(bounds.end());
        if gap_end > cursor {
            windows.push(FreeWindow::between(day, cursor, gap_end)?);
        }
        cursor = cursor.max(block.end());
    }

    // Trailing window after the last block.
    if cursor < bounds.end() {
        windows.push(FreeWindow::between(day, cursor, bounds.end())?);
    }

    Ok(windows)
}

/// Free windows for every bucketed day, in calendar order.
pub fn free_windows_by_day(
    buckets: &DayBuckets,
    envelope: &DayEnvelope,
    tz: Tz,
) -> Result<Vec<FreeWindow>> {
    let mut windows = Vec::new();
    for (day, blocks) in buckets {
        windows.extend(find_free_windows(*day, blocks, envelope, tz)?);
    }
    Ok(windows)
}

/// The first window lasting at least `min_duration_minutes`.
pub fn find_first_free_window(
    windows: &[FreeWindow],
    min_duration_minutes: i64,
) -> Option<&FreeWindow> {
    windows
        .iter()
        .find(|w| w.duration_minutes >= min_duration_minutes)
}
