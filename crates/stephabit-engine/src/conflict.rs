//! Detect overlapping blocks within a day.
//!
//! Blocks that touch (one ends exactly when the next starts) are NOT conflicts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::block::ScheduleBlock;
use crate::bucket::DayBuckets;

/// Which block pairs the detector compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictMode {
    /// Compare each block with its immediate predecessor in start order only.
    /// A block nested in a non-adjacent earlier block is not reported.
    #[default]
    Adjacent,
    /// Compare every pair of blocks on the day.
    Pairwise,
}

/// Two blocks on the same day whose windows overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub day: NaiveDate,
    /// The block that starts first.
    pub first: ScheduleBlock,
    pub second: ScheduleBlock,
    pub overlap_minutes: i64,
}

impl Conflict {
    fn new(day: NaiveDate, first: &ScheduleBlock, second: &ScheduleBlock) -> Self {
        Self {
            day,
            first: first.clone(),
            second: second.clone(),
            overlap_minutes: first.window.overlap_minutes(&second.window),
        }
    }
}

/// Find conflicts among one day's blocks.
///
/// `blocks` are walked in `(start, id)` order. Conflicts come out in that
/// order too, keyed by the later block of each pair.
pub fn find_conflicts(day: NaiveDate, blocks: &[ScheduleBlock], mode: ConflictMode) -> Vec<Conflict> {
    let mut ordered: Vec<&ScheduleBlock> = blocks.iter().collect();
    ordered.sort_by_key(|b| (b.start(), b.id));

    let mut conflicts = Vec::new();
    match mode {
        ConflictMode::Adjacent => {
            for pair in ordered.windows(2) {
                let (prev, next) = (pair[0], pair[1]);
                if prev.window.overlaps(&next.window) {
                    conflicts.push(Conflict::new(day, prev, next));
                }
            }
        }
        ConflictMode::Pairwise => {
            for (j, next) in ordered.iter().enumerate() {
                for prev in &ordered[..j] {
                    if prev.window.overlaps(&next.window) {
                        conflicts.push(Conflict::new(day, prev, next));
                    }
                }
            }
        }
    }
    conflicts
}

/// Conflicts for every bucketed day, in calendar order.
pub fn conflicts_by_day(buckets: &DayBuckets, mode: ConflictMode) -> Vec<Conflict> {
    buckets
        .iter()
        .flat_map(|(day, blocks)| find_conflicts(*day, blocks, mode))
        .collect()
}
