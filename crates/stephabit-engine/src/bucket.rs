//! Group schedule blocks by local calendar day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::block::ScheduleBlock;

/// Blocks keyed by local calendar day; days iterate in calendar order.
pub type DayBuckets = BTreeMap<NaiveDate, Vec<ScheduleBlock>>;

/// The local calendar date of the block's start in `tz`.
pub fn day_of(block: &ScheduleBlock, tz: Tz) -> NaiveDate {
    block.start().with_timezone(&tz).date_naive()
}

/// Partition `blocks` by the local date of their start.
///
/// Every block lands in exactly one bucket. Each bucket is sorted by
/// `(start, id)` so ties resolve the same way on every run.
pub fn bucket_by_day(blocks: &[ScheduleBlock], tz: Tz) -> DayBuckets {
    let mut buckets = DayBuckets::new();
    for block in blocks {
        buckets.entry(day_of(block, tz)).or_default().push(block.clone());
    }
    for day in buckets.values_mut() {
        sort_blocks(day);
    }
    buckets
}

/// Sort in place by `(start, id)`.
pub fn sort_blocks(blocks: &mut [ScheduleBlock]) {
    blocks.sort_by_key(|b| (b.start(), b.id));
}
