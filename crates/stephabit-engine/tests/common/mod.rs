//! Shared builders for engine integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use stephabit_engine::{BlockKind, Repeat, ScheduleBlock, TimeWindow};

/// A habit block for owner 1 on the given day, between two UTC hour:minute marks.
pub fn block(
    id: u64,
    (year, month, day): (i32, u32, u32),
    (start_hour, start_min): (u32, u32),
    (end_hour, end_min): (u32, u32),
) -> ScheduleBlock {
    owned_block(id, 1, (year, month, day), (start_hour, start_min), (end_hour, end_min))
}

pub fn owned_block(
    id: u64,
    owner_id: u64,
    (year, month, day): (i32, u32, u32),
    (start_hour, start_min): (u32, u32),
    (end_hour, end_min): (u32, u32),
) -> ScheduleBlock {
    let start = Utc
        .with_ymd_and_hms(year, month, day, start_hour, start_min, 0)
        .unwrap();
    let end = Utc
        .with_ymd_and_hms(year, month, day, end_hour, end_min, 0)
        .unwrap();
    ScheduleBlock {
        id,
        owner_id,
        window: TimeWindow::new(start, end).unwrap(),
        kind: BlockKind::Habit(1),
        repeat: Repeat::Once,
        notes: None,
        title: Some(format!("block {}", id)),
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn utc(
    (year, month, day): (i32, u32, u32),
    (hour, min): (u32, u32),
) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap()
}
