//! Tests for free-window computation.

mod common;

use chrono_tz::Tz;
use common::{block, date, utc};
use stephabit_engine::bucket::bucket_by_day;
use stephabit_engine::freebusy::{find_first_free_window, free_windows_by_day};
use stephabit_engine::{find_free_windows, DayEnvelope, FreeWindow, ScheduleBlock};

const DAY: (i32, u32, u32) = (2024, 1, 1);

/// Free windows of 2024-01-01 under the default 06:00-22:00 envelope.
fn default_day(blocks: &[ScheduleBlock]) -> Vec<FreeWindow> {
    find_free_windows(date(2024, 1, 1), blocks, &DayEnvelope::default(), Tz::UTC).unwrap()
}

#[test]
fn empty_day_yields_whole_envelope() {
    let windows = default_day(&[]);

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].duration_minutes, 960);
    assert_eq!(windows[0].window.start(), utc(DAY, (6, 0)));
    assert_eq!(windows[0].window.end(), utc(DAY, (22, 0)));
}

#[test]
fn gaps_around_two_blocks() {
    // [06:00-07:00] and [12:00-13:00] → [07:00-12:00] and [13:00-22:00]
    let blocks = vec![
        block(1, DAY, (6, 0), (7, 0)),
        block(2, DAY, (12, 0), (13, 0)),
    ];

    let windows = default_day(&blocks);

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].window.start(), utc(DAY, (7, 0)));
    assert_eq!(windows[0].window.end(), utc(DAY, (12, 0)));
    assert_eq!(windows[0].duration_minutes, 300);
    assert_eq!(windows[1].window.start(), utc(DAY, (13, 0)));
    assert_eq!(windows[1].window.end(), utc(DAY, (22, 0)));
    assert_eq!(windows[1].duration_minutes, 540);
}

#[test]
fn fully_covered_envelope_has_no_windows() {
    let blocks = vec![
        block(1, DAY, (6, 0), (12, 0)),
        block(2, DAY, (12, 0), (18, 0)),
        block(3, DAY, (18, 0), (22, 0)),
    ];

    let windows = default_day(&blocks);

    assert!(windows.is_empty(), "no gaps expected, got {:?}", windows);
}

#[test]
fn nested_block_adds_no_gap() {
    // 09:00-12:00 contains 10:00-11:00; the cursor must stay at 12:00.
    let blocks = vec![
        block(1, DAY, (9, 0), (12, 0)),
        block(2, DAY, (10, 0), (11, 0)),
    ];

    let windows = default_day(&blocks);

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].duration_minutes, 180); // 06:00-09:00
    assert_eq!(windows[1].window.start(), utc(DAY, (12, 0)));
    assert_eq!(windows[1].duration_minutes, 600); // 12:00-22:00
}

#[test]
fn unsorted_input_is_walked_in_start_order() {
    let blocks = vec![
        block(2, DAY, (12, 0), (13, 0)),
        block(1, DAY, (6, 0), (7, 0)),
    ];

    let windows = default_day(&blocks);

    let minutes: Vec<i64> = windows.iter().map(|w| w.duration_minutes).collect();
    assert_eq!(minutes, vec![300, 540]);
}

#[test]
fn blocks_outside_envelope_are_clipped() {
    // Early block spills into the envelope; late block starts after it ends.
    let blocks = vec![
        block(1, DAY, (5, 0), (6, 30)),
        block(2, DAY, (22, 30), (23, 0)),
    ];

    let windows = default_day(&blocks);

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].window.start(), utc(DAY, (6, 30)));
    assert_eq!(windows[0].window.end(), utc(DAY, (22, 0)));
}

#[test]
fn custom_envelope_respected() {
    let envelope = DayEnvelope::parse("08:00", "17:00").unwrap();
    let blocks = vec![block(1, DAY, (10, 0), (11, 0))];

    let windows = find_free_windows(date(2024, 1, 1), &blocks, &envelope, Tz::UTC).unwrap();

    let minutes: Vec<i64> = windows.iter().map(|w| w.duration_minutes).collect();
    assert_eq!(minutes, vec![120, 360]);
}

#[test]
fn windows_across_days_in_calendar_order() {
    let blocks = vec![
        block(1, (2024, 1, 3), (6, 0), (22, 0)),
        block(2, (2024, 1, 2), (6, 0), (21, 0)),
        block(3, (2024, 1, 1), (7, 0), (22, 0)),
    ];
    let buckets = bucket_by_day(&blocks, Tz::UTC);

    let windows = free_windows_by_day(&buckets, &DayEnvelope::default(), Tz::UTC).unwrap();

    let days: Vec<_> = windows.iter().map(|w| w.day).collect();
    assert_eq!(days, vec![date(2024, 1, 1), date(2024, 1, 2)]);
    assert_eq!(windows[0].duration_minutes, 60);
    assert_eq!(windows[1].duration_minutes, 60);
}

#[test]
fn first_free_window_with_minimum_duration() {
    let blocks = vec![
        block(1, DAY, (6, 30), (12, 0)),
        block(2, DAY, (12, 15), (20, 0)),
    ];
    let windows = default_day(&blocks);

    let slot = find_first_free_window(&windows, 60).expect("a long enough window exists");
    assert_eq!(slot.window.start(), utc(DAY, (20, 0)));
    assert_eq!(slot.duration_minutes, 120);

    assert!(find_first_free_window(&windows, 500).is_none());
}
