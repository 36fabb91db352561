//! Tests for conflict detection.

mod common;

use chrono_tz::Tz;
use common::{block, date, utc};
use stephabit_engine::bucket::bucket_by_day;
use stephabit_engine::conflict::conflicts_by_day;
use stephabit_engine::{find_conflicts, ConflictMode};

const DAY: (i32, u32, u32) = (2024, 1, 1);

#[test]
fn two_overlapping_blocks_detected() {
    // [09:00-10:00] and [09:30-10:30] → one conflict, earlier start first
    let blocks = vec![
        block(2, DAY, (9, 30), (10, 30)),
        block(1, DAY, (9, 0), (10, 0)),
    ];

    let conflicts = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Adjacent);

    assert_eq!(conflicts.len(), 1, "should detect exactly one conflict");
    assert_eq!(conflicts[0].day, date(2024, 1, 1));
    assert_eq!(conflicts[0].first.start(), utc(DAY, (9, 0)));
    assert_eq!(conflicts[0].second.start(), utc(DAY, (9, 30)));
    assert_eq!(conflicts[0].overlap_minutes, 30);
}

#[test]
fn non_overlapping_blocks_no_conflict() {
    let blocks = vec![
        block(1, DAY, (9, 0), (10, 0)),
        block(2, DAY, (11, 0), (12, 0)),
    ];

    for mode in [ConflictMode::Adjacent, ConflictMode::Pairwise] {
        assert!(find_conflicts(date(2024, 1, 1), &blocks, mode).is_empty());
    }
}

#[test]
fn touching_blocks_not_a_conflict() {
    let blocks = vec![
        block(1, DAY, (9, 0), (10, 0)),
        block(2, DAY, (10, 0), (11, 0)),
    ];

    let conflicts = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Adjacent);

    assert!(conflicts.is_empty(), "back-to-back blocks must not conflict");
}

#[test]
fn adjacent_mode_misses_non_adjacent_nested_overlap() {
    // A: 09:00-13:00, B: 10:00-10:30, C: 11:00-12:00.
    // Adjacent pairs: (A,B) overlap, (B,C) do not. C nests in A but is not
    // adjacent to it in start order.
    let blocks = vec![
        block(1, DAY, (9, 0), (13, 0)),
        block(2, DAY, (10, 0), (10, 30)),
        block(3, DAY, (11, 0), (12, 0)),
    ];

    let adjacent = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Adjacent);
    assert_eq!(adjacent.len(), 1);
    assert_eq!((adjacent[0].first.id, adjacent[0].second.id), (1, 2));

    let pairwise = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Pairwise);
    let pairs: Vec<(u64, u64)> = pairwise.iter().map(|c| (c.first.id, c.second.id)).collect();
    assert_eq!(pairs, vec![(1, 2), (1, 3)]);
    assert_eq!(pairwise[1].overlap_minutes, 60);
}

#[test]
fn chain_of_overlaps_reports_each_adjacent_pair() {
    let blocks = vec![
        block(1, DAY, (9, 0), (10, 0)),
        block(2, DAY, (9, 45), (11, 0)),
        block(3, DAY, (10, 30), (12, 0)),
    ];

    let conflicts = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Adjacent);

    let pairs: Vec<(u64, u64)> = conflicts.iter().map(|c| (c.first.id, c.second.id)).collect();
    assert_eq!(pairs, vec![(1, 2), (2, 3)]);
}

#[test]
fn identical_starts_ordered_by_id() {
    let blocks = vec![
        block(8, DAY, (9, 0), (10, 0)),
        block(5, DAY, (9, 0), (9, 30)),
    ];

    let conflicts = find_conflicts(date(2024, 1, 1), &blocks, ConflictMode::Adjacent);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].first.id, 5);
    assert_eq!(conflicts[0].second.id, 8);
}

#[test]
fn single_block_or_empty_day_no_conflicts() {
    assert!(find_conflicts(date(2024, 1, 1), &[], ConflictMode::Pairwise).is_empty());
    let one = vec![block(1, DAY, (9, 0), (10, 0))];
    assert!(find_conflicts(date(2024, 1, 1), &one, ConflictMode::Pairwise).is_empty());
}

#[test]
fn blocks_on_different_days_never_conflict() {
    // Same wall-clock hours, different days.
    let blocks = vec![
        block(1, (2024, 1, 1), (9, 0), (10, 0)),
        block(2, (2024, 1, 2), (9, 0), (10, 0)),
        block(3, (2024, 1, 2), (9, 30), (9, 45)),
    ];
    let buckets = bucket_by_day(&blocks, Tz::UTC);

    let conflicts = conflicts_by_day(&buckets, ConflictMode::Adjacent);

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].day, date(2024, 1, 2));
    assert_eq!(conflicts[0].overlap_minutes, 15);
}
