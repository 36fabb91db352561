//! Half-open time windows and the daily envelope they are measured against.
//!
//! A [`TimeWindow`] is `[start, end)`: the end instant is excluded, so two blocks
//! that touch (one ends exactly when the next starts) do NOT overlap.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Widest local-time gap (DST spring forward) we step over when resolving a
/// wall-clock time, in minutes.
const MAX_GAP_MINUTES: i64 = 180;

/// A half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow", into = "RawWindow")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = ScheduleError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl From<TimeWindow> for RawWindow {
    fn from(w: TimeWindow) -> Self {
        RawWindow {
            start: w.start,
            end: w.end,
        }
    }
}

impl TimeWindow {
    /// Build a window, rejecting empty and inverted intervals.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidWindow` when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window of `minutes` length starting at `start`.
    ///
    /// # Errors
    /// - `InvalidTime` when the end falls outside the representable range.
    /// - `InvalidWindow` when `minutes` is not positive.
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self> {
        let end = Duration::try_minutes(minutes)
            .and_then(|length| start.checked_add_signed(length))
            .ok_or_else(|| {
                ScheduleError::InvalidTime(format!("{} + {} minutes is out of range", start, minutes))
            })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Two windows overlap iff `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `instant` falls inside `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Length of the window in whole minutes, rounded down.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Minutes shared with `other`, or 0 when they do not overlap.
    pub fn overlap_minutes(&self, other: &TimeWindow) -> i64 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_minutes()
    }
}

/// The local time range of a day within which free windows are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope", into = "RawEnvelope")]
pub struct DayEnvelope {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Serialize, Deserialize)]
struct RawEnvelope {
    #[serde(with = "hhmm")]
    start: NaiveTime,
    #[serde(with = "hhmm")]
    end: NaiveTime,
}

impl TryFrom<RawEnvelope> for DayEnvelope {
    type Error = ScheduleError;

    fn try_from(raw: RawEnvelope) -> Result<Self> {
        DayEnvelope::new(raw.start, raw.end)
    }
}

impl From<DayEnvelope> for RawEnvelope {
    fn from(e: DayEnvelope) -> Self {
        RawEnvelope {
            start: e.start,
            end: e.end,
        }
    }
}

impl Default for DayEnvelope {
    /// 06:00 to 22:00.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl DayEnvelope {
    /// # Errors
    /// Returns `ScheduleError::InvalidEnvelope` unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self> {
        if start >= end {
            return Err(ScheduleError::InvalidEnvelope(format!(
                "{} is not before {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse an envelope from two `HH:MM` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// The envelope of `day` in `tz`, as absolute instants.
    pub fn bounds(&self, day: NaiveDate, tz: Tz) -> Result<TimeWindow> {
        let start = resolve_local(day, self.start, tz)?;
        let end = resolve_local(day, self.end, tz)?;
        TimeWindow::new(start, end)
    }
}

/// Resolve a wall-clock time on `day` in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall back) take the earliest instant. Times inside a
/// DST gap move forward to the first valid minute.
pub fn resolve_local(day: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>> {
    let mut local = day.and_time(time);
    for _ in 0..=MAX_GAP_MINUTES {
        match tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => return Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => {
                local = local
                    .checked_add_signed(Duration::minutes(1))
                    .ok_or_else(|| ScheduleError::InvalidTime(format!("{} {}", day, time)))?;
            }
        }
    }
    Err(ScheduleError::InvalidTime(format!(
        "{} {} does not exist in {}",
        day,
        time.format("%H:%M"),
        tz.name()
    )))
}

/// Parse a timestamp: RFC 3339 with offset, or a naive local
/// `YYYY-MM-DDTHH:MM[:SS]` interpreted in `tz`.
pub fn parse_instant(value: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ScheduleError::InvalidTime(value.to_string()))?;
    resolve_local(naive.date(), naive.time(), tz)
}

/// Parse a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(value.to_string()))
}

/// Format an instant as `HH:MM` in `tz`.
pub fn format_time_of_day(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%H:%M").to_string()
}

/// Serde adapter for `HH:MM` times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}
