use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Minutes elapsed since midnight, ignoring seconds.
pub fn minute_of_day(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

/// Build a clock time from minutes since midnight.
///
/// Returns `None` for values outside a single day.
pub fn time_from_minute(minute: i32) -> Option<NaiveTime> {
    if !(0..24 * 60).contains(&minute) {
        return None;
    }
    NaiveTime::from_hms_opt(minute as u32 / 60, minute as u32 % 60, 0)
}

/// Weekday index with Monday = 0, Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// A half-open `[start, end)` span of minutes within a single day.
///
/// Spans may dip below 0 when preparation time spills before midnight;
/// the overlap arithmetic stays valid either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteSpan {
    pub start: i32,
    pub end: i32,
}

impl MinuteSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Span covering `duration_minutes` from a clock time.
    pub fn from_start_and_duration(start: NaiveTime, duration_minutes: u32) -> Self {
        let start_min = minute_of_day(start);
        Self {
            start: start_min,
            end: start_min + duration_minutes as i32,
        }
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end - self.start
    }

    /// Half-open overlap: StartA < EndB and StartB < EndA.
    pub fn overlaps(&self, other: &MinuteSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &MinuteSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}
