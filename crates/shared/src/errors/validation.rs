use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Construction-time violations of entity invariants.
///
/// These fire when an entity is built from raw values; the scheduling core
/// only ever sees entities that passed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Priority must be between 1 (critical) and 5 (optional), got {0}")]
    PriorityOutOfRange(u8),

    #[error("Duration must be between {min} and {max} minutes, got {actual}")]
    DurationOutOfRange { min: u32, max: u32, actual: u32 },

    #[error("Window end time ({end}) must be after start time ({start})")]
    WindowEndNotAfterStart { start: NaiveTime, end: NaiveTime },

    #[error("Frequency count must be at least 1")]
    ZeroFrequencyCount,

    #[error("Weekly frequency cannot exceed 7 occurrences, got {0}")]
    WeeklyCountTooHigh(u32),

    #[error("Monthly frequency cannot exceed 31 occurrences, got {0}")]
    MonthlyCountTooHigh(u32),

    #[error("Preferred days are only valid for the Weekly pattern")]
    PreferredDaysNotWeekly,

    #[error("Preferred day must be between 0 (Monday) and 6 (Sunday), got {0}")]
    PreferredDayOutOfRange(u8),

    #[error("Custom pattern requires interval_days")]
    MissingIntervalDays,

    #[error("Interval days must be at least 1")]
    ZeroIntervalDays,

    #[error("Day of week must be between 0 (Monday) and 6 (Sunday), got {0}")]
    DayOfWeekOutOfRange(u8),

    #[error("Shift end time ({end}) must be strictly after start time ({start})")]
    ShiftEndNotAfterStart { start: NaiveTime, end: NaiveTime },

    #[error("End date ({end}) cannot be before start date ({start})")]
    EndDateBeforeStartDate { start: NaiveDate, end: NaiveDate },

    #[error("Concurrent capacity must be at least 1")]
    ZeroCapacity,
}
