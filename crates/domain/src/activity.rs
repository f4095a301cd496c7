//! Demand-side entities: activities and their recurrence configuration.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use shared::types::{minute_of_day, ActivityId, EquipmentId, SpecialistId};
use shared::ValidationError;
use std::fmt;

/// Shortest and longest bookable activity, in minutes.
pub const MIN_DURATION_MINUTES: u32 = 5;
pub const MAX_DURATION_MINUTES: u32 = 480;

/// Categorization of health activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityType {
    Fitness,
    Food,
    Medication,
    Therapy,
    Consultation,
    Other,
}

/// Physical context where an activity can be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Location {
    Home,
    Gym,
    Clinic,
    Outdoors,
    #[default]
    Any,
}

/// Recurrence pattern for an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrequencyPattern {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl fmt::Display for FrequencyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrequencyPattern::Daily => "Daily",
            FrequencyPattern::Weekly => "Weekly",
            FrequencyPattern::Monthly => "Monthly",
            FrequencyPattern::Custom => "Custom",
        };
        write!(f, "{label}")
    }
}

/// How often an activity should occur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub pattern: FrequencyPattern,
    /// Occurrences per period (per week for Weekly, per month for Monthly).
    #[serde(default = "default_count")]
    pub count: u32,
    /// Specific weekdays (0 = Monday, 6 = Sunday). Weekly pattern only.
    #[serde(default)]
    pub preferred_days: Option<Vec<u8>>,
    /// Day interval for the Custom pattern (e.g. 2 for every other day).
    #[serde(default)]
    pub interval_days: Option<u32>,
}

fn default_count() -> u32 {
    1
}

impl Frequency {
    /// Every day, once a day.
    pub fn daily() -> Self {
        Self {
            pattern: FrequencyPattern::Daily,
            count: 1,
            preferred_days: None,
            interval_days: None,
        }
    }

    /// `count` occurrences per week, spread by the engine.
    pub fn weekly(count: u32) -> Result<Self, ValidationError> {
        let frequency = Self {
            pattern: FrequencyPattern::Weekly,
            count,
            preferred_days: None,
            interval_days: None,
        };
        frequency.validate()?;
        Ok(frequency)
    }

    /// `count` occurrences per month (30-day blocks).
    pub fn monthly(count: u32) -> Result<Self, ValidationError> {
        let frequency = Self {
            pattern: FrequencyPattern::Monthly,
            count,
            preferred_days: None,
            interval_days: None,
        };
        frequency.validate()?;
        Ok(frequency)
    }

    /// Once every `interval_days` days.
    pub fn every_n_days(interval_days: u32) -> Result<Self, ValidationError> {
        let frequency = Self {
            pattern: FrequencyPattern::Custom,
            count: 1,
            preferred_days: None,
            interval_days: Some(interval_days),
        };
        frequency.validate()?;
        Ok(frequency)
    }

    /// Pin a Weekly frequency to specific weekdays, cycled per occurrence.
    pub fn with_preferred_days(mut self, days: Vec<u8>) -> Result<Self, ValidationError> {
        self.preferred_days = Some(days);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.count == 0 {
            return Err(ValidationError::ZeroFrequencyCount);
        }
        match self.pattern {
            FrequencyPattern::Weekly if self.count > 7 => {
                return Err(ValidationError::WeeklyCountTooHigh(self.count));
            }
            FrequencyPattern::Monthly if self.count > 31 => {
                return Err(ValidationError::MonthlyCountTooHigh(self.count));
            }
            _ => {}
        }
        if let Some(days) = &self.preferred_days {
            if self.pattern != FrequencyPattern::Weekly {
                return Err(ValidationError::PreferredDaysNotWeekly);
            }
            if let Some(&day) = days.iter().find(|&&day| day > 6) {
                return Err(ValidationError::PreferredDayOutOfRange(day));
            }
        }
        match (self.pattern, self.interval_days) {
            (FrequencyPattern::Custom, None) => Err(ValidationError::MissingIntervalDays),
            (_, Some(0)) => Err(ValidationError::ZeroIntervalDays),
            _ => Ok(()),
        }
    }
}

/// The earliest start and latest end an activity accepts, as clock times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Create a window, validating that the end is strictly after the start.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::WindowEndNotAfterStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start_minute(&self) -> i32 {
        minute_of_day(self.start)
    }

    pub fn end_minute(&self) -> i32 {
        minute_of_day(self.end)
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end_minute() - self.start_minute()
    }
}

/// A single health task to be scheduled, with timing, resource
/// requirements and fallback options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    /// 1 = critical, 5 = optional.
    pub priority: u8,
    pub frequency: Frequency,
    /// Duration of the activity itself.
    pub duration_minutes: u32,
    /// Contiguous block reserved immediately before the start (travel, setup).
    #[serde(default)]
    pub preparation_duration_minutes: u32,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
    #[serde(default)]
    pub specialist_id: Option<SpecialistId>,
    #[serde(default)]
    pub equipment_ids: Vec<EquipmentId>,
    #[serde(default)]
    pub location: Location,
    /// The activity needs no fixed location (can run during travel).
    #[serde(default)]
    pub remote_capable: bool,
    /// User instructions or notes.
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub preparation_requirements: Vec<String>,
    /// Ordered alternatives to attempt when this activity cannot be placed.
    #[serde(default)]
    pub backup_activity_ids: Vec<ActivityId>,
    /// Metrics the user records for this activity (e.g. "HR", "Weight").
    #[serde(default)]
    pub metrics_to_collect: Vec<String>,
}

impl Activity {
    pub fn new(
        id: impl Into<ActivityId>,
        name: impl Into<String>,
        activity_type: ActivityType,
        priority: u8,
        frequency: Frequency,
        duration_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let activity = Self {
            id: id.into(),
            name: name.into(),
            activity_type,
            priority,
            frequency,
            duration_minutes,
            preparation_duration_minutes: 0,
            time_window: None,
            specialist_id: None,
            equipment_ids: Vec::new(),
            location: Location::Any,
            remote_capable: false,
            details: String::new(),
            preparation_requirements: Vec::new(),
            backup_activity_ids: Vec::new(),
            metrics_to_collect: Vec::new(),
        };
        activity.validate()?;
        Ok(activity)
    }

    pub fn with_preparation(mut self, minutes: u32) -> Self {
        self.preparation_duration_minutes = minutes;
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    pub fn with_specialist(mut self, id: impl Into<SpecialistId>) -> Self {
        self.specialist_id = Some(id.into());
        self
    }

    pub fn with_equipment(mut self, ids: Vec<EquipmentId>) -> Self {
        self.equipment_ids = ids;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_remote_capable(mut self, remote_capable: bool) -> Self {
        self.remote_capable = remote_capable;
        self
    }

    pub fn with_backups(mut self, ids: Vec<ActivityId>) -> Self {
        self.backup_activity_ids = ids;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !(1..=5).contains(&self.priority) {
            return Err(ValidationError::PriorityOutOfRange(self.priority));
        }
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(ValidationError::DurationOutOfRange {
                min: MIN_DURATION_MINUTES,
                max: MAX_DURATION_MINUTES,
                actual: self.duration_minutes,
            });
        }
        self.frequency.validate()?;
        if let Some(window) = &self.time_window {
            // Re-check: a window rehydrated from the wire bypasses `TimeWindow::new`.
            TimeWindow::new(window.start, window.end)?;
        }
        Ok(())
    }
}
