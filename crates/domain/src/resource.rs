//! Supply-side entities: specialists, equipment and travel periods.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::types::{minute_of_day, EquipmentId, MinuteSpan, SpecialistId, TravelPeriodId};
use shared::ValidationError;

/// Categories of human resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialistType {
    Trainer,
    Dietitian,
    Therapist,
    Physician,
    #[serde(rename = "Allied_Health")]
    AlliedHealth,
}

/// A weekly shift when a specialist is working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBlock {
    /// 0 = Monday, 6 = Sunday.
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl AvailabilityBlock {
    pub fn new(
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ValidationError> {
        if day_of_week > 6 {
            return Err(ValidationError::DayOfWeekOutOfRange(day_of_week));
        }
        if end_time <= start_time {
            return Err(ValidationError::ShiftEndNotAfterStart {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            day_of_week,
            start_time,
            end_time,
        })
    }

    /// Whether the span fits entirely within this shift.
    pub fn contains_span(&self, span: MinuteSpan) -> bool {
        minute_of_day(self.start_time) <= span.start && span.end <= minute_of_day(self.end_time)
    }
}

/// Human resource with weekly shifts and a concurrency cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialist {
    pub id: SpecialistId,
    pub name: String,
    #[serde(rename = "type")]
    pub specialist_type: SpecialistType,
    /// Standard weekly operating hours. May be empty for someone fully booked out.
    pub availability: Vec<AvailabilityBlock>,
    /// Specific dates of unavailability (holidays, sick leave).
    #[serde(default)]
    pub days_off: Vec<NaiveDate>,
    /// How many clients can be seen simultaneously.
    #[serde(default = "default_capacity")]
    pub max_concurrent_clients: u32,
}

fn default_capacity() -> u32 {
    1
}

impl Specialist {
    pub fn new(
        id: impl Into<SpecialistId>,
        name: impl Into<String>,
        specialist_type: SpecialistType,
        availability: Vec<AvailabilityBlock>,
    ) -> Result<Self, ValidationError> {
        let specialist = Self {
            id: id.into(),
            name: name.into(),
            specialist_type,
            availability,
            days_off: Vec::new(),
            max_concurrent_clients: 1,
        };
        specialist.validate()?;
        Ok(specialist)
    }

    pub fn with_days_off(mut self, days_off: Vec<NaiveDate>) -> Self {
        self.days_off = days_off;
        self
    }

    pub fn with_max_concurrent_clients(mut self, max: u32) -> Self {
        self.max_concurrent_clients = max;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.max_concurrent_clients == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        for block in &self.availability {
            AvailabilityBlock::new(block.day_of_week, block.start_time, block.end_time)?;
        }
        Ok(())
    }

    pub fn is_off(&self, date: NaiveDate) -> bool {
        self.days_off.contains(&date)
    }

    /// Shifts active on the given weekday (0 = Monday).
    pub fn blocks_for(&self, weekday: u8) -> impl Iterator<Item = &AvailabilityBlock> {
        self.availability
            .iter()
            .filter(move |block| block.day_of_week == weekday)
    }
}

/// Date range when a piece of equipment is out of service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// If absent, the window applies to the full day.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

impl MaintenanceWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::EndDateBeforeStartDate {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            start_time: None,
            end_time: None,
        })
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Physical resource with portability and maintenance constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    /// Where the item normally lives (free-form, e.g. "Downtown Gym").
    pub location: String,
    /// Portable items travel with the user (bands yes, treadmill no).
    #[serde(default)]
    pub is_portable: bool,
    #[serde(default)]
    pub maintenance_windows: Vec<MaintenanceWindow>,
    #[serde(default = "default_capacity")]
    pub max_concurrent_users: u32,
    /// Whether using this item requires supervision.
    #[serde(default)]
    pub requires_specialist: bool,
}

impl Equipment {
    pub fn new(
        id: impl Into<EquipmentId>,
        name: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let equipment = Self {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            is_portable: false,
            maintenance_windows: Vec::new(),
            max_concurrent_users: 1,
            requires_specialist: false,
        };
        equipment.validate()?;
        Ok(equipment)
    }

    pub fn with_portable(mut self, is_portable: bool) -> Self {
        self.is_portable = is_portable;
        self
    }

    pub fn with_maintenance_windows(mut self, windows: Vec<MaintenanceWindow>) -> Self {
        self.maintenance_windows = windows;
        self
    }

    pub fn with_max_concurrent_users(mut self, max: u32) -> Self {
        self.max_concurrent_users = max;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.max_concurrent_users == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        for window in &self.maintenance_windows {
            MaintenanceWindow::new(window.start_date, window.end_date)?;
        }
        Ok(())
    }

    /// Under maintenance at any point on the given date (day-level check).
    pub fn under_maintenance(&self, date: NaiveDate) -> bool {
        self.maintenance_windows
            .iter()
            .any(|window| window.covers_date(date))
    }
}

/// A trip away from home, limiting which activities and equipment are usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelPeriod {
    pub id: TravelPeriodId,
    /// Destination name.
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Strictly forbids physical facility usage (e.g. a hiking trip).
    #[serde(default)]
    pub remote_activities_only: bool,
    /// Equipment available at the destination (the hotel-gym case).
    #[serde(default)]
    pub available_equipment_ids: Vec<EquipmentId>,
}

impl TravelPeriod {
    pub fn new(
        id: impl Into<TravelPeriodId>,
        location: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if end_date < start_date {
            return Err(ValidationError::EndDateBeforeStartDate {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: id.into(),
            location: location.into(),
            start_date,
            end_date,
            remote_activities_only: false,
            available_equipment_ids: Vec::new(),
        })
    }

    pub fn with_remote_activities_only(mut self, remote_only: bool) -> Self {
        self.remote_activities_only = remote_only;
        self
    }

    pub fn with_available_equipment(mut self, ids: Vec<EquipmentId>) -> Self {
        self.available_equipment_ids = ids;
        self
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
