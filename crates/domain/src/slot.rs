//! The output unit: a committed block of time for one activity.

use crate::activity::Activity;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::types::{minute_of_day, ActivityId, EquipmentId, MinuteSpan, SpecialistId};

/// Lifecycle state of a scheduled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

/// A committed block of time for a specific activity.
///
/// The *effective block* of a slot is `[start_time - prep, start_time +
/// duration]`: the full span the user is unavailable. `is_backup` and
/// `original_activity_id` are set together by [`TimeSlot::backup`] and never
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// The activity effectively scheduled (the backup's id when falling back).
    pub activity_id: ActivityId,
    pub priority: u8,
    pub date: NaiveDate,
    /// Start of the activity itself; preparation runs before this.
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    /// Minutes reserved immediately prior to `start_time`.
    #[serde(default)]
    pub prep_duration_minutes: u32,
    #[serde(default)]
    pub specialist_id: Option<SpecialistId>,
    #[serde(default)]
    pub equipment_ids: Vec<EquipmentId>,
    /// True when this slot was placed as a fallback for another activity.
    #[serde(default)]
    pub is_backup: bool,
    /// The primary activity that failed, when `is_backup` is set.
    #[serde(default)]
    pub original_activity_id: Option<ActivityId>,
    #[serde(default)]
    pub status: SlotStatus,
}

impl TimeSlot {
    /// A slot for an activity placed on its own behalf.
    pub fn primary(activity: &Activity, date: NaiveDate, start_time: NaiveTime) -> Self {
        Self::from_activity(activity, date, start_time, None)
    }

    /// A slot for `activity` standing in for the failed `original` primary.
    pub fn backup(
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        original: ActivityId,
    ) -> Self {
        Self::from_activity(activity, date, start_time, Some(original))
    }

    fn from_activity(
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        original: Option<ActivityId>,
    ) -> Self {
        Self {
            activity_id: activity.id.clone(),
            priority: activity.priority,
            date,
            start_time,
            duration_minutes: activity.duration_minutes,
            prep_duration_minutes: activity.preparation_duration_minutes,
            specialist_id: activity.specialist_id.clone(),
            equipment_ids: activity.equipment_ids.clone(),
            is_backup: original.is_some(),
            original_activity_id: original,
            status: SlotStatus::Scheduled,
        }
    }

    /// The full span the user is occupied: `[start - prep, start + duration)`.
    pub fn effective_span(&self) -> MinuteSpan {
        let start = minute_of_day(self.start_time);
        MinuteSpan::new(
            start - self.prep_duration_minutes as i32,
            start + self.duration_minutes as i32,
        )
    }

    /// The activity-only span `[start, start + duration)`, prep excluded.
    pub fn activity_span(&self) -> MinuteSpan {
        MinuteSpan::from_start_and_duration(self.start_time, self.duration_minutes)
    }
}
