//! Shared fixtures for the integration tests.

use chrono::{NaiveDate, NaiveTime};
use domain::{Activity, ActivityType, Frequency};
use shared::types::ActivityId;
use std::collections::HashMap;

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// 2025-01-06, a Monday, as a clean anchor for weekday math.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

pub fn make_activity(id: &str, priority: u8, frequency: Frequency, duration: u32) -> Activity {
    Activity::new(
        id,
        format!("Activity {id}"),
        ActivityType::Fitness,
        priority,
        frequency,
        duration,
    )
    .unwrap()
}

pub fn no_backups() -> HashMap<ActivityId, Activity> {
    HashMap::new()
}

pub fn backup_map(backups: Vec<Activity>) -> HashMap<ActivityId, Activity> {
    backups
        .into_iter()
        .map(|activity| (activity.id.clone(), activity))
        .collect()
}
