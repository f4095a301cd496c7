//! Hard constraint validation: can activity X happen at time Y?
//!
//! The checker is pure. It answers per candidate against the bookings made
//! so far and never mutates anything, so the engine can call it freely
//! while iterating candidates.

use chrono::{NaiveDate, NaiveTime};
use domain::{Activity, Equipment, Location, Specialist, TimeSlot, TravelPeriod};
use serde::{Deserialize, Serialize};
use shared::types::{minute_of_day, weekday_index, ActivityId, MinuteSpan};
use std::collections::HashMap;
use std::fmt;

/// Which hard constraint a candidate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationKind {
    Overlap,
    Specialist,
    Equipment,
    Travel,
    TimeWindow,
    /// Synthetic marker the engine records after every placement attempt
    /// (narrow, fallback chain, wide) has failed for an occurrence.
    Exhaustion,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ViolationKind::Overlap => "Overlap",
            ViolationKind::Specialist => "Specialist",
            ViolationKind::Equipment => "Equipment",
            ViolationKind::Travel => "Travel",
            ViolationKind::TimeWindow => "TimeWindow",
            ViolationKind::Exhaustion => "Exhaustion",
        };
        write!(f, "{label}")
    }
}

/// Detailed reason a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    pub reason: String,
    pub activity_id: ActivityId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

/// Validates hard constraints for activity placement.
pub struct ConstraintChecker<'a> {
    specialists: HashMap<&'a str, &'a Specialist>,
    equipment: HashMap<&'a str, &'a Equipment>,
    travel_periods: &'a [TravelPeriod],
}

impl<'a> ConstraintChecker<'a> {
    pub fn new(
        specialists: &'a [Specialist],
        equipment: &'a [Equipment],
        travel_periods: &'a [TravelPeriod],
    ) -> Self {
        Self {
            specialists: specialists.iter().map(|s| (s.id.as_str(), s)).collect(),
            equipment: equipment.iter().map(|e| (e.id.as_str(), e)).collect(),
            travel_periods,
        }
    }

    /// Master validation. Checks run in a fixed order and short-circuit on
    /// the first failure: travel, specialist, equipment, overlap, window.
    pub fn check_time_slot(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        booked_slots: &[TimeSlot],
        is_backup: bool,
    ) -> Result<(), ConstraintViolation> {
        self.check_travel_context(activity, date, is_backup)?;

        if activity.specialist_id.is_some() {
            self.check_specialist(activity, date, start_time)?;
        }

        if !activity.equipment_ids.is_empty() {
            self.check_equipment(activity, date, start_time, booked_slots)?;
        }

        self.check_overlap(activity, date, start_time, booked_slots)?;

        if activity.time_window.is_some() {
            self.check_time_window(activity, date, start_time)?;
        }

        Ok(())
    }

    /// The travel period (if any) covering a date.
    pub fn active_travel(&self, date: NaiveDate) -> Option<&'a TravelPeriod> {
        self.travel_periods.iter().find(|trip| trip.contains(date))
    }

    /// An activity that needs no fixed location: flagged remote-capable, or
    /// every required equipment item is portable. An activity with no
    /// equipment and no flag stays pinned to its location.
    pub fn is_effectively_remote(&self, activity: &Activity) -> bool {
        if activity.remote_capable {
            return true;
        }
        !activity.equipment_ids.is_empty()
            && activity.equipment_ids.iter().all(|id| {
                self.equipment
                    .get(id.as_str())
                    .is_some_and(|item| item.is_portable)
            })
    }

    fn check_travel_context(
        &self,
        activity: &Activity,
        date: NaiveDate,
        is_backup: bool,
    ) -> Result<(), ConstraintViolation> {
        let Some(trip) = self.active_travel(date) else {
            return Ok(());
        };

        // Backups are assumed location-agnostic (hotel room, cabin, ...).
        if is_backup {
            return Ok(());
        }

        let effectively_remote = self.is_effectively_remote(activity);

        if trip.remote_activities_only && !effectively_remote {
            return Err(ConstraintViolation {
                kind: ViolationKind::Travel,
                reason: format!("Traveling to {} (remote activities only)", trip.location),
                activity_id: activity.id.clone(),
                date,
                start_time: NaiveTime::MIN,
            });
        }

        if activity.location == Location::Home && !effectively_remote {
            return Err(ConstraintViolation {
                kind: ViolationKind::Travel,
                reason: format!("Away at {}, cannot run a home activity", trip.location),
                activity_id: activity.id.clone(),
                date,
                start_time: NaiveTime::MIN,
            });
        }

        Ok(())
    }

    fn check_specialist(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<(), ConstraintViolation> {
        let Some(specialist) = activity
            .specialist_id
            .as_ref()
            .and_then(|id| self.specialists.get(id.as_str()))
        else {
            return Ok(());
        };

        if specialist.is_off(date) {
            return Err(ConstraintViolation {
                kind: ViolationKind::Specialist,
                reason: format!("{} is off on {}", specialist.name, date),
                activity_id: activity.id.clone(),
                date,
                start_time,
            });
        }

        // The activity must fit entirely within one shift.
        let span = MinuteSpan::from_start_and_duration(start_time, activity.duration_minutes);
        let covered = specialist
            .blocks_for(weekday_index(date))
            .any(|block| block.contains_span(span));

        if !covered {
            return Err(ConstraintViolation {
                kind: ViolationKind::Specialist,
                reason: format!("{} is not working at this time", specialist.name),
                activity_id: activity.id.clone(),
                date,
                start_time,
            });
        }

        Ok(())
    }

    fn check_equipment(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        booked_slots: &[TimeSlot],
    ) -> Result<(), ConstraintViolation> {
        let trip = self.active_travel(date);
        let span = MinuteSpan::from_start_and_duration(start_time, activity.duration_minutes);

        for equipment_id in &activity.equipment_ids {
            let Some(item) = self.equipment.get(equipment_id.as_str()) else {
                continue;
            };

            // While traveling the item must travel along or be provided there.
            if let Some(trip) = trip {
                let on_site =
                    item.is_portable || trip.available_equipment_ids.contains(equipment_id);
                if !on_site {
                    return Err(ConstraintViolation {
                        kind: ViolationKind::Equipment,
                        reason: format!(
                            "{} is not available during travel to {}",
                            item.name, trip.location
                        ),
                        activity_id: activity.id.clone(),
                        date,
                        start_time,
                    });
                }
            }

            if item.under_maintenance(date) {
                return Err(ConstraintViolation {
                    kind: ViolationKind::Equipment,
                    reason: format!("{} is under maintenance", item.name),
                    activity_id: activity.id.clone(),
                    date,
                    start_time,
                });
            }

            // Concurrent usage, prep time excluded.
            let usage = booked_slots
                .iter()
                .filter(|slot| {
                    slot.date == date
                        && slot.equipment_ids.contains(equipment_id)
                        && slot.activity_span().overlaps(&span)
                })
                .count();
            if usage >= item.max_concurrent_users as usize {
                return Err(ConstraintViolation {
                    kind: ViolationKind::Equipment,
                    reason: format!("{} is fully booked at this time", item.name),
                    activity_id: activity.id.clone(),
                    date,
                    start_time,
                });
            }
        }

        Ok(())
    }

    /// The user cannot be in two places at once: the candidate's effective
    /// block (prep included) must not overlap any same-day slot's effective
    /// block, shared resources or not.
    fn check_overlap(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        booked_slots: &[TimeSlot],
    ) -> Result<(), ConstraintViolation> {
        let start_min = minute_of_day(start_time);
        let candidate = MinuteSpan::new(
            start_min - activity.preparation_duration_minutes as i32,
            start_min + activity.duration_minutes as i32,
        );

        for slot in booked_slots.iter().filter(|slot| slot.date == date) {
            if slot.effective_span().overlaps(&candidate) {
                return Err(ConstraintViolation {
                    kind: ViolationKind::Overlap,
                    reason: format!("Clashes with {} (including prep time)", slot.activity_id),
                    activity_id: activity.id.clone(),
                    date,
                    start_time,
                });
            }
        }

        Ok(())
    }

    fn check_time_window(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
    ) -> Result<(), ConstraintViolation> {
        let Some(window) = &activity.time_window else {
            return Ok(());
        };
        let start_min = minute_of_day(start_time);

        if start_min < window.start_minute() {
            return Err(ConstraintViolation {
                kind: ViolationKind::TimeWindow,
                reason: "Starts before the allowed window".to_string(),
                activity_id: activity.id.clone(),
                date,
                start_time,
            });
        }

        if start_min + activity.duration_minutes as i32 > window.end_minute() {
            return Err(ConstraintViolation {
                kind: ViolationKind::TimeWindow,
                reason: "Runs past the end of the allowed window".to_string(),
                activity_id: activity.id.clone(),
                date,
                start_time,
            });
        }

        Ok(())
    }
}
