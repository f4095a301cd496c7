//! Mutable memory of one scheduling run: bookings, resource usage indices,
//! failure log and the reporting built from them.

use crate::constraints::{ConstraintViolation, ViolationKind};
use chrono::NaiveDate;
use domain::{Activity, TimeSlot};
use serde::Serialize;
use shared::types::{ActivityId, EquipmentId, SpecialistId};
use std::collections::{BTreeMap, HashMap};

/// Accumulated failed attempts for one activity.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub priority: u8,
    /// How many candidates were rejected across all placement attempts.
    pub attempts: u32,
    pub violations: Vec<ConstraintViolation>,
}

impl FailureRecord {
    /// Occurrences dropped entirely (one Exhaustion per dropped occurrence).
    pub fn exhaustion_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.kind == ViolationKind::Exhaustion)
            .count()
    }

    pub fn is_terminal(&self) -> bool {
        self.exhaustion_count() > 0
    }
}

/// Success/failure tally for one priority tier.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PriorityStats {
    pub success: usize,
    pub failed: usize,
}

impl PriorityStats {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.success as f64 / self.total() as f64 * 100.0
        }
    }
}

/// Aggregate view of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleStatistics {
    pub total_slots: usize,
    pub primary_slots: usize,
    pub backup_slots: usize,
    /// Share of the delivered schedule that came from fallbacks, 0-100.
    pub resilience_rate: f64,
    pub unique_activities: usize,
    /// Placed occurrences over total demand (placed + dropped), 0-100.
    pub overall_success_rate: f64,
    pub priority_breakdown: BTreeMap<u8, PriorityStats>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub busiest_day: Option<(NaiveDate, usize)>,
    pub specialist_usage: BTreeMap<SpecialistId, usize>,
    pub equipment_usage: BTreeMap<EquipmentId, usize>,
    /// Activities that dropped at least one occurrence.
    pub terminal_failure_count: usize,
}

/// One line of the user-facing failure report.
#[derive(Debug, Clone, Serialize)]
pub struct FailureReportEntry {
    pub activity_id: ActivityId,
    pub activity_name: String,
    pub priority: u8,
    pub total_attempts: u32,
    /// The violation kind rejected most often for this activity.
    pub primary_failure_cause: ViolationKind,
    pub violation_breakdown: BTreeMap<ViolationKind, usize>,
    /// The first recorded rejection reason, as a representative sample.
    pub sample_reason: String,
}

/// Mutable scheduler state: created empty, populated by the engine during
/// one run, then handed back to the caller as the result.
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// The master schedule, in commit order.
    pub booked_slots: Vec<TimeSlot>,
    // Indices into `booked_slots`, keyed by resource.
    specialist_bookings: HashMap<SpecialistId, Vec<usize>>,
    equipment_bookings: HashMap<EquipmentId, Vec<usize>>,
    activity_occurrences: HashMap<ActivityId, u32>,
    failed_activities: HashMap<ActivityId, FailureRecord>,
    // original primary id -> backup slots booked in its stead.
    backup_activations: HashMap<ActivityId, Vec<usize>>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a successful booking, updating every index and counter.
    pub fn add_booking(&mut self, slot: TimeSlot) {
        let index = self.booked_slots.len();

        if let Some(specialist_id) = &slot.specialist_id {
            self.specialist_bookings
                .entry(specialist_id.clone())
                .or_default()
                .push(index);
        }
        for equipment_id in &slot.equipment_ids {
            self.equipment_bookings
                .entry(equipment_id.clone())
                .or_default()
                .push(index);
        }

        *self
            .activity_occurrences
            .entry(slot.activity_id.clone())
            .or_default() += 1;

        if slot.is_backup {
            if let Some(original) = &slot.original_activity_id {
                self.backup_activations
                    .entry(original.clone())
                    .or_default()
                    .push(index);
            }
        }

        self.booked_slots.push(slot);
    }

    /// Log a rejected candidate or a terminal Exhaustion for an activity,
    /// aggregating across attempts.
    pub fn record_failure(&mut self, activity: &Activity, violation: ConstraintViolation) {
        let record = self
            .failed_activities
            .entry(activity.id.clone())
            .or_insert_with(|| FailureRecord {
                activity_id: activity.id.clone(),
                activity_name: activity.name.clone(),
                priority: activity.priority,
                attempts: 0,
                violations: Vec::new(),
            });
        record.attempts += 1;
        record.violations.push(violation);
    }

    pub fn slots_for_date(&self, date: NaiveDate) -> Vec<&TimeSlot> {
        self.booked_slots
            .iter()
            .filter(|slot| slot.date == date)
            .collect()
    }

    pub fn slots_for_activity(&self, activity_id: &str) -> Vec<&TimeSlot> {
        self.booked_slots
            .iter()
            .filter(|slot| slot.activity_id.as_str() == activity_id)
            .collect()
    }

    /// How many times an activity has been booked so far.
    pub fn occurrence_count(&self, activity_id: &str) -> u32 {
        self.activity_occurrences
            .get(activity_id)
            .copied()
            .unwrap_or(0)
    }

    /// Backup slots booked in place of the given primary.
    pub fn backups_for(&self, original_activity_id: &str) -> Vec<&TimeSlot> {
        self.backup_activations
            .get(original_activity_id)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&index| self.booked_slots.get(index))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn failure_log(&self) -> &HashMap<ActivityId, FailureRecord> {
        &self.failed_activities
    }

    /// First and last booked dates, if anything was booked.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.booked_slots.iter().map(|slot| slot.date).min()?;
        let last = self.booked_slots.iter().map(|slot| slot.date).max()?;
        Some((first, last))
    }

    pub fn statistics(&self) -> ScheduleStatistics {
        let total_slots = self.booked_slots.len();
        let backup_slots = self
            .booked_slots
            .iter()
            .filter(|slot| slot.is_backup)
            .count();
        let primary_slots = total_slots - backup_slots;

        let resilience_rate = if total_slots > 0 {
            backup_slots as f64 / total_slots as f64 * 100.0
        } else {
            0.0
        };

        let mut date_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for slot in &self.booked_slots {
            *date_counts.entry(slot.date).or_default() += 1;
        }
        // Earliest date wins ties.
        let mut busiest_day: Option<(NaiveDate, usize)> = None;
        for (&date, &count) in &date_counts {
            if busiest_day.map_or(true, |(_, best)| count > best) {
                busiest_day = Some((date, count));
            }
        }

        let mut priority_breakdown: BTreeMap<u8, PriorityStats> = BTreeMap::new();
        for slot in &self.booked_slots {
            priority_breakdown.entry(slot.priority).or_default().success += 1;
        }
        for record in self.failed_activities.values() {
            let dropped = record.exhaustion_count();
            if dropped > 0 {
                priority_breakdown.entry(record.priority).or_default().failed += dropped;
            }
        }

        let total_demand: usize = priority_breakdown.values().map(PriorityStats::total).sum();
        let overall_success_rate = if total_demand > 0 {
            total_slots as f64 / total_demand as f64 * 100.0
        } else {
            0.0
        };

        ScheduleStatistics {
            total_slots,
            primary_slots,
            backup_slots,
            resilience_rate,
            unique_activities: self.activity_occurrences.len(),
            overall_success_rate,
            priority_breakdown,
            date_range: self.date_range(),
            busiest_day,
            specialist_usage: self
                .specialist_bookings
                .iter()
                .map(|(id, indices)| (id.clone(), indices.len()))
                .collect(),
            equipment_usage: self
                .equipment_bookings
                .iter()
                .map(|(id, indices)| (id.clone(), indices.len()))
                .collect(),
            terminal_failure_count: self
                .failed_activities
                .values()
                .filter(|record| record.is_terminal())
                .count(),
        }
    }

    /// What could not be scheduled and why. Only activities that dropped an
    /// occurrence outright appear; activities saved by a backup are omitted.
    /// Sorted by priority (critical first), then activity id.
    pub fn failure_report(&self) -> Vec<FailureReportEntry> {
        let mut report: Vec<FailureReportEntry> = self
            .failed_activities
            .values()
            .filter(|record| record.is_terminal())
            .map(|record| {
                let mut violation_breakdown: BTreeMap<ViolationKind, usize> = BTreeMap::new();
                for violation in &record.violations {
                    *violation_breakdown.entry(violation.kind).or_default() += 1;
                }

                // Most frequent kind; declaration order breaks ties.
                let mut primary_failure_cause = ViolationKind::Exhaustion;
                let mut best_count = 0;
                for (&kind, &count) in &violation_breakdown {
                    if count > best_count {
                        primary_failure_cause = kind;
                        best_count = count;
                    }
                }

                FailureReportEntry {
                    activity_id: record.activity_id.clone(),
                    activity_name: record.activity_name.clone(),
                    priority: record.priority,
                    total_attempts: record.attempts,
                    primary_failure_cause,
                    violation_breakdown,
                    sample_reason: record
                        .violations
                        .first()
                        .map(|violation| violation.reason.clone())
                        .unwrap_or_default(),
                }
            })
            .collect();

        report.sort_by(|a, b| {
            (a.priority, &a.activity_id).cmp(&(b.priority, &b.activity_id))
        });
        report
    }

    /// Reset to empty (useful for tests or re-running phases).
    pub fn clear(&mut self) {
        self.booked_slots.clear();
        self.specialist_bookings.clear();
        self.equipment_bookings.clear();
        self.activity_occurrences.clear();
        self.failed_activities.clear();
        self.backup_activations.clear();
    }
}
