//! The placement engine: one deterministic greedy pass from demand to
//! schedule.
//!
//! Occurrence expansion turns recurring activities into concrete instances;
//! a difficulty sort places the most constrained instances first; each
//! instance then runs a three-scope cascade (narrow primary, narrow
//! fallback chain, wide primary) and the first feasible best-scoring
//! candidate is committed. No backtracking, no re-entry.

use crate::candidates::{generate_candidates, Horizon, Scope};
use crate::config::SchedulerConfig;
use crate::constraints::{ConstraintChecker, ConstraintViolation, ViolationKind};
use crate::scoring::SlotScorer;
use crate::state::SchedulerState;
use chrono::{NaiveDate, NaiveTime};
use domain::{Activity, Equipment, FrequencyPattern, Specialist, TimeSlot, TravelPeriod};
use shared::types::{ActivityId, EquipmentId, SpecialistId};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Broken input invariants the engine refuses to run with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Activity {activity} references unknown specialist {specialist}")]
    UnknownSpecialist {
        activity: ActivityId,
        specialist: SpecialistId,
    },

    #[error("Activity {activity} references unknown equipment {equipment}")]
    UnknownEquipment {
        activity: ActivityId,
        equipment: EquipmentId,
    },
}

/// One concrete instance of a recurring activity, demanding a single slot.
struct Occurrence<'a> {
    activity: &'a Activity,
    index_in_sequence: u32,
    difficulty: i32,
}

/// Main scheduling engine. Borrows demand and supply read-only, owns the
/// state it populates, and hands the state back from [`ScheduleEngine::run`].
pub struct ScheduleEngine<'a> {
    activities: &'a [Activity],
    checker: ConstraintChecker<'a>,
    scorer: SlotScorer,
    state: SchedulerState,
    /// Primaries plus backup-only activities, for fallback resolution.
    activity_map: HashMap<&'a str, &'a Activity>,
    /// date -> priority -> bookings committed (backups included).
    daily_load: HashMap<NaiveDate, HashMap<u8, u32>>,
    horizon: Horizon,
    config: SchedulerConfig,
}

impl<'a> ScheduleEngine<'a> {
    /// Build an engine over borrowed inputs.
    ///
    /// Fails fast if any activity (primary or backup) references a
    /// specialist or equipment id that does not resolve; such an input
    /// would silently mis-schedule.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        activities: &'a [Activity],
        specialists: &'a [Specialist],
        equipment: &'a [Equipment],
        travel_periods: &'a [TravelPeriod],
        start_date: NaiveDate,
        duration_days: u32,
        backup_lookup: &'a HashMap<ActivityId, Activity>,
    ) -> Result<Self, SchedulerError> {
        let known_specialists: HashSet<&str> =
            specialists.iter().map(|s| s.id.as_str()).collect();
        let known_equipment: HashSet<&str> = equipment.iter().map(|e| e.id.as_str()).collect();

        for activity in activities.iter().chain(backup_lookup.values()) {
            if let Some(specialist_id) = &activity.specialist_id {
                if !known_specialists.contains(specialist_id.as_str()) {
                    return Err(SchedulerError::UnknownSpecialist {
                        activity: activity.id.clone(),
                        specialist: specialist_id.clone(),
                    });
                }
            }
            for equipment_id in &activity.equipment_ids {
                if !known_equipment.contains(equipment_id.as_str()) {
                    return Err(SchedulerError::UnknownEquipment {
                        activity: activity.id.clone(),
                        equipment: equipment_id.clone(),
                    });
                }
            }
        }

        let mut activity_map: HashMap<&str, &Activity> =
            activities.iter().map(|a| (a.id.as_str(), a)).collect();
        for (id, activity) in backup_lookup {
            activity_map.insert(id.as_str(), activity);
        }

        Ok(Self {
            activities,
            checker: ConstraintChecker::new(specialists, equipment, travel_periods),
            scorer: SlotScorer::new(),
            state: SchedulerState::new(),
            activity_map,
            daily_load: HashMap::new(),
            horizon: Horizon::new(start_date, duration_days),
            config: SchedulerConfig::default(),
        })
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute the scheduling pipeline and return the populated state.
    pub fn run(mut self) -> SchedulerState {
        let mut occurrences = self.expand_occurrences();
        info!(
            activities = self.activities.len(),
            occurrences = occurrences.len(),
            start = %self.horizon.start,
            end = %self.horizon.end,
            "starting scheduling pass"
        );

        // Hardest first; the stable sort keeps expansion order on ties,
        // which is what makes the whole pass deterministic.
        occurrences.sort_by_key(|occurrence| Reverse(occurrence.difficulty));

        for occurrence in occurrences {
            self.place_occurrence(occurrence);
        }

        info!(
            booked = self.state.booked_slots.len(),
            failures = self.state.failure_log().len(),
            "scheduling pass complete"
        );
        self.state
    }

    /// The three-scope cascade for one occurrence.
    fn place_occurrence(&mut self, occurrence: Occurrence<'a>) {
        let activity = occurrence.activity;
        let index = occurrence.index_in_sequence;

        let mut placed = self.attempt_placement(activity, index, Scope::Narrow, None);

        if !placed && !activity.backup_activity_ids.is_empty() {
            placed = self.attempt_fallback_chain(activity, index);
        }

        // Liquid scheduling: weekly and monthly tasks may land anywhere in
        // their period when the preferred days are locked out.
        if !placed
            && matches!(
                activity.frequency.pattern,
                FrequencyPattern::Weekly | FrequencyPattern::Monthly
            )
        {
            placed = self.attempt_placement(activity, index, Scope::Wide, None);
        }

        if !placed {
            self.state.record_failure(
                activity,
                ConstraintViolation {
                    kind: ViolationKind::Exhaustion,
                    reason: "All placement attempts failed".to_string(),
                    activity_id: activity.id.clone(),
                    date: self.horizon.start,
                    start_time: NaiveTime::MIN,
                },
            );
        }
    }

    /// Try to commit one slot for `activity`. Shared by primary and backup
    /// attempts; `backup_of` carries the failed primary's id for fallbacks.
    fn attempt_placement(
        &mut self,
        activity: &'a Activity,
        index: u32,
        scope: Scope,
        backup_of: Option<&ActivityId>,
    ) -> bool {
        let is_backup = backup_of.is_some();
        let candidates = generate_candidates(activity, index, scope, self.horizon);

        let mut feasible: Vec<(f64, NaiveDate, NaiveTime)> = Vec::new();
        for (date, time) in candidates {
            // Backups are a last resort and skip the quota gate.
            if !is_backup && !self.quota_allows(date, activity.priority) {
                continue;
            }

            match self
                .checker
                .check_time_slot(activity, date, time, &self.state.booked_slots, is_backup)
            {
                Ok(()) => {
                    let score =
                        self.scorer
                            .calculate_score(activity, date, time, &self.state.booked_slots);
                    feasible.push((score, date, time));
                }
                Err(violation) => {
                    // Primary rejections feed the failure report; backup
                    // rejections would only be noise.
                    if !is_backup {
                        self.state.record_failure(activity, violation);
                    }
                }
            }
        }

        if feasible.is_empty() {
            return false;
        }

        // Stable sort: equal scores keep the generator's enumeration order.
        feasible.sort_by(|a, b| b.0.total_cmp(&a.0));
        let (score, date, time) = feasible[0];

        let slot = match backup_of {
            Some(original) => TimeSlot::backup(activity, date, time, original.clone()),
            None => TimeSlot::primary(activity, date, time),
        };

        self.scorer.record_booking(&slot);
        *self
            .daily_load
            .entry(date)
            .or_default()
            .entry(activity.priority)
            .or_default() += 1;
        debug!(
            activity = %activity.id,
            %date,
            %time,
            score,
            is_backup,
            "committed slot"
        );
        self.state.add_booking(slot);
        true
    }

    /// Walk the primary's backup chain in order; the first backup that
    /// places wins. The chain is walked linearly, never recursively: a
    /// backup's own backups are not considered.
    fn attempt_fallback_chain(&mut self, primary: &'a Activity, index: u32) -> bool {
        for backup_id in &primary.backup_activity_ids {
            let Some(backup) = self.activity_map.get(backup_id.as_str()).copied() else {
                warn!(backup = %backup_id, primary = %primary.id, "backup activity not found, skipping");
                continue;
            };

            info!(primary = %primary.name, backup = %backup.name, "triggering fallback");
            if self.attempt_placement(backup, index, Scope::Narrow, Some(&primary.id)) {
                return true;
            }
        }
        false
    }

    /// Keep any single priority tier from monopolizing a day.
    fn quota_allows(&self, date: NaiveDate, priority: u8) -> bool {
        let current = self
            .daily_load
            .get(&date)
            .and_then(|by_priority| by_priority.get(&priority))
            .copied()
            .unwrap_or(0);
        f64::from(current) < self.config.daily_quota(priority)
    }

    /// Flatten the recurring activities into the occurrences to place, each
    /// tagged with its difficulty rank.
    fn expand_occurrences(&self) -> Vec<Occurrence<'a>> {
        let mut occurrences = Vec::new();
        for activity in self.activities {
            let count = self.required_count(activity);
            let difficulty = difficulty_score(activity);
            for index_in_sequence in 0..count {
                occurrences.push(Occurrence {
                    activity,
                    index_in_sequence,
                    difficulty,
                });
            }
        }
        occurrences
    }

    /// Demanded occurrences over the horizon for one activity.
    fn required_count(&self, activity: &Activity) -> u32 {
        let days = self.horizon.days();
        let frequency = &activity.frequency;
        match frequency.pattern {
            FrequencyPattern::Daily => days,
            FrequencyPattern::Weekly => (days / 7) * frequency.count,
            FrequencyPattern::Monthly => (days / 30) * frequency.count,
            FrequencyPattern::Custom => days / frequency.interval_days.unwrap_or(1),
        }
    }
}

/// Heuristic rank: scarce resources and tight windows schedule first, with
/// priority dominating everything else.
fn difficulty_score(activity: &Activity) -> i32 {
    let mut score = (6 - i32::from(activity.priority)) * 100;
    if activity.specialist_id.is_some() {
        score += 50;
    }
    score += 30 * activity.equipment_ids.len() as i32;
    if activity.time_window.is_some() {
        score += 40;
    }
    score
}
