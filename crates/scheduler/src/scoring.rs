//! Soft-constraint scoring: how good is a feasible slot?
//!
//! Hard constraints are binary; this grades the survivors on a 0-100 scale
//! so the engine can pick slots that make a humane schedule: centred in
//! their windows, clustered into blocks, buffered against overruns, and
//! landing on consistent weekdays.

use chrono::{NaiveDate, NaiveTime};
use domain::{Activity, TimeSlot};
use shared::types::{minute_of_day, weekday_index, ActivityId};
use std::collections::HashMap;

const BASE_SCORE: f64 = 50.0;

/// Gap bands for the buffer term, in minutes.
const DANGER_GAP: i32 = 15;
const GOLDILOCKS_GAP: i32 = 45;
const FRAGMENTATION_GAP: i32 = 90;

/// Evaluates candidate slots against soft preferences.
///
/// Stateful only in the weekday history it keeps per activity, fed by
/// [`SlotScorer::record_booking`] after each commit.
#[derive(Debug, Default)]
pub struct SlotScorer {
    weekday_history: HashMap<ActivityId, Vec<u8>>,
}

impl SlotScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score a feasible `(activity, date, start_time)` triple, clamped to
    /// [0, 100].
    pub fn calculate_score(
        &self,
        activity: &Activity,
        date: NaiveDate,
        start_time: NaiveTime,
        booked_slots: &[TimeSlot],
    ) -> f64 {
        let mut score = BASE_SCORE;
        score += self.score_window_fit(activity, start_time);
        score += self.score_consistency(&activity.id, date);
        score += score_clustering(date, start_time, activity.duration_minutes, booked_slots);
        score += score_buffer(date, start_time, activity, booked_slots);
        score.clamp(0.0, 100.0)
    }

    /// Update the weekday history after a successful commit.
    pub fn record_booking(&mut self, slot: &TimeSlot) {
        self.weekday_history
            .entry(slot.activity_id.clone())
            .or_default()
            .push(weekday_index(slot.date));
    }

    /// Parabolic preference for the centre of the time window: +20 at the
    /// midpoint, 0 at the edges. Neutral without a window.
    fn score_window_fit(&self, activity: &Activity, start_time: NaiveTime) -> f64 {
        let Some(window) = &activity.time_window else {
            return 0.0;
        };
        let window_duration = window.duration_minutes();
        if window_duration <= 0 {
            return 0.0;
        }

        let position =
            f64::from(minute_of_day(start_time) - window.start_minute()) / f64::from(window_duration);
        (1.0 - 4.0 * (position - 0.5).powi(2)) * 20.0
    }

    /// Reward repeating an activity on the same weekday as earlier bookings.
    fn score_consistency(&self, activity_id: &ActivityId, date: NaiveDate) -> f64 {
        let weekday = weekday_index(date);
        let Some(history) = self.weekday_history.get(activity_id) else {
            return 0.0;
        };

        let count = history.iter().filter(|&&day| day == weekday).count();
        if count > 2 {
            10.0
        } else if count > 0 {
            5.0
        } else {
            0.0
        }
    }
}

/// Reward back-to-back placement, penalize island tasks. Neutral on an
/// empty day.
fn score_clustering(
    date: NaiveDate,
    start_time: NaiveTime,
    duration_minutes: u32,
    booked_slots: &[TimeSlot],
) -> f64 {
    let mut day_slots = booked_slots.iter().filter(|slot| slot.date == date).peekable();
    if day_slots.peek().is_none() {
        return 0.0;
    }

    let start_min = minute_of_day(start_time);
    let end_min = start_min + duration_minutes as i32;

    for slot in day_slots {
        let span = slot.activity_span();
        if (span.end - start_min).abs() < DANGER_GAP || (end_min - span.start).abs() < DANGER_GAP {
            return 15.0;
        }
    }

    -5.0
}

/// Score the breathing room around the candidate by the tightest gap to a
/// neighbouring slot:
///
/// - under 15 min: delays cascade, linear penalty down to -10;
/// - 15-45 min: ideal buffer, +10;
/// - 46-90 min: acceptable dead time, +5;
/// - over 90 min: fragmented day, neutral.
///
/// The first activity of a day always gets +10.
fn score_buffer(
    date: NaiveDate,
    start_time: NaiveTime,
    activity: &Activity,
    booked_slots: &[TimeSlot],
) -> f64 {
    let day_slots: Vec<&TimeSlot> = booked_slots
        .iter()
        .filter(|slot| slot.date == date)
        .collect();
    if day_slots.is_empty() {
        return 10.0;
    }

    let candidate_start = minute_of_day(start_time);
    let candidate_end = candidate_start
        + (activity.duration_minutes + activity.preparation_duration_minutes) as i32;

    let mut tightest_gap: Option<i32> = None;
    let mut track = |gap: i32| {
        if tightest_gap.map_or(true, |best| gap < best) {
            tightest_gap = Some(gap);
        }
    };

    for slot in &day_slots {
        let slot_start = minute_of_day(slot.start_time);
        let slot_end = slot_start + (slot.duration_minutes + slot.prep_duration_minutes) as i32;

        if slot_end <= candidate_start {
            track(candidate_start - slot_end);
        }
        if candidate_end <= slot_start {
            track(slot_start - candidate_end);
        }
    }

    match tightest_gap {
        // No slot strictly before or after: treat like an open day.
        None => 10.0,
        Some(gap) if gap < DANGER_GAP => -10.0 + f64::from(gap) / 1.5,
        Some(gap) if gap <= GOLDILOCKS_GAP => 10.0,
        Some(gap) if gap <= FRAGMENTATION_GAP => 5.0,
        Some(_) => 0.0,
    }
}
