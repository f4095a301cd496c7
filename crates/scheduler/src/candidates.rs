//! Candidate `(date, time)` generation for one occurrence of an activity.
//!
//! Narrow scope aims at the occurrence's target date (with a ±1 day flex
//! for non-daily patterns); wide scope enumerates the occurrence's whole
//! 7-day block so weekly and monthly tasks locked out of their preferred
//! day can still land somewhere in the period.

use chrono::{Duration, NaiveDate, NaiveTime};
use domain::{Activity, Frequency, FrequencyPattern};
use shared::types::{time_from_minute, weekday_index};

/// Inclusive date range the engine may book into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Horizon {
    pub fn new(start: NaiveDate, duration_days: u32) -> Self {
        Self {
            start,
            end: start + Duration::days(i64::from(duration_days) - 1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1).max(0) as u32
    }
}

/// How far from the target date the generator may roam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The occurrence's target date, ±1 day for non-daily patterns.
    Narrow,
    /// Every date of the occurrence's 7-day block (Weekly/Monthly only).
    Wide,
}

/// Start times tried when an activity has no explicit window, as minutes of
/// day: 07:00, 09:00, 12:00, 17:00, 19:00 and 22:00.
const OPEN_START_MINUTES: [i32; 6] = [420, 540, 720, 1020, 1140, 1320];

/// Interval between candidate starts within a time window.
const WINDOW_STEP_MINUTES: i32 = 30;

/// Candidate `(date, time)` pairs for occurrence `index` of `activity`,
/// in deterministic enumeration order.
pub fn generate_candidates(
    activity: &Activity,
    index: u32,
    scope: Scope,
    horizon: Horizon,
) -> Vec<(NaiveDate, NaiveTime)> {
    let frequency = &activity.frequency;
    let mut candidates = Vec::new();

    if scope == Scope::Wide {
        let block_start = match frequency.pattern {
            FrequencyPattern::Weekly => {
                horizon.start + Duration::days(7 * i64::from(index / frequency.count))
            }
            FrequencyPattern::Monthly => {
                horizon.start + Duration::days(30 * i64::from(index / frequency.count))
            }
            _ => return candidates,
        };
        for offset in 0..7 {
            let day = block_start + Duration::days(offset);
            if horizon.contains(day) {
                push_times_for_date(activity, day, &mut candidates);
            }
        }
        return candidates;
    }

    let target = target_date(frequency, index, horizon.start);
    if horizon.contains(target) {
        push_times_for_date(activity, target, &mut candidates);
    }

    // Daily tasks are rigid; everything else gets a day of flex either side.
    if frequency.pattern != FrequencyPattern::Daily {
        let before = target - Duration::days(1);
        if before >= horizon.start {
            push_times_for_date(activity, before, &mut candidates);
        }
        let after = target + Duration::days(1);
        if after <= horizon.end {
            push_times_for_date(activity, after, &mut candidates);
        }
    }

    candidates
}

/// The ideal date for occurrence `index`, derived from the pattern.
fn target_date(frequency: &Frequency, index: u32, start: NaiveDate) -> NaiveDate {
    match frequency.pattern {
        FrequencyPattern::Daily => start + Duration::days(i64::from(index)),
        FrequencyPattern::Weekly => {
            let week_num = index / frequency.count;
            let occurrence_in_week = index % frequency.count;

            let weekday = match &frequency.preferred_days {
                Some(days) if !days.is_empty() => {
                    i64::from(days[occurrence_in_week as usize % days.len()])
                }
                // Default spread: Mon, Wed, Fri, ...
                _ => i64::from((occurrence_in_week * 2) % 7),
            };

            let week_start = start + Duration::days(7 * i64::from(week_num));
            let offset = (weekday - i64::from(weekday_index(week_start))).rem_euclid(7);
            week_start + Duration::days(offset)
        }
        // 30-day blocks approximate calendar months.
        FrequencyPattern::Monthly => {
            start + Duration::days(30 * i64::from(index / frequency.count))
        }
        FrequencyPattern::Custom => {
            let interval = frequency.interval_days.unwrap_or(1);
            start + Duration::days(i64::from(index) * i64::from(interval))
        }
    }
}

/// Emit the start times tried on a single date: every 30 minutes through an
/// explicit window, or the fixed open-schedule palette.
fn push_times_for_date(
    activity: &Activity,
    date: NaiveDate,
    out: &mut Vec<(NaiveDate, NaiveTime)>,
) {
    match &activity.time_window {
        Some(window) => {
            let mut minute = window.start_minute();
            while minute <= window.end_minute() {
                if minute + activity.duration_minutes as i32 <= window.end_minute() {
                    if let Some(time) = time_from_minute(minute) {
                        out.push((date, time));
                    }
                }
                minute += WINDOW_STEP_MINUTES;
            }
        }
        None => {
            for minute in OPEN_START_MINUTES {
                if let Some(time) = time_from_minute(minute) {
                    out.push((date, time));
                }
            }
        }
    }
}
