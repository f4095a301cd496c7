//! Whole-schedule invariants over a mixed fixture, plus randomised checks.

mod common;

use chrono::{Duration, NaiveDate};
use common::{backup_map, make_activity, monday, no_backups, t};
use domain::{
    Activity, ActivityType, AvailabilityBlock, Equipment, Frequency, Location, MaintenanceWindow,
    Specialist, SpecialistType, TimeSlot, TimeWindow, TravelPeriod,
};
use proptest::prelude::*;
use scheduler::{ScheduleEngine, SchedulerState};
use shared::types::{weekday_index, ActivityId};
use std::collections::HashMap;

struct Fixture {
    activities: Vec<Activity>,
    specialists: Vec<Specialist>,
    equipment: Vec<Equipment>,
    travel: Vec<TravelPeriod>,
    backups: HashMap<ActivityId, Activity>,
}

/// A mixed workload exercising every constraint at once.
fn make_fixture() -> Fixture {
    let specialists = vec![Specialist::new(
        "spec_coach",
        "Coach",
        SpecialistType::Trainer,
        vec![
            AvailabilityBlock::new(0, t(8, 0), t(18, 0)).unwrap(),
            AvailabilityBlock::new(2, t(8, 0), t(18, 0)).unwrap(),
            AvailabilityBlock::new(4, t(8, 0), t(12, 0)).unwrap(),
        ],
    )
    .unwrap()
    .with_days_off(vec![monday() + Duration::days(7)])];

    let equipment = vec![
        Equipment::new("equip_tread", "Treadmill", "Gym")
            .unwrap()
            .with_maintenance_windows(vec![MaintenanceWindow::new(
                monday() + Duration::days(4),
                monday() + Duration::days(5),
            )
            .unwrap()]),
        Equipment::new("equip_mat", "Yoga mat", "Home")
            .unwrap()
            .with_portable(true),
    ];

    let travel = vec![TravelPeriod::new(
        "travel_city",
        "City trip",
        monday() + Duration::days(9),
        monday() + Duration::days(11),
    )
    .unwrap()];

    let activities = vec![
        make_activity("act_meds", 1, Frequency::daily(), 5)
            .with_time_window(TimeWindow::new(t(8, 0), t(10, 0)).unwrap())
            .with_remote_capable(true),
        make_activity("act_training", 2, Frequency::weekly(3).unwrap(), 60)
            .with_specialist("spec_coach")
            .with_preparation(15),
        make_activity("act_cardio", 3, Frequency::every_n_days(2).unwrap(), 45)
            .with_equipment(vec!["equip_tread".into()])
            .with_location(Location::Gym),
        make_activity("act_stretch_home", 3, Frequency::daily(), 20)
            .with_location(Location::Home)
            .with_backups(vec!["act_stretch_anywhere".into()]),
        make_activity("act_journal", 4, Frequency::daily(), 15).with_remote_capable(true),
    ];

    let backups = backup_map(vec![make_activity(
        "act_stretch_anywhere",
        3,
        Frequency::daily(),
        15,
    )
    .with_equipment(vec!["equip_mat".into()])
    .with_remote_capable(true)]);

    Fixture {
        activities,
        specialists,
        equipment,
        travel,
        backups,
    }
}

fn run_fixture(fixture: &Fixture, duration_days: u32) -> SchedulerState {
    ScheduleEngine::new(
        &fixture.activities,
        &fixture.specialists,
        &fixture.equipment,
        &fixture.travel,
        monday(),
        duration_days,
        &fixture.backups,
    )
    .unwrap()
    .run()
}

fn assert_no_user_double_booking(state: &SchedulerState) {
    for (i, a) in state.booked_slots.iter().enumerate() {
        for b in state.booked_slots.iter().skip(i + 1) {
            if a.date == b.date {
                assert!(
                    !a.effective_span().overlaps(&b.effective_span()),
                    "slots {} and {} overlap on {}",
                    a.activity_id,
                    b.activity_id,
                    a.date
                );
            }
        }
    }
}

fn assert_within_horizon(state: &SchedulerState, start: NaiveDate, duration_days: u32) {
    let end = start + Duration::days(i64::from(duration_days) - 1);
    for slot in &state.booked_slots {
        assert!(slot.date >= start && slot.date <= end);
    }
}

fn assert_quota_monotonicity(state: &SchedulerState) {
    let quotas: [f64; 5] = [1.00, 0.80, 0.60, 0.50, 0.40];
    let mut per_day_priority: HashMap<(NaiveDate, u8), usize> = HashMap::new();
    for slot in state.booked_slots.iter().filter(|slot| !slot.is_backup) {
        *per_day_priority
            .entry((slot.date, slot.priority))
            .or_default() += 1;
    }
    for ((date, priority), count) in per_day_priority {
        let limit = (10.0 * quotas[priority as usize - 1]).floor() as usize;
        assert!(
            count <= limit,
            "{count} non-backup priority-{priority} slots on {date}, limit {limit}"
        );
    }
}

#[test]
fn booked_slots_never_overlap_for_the_user() {
    let state = run_fixture(&make_fixture(), 14);
    assert!(!state.booked_slots.is_empty());
    assert_no_user_double_booking(&state);
}

#[test]
fn every_slot_stays_inside_the_horizon() {
    let state = run_fixture(&make_fixture(), 14);
    assert_within_horizon(&state, monday(), 14);
}

#[test]
fn specialist_slots_respect_shifts_days_off_and_capacity() {
    let fixture = make_fixture();
    let state = run_fixture(&fixture, 14);
    let coach = &fixture.specialists[0];

    let coach_slots: Vec<&TimeSlot> = state
        .booked_slots
        .iter()
        .filter(|slot| {
            slot.specialist_id
                .as_ref()
                .map(|id| id.as_str())
                == Some("spec_coach")
        })
        .collect();
    assert!(!coach_slots.is_empty());

    for slot in &coach_slots {
        assert!(!coach.is_off(slot.date), "booked on a day off: {}", slot.date);
        let covered = coach
            .blocks_for(weekday_index(slot.date))
            .any(|block| block.contains_span(slot.activity_span()));
        assert!(covered, "slot outside every shift: {} {}", slot.date, slot.start_time);
    }

    // Capacity 1: no two coach slots may cover the same instant.
    for (i, a) in coach_slots.iter().enumerate() {
        for b in coach_slots.iter().skip(i + 1) {
            if a.date == b.date {
                assert!(!a.effective_span().overlaps(&b.effective_span()));
            }
        }
    }
}

#[test]
fn equipment_slots_respect_maintenance_and_capacity() {
    let fixture = make_fixture();
    let state = run_fixture(&fixture, 14);
    let treadmill = &fixture.equipment[0];

    let treadmill_slots: Vec<&TimeSlot> = state
        .booked_slots
        .iter()
        .filter(|slot| slot.equipment_ids.iter().any(|id| id.as_str() == "equip_tread"))
        .collect();
    assert!(!treadmill_slots.is_empty());

    for slot in &treadmill_slots {
        assert!(!treadmill.under_maintenance(slot.date));
    }
    for (i, a) in treadmill_slots.iter().enumerate() {
        for b in treadmill_slots.iter().skip(i + 1) {
            if a.date == b.date {
                assert!(!a.activity_span().overlaps(&b.activity_span()));
            }
        }
    }
}

#[test]
fn travel_days_only_carry_valid_slots() {
    let fixture = make_fixture();
    let state = run_fixture(&fixture, 14);
    let trip = &fixture.travel[0];
    let portable_ids = ["equip_mat"];

    for slot in state.booked_slots.iter().filter(|slot| trip.contains(slot.date)) {
        if slot.is_backup {
            continue;
        }
        let activity = fixture
            .activities
            .iter()
            .find(|activity| activity.id == slot.activity_id)
            .expect("primary slot must come from a primary activity");

        let effectively_remote = activity.remote_capable
            || (!activity.equipment_ids.is_empty()
                && activity
                    .equipment_ids
                    .iter()
                    .all(|id| portable_ids.contains(&id.as_str())));

        assert!(
            effectively_remote || activity.location != Location::Home,
            "{} booked during travel but bound to home",
            activity.id
        );
        for id in &activity.equipment_ids {
            assert!(
                portable_ids.contains(&id.as_str())
                    || trip.available_equipment_ids.contains(id),
                "{} uses unavailable equipment during travel",
                activity.id
            );
        }
    }
}

#[test]
fn windowed_slots_stay_inside_their_window() {
    let fixture = make_fixture();
    let state = run_fixture(&fixture, 14);

    let meds_window = fixture.activities[0].time_window.unwrap();
    for slot in state.slots_for_activity("act_meds") {
        let span = slot.activity_span();
        assert!(meds_window.start_minute() <= span.start);
        assert!(span.end <= meds_window.end_minute());
    }
}

#[test]
fn backup_tagging_is_consistent() {
    let fixture = make_fixture();
    let state = run_fixture(&fixture, 14);

    for slot in &state.booked_slots {
        assert_eq!(slot.is_backup, slot.original_activity_id.is_some());
        if let Some(original_id) = &slot.original_activity_id {
            let original = fixture
                .activities
                .iter()
                .find(|activity| &activity.id == original_id)
                .expect("original must be a primary activity");
            assert!(
                original.backup_activity_ids.contains(&slot.activity_id),
                "backup {} is not in {}'s chain",
                slot.activity_id,
                original_id
            );
        }
    }
}

#[test]
fn identical_inputs_produce_identical_schedules() {
    let fixture = make_fixture();
    let first = run_fixture(&fixture, 14);
    let second = run_fixture(&fixture, 14);
    assert_eq!(first.booked_slots, second.booked_slots);
    assert_eq!(
        first.failure_report().len(),
        second.failure_report().len()
    );
}

#[test]
fn non_backup_quota_holds_across_the_run() {
    let state = run_fixture(&make_fixture(), 14);
    assert_quota_monotonicity(&state);
}

// Randomised workloads: whatever the mix, the structural invariants hold
// and the pass is deterministic.

fn arbitrary_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::daily()),
        (1u32..=4).prop_map(|count| Frequency::weekly(count).unwrap()),
        (1u32..=3).prop_map(|count| Frequency::monthly(count).unwrap()),
        (1u32..=5).prop_map(|interval| Frequency::every_n_days(interval).unwrap()),
    ]
}

type ActivitySpec = (u8, u32, u32, Frequency, bool);

fn arbitrary_activity_spec() -> impl Strategy<Value = ActivitySpec> {
    (
        1u8..=5,
        prop_oneof![Just(15u32), Just(30), Just(45), Just(60)],
        prop_oneof![Just(0u32), Just(10), Just(20)],
        arbitrary_frequency(),
        any::<bool>(),
    )
}

fn build_activity(index: usize, spec: ActivitySpec) -> Activity {
    let (priority, duration, prep, frequency, windowed) = spec;
    let mut activity = Activity::new(
        format!("act_{index:02}"),
        format!("Random activity {index}"),
        ActivityType::Other,
        priority,
        frequency,
        duration,
    )
    .unwrap()
    .with_preparation(prep);
    if windowed {
        activity = activity.with_time_window(TimeWindow::new(t(8, 0), t(14, 0)).unwrap());
    }
    activity
}

fn arbitrary_workload() -> impl Strategy<Value = Vec<Activity>> {
    prop::collection::vec(arbitrary_activity_spec(), 1..=6).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| build_activity(index, spec))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_randomised_workloads_keep_invariants(
        activities in arbitrary_workload(),
        duration_days in 1u32..=21,
    ) {
        let backups = no_backups();
        let state = ScheduleEngine::new(
            &activities, &[], &[], &[], monday(), duration_days, &backups,
        )
        .unwrap()
        .run();

        assert_no_user_double_booking(&state);
        assert_within_horizon(&state, monday(), duration_days);
        assert_quota_monotonicity(&state);

        // Determinism across a re-run of the same inputs.
        let again = ScheduleEngine::new(
            &activities, &[], &[], &[], monday(), duration_days, &backups,
        )
        .unwrap()
        .run();
        prop_assert_eq!(state.booked_slots, again.booked_slots);
    }
}
