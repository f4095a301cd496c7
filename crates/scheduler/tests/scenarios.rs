//! End-to-end scheduling scenarios with literal inputs and expected
//! outcomes.

mod common;

use chrono::Duration;
use common::{backup_map, make_activity, monday, no_backups, t};
use domain::{
    AvailabilityBlock, Equipment, Frequency, Location, Specialist, SpecialistType, TravelPeriod,
};
use scheduler::{ScheduleEngine, ViolationKind};
use shared::types::weekday_index;

#[test]
fn single_daily_activity_fills_every_day_at_seven() {
    let activities = vec![make_activity("act_walk", 3, Frequency::daily(), 30)];
    let backups = no_backups();

    let state = ScheduleEngine::new(&activities, &[], &[], &[], monday(), 7, &backups)
        .unwrap()
        .run();

    assert_eq!(state.booked_slots.len(), 7);
    for (day, slot) in state.booked_slots.iter().enumerate() {
        assert_eq!(slot.date, monday() + Duration::days(day as i64));
        // All palette times tie on an empty day; determinism picks the
        // first enumerated, 07:00.
        assert_eq!(slot.start_time, t(7, 0));
        assert!(!slot.is_backup);
    }
    assert!(state.failure_report().is_empty());
}

#[test]
fn weekly_fallback_serves_non_monday_occurrences() {
    // The specialist only works Mondays; the default weekly spread targets
    // Monday and Wednesday, so half the occurrences must fall back.
    let specialists = vec![Specialist::new(
        "spec_mon",
        "Monday-only specialist",
        SpecialistType::Trainer,
        vec![AvailabilityBlock::new(0, t(9, 0), t(17, 0)).unwrap()],
    )
    .unwrap()];

    let activities = vec![make_activity("act_session", 3, Frequency::weekly(2).unwrap(), 60)
        .with_specialist("spec_mon")
        .with_backups(vec!["act_solo".into()])];
    let backups = backup_map(vec![make_activity(
        "act_solo",
        3,
        Frequency::weekly(2).unwrap(),
        30,
    )
    .with_remote_capable(true)]);

    let state = ScheduleEngine::new(&activities, &specialists, &[], &[], monday(), 14, &backups)
        .unwrap()
        .run();

    // 2 weeks x 2 occurrences.
    assert_eq!(state.booked_slots.len(), 4);

    let primaries: Vec<_> = state.booked_slots.iter().filter(|s| !s.is_backup).collect();
    let fallbacks: Vec<_> = state.booked_slots.iter().filter(|s| s.is_backup).collect();
    assert_eq!(primaries.len(), 2);
    assert_eq!(fallbacks.len(), 2);

    for slot in &primaries {
        assert_eq!(weekday_index(slot.date), 0, "primaries must land on Mondays");
        assert_eq!(slot.activity_id.as_str(), "act_session");
    }
    for slot in &fallbacks {
        assert_eq!(slot.activity_id.as_str(), "act_solo");
        assert_eq!(
            slot.original_activity_id.as_ref().map(|id| id.as_str()),
            Some("act_session")
        );
    }

    // Saved by the backup: nothing terminal to report.
    assert!(state.failure_report().is_empty());
    assert_eq!(state.statistics().resilience_rate, 50.0);
}

#[test]
fn remote_only_travel_blocks_home_bound_daily_activity() {
    let activities = vec![make_activity("act_home_gym", 2, Frequency::daily(), 30)
        .with_location(Location::Home)];
    let travel = vec![TravelPeriod::new(
        "travel_trek",
        "Mountain trek",
        monday() + Duration::days(3),
        monday() + Duration::days(5),
    )
    .unwrap()
    .with_remote_activities_only(true)];
    let backups = no_backups();

    let state = ScheduleEngine::new(&activities, &[], &[], &travel, monday(), 10, &backups)
        .unwrap()
        .run();

    // 10 days minus the 3 travel days.
    assert_eq!(state.booked_slots.len(), 7);
    for slot in &state.booked_slots {
        let offset = (slot.date - monday()).num_days();
        assert!(!(3..=5).contains(&offset), "no bookings during the trek");
    }

    // Daily has no wide scope and there is no backup chain: the three
    // blocked occurrences are dropped and reported.
    let report = state.failure_report();
    assert_eq!(report.len(), 1);
    let entry = &report[0];
    assert_eq!(entry.activity_id.as_str(), "act_home_gym");
    assert_eq!(entry.violation_breakdown[&ViolationKind::Exhaustion], 3);
    // Six palette candidates rejected per blocked day.
    assert_eq!(entry.violation_breakdown[&ViolationKind::Travel], 18);
    assert_eq!(state.statistics().terminal_failure_count, 1);
}

#[test]
fn destination_equipment_keeps_gym_activity_alive_during_travel() {
    let equipment = vec![Equipment::new("equip_tread", "Treadmill", "Gym").unwrap()];
    let activities = vec![make_activity("act_run", 2, Frequency::daily(), 30)
        .with_location(Location::Gym)
        .with_equipment(vec!["equip_tread".into()])];
    let travel = vec![TravelPeriod::new(
        "travel_hotel",
        "Conference hotel",
        monday() + Duration::days(5),
        monday() + Duration::days(7),
    )
    .unwrap()
    .with_available_equipment(vec!["equip_tread".into()])];
    let backups = no_backups();

    let state = ScheduleEngine::new(&activities, &[], &equipment, &travel, monday(), 10, &backups)
        .unwrap()
        .run();

    // The hotel provides the treadmill: travel days book like home days.
    assert_eq!(state.booked_slots.len(), 10);
    assert!(state.failure_report().is_empty());

    let travel_day_bookings = state
        .booked_slots
        .iter()
        .filter(|slot| (5..=7).contains(&(slot.date - monday()).num_days()))
        .count();
    assert_eq!(travel_day_bookings, 3);
}

#[test]
fn priority_five_quota_caps_a_single_day_at_four() {
    let activities: Vec<_> = (0..10)
        .map(|index| make_activity(&format!("act_{index:02}"), 5, Frequency::daily(), 30))
        .collect();
    let backups = no_backups();

    let state = ScheduleEngine::new(&activities, &[], &[], &[], monday(), 1, &backups)
        .unwrap()
        .run();

    // floor(10 * 0.40) = 4 priority-5 placements per day.
    assert_eq!(state.booked_slots.len(), 4);
    assert!(state.booked_slots.iter().all(|slot| slot.date == monday()));

    let report = state.failure_report();
    assert_eq!(report.len(), 6);
    for entry in &report {
        assert_eq!(entry.primary_failure_cause, ViolationKind::Exhaustion);
    }

    let stats = state.statistics();
    assert_eq!(stats.terminal_failure_count, 6);
    assert_eq!(stats.priority_breakdown[&5].success, 4);
    assert_eq!(stats.priority_breakdown[&5].failed, 6);
    assert!((stats.overall_success_rate - 40.0).abs() < 1e-9);
}

#[test]
fn fully_failing_primaries_yield_one_hundred_percent_resilience() {
    // A specialist with no shifts at all satisfies nothing.
    let specialists = vec![Specialist::new(
        "spec_never",
        "Fully booked out",
        SpecialistType::Physician,
        vec![],
    )
    .unwrap()];

    let mut activities = Vec::new();
    let mut backups = Vec::new();
    for index in 0..20u8 {
        let frequency = Frequency::weekly(1)
            .unwrap()
            .with_preferred_days(vec![index % 7])
            .unwrap();
        activities.push(
            make_activity(&format!("act_p_{index:02}"), 3, frequency.clone(), 30)
                .with_specialist("spec_never")
                .with_backups(vec![format!("act_b_{index:02}").into()]),
        );
        backups.push(make_activity(&format!("act_b_{index:02}"), 3, frequency, 30));
    }
    let backups = backup_map(backups);

    let state = ScheduleEngine::new(&activities, &specialists, &[], &[], monday(), 7, &backups)
        .unwrap()
        .run();

    assert_eq!(state.booked_slots.len(), 20);
    assert!(state.booked_slots.iter().all(|slot| slot.is_backup));

    let stats = state.statistics();
    assert_eq!(stats.primary_slots, 0);
    assert_eq!(stats.backup_slots, 20);
    assert_eq!(stats.resilience_rate, 100.0);

    // Every primary was saved: no Exhaustion, empty report.
    assert!(state.failure_report().is_empty());
    assert_eq!(state.backups_for("act_p_00").len(), 1);
}

#[test]
fn wide_scope_rescues_weekly_occurrence_from_blocked_target() {
    // The weekly task targets Wednesday; travel covers Tuesday through
    // Thursday, so the whole narrow scope (target ± 1) is blocked. Wide
    // scope may use any day of the week and finds Monday.
    let frequency = Frequency::weekly(1)
        .unwrap()
        .with_preferred_days(vec![2])
        .unwrap();
    let activities = vec![make_activity("act_weekly_home", 3, frequency, 30)
        .with_location(Location::Home)];
    let travel = vec![TravelPeriod::new(
        "travel_midweek",
        "Client site",
        monday() + Duration::days(1),
        monday() + Duration::days(3),
    )
    .unwrap()
    .with_remote_activities_only(true)];
    let backups = no_backups();

    let state = ScheduleEngine::new(&activities, &[], &[], &travel, monday(), 7, &backups)
        .unwrap()
        .run();

    assert_eq!(state.booked_slots.len(), 1);
    let slot = &state.booked_slots[0];
    assert_eq!(slot.date, monday());
    assert!(!slot.is_backup);

    // Rescued, so nothing terminal; the narrow rejections are still in the
    // raw failure log.
    assert!(state.failure_report().is_empty());
    assert!(state.failure_log()["act_weekly_home"]
        .violations
        .iter()
        .all(|violation| violation.kind == ViolationKind::Travel));
}
