use std::collections::{BTreeMap, BTreeSet};

use calgrid_core::{
    Controller, ControllerOptions, DateMatrix, DayKey, ScheduleChanges, ScheduleData, ScheduleTime,
    contained_days,
};

fn day(s: &str) -> DayKey {
    s.parse().unwrap()
}

fn controller() -> Controller {
    Controller::new(ControllerOptions::default())
}

fn fixture() -> Controller {
    let mut c = controller();
    let schedules = vec![
        ScheduleData::new("2024-03-10T09:00", "2024-03-10T10:00").with_id("standup"),
        ScheduleData::new("2024-03-10", "2024-03-12").all_day().with_id("offsite"),
        ScheduleData::new("2024-03-11T22:00", "2024-03-12T02:00").with_id("deploy"),
        ScheduleData::new("2024-03-12T00:00", "2024-03-12T00:00").with_id("marker"),
        ScheduleData::new("2024-03-13T20:00", "2024-03-14T00:00").with_id("dinner"),
    ];
    c.create_schedules(schedules, true).unwrap();
    c
}

/// The index recomputed directly from `contained_days` of every schedule.
fn expected_membership(c: &Controller) -> BTreeMap<DayKey, BTreeSet<String>> {
    let mut expected: BTreeMap<DayKey, BTreeSet<String>> = BTreeMap::new();
    for schedule in c.schedules().iter() {
        for d in contained_days(schedule) {
            expected.entry(d).or_default().insert(schedule.id().to_string());
        }
    }
    expected
}

fn actual_membership(matrix: &DateMatrix) -> BTreeMap<DayKey, BTreeSet<String>> {
    matrix
        .membership()
        .into_iter()
        .map(|(d, ids)| (d, ids.into_iter().map(str::to_string).collect()))
        .collect()
}

#[test]
fn index_membership_equals_contained_days() {
    let c = fixture();
    assert_eq!(actual_membership(c.matrix()), expected_membership(&c));
}

#[test]
fn double_removal_is_noop() {
    let mut c = fixture();
    c.delete_schedule("offsite");
    let snapshot = c.matrix().clone();

    assert!(c.delete_schedule("offsite").is_none());
    assert_eq!(*c.matrix(), snapshot);
}

#[test]
fn update_moves_id_between_ranges() {
    let mut c = fixture();
    let old_days = c.matrix().days_of("standup");

    let start: ScheduleTime = "2024-04-01T09:00".parse().unwrap();
    let end: ScheduleTime = "2024-04-02T09:30".parse().unwrap();
    c.update_schedule("standup", ScheduleChanges::period(start, end))
        .unwrap()
        .unwrap();

    for d in old_days {
        assert!(!c.matrix().bucket(d).contains(&"standup".to_string()));
    }
    assert_eq!(c.matrix().days_of("standup"), vec![day("20240401"), day("20240402")]);
    assert_eq!(actual_membership(c.matrix()), expected_membership(&c));
}

#[test]
fn rebuild_equals_incremental_maintenance() {
    let mut c = fixture();
    c.delete_schedule("deploy");
    c.update_schedule(
        "offsite",
        ScheduleChanges {
            end: Some("2024-03-15".parse().unwrap()),
            ..Default::default()
        },
    )
    .unwrap();
    c.create_schedule(ScheduleData::new("2024-03-12T08:00", "2024-03-12T09:00").with_id("late"), true)
        .unwrap();

    let incremental = actual_membership(c.matrix());
    let rebuilt = actual_membership(&DateMatrix::rebuild(c.schedules().iter()));
    assert_eq!(incremental, rebuilt);
}

#[test]
fn zero_length_schedule_occupies_one_day() {
    let c = fixture();
    assert_eq!(c.matrix().days_of("marker"), vec![day("20240312")]);
}

#[test]
fn midnight_end_is_exclusive() {
    let c = fixture();
    assert_eq!(c.matrix().days_of("dinner"), vec![day("20240313")]);
    assert_eq!(
        c.matrix().days_of("offsite"),
        vec![day("20240310"), day("20240311"), day("20240312")]
    );

    let mut c = controller();
    c.create_schedule(
        ScheduleData::new("2024-03-10T00:00", "2024-03-12T00:00")
            .all_day()
            .with_id("span"),
        true,
    )
    .unwrap();
    assert_eq!(c.matrix().days_of("span"), vec![day("20240310"), day("20240311")]);
}

#[test]
fn scenario_single_timed_schedule() {
    let mut c = controller();
    c.create_schedule(
        ScheduleData::new("2024-03-10T09:00", "2024-03-10T10:00").with_id("a"),
        false,
    )
    .unwrap();

    let found = c.find_by_date_range(day("20240310"), day("20240310"));
    let ids: Vec<&str> = found[&day("20240310")].iter().map(|s| s.id()).collect();
    assert_eq!(ids, vec!["a"]);
}

#[test]
fn scenario_three_day_all_day_schedule() {
    let mut c = controller();
    c.create_schedule(ScheduleData::new("2024-03-10", "2024-03-12").all_day().with_id("b"), false)
        .unwrap();

    let found = c.find_by_date_range(day("20240309"), day("20240313"));
    let counts: Vec<(String, usize)> = found
        .iter()
        .map(|(d, list)| (d.to_string(), list.len()))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("20240309".to_string(), 0),
            ("20240310".to_string(), 1),
            ("20240311".to_string(), 1),
            ("20240312".to_string(), 1),
            ("20240313".to_string(), 0),
        ]
    );
}

#[test]
fn scenario_delete() {
    let mut c = fixture();
    c.delete_schedule("offsite").unwrap();

    assert!(!c.schedules().has("offsite"));
    assert!(c.matrix().days_of("offsite").is_empty());
    let found = c.find_by_date_range(day("20240310"), day("20240312"));
    assert!(found.values().flatten().all(|s| s.id() != "offsite"));
}

#[test]
fn scenario_clear() {
    let mut c = fixture();
    c.clear_schedules();

    assert!(c.schedules().is_empty());
    assert!(c.matrix().is_empty());
    let found = c.find_by_date_range(day("20240310"), day("20240314"));
    assert_eq!(found.len(), 5);
    assert!(found.values().all(Vec::is_empty));
}
