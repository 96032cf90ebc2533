//! Day-bucketed index of schedule ids.
//!
//! Every schedule is recorded under each calendar day it touches, so a month
//! or week view can ask "what happens on these days" without scanning the
//! whole schedule collection. The matrix only knows ids; schedule content is
//! always resolved from a [`Collection`] at query time.
//!
//! Updates are remove-then-add. Removal scans every bucket instead of
//! recomputing the schedule's days, because after an update the old days can no
//! longer be derived from the schedule itself.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::collection::Collection;
use crate::day_key::DayKey;
use crate::schedule::Schedule;
use crate::time::is_day_start;

/// The calendar days a schedule occupies, in order.
///
/// A schedule that starts and ends on the same day occupies that day. Otherwise
/// an end at the first instant of a day is exclusive, so a schedule ending at
/// `2024-03-12T00:00` stops on the 11th. In zones where DST skips midnight that
/// instant is 01:00.
pub fn contained_days(schedule: &Schedule) -> Vec<DayKey> {
    let first = DayKey::of(&schedule.start);
    let end = DayKey::of(&schedule.end);

    let last = if first != end && is_day_start(&schedule.end) {
        end.prev().unwrap_or(end)
    } else {
        end
    };

    DayKey::range(first, last.max(first)).collect()
}

/// Mapping from day to the ids of schedules active that day.
///
/// Empty buckets are never kept, so a matrix maintained through any sequence of
/// adds and removes has the same [`DateMatrix::membership`] as one rebuilt from
/// the surviving schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateMatrix {
    buckets: BTreeMap<DayKey, Vec<String>>,
}

impl DateMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from scratch.
    pub fn rebuild<'a>(schedules: impl IntoIterator<Item = &'a Schedule>) -> Self {
        let mut matrix = DateMatrix::new();
        for schedule in schedules {
            matrix.add(schedule);
        }
        matrix
    }

    /// Record `schedule` under every day it occupies, after anything already there.
    pub fn add(&mut self, schedule: &Schedule) {
        let days = contained_days(schedule);
        debug!("index add id={} days={}", schedule.id(), days.len());

        for day in days {
            self.buckets
                .entry(day)
                .or_default()
                .push(schedule.id().to_string());
        }
    }

    /// Drop `id` from every bucket that holds it. Returns how many buckets
    /// changed; removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> usize {
        let mut touched = 0;

        self.buckets.retain(|_, ids| {
            let before = ids.len();
            ids.retain(|existing| existing != id);
            if ids.len() != before {
                touched += 1;
            }
            !ids.is_empty()
        });

        if touched > 0 {
            debug!("index remove id={} buckets={}", id, touched);
        }
        touched
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Ids recorded under `day`, in insertion order.
    pub fn bucket(&self, day: DayKey) -> &[String] {
        self.buckets.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Days under which `id` is currently recorded.
    pub fn days_of(&self, id: &str) -> Vec<DayKey> {
        self.buckets
            .iter()
            .filter(|(_, ids)| ids.iter().any(|existing| existing == id))
            .map(|(day, _)| *day)
            .collect()
    }

    /// Day to id-set view, ignoring order inside buckets.
    pub fn membership(&self) -> BTreeMap<DayKey, BTreeSet<&str>> {
        self.buckets
            .iter()
            .map(|(day, ids)| (*day, ids.iter().map(String::as_str).collect()))
            .collect()
    }

    /// Number of non-empty day buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// For every day from `start` to `end` inclusive, the schedules of `source`
    /// recorded that day, in bucket order.
    ///
    /// Every day of the range gets an entry, empty or not. Ids that `source`
    /// does not hold are skipped.
    pub fn split_by_range<'a>(
        &self,
        start: DayKey,
        end: DayKey,
        source: &'a Collection<Schedule>,
    ) -> BTreeMap<DayKey, Vec<&'a Schedule>> {
        DayKey::range(start, end)
            .map(|day| {
                let schedules = self
                    .bucket(day)
                    .iter()
                    .filter_map(|id| source.get(id))
                    .collect();
                (day, schedules)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleData;
    use chrono_tz::UTC;

    fn schedule(id: &str, start: &str, end: &str) -> Schedule {
        Schedule::create(ScheduleData::new(start, end).with_id(id), UTC).unwrap()
    }

    fn keys(days: &[DayKey]) -> Vec<String> {
        days.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_contained_days_same_day() {
        let s = schedule("a", "2024-03-10T09:00", "2024-03-10T10:00");
        assert_eq!(keys(&contained_days(&s)), vec!["20240310"]);
    }

    #[test]
    fn test_contained_days_zero_length_at_midnight() {
        let s = schedule("a", "2024-03-10T00:00", "2024-03-10T00:00");
        assert_eq!(keys(&contained_days(&s)), vec!["20240310"]);
    }

    #[test]
    fn test_contained_days_midnight_end_is_exclusive() {
        let s = schedule("a", "2024-03-10T22:00", "2024-03-11T00:00");
        assert_eq!(keys(&contained_days(&s)), vec!["20240310"]);
    }

    #[test]
    fn test_contained_days_spans_into_end_day() {
        let s = schedule("a", "2024-03-10T22:00", "2024-03-12T01:00");
        assert_eq!(
            keys(&contained_days(&s)),
            vec!["20240310", "20240311", "20240312"]
        );
    }

    #[test]
    fn test_contained_days_across_dst_change() {
        use chrono_tz::Europe::Berlin;

        let s = Schedule::create(
            ScheduleData::new("2024-03-30", "2024-04-01").all_day(),
            Berlin,
        )
        .unwrap();
        assert_eq!(
            keys(&contained_days(&s)),
            vec!["20240330", "20240331", "20240401"]
        );
    }

    #[test]
    fn test_contained_days_when_dst_skips_midnight() {
        use chrono_tz::America::Santiago;

        // 2024-09-08 starts at 01:00 in Santiago, which is where the stored end lands
        let s = Schedule::create(
            ScheduleData::new("2024-09-07", "2024-09-07").all_day(),
            Santiago,
        )
        .unwrap();
        assert_eq!(keys(&contained_days(&s)), vec!["20240907"]);

        let mut matrix = DateMatrix::new();
        matrix.add(&s);
        assert!(matrix.bucket("20240908".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let mut matrix = DateMatrix::new();
        matrix.add(&schedule("b", "2024-03-10T09:00", "2024-03-10T10:00"));
        matrix.add(&schedule("a", "2024-03-10T08:00", "2024-03-11T10:00"));

        let day = "20240310".parse().unwrap();
        assert_eq!(matrix.bucket(day), ["b".to_string(), "a".to_string()]);
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn test_remove_cleans_every_bucket_and_is_idempotent() {
        let mut matrix = DateMatrix::new();
        let s = schedule("a", "2024-03-10T09:00", "2024-03-12T10:00");
        matrix.add(&s);
        matrix.add(&schedule("b", "2024-03-11T09:00", "2024-03-11T10:00"));

        assert_eq!(matrix.remove("a"), 3);
        assert!(matrix.days_of("a").is_empty());
        assert_eq!(keys(&matrix.days_of("b")), vec!["20240311"]);
        // Buckets left empty are dropped
        assert_eq!(matrix.len(), 1);

        let snapshot = matrix.clone();
        assert_eq!(matrix.remove("a"), 0);
        assert_eq!(matrix, snapshot);
    }

    #[test]
    fn test_remove_finds_stale_days() {
        let mut matrix = DateMatrix::new();
        let mut s = schedule("a", "2024-03-10T09:00", "2024-03-10T10:00");
        matrix.add(&s);

        // Schedule moved without telling the matrix
        s.start = s.start + chrono::Duration::days(5);
        s.end = s.end + chrono::Duration::days(5);
        matrix.remove(s.id());
        matrix.add(&s);

        assert_eq!(keys(&matrix.days_of("a")), vec!["20240315"]);
    }

    #[test]
    fn test_split_by_range_fills_every_day_and_skips_unknown_ids() {
        let a = schedule("a", "2024-03-10T09:00", "2024-03-11T10:00");
        let ghost = schedule("ghost", "2024-03-11T09:00", "2024-03-11T10:00");

        let mut matrix = DateMatrix::new();
        matrix.add(&a);
        matrix.add(&ghost);

        let source: Collection<Schedule> = vec![a].into_iter().collect();
        let result = matrix.split_by_range(
            "20240309".parse().unwrap(),
            "20240312".parse().unwrap(),
            &source,
        );

        let summary: Vec<(String, Vec<&str>)> = result
            .iter()
            .map(|(day, list)| (day.to_string(), list.iter().map(|s| s.id()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("20240309".to_string(), vec![]),
                ("20240310".to_string(), vec!["a"]),
                ("20240311".to_string(), vec!["a"]),
                ("20240312".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_rebuild_matches_incremental() {
        let a = schedule("a", "2024-03-10T09:00", "2024-03-12T10:00");
        let b = schedule("b", "2024-03-11T09:00", "2024-03-11T10:00");

        let mut incremental = DateMatrix::new();
        incremental.add(&a);
        incremental.add(&b);
        incremental.remove("a");
        incremental.add(&a);

        // Same insertion order as the incremental matrix ends up with
        assert_eq!(incremental, DateMatrix::rebuild([&b, &a]));
        // Any replay order gives the same membership
        assert_eq!(incremental.membership(), DateMatrix::rebuild([&a, &b]).membership());
    }
}
