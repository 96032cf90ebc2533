//! Day-granularity keys for the date matrix.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Serialize, Serializer};

use crate::error::{CalGridError, CalGridResult};

/// A calendar date truncated to the day, rendered as `YYYYMMDD`.
///
/// Ordering is chronological, so a `BTreeMap<DayKey, _>` iterates day by day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        DayKey(date)
    }

    /// The local calendar day of a timestamp, in the timestamp's own timezone.
    pub fn of<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        DayKey(datetime.date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn next(self) -> Option<Self> {
        self.0.succ_opt().map(DayKey)
    }

    pub fn prev(self) -> Option<Self> {
        self.0.pred_opt().map(DayKey)
    }

    /// Every day from `start` to `end`, both inclusive. Empty when `end < start`.
    pub fn range(start: DayKey, end: DayKey) -> DayRange {
        DayRange {
            next: (start <= end).then_some(start),
            end,
        }
    }
}

/// Iterator over consecutive calendar days.
///
/// Steps with date arithmetic rather than a fixed number of seconds, so DST
/// transitions never skip or repeat a day.
#[derive(Debug, Clone)]
pub struct DayRange {
    next: Option<DayKey>,
    end: DayKey,
}

impl Iterator for DayRange {
    type Item = DayKey;

    fn next(&mut self) -> Option<DayKey> {
        let current = self.next?;
        self.next = current.next().filter(|day| *day <= self.end);
        Some(current)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        DayKey(date)
    }
}

impl<Tz: TimeZone> From<&DateTime<Tz>> for DayKey {
    fn from(datetime: &DateTime<Tz>) -> Self {
        DayKey::of(datetime)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl FromStr for DayKey {
    type Err = CalGridError;

    fn from_str(s: &str) -> CalGridResult<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CalGridError::InvalidDayKey(s.to_string()));
        }

        NaiveDate::parse_from_str(s, "%Y%m%d")
            .map(DayKey)
            .map_err(|_| CalGridError::InvalidDayKey(s.to_string()))
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_display_is_eight_digits() {
        assert_eq!(day(2024, 3, 9).to_string(), "20240309");
        assert_eq!(day(987, 12, 31).to_string(), "09871231");
    }

    #[test]
    fn test_parse() {
        assert_eq!("20240310".parse::<DayKey>().unwrap(), day(2024, 3, 10));
        assert!("2024-03-10".parse::<DayKey>().is_err());
        assert!("20240230".parse::<DayKey>().is_err());
        assert!("2024031".parse::<DayKey>().is_err());
    }

    #[test]
    fn test_range_is_inclusive_and_crosses_months() {
        let days: Vec<String> = DayKey::range(day(2024, 2, 28), day(2024, 3, 2))
            .map(|d| d.to_string())
            .collect();
        assert_eq!(days, vec!["20240228", "20240229", "20240301", "20240302"]);
    }

    #[test]
    fn test_range_single_and_empty() {
        assert_eq!(DayKey::range(day(2024, 3, 10), day(2024, 3, 10)).count(), 1);
        assert_eq!(DayKey::range(day(2024, 3, 11), day(2024, 3, 10)).count(), 0);
    }

    #[test]
    fn test_of_uses_local_date() {
        use chrono_tz::America::New_York;

        // 02:00 UTC is still the previous evening in New York
        let utc = chrono::Utc.with_ymd_and_hms(2024, 3, 11, 2, 0, 0).unwrap();
        assert_eq!(DayKey::of(&utc), day(2024, 3, 11));
        assert_eq!(DayKey::of(&utc.with_timezone(&New_York)), day(2024, 3, 10));
    }
}
