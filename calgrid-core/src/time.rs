//! Schedule time inputs and their resolution into a concrete timezone.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CalGridError, CalGridResult};

/// A point in time as supplied by a caller, before it is pinned to the
/// controller's timezone.
///
/// Accepted text forms:
/// - `2024-03-10` (date only)
/// - `2024-03-10T09:00` or `2024-03-10T09:00:30` (floating, read in the controller's timezone)
/// - `2024-03-10T09:00:00Z` / `2024-03-10T09:00:00+01:00` (absolute instant)
/// - `2024-03-10T09:00[Europe/Berlin]` (wall time in a named zone)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ScheduleTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

const FLOATING_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

impl ScheduleTime {
    pub fn is_date_only(&self) -> bool {
        matches!(self, ScheduleTime::Date(_))
    }

    /// Pin this time to `tz`. Date-only values become the start of that day.
    pub fn resolve(&self, tz: Tz) -> CalGridResult<DateTime<Tz>> {
        match self {
            ScheduleTime::Date(date) => Ok(start_of_day(*date, tz)),
            ScheduleTime::DateTimeUtc(dt) => Ok(dt.with_timezone(&tz)),
            ScheduleTime::DateTimeFloating(naive) => local_to_zoned(naive, tz),
            ScheduleTime::DateTimeZoned { datetime, tzid } => {
                let zone = parse_timezone(tzid)?;
                Ok(local_to_zoned(datetime, zone)?.with_timezone(&tz))
            }
        }
    }
}

impl FromStr for ScheduleTime {
    type Err = CalGridError;

    fn from_str(s: &str) -> CalGridResult<Self> {
        let s = s.trim();

        if let Some((wall, rest)) = s.split_once('[') {
            let tzid = rest
                .strip_suffix(']')
                .ok_or_else(|| CalGridError::Validation(format!("Unterminated timezone in '{}'", s)))?;
            let datetime = parse_floating(wall)
                .ok_or_else(|| CalGridError::Validation(format!("Invalid date/time '{}'", s)))?;
            parse_timezone(tzid)?;
            return Ok(ScheduleTime::DateTimeZoned {
                datetime,
                tzid: tzid.to_string(),
            });
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(ScheduleTime::DateTimeUtc(dt.with_timezone(&Utc)));
        }

        if let Some(naive) = parse_floating(s) {
            return Ok(ScheduleTime::DateTimeFloating(naive));
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(ScheduleTime::Date)
            .map_err(|_| CalGridError::Validation(format!("Invalid date/time '{}'", s)))
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = CalGridError;

    fn try_from(s: String) -> CalGridResult<Self> {
        s.parse()
    }
}

impl From<ScheduleTime> for String {
    fn from(time: ScheduleTime) -> String {
        time.to_string()
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for ScheduleTime {
    fn from(dt: DateTime<Z>) -> Self {
        ScheduleTime::DateTimeUtc(dt.with_timezone(&Utc))
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScheduleTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ScheduleTime::DateTimeUtc(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            ScheduleTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            ScheduleTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{}[{}]", datetime.format("%Y-%m-%dT%H:%M:%S%.f"), tzid)
            }
        }
    }
}

fn parse_floating(s: &str) -> Option<NaiveDateTime> {
    FLOATING_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parse an IANA timezone id such as `Europe/Berlin`.
pub fn parse_timezone(tzid: &str) -> CalGridResult<Tz> {
    tzid.parse::<Tz>()
        .map_err(|_| CalGridError::UnknownTimezone(tzid.to_string()))
}

/// Wall-clock time in `tz`. Ambiguous times (DST fall-back) take the earlier
/// instant; times inside a DST gap do not exist and are rejected.
fn local_to_zoned(naive: &NaiveDateTime, tz: Tz) -> CalGridResult<DateTime<Tz>> {
    tz.from_local_datetime(naive).earliest().ok_or_else(|| {
        CalGridError::Validation(format!(
            "{} does not exist in timezone {}",
            naive.format("%Y-%m-%d %H:%M"),
            tz.name()
        ))
    })
}

/// First instant of `date` in `tz`.
///
/// A few zones switch DST at midnight, so the day may start at 01:00.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// True when `dt` is the first instant of its local day.
///
/// Where a DST change skips midnight the day starts at 01:00, and that instant
/// counts as the day start.
pub fn is_day_start(dt: &DateTime<Tz>) -> bool {
    *dt == start_of_day(dt.date_naive(), dt.timezone())
}
