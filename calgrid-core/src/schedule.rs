//! Schedule entity, its factory, and partial updates.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collection::Keyed;
use crate::entities::Palette;
use crate::error::{CalGridError, CalGridResult};
use crate::time::{ScheduleTime, is_day_start, start_of_day};

/// Kind of schedule. The declaration order is the order in which grouped
/// panels are laid out (milestones on top, timed schedules last).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleCategory {
    Milestone,
    Task,
    Allday,
    #[default]
    Time,
}

impl fmt::Display for ScheduleCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ScheduleCategory::Milestone => "milestone",
            ScheduleCategory::Task => "task",
            ScheduleCategory::Allday => "allday",
            ScheduleCategory::Time => "time",
        };
        write!(f, "{}", name)
    }
}

/// Raw schedule input as it arrives from a UI layer or a data file.
///
/// Dates stay as text here; [`Schedule::create`] parses and validates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleData {
    pub id: Option<String>,
    pub calendar_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub is_all_day: bool,
    pub category: Option<ScheduleCategory>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub state: Option<String>,
    #[serde(flatten)]
    pub palette: Palette,
    pub is_pending: bool,
    pub is_focused: bool,
    pub is_read_only: bool,
    pub raw: Option<serde_json::Value>,
}

impl ScheduleData {
    pub fn new(start: &str, end: &str) -> Self {
        ScheduleData {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_calendar(mut self, calendar_id: &str) -> Self {
        self.calendar_id = Some(calendar_id.to_string());
        self
    }

    pub fn with_category(mut self, category: ScheduleCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn all_day(mut self) -> Self {
        self.is_all_day = true;
        self
    }
}

/// A time-boxed calendar entry.
///
/// Invariant: `start <= end`. All-day schedules are stored as
/// `[start of first day, start of the day after the last day)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    id: String,
    pub calendar_id: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub is_all_day: bool,
    pub category: ScheduleCategory,
    pub location: Option<String>,
    /// Resource and team ids
    pub attendees: Vec<String>,
    pub state: Option<String>,
    #[serde(flatten)]
    pub palette: Palette,
    pub is_pending: bool,
    pub is_focused: bool,
    pub is_read_only: bool,
    /// Opaque payload carried through untouched
    pub raw: Option<serde_json::Value>,
}

/// Partial update for a [`Schedule`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleChanges {
    pub calendar_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub start: Option<ScheduleTime>,
    pub end: Option<ScheduleTime>,
    pub is_all_day: Option<bool>,
    pub category: Option<ScheduleCategory>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub state: Option<String>,
    #[serde(flatten)]
    pub palette: Palette,
    pub is_pending: Option<bool>,
    pub is_focused: Option<bool>,
    pub is_read_only: Option<bool>,
    pub raw: Option<serde_json::Value>,
}

impl ScheduleChanges {
    pub fn period(start: impl Into<ScheduleTime>, end: impl Into<ScheduleTime>) -> Self {
        ScheduleChanges {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Default::default()
        }
    }
}

impl Schedule {
    /// Build a schedule from raw input, pinning every date to `tz`.
    ///
    /// `end` defaults to `start`. The schedule is all-day when flagged so or
    /// when its category is `allday`. Fails with `Validation` when `start` is
    /// missing, a date does not parse or `end` precedes `start`.
    pub fn create(data: ScheduleData, tz: Tz) -> CalGridResult<Schedule> {
        let start_input: ScheduleTime = data
            .start
            .as_deref()
            .ok_or_else(|| CalGridError::Validation("start is required".to_string()))?
            .parse()?;
        let end_input: ScheduleTime = match data.end.as_deref() {
            Some(end) => end.parse()?,
            None => start_input.clone(),
        };

        let category = data.category.unwrap_or(if data.is_all_day {
            ScheduleCategory::Allday
        } else {
            ScheduleCategory::Time
        });
        let is_all_day = data.is_all_day || category == ScheduleCategory::Allday;

        let start = start_input.resolve(tz)?;
        let end = end_input.resolve(tz)?;
        let (start, end) = if is_all_day {
            all_day_period(&start, &end, end_input.is_date_only(), tz)?
        } else {
            time_period(start, end)?
        };

        Ok(Schedule {
            id: data.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            calendar_id: data.calendar_id,
            title: data.title.unwrap_or_default(),
            body: data.body,
            start,
            end,
            is_all_day,
            category,
            location: data.location,
            attendees: data.attendees,
            state: data.state,
            palette: data.palette,
            is_pending: data.is_pending,
            is_focused: data.is_focused,
            is_read_only: data.is_read_only,
            raw: data.raw,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration(&self) -> Duration {
        self.end.clone().signed_duration_since(self.start.clone())
    }

    /// Group a schedule is filed under in day panels. Timed schedules longer
    /// than a day sit with the all-day ones.
    pub fn group_key(&self) -> ScheduleCategory {
        if self.is_all_day {
            return ScheduleCategory::Allday;
        }

        if self.category == ScheduleCategory::Time && self.duration() > Duration::hours(24) {
            return ScheduleCategory::Allday;
        }

        self.category
    }

    /// Ascending display order: all-day first, then by start, longer first, then by id.
    pub fn display_order(a: &Schedule, b: &Schedule) -> Ordering {
        let a_all_day = a.group_key() == ScheduleCategory::Allday;
        let b_all_day = b.group_key() == ScheduleCategory::Allday;

        b_all_day
            .cmp(&a_all_day)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| b.duration().cmp(&a.duration()))
            .then_with(|| a.id.cmp(&b.id))
    }

    /// Apply a partial update. Either every change lands or, on error, none does.
    pub fn apply(&mut self, changes: ScheduleChanges, tz: Tz) -> CalGridResult<()> {
        let is_all_day = if changes.category == Some(ScheduleCategory::Allday) {
            Some(true)
        } else {
            changes.is_all_day
        };

        let moves_period = changes.start.is_some()
            || changes.end.is_some()
            || is_all_day.is_some_and(|all_day| all_day != self.is_all_day);

        let period = if moves_period {
            let start = match &changes.start {
                Some(time) => time.resolve(tz)?,
                None => self.start.clone(),
            };
            let (end, end_is_date) = match &changes.end {
                Some(time) => (time.resolve(tz)?, time.is_date_only()),
                None => (self.end.clone(), false),
            };

            if is_all_day.unwrap_or(self.is_all_day) {
                Some(all_day_period(&start, &end, end_is_date, tz)?)
            } else {
                Some(time_period(start, end)?)
            }
        } else {
            None
        };

        if let Some(all_day) = is_all_day {
            self.is_all_day = all_day;
            if !all_day && self.category == ScheduleCategory::Allday && changes.category.is_none() {
                self.category = ScheduleCategory::Time;
            }
        }
        if let Some(category) = changes.category {
            self.category = category;
        }
        if let Some((start, end)) = period {
            self.start = start;
            self.end = end;
        }
        if changes.calendar_id.is_some() {
            self.calendar_id = changes.calendar_id;
        }
        if let Some(title) = changes.title {
            self.title = title;
        }
        if changes.body.is_some() {
            self.body = changes.body;
        }
        if changes.location.is_some() {
            self.location = changes.location;
        }
        if let Some(attendees) = changes.attendees {
            self.attendees = attendees;
        }
        if changes.state.is_some() {
            self.state = changes.state;
        }
        self.palette.merge(changes.palette);
        if let Some(is_pending) = changes.is_pending {
            self.is_pending = is_pending;
        }
        if let Some(is_focused) = changes.is_focused {
            self.is_focused = is_focused;
        }
        if let Some(is_read_only) = changes.is_read_only {
            self.is_read_only = is_read_only;
        }
        if changes.raw.is_some() {
            self.raw = changes.raw;
        }

        Ok(())
    }
}

impl Keyed for Schedule {
    fn key(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "(untitled)")
        } else {
            write!(f, "{}", self.title)
        }
    }
}

fn time_period(start: DateTime<Tz>, end: DateTime<Tz>) -> CalGridResult<(DateTime<Tz>, DateTime<Tz>)> {
    if end < start {
        return Err(CalGridError::Validation(format!(
            "end {} is before start {}",
            end.to_rfc3339(),
            start.to_rfc3339()
        )));
    }
    Ok((start, end))
}

/// Stretch a period over whole days, ending at the start of the day after the
/// last one.
///
/// A date-only `end` names the last day itself. A timed `end` exactly at
/// midnight after the first day is already exclusive and is kept as is; any
/// other timed `end` includes its own day.
fn all_day_period(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    end_is_date: bool,
    tz: Tz,
) -> CalGridResult<(DateTime<Tz>, DateTime<Tz>)> {
    let first_day = start.date_naive();
    let end_day = end.date_naive();

    let exclusive_end = if !end_is_date && is_day_start(end) && end_day > first_day {
        end_day
    } else {
        end_day
            .succ_opt()
            .ok_or_else(|| CalGridError::Validation(format!("end {} is out of range", end_day)))?
    };

    if exclusive_end <= first_day {
        return Err(CalGridError::Validation(format!(
            "end {} is before start {}",
            end_day, first_day
        )));
    }

    Ok((start_of_day(first_day, tz), start_of_day(exclusive_end, tz)))
}
