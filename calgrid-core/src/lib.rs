//! Core types for calgrid.
//!
//! A [`Controller`] owns the schedules of a calendar widget together with its
//! calendars, teams, resources and users, and keeps a [`DateMatrix`] that
//! buckets schedule ids by calendar day so range queries never scan the whole
//! collection.

pub mod collection;
pub mod controller;
pub mod date_matrix;
pub mod day_key;
pub mod entities;
pub mod error;
pub mod notify;
pub mod schedule;
pub mod time;

pub use collection::{Collection, Keyed};
pub use controller::{
    Attendees, Controller, ControllerOptions, DayBuckets, GroupFn, GroupedDayBuckets, MoreItem,
    MoreView,
};
pub use date_matrix::{DateMatrix, contained_days};
pub use day_key::DayKey;
pub use entities::{
    Calendar, CalendarChanges, Palette, Resource, ResourceChanges, Team, TeamChanges, User,
    UserChanges,
};
pub use error::{CalGridError, CalGridResult};
pub use notify::{ListenerId, Notification, NotificationKind, Notifier};
pub use schedule::{Schedule, ScheduleCategory, ScheduleChanges, ScheduleData};
pub use time::{ScheduleTime, parse_timezone};
