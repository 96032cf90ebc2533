//! The controller: owner of every collection and of the date matrix.
//!
//! All schedule mutations go through here so the [`Collection`] and the
//! [`DateMatrix`] never drift apart.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use log::{debug, info, warn};

use crate::collection::{Collection, Keyed};
use crate::date_matrix::{DateMatrix, contained_days};
use crate::day_key::DayKey;
use crate::entities::{
    Calendar, CalendarChanges, Resource, ResourceChanges, Team, TeamChanges, User, UserChanges,
};
use crate::error::CalGridResult;
use crate::notify::{ListenerId, Notification, NotificationKind, Notifier};
use crate::schedule::{Schedule, ScheduleCategory, ScheduleChanges, ScheduleData};

/// Per-day schedules, one entry for every day of the queried range.
pub type DayBuckets<'a> = BTreeMap<DayKey, Vec<&'a Schedule>>;

/// Per-day schedules split into panels by [`ControllerOptions::group_fn`].
pub type GroupedDayBuckets<'a> = BTreeMap<DayKey, BTreeMap<ScheduleCategory, Vec<&'a Schedule>>>;

/// Picks the panel a schedule is shown in.
pub type GroupFn = fn(&Schedule) -> ScheduleCategory;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Timezone every schedule date is pinned to, and in which days are cut
    pub timezone: Tz,
    /// Panel grouping for [`Controller::find_grouped_by_date_range`]
    pub group_fn: GroupFn,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions {
            timezone: Tz::UTC,
            group_fn: Schedule::group_key,
        }
    }
}

/// Attendees of a schedule, split by what the ids resolved to.
#[derive(Debug, Default)]
pub struct Attendees<'a> {
    pub resources: Vec<&'a Resource>,
    pub teams: Vec<&'a Team>,
}

/// One row of the "+n more" list for a single day.
#[derive(Debug)]
pub struct MoreItem<'a> {
    pub schedule: &'a Schedule,
    /// The schedule runs over more than this one day
    pub has_multi_dates: bool,
}

/// Everything scheduled on one day, in display order.
#[derive(Debug)]
pub struct MoreView<'a> {
    pub day: DayKey,
    pub schedules: Vec<MoreItem<'a>>,
}

#[derive(Debug, Default)]
pub struct Controller {
    options: ControllerOptions,
    schedules: Collection<Schedule>,
    matrix: DateMatrix,
    calendars: Collection<Calendar>,
    teams: Collection<Team>,
    resources: Collection<Resource>,
    users: Collection<User>,
    notifier: Notifier,
}

impl Controller {
    pub fn new(options: ControllerOptions) -> Self {
        Controller {
            options,
            ..Default::default()
        }
    }

    pub fn timezone(&self) -> Tz {
        self.options.timezone
    }

    // NOTIFICATIONS:

    pub fn on(
        &mut self,
        kind: NotificationKind,
        listener: impl FnMut(&Notification<'_>) + 'static,
    ) -> ListenerId {
        self.notifier.on(kind, listener)
    }

    pub fn on_veto(
        &mut self,
        kind: NotificationKind,
        listener: impl FnMut(&Notification<'_>) -> bool + 'static,
    ) -> ListenerId {
        self.notifier.on_veto(kind, listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.notifier.off(id)
    }

    // SCHEDULES:

    pub fn schedules(&self) -> &Collection<Schedule> {
        &self.schedules
    }

    pub fn matrix(&self) -> &DateMatrix {
        &self.matrix
    }

    /// Create a schedule from raw input and index it.
    ///
    /// Returns `Ok(None)` when a `BeforeCreateSchedule` listener vetoes, in
    /// which case nothing changes. Invalid input and duplicate ids are errors.
    pub fn create_schedule(
        &mut self,
        data: ScheduleData,
        silent: bool,
    ) -> CalGridResult<Option<&Schedule>> {
        if !self.notifier.invoke(&Notification::BeforeCreateSchedule(&data)) {
            warn!("schedule creation vetoed (id={:?})", data.id);
            return Ok(None);
        }

        let schedule = Schedule::create(data, self.options.timezone)?;

        let created = self.schedules.add(schedule)?;
        self.matrix.add(created);

        if !silent {
            self.notifier.fire(&Notification::AddedSchedule(created));
            self.notifier.fire(&Notification::CreatedSchedule(created));
        }

        Ok(Some(created))
    }

    /// Create several schedules. Stops at the first error; schedules created
    /// before it stay. Vetoed entries are skipped.
    pub fn create_schedules(
        &mut self,
        list: Vec<ScheduleData>,
        silent: bool,
    ) -> CalGridResult<Vec<&Schedule>> {
        let mut ids = Vec::with_capacity(list.len());
        for data in list {
            if let Some(created) = self.create_schedule(data, silent)? {
                ids.push(created.id().to_string());
            }
        }

        Ok(ids.iter().filter_map(|id| self.schedules.get(id)).collect())
    }

    /// Add an already built schedule to the collection and the matrix.
    pub fn add_schedule(&mut self, schedule: Schedule, silent: bool) -> CalGridResult<&Schedule> {
        let added = self.schedules.add(schedule)?;
        self.matrix.add(added);

        if !silent {
            self.notifier.fire(&Notification::AddedSchedule(added));
        }

        Ok(added)
    }

    /// Apply `changes` to the schedule `id` and re-index it.
    ///
    /// Unknown ids are a no-op returning `Ok(None)`. Invalid changes leave the
    /// schedule and the matrix untouched.
    pub fn update_schedule(
        &mut self,
        id: &str,
        changes: ScheduleChanges,
    ) -> CalGridResult<Option<&Schedule>> {
        let tz = self.options.timezone;
        let Some(schedule) = self.schedules.get_mut(id) else {
            debug!("update of unknown schedule id={}", id);
            return Ok(None);
        };

        schedule.apply(changes, tz)?;

        self.matrix.remove(id);
        self.matrix.add(schedule);

        self.notifier.fire(&Notification::UpdateSchedule(schedule));

        Ok(Some(&*schedule))
    }

    /// Remove a schedule from the matrix and the collection together.
    pub fn delete_schedule(&mut self, id: &str) -> Option<Schedule> {
        self.matrix.remove(id);
        let removed = self.schedules.remove(id);
        if removed.is_none() {
            debug!("delete of unknown schedule id={}", id);
        }
        removed
    }

    pub fn clear_schedules(&mut self) {
        info!("clearing {} schedules", self.schedules.len());
        self.matrix.clear();
        self.schedules.clear();
        self.notifier.fire(&Notification::ClearSchedules);
    }

    /// Recompute the matrix from the schedule collection.
    pub fn rebuild_index(&mut self) {
        self.matrix = DateMatrix::rebuild(self.schedules.iter());
    }

    /// Schedules per day for every day from `start` to `end`, inclusive.
    pub fn find_by_date_range(
        &self,
        start: impl Into<DayKey>,
        end: impl Into<DayKey>,
    ) -> DayBuckets<'_> {
        self.matrix
            .split_by_range(start.into(), end.into(), &self.schedules)
    }

    /// Like [`Controller::find_by_date_range`], but resolving ids against
    /// `collection` instead of the controller's own schedules.
    pub fn split_schedule_by_date_range<'a>(
        &self,
        start: impl Into<DayKey>,
        end: impl Into<DayKey>,
        collection: &'a Collection<Schedule>,
    ) -> DayBuckets<'a> {
        self.matrix.split_by_range(start.into(), end.into(), collection)
    }

    /// Day buckets split into milestone/task/allday/time panels.
    pub fn find_grouped_by_date_range(
        &self,
        start: impl Into<DayKey>,
        end: impl Into<DayKey>,
    ) -> GroupedDayBuckets<'_> {
        let group_fn = self.options.group_fn;
        self.find_by_date_range(start, end)
            .into_iter()
            .map(|(day, schedules)| {
                let mut panels: BTreeMap<ScheduleCategory, Vec<&Schedule>> = BTreeMap::new();
                for schedule in schedules {
                    panels.entry(group_fn(schedule)).or_default().push(schedule);
                }
                (day, panels)
            })
            .collect()
    }

    /// The schedules of a single day that pass `filter`, sorted for display.
    pub fn more_view(
        &self,
        day: impl Into<DayKey>,
        filter: impl Fn(&Schedule) -> bool,
    ) -> MoreView<'_> {
        let day = day.into();
        let mut schedules: Vec<MoreItem<'_>> = self
            .find_by_date_range(day, day)
            .remove(&day)
            .unwrap_or_default()
            .into_iter()
            .filter(|schedule| filter(*schedule))
            .map(|schedule| MoreItem {
                schedule,
                has_multi_dates: contained_days(schedule).len() > 1,
            })
            .collect();
        schedules.sort_by(|a, b| Schedule::display_order(a.schedule, b.schedule));

        MoreView { day, schedules }
    }

    // CALENDARS, TEAMS, RESOURCES, USERS:

    pub fn calendars(&self) -> &Collection<Calendar> {
        &self.calendars
    }

    pub fn add_calendar(&mut self, calendar: Calendar, silent: bool) -> CalGridResult<&Calendar> {
        let added = self.calendars.add(calendar)?;
        if !silent {
            self.notifier.fire(&Notification::AddedCalendar(added));
        }
        Ok(added)
    }

    pub fn update_calendar(&mut self, id: &str, changes: CalendarChanges) -> Option<&Calendar> {
        let calendar = self.calendars.get_mut(id)?;
        calendar.apply(changes);
        self.notifier.fire(&Notification::UpdateCalendar);
        Some(&*calendar)
    }

    pub fn delete_calendar(&mut self, id: &str) -> Option<Calendar> {
        self.calendars.remove(id)
    }

    /// Replace every calendar. Rejected as a whole if ids repeat.
    pub fn set_calendars(&mut self, calendars: Vec<Calendar>) -> CalGridResult<()> {
        self.calendars = Collection::try_from(calendars)?;
        Ok(())
    }

    pub fn teams(&self) -> &Collection<Team> {
        &self.teams
    }

    pub fn add_team(&mut self, team: Team, silent: bool) -> CalGridResult<&Team> {
        let added = self.teams.add(team)?;
        if !silent {
            self.notifier.fire(&Notification::AddedTeam(added));
        }
        Ok(added)
    }

    pub fn update_team(&mut self, id: &str, changes: TeamChanges) -> Option<&Team> {
        let team = self.teams.get_mut(id)?;
        team.apply(changes);
        self.notifier.fire(&Notification::UpdateTeam);
        Some(&*team)
    }

    pub fn delete_team(&mut self, id: &str) -> Option<Team> {
        self.teams.remove(id)
    }

    pub fn set_teams(&mut self, teams: Vec<Team>) -> CalGridResult<()> {
        self.teams = Collection::try_from(teams)?;
        Ok(())
    }

    pub fn resources(&self) -> &Collection<Resource> {
        &self.resources
    }

    pub fn add_resource(&mut self, resource: Resource, silent: bool) -> CalGridResult<&Resource> {
        let added = self.resources.add(resource)?;
        if !silent {
            self.notifier.fire(&Notification::AddedResource(added));
        }
        Ok(added)
    }

    pub fn update_resource(&mut self, id: &str, changes: ResourceChanges) -> Option<&Resource> {
        let resource = self.resources.get_mut(id)?;
        resource.apply(changes);
        self.notifier.fire(&Notification::UpdateResource);
        Some(&*resource)
    }

    pub fn delete_resource(&mut self, id: &str) -> Option<Resource> {
        self.resources.remove(id)
    }

    pub fn set_resources(&mut self, resources: Vec<Resource>) -> CalGridResult<()> {
        self.resources = Collection::try_from(resources)?;
        Ok(())
    }

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    pub fn add_user(&mut self, user: User, silent: bool) -> CalGridResult<&User> {
        let added = self.users.add(user)?;
        if !silent {
            self.notifier.fire(&Notification::AddedUser(added));
        }
        Ok(added)
    }

    pub fn update_user(&mut self, id: &str, changes: UserChanges) -> Option<&User> {
        let user = self.users.get_mut(id)?;
        user.apply(changes);
        self.notifier.fire(&Notification::UpdateUser);
        Some(&*user)
    }

    pub fn delete_user(&mut self, id: &str) -> Option<User> {
        self.users.remove(id)
    }

    pub fn set_users(&mut self, users: Vec<User>) -> CalGridResult<()> {
        self.users = Collection::try_from(users)?;
        Ok(())
    }

    // REFERENCES:

    pub fn calendar_of(&self, schedule: &Schedule) -> Option<&Calendar> {
        let id = schedule.calendar_id.as_deref()?;
        let calendar = self.calendars.get(id);
        if calendar.is_none() {
            debug!("schedule {} points at missing calendar {}", schedule.id(), id);
        }
        calendar
    }

    /// Attendee ids of a schedule resolved to resources and teams.
    pub fn attendees_of(&self, schedule: &Schedule) -> Attendees<'_> {
        Attendees {
            resources: linked(&self.resources, &schedule.attendees),
            teams: linked(&self.teams, &schedule.attendees),
        }
    }

    pub fn team_resources(&self, team: &Team) -> Vec<&Resource> {
        linked(&self.resources, &team.resources)
    }

    pub fn resource_teams(&self, resource: &Resource) -> Vec<&Team> {
        linked(&self.teams, &resource.teams)
    }

    pub fn resource_assignees(&self, resource: &Resource) -> Vec<&User> {
        linked(&self.users, &resource.assignees)
    }

    pub fn user_resources(&self, user: &User) -> Vec<&Resource> {
        linked(&self.resources, &user.resources)
    }
}

/// Items of `collection` whose key is listed in `ids`, in collection order.
/// Ids that match nothing are ignored.
fn linked<'a, T: Keyed>(collection: &'a Collection<T>, ids: &[String]) -> Vec<&'a T> {
    collection.filter(|item| ids.iter().any(|id| id == item.key()))
}
