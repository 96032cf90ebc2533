//! Synchronous lifecycle notifications.
//!
//! Listeners run in registration order and to completion before the mutating
//! call that fired them returns. A listener registered with
//! [`Notifier::on_veto`] can cancel a pending operation by returning `false`.
//!
//! Listeners only see shared references to payloads and cannot reach the
//! controller while it is dispatching, so a notification can never re-enter a
//! mutation of the structure that fired it.

use std::fmt;

use crate::entities::{Calendar, Resource, Team, User};
use crate::schedule::{Schedule, ScheduleData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    BeforeCreateSchedule,
    CreatedSchedule,
    AddedSchedule,
    UpdateSchedule,
    ClearSchedules,
    AddedCalendar,
    AddedTeam,
    AddedResource,
    AddedUser,
    UpdateCalendar,
    UpdateTeam,
    UpdateResource,
    UpdateUser,
}

/// A notification together with its payload.
#[derive(Debug, Clone, Copy)]
pub enum Notification<'a> {
    /// Cancelable; carries the raw input about to be turned into a schedule
    BeforeCreateSchedule(&'a ScheduleData),
    CreatedSchedule(&'a Schedule),
    AddedSchedule(&'a Schedule),
    UpdateSchedule(&'a Schedule),
    ClearSchedules,
    AddedCalendar(&'a Calendar),
    AddedTeam(&'a Team),
    AddedResource(&'a Resource),
    AddedUser(&'a User),
    UpdateCalendar,
    UpdateTeam,
    UpdateResource,
    UpdateUser,
}

impl Notification<'_> {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::BeforeCreateSchedule(_) => NotificationKind::BeforeCreateSchedule,
            Notification::CreatedSchedule(_) => NotificationKind::CreatedSchedule,
            Notification::AddedSchedule(_) => NotificationKind::AddedSchedule,
            Notification::UpdateSchedule(_) => NotificationKind::UpdateSchedule,
            Notification::ClearSchedules => NotificationKind::ClearSchedules,
            Notification::AddedCalendar(_) => NotificationKind::AddedCalendar,
            Notification::AddedTeam(_) => NotificationKind::AddedTeam,
            Notification::AddedResource(_) => NotificationKind::AddedResource,
            Notification::AddedUser(_) => NotificationKind::AddedUser,
            Notification::UpdateCalendar => NotificationKind::UpdateCalendar,
            Notification::UpdateTeam => NotificationKind::UpdateTeam,
            Notification::UpdateResource => NotificationKind::UpdateResource,
            Notification::UpdateUser => NotificationKind::UpdateUser,
        }
    }
}

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&Notification<'_>) -> bool>;

#[derive(Default)]
pub struct Notifier {
    next_id: u64,
    listeners: Vec<(ListenerId, NotificationKind, Listener)>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for `kind`. The listener cannot cancel anything.
    pub fn on(
        &mut self,
        kind: NotificationKind,
        mut listener: impl FnMut(&Notification<'_>) + 'static,
    ) -> ListenerId {
        self.register(
            kind,
            Box::new(move |notification: &Notification<'_>| {
                listener(notification);
                true
            }),
        )
    }

    /// Listen for `kind` with the power to cancel: returning `false` from a
    /// cancelable notification aborts the operation.
    pub fn on_veto(
        &mut self,
        kind: NotificationKind,
        listener: impl FnMut(&Notification<'_>) -> bool + 'static,
    ) -> ListenerId {
        self.register(kind, Box::new(listener))
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn has_listeners(&self, kind: NotificationKind) -> bool {
        self.listeners.iter().any(|(_, k, _)| *k == kind)
    }

    /// Deliver to every listener of this kind.
    pub fn fire(&mut self, notification: &Notification<'_>) {
        let kind = notification.kind();
        for (_, _, listener) in self.listeners.iter_mut().filter(|(_, k, _)| *k == kind) {
            listener(notification);
        }
    }

    /// Deliver until a listener says no. Returns `false` if one did; later
    /// listeners are then not called.
    pub fn invoke(&mut self, notification: &Notification<'_>) -> bool {
        let kind = notification.kind();
        self.listeners
            .iter_mut()
            .filter(|(_, k, _)| *k == kind)
            .all(|(_, _, listener)| listener(notification))
    }

    fn register(&mut self, kind: NotificationKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, listener));
        id
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
