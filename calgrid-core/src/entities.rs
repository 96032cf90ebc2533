//! Calendars, teams, resources and users.
//!
//! These are flat records. Membership lists hold ids of other entities and are
//! weak: nothing guarantees the referenced entity exists, and lookups through
//! the controller skip ids that no longer resolve.

use serde::{Deserialize, Serialize};

use crate::collection::Keyed;

/// Display colors shared by schedules and the entities that group them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Palette {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

impl Palette {
    /// Overwrite each color that `changes` carries; leave the rest.
    pub fn merge(&mut self, changes: Palette) {
        if changes.color.is_some() {
            self.color = changes.color;
        }
        if changes.bg_color.is_some() {
            self.bg_color = changes.bg_color;
        }
        if changes.drag_bg_color.is_some() {
            self.drag_bg_color = changes.drag_bg_color;
        }
        if changes.border_color.is_some() {
            self.border_color = changes.border_color;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub palette: Palette,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default = "default_checked")]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub palette: Palette,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub calendars: Vec<String>,
    #[serde(default = "default_checked")]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    pub name: String,
    /// People can be assigned; rooms and equipment cannot.
    #[serde(default)]
    pub is_person: bool,
    #[serde(flatten)]
    pub palette: Palette,
    /// User ids assigned to this resource
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub calendars: Vec<String>,
    #[serde(default = "default_checked")]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Identifier of this user in an external directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

fn default_checked() -> bool {
    true
}

impl Calendar {
    pub fn new(id: &str, name: &str) -> Self {
        Calendar {
            id: id.to_string(),
            name: name.to_string(),
            palette: Palette::default(),
            teams: Vec::new(),
            resources: Vec::new(),
            users: Vec::new(),
            checked: true,
        }
    }

    pub fn apply(&mut self, changes: CalendarChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        self.palette.merge(changes.palette);
        if let Some(teams) = changes.teams {
            self.teams = teams;
        }
        if let Some(resources) = changes.resources {
            self.resources = resources;
        }
        if let Some(users) = changes.users {
            self.users = users;
        }
        if let Some(checked) = changes.checked {
            self.checked = checked;
        }
    }
}

impl Team {
    pub fn new(id: &str, name: &str) -> Self {
        Team {
            id: id.to_string(),
            name: name.to_string(),
            palette: Palette::default(),
            resources: Vec::new(),
            calendars: Vec::new(),
            checked: true,
        }
    }

    pub fn apply(&mut self, changes: TeamChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        self.palette.merge(changes.palette);
        if let Some(resources) = changes.resources {
            self.resources = resources;
        }
        if let Some(calendars) = changes.calendars {
            self.calendars = calendars;
        }
        if let Some(checked) = changes.checked {
            self.checked = checked;
        }
    }
}

impl Resource {
    pub fn new(id: &str, name: &str) -> Self {
        Resource {
            id: id.to_string(),
            name: name.to_string(),
            is_person: false,
            palette: Palette::default(),
            assignees: Vec::new(),
            teams: Vec::new(),
            calendars: Vec::new(),
            checked: true,
        }
    }

    pub fn apply(&mut self, changes: ResourceChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(is_person) = changes.is_person {
            self.is_person = is_person;
        }
        self.palette.merge(changes.palette);
        if let Some(assignees) = changes.assignees {
            self.assignees = assignees;
        }
        if let Some(teams) = changes.teams {
            self.teams = teams;
        }
        if let Some(calendars) = changes.calendars {
            self.calendars = calendars;
        }
        if let Some(checked) = changes.checked {
            self.checked = checked;
        }
    }
}

impl User {
    pub fn new(id: &str, name: &str) -> Self {
        User {
            id: id.to_string(),
            remote_id: None,
            name: name.to_string(),
            email: None,
            phone: None,
            resources: Vec::new(),
        }
    }

    /// The id is identity and is not part of the allow-list.
    pub fn apply(&mut self, changes: UserChanges) {
        if changes.remote_id.is_some() {
            self.remote_id = changes.remote_id;
        }
        if let Some(name) = changes.name {
            self.name = name;
        }
        if changes.email.is_some() {
            self.email = changes.email;
        }
        if changes.phone.is_some() {
            self.phone = changes.phone;
        }
        if let Some(resources) = changes.resources {
            self.resources = resources;
        }
    }
}

/// Partial update for a [`Calendar`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarChanges {
    pub name: Option<String>,
    #[serde(flatten)]
    pub palette: Palette,
    pub teams: Option<Vec<String>>,
    pub resources: Option<Vec<String>>,
    pub users: Option<Vec<String>>,
    pub checked: Option<bool>,
}

/// Partial update for a [`Team`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamChanges {
    pub name: Option<String>,
    #[serde(flatten)]
    pub palette: Palette,
    pub resources: Option<Vec<String>>,
    pub calendars: Option<Vec<String>>,
    pub checked: Option<bool>,
}

/// Partial update for a [`Resource`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceChanges {
    pub name: Option<String>,
    pub is_person: Option<bool>,
    #[serde(flatten)]
    pub palette: Palette,
    pub assignees: Option<Vec<String>>,
    pub teams: Option<Vec<String>>,
    pub calendars: Option<Vec<String>>,
    pub checked: Option<bool>,
}

/// Partial update for a [`User`]. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserChanges {
    pub remote_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub resources: Option<Vec<String>>,
}

impl Keyed for Calendar {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Team {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Resource {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.id
    }
}
