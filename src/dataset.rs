//! On-disk schedule data: calendars, teams, resources, users and schedules in
//! one JSON or TOML file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use calgrid_core::{Calendar, Controller, ControllerOptions, Resource, ScheduleData, Team, User};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub calendars: Vec<Calendar>,
    pub teams: Vec<Team>,
    pub resources: Vec<Resource>,
    pub users: Vec<User>,
    pub schedules: Vec<ScheduleData>,
}

impl Dataset {
    /// Read a dataset, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let dataset = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?,
            Some("toml") => toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?,
            _ => bail!(
                "Unsupported data file {} (expected .json or .toml)",
                path.display()
            ),
        };

        Ok(dataset)
    }

    /// Feed everything into a fresh controller. Schedules are added silently.
    pub fn into_controller(self, options: ControllerOptions) -> Result<Controller> {
        let mut controller = Controller::new(options);

        controller.set_calendars(self.calendars)?;
        controller.set_teams(self.teams)?;
        controller.set_resources(self.resources)?;
        controller.set_users(self.users)?;

        let count = self.schedules.len();
        controller.create_schedules(self.schedules, true)?;
        log::info!(
            "loaded {} schedules over {} days",
            count,
            controller.matrix().len()
        );

        Ok(controller)
    }
}
