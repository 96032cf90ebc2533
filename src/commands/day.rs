use anyhow::Result;
use calgrid_core::{Controller, DayKey, Schedule};
use owo_colors::OwoColorize;

use crate::render::{self, Render};

/// List one day in display order, hiding schedules of unchecked calendars.
pub fn run(controller: &Controller, day: DayKey) -> Result<()> {
    let view = controller.more_view(day, |schedule| is_visible(controller, schedule));

    println!("{}", view.day.render());

    if view.schedules.is_empty() {
        println!("  {}", "Nothing scheduled".dimmed());
        return Ok(());
    }

    for item in &view.schedules {
        let calendar = controller.calendar_of(item.schedule);
        println!("{}", render::more_line(item, calendar));
    }

    Ok(())
}

/// Schedules without a known calendar are always shown.
pub fn is_visible(controller: &Controller, schedule: &Schedule) -> bool {
    controller
        .calendar_of(schedule)
        .is_none_or(|calendar| calendar.checked)
}
