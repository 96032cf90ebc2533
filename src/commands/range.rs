use anyhow::{Result, bail};
use calgrid_core::{Controller, DayKey};
use owo_colors::OwoColorize;

use crate::commands::day::is_visible;
use crate::render::{self, Render};

/// Longest range a single invocation will print.
const MAX_RANGE_DAYS: i64 = 366;

/// Print every day from `from` to `to` that has something on it, split into
/// milestone/task/allday/time panels.
pub fn run(controller: &Controller, from: DayKey, to: DayKey) -> Result<()> {
    if to < from {
        bail!("--to {} is before --from {}", to, from);
    }
    if (to.date() - from.date()).num_days() >= MAX_RANGE_DAYS {
        bail!("Range is longer than {} days", MAX_RANGE_DAYS);
    }

    println!(
        "{}",
        render::zone_header(&format!("{} to {}", from.date(), to.date()), controller.timezone())
    );

    let mut printed_any = false;

    for (day, panels) in controller.find_grouped_by_date_range(from, to) {
        let panels: Vec<_> = panels
            .into_iter()
            .map(|(category, schedules)| {
                let visible: Vec<_> = schedules
                    .into_iter()
                    .filter(|s| is_visible(controller, s))
                    .collect();
                (category, visible)
            })
            .filter(|(_, schedules)| !schedules.is_empty())
            .collect();

        if panels.is_empty() {
            continue;
        }

        println!();
        println!("{}", day.render());
        for (category, schedules) in panels {
            println!(" {}", category.render());
            for schedule in schedules {
                println!("{}", render::schedule_line(schedule, controller.calendar_of(schedule)));
            }
        }
        printed_any = true;
    }

    if !printed_any {
        println!("{}", "No schedules found".dimmed());
    }

    Ok(())
}
