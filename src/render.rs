//! Terminal rendering for calgrid-core types using owo_colors.

use calgrid_core::{Calendar, DayKey, MoreItem, Palette, Schedule, ScheduleCategory};
use chrono::Datelike;
use chrono_tz::Tz;
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ScheduleCategory {
    fn render(&self) -> String {
        let label = self.to_string();
        match self {
            ScheduleCategory::Milestone => label.magenta().to_string(),
            ScheduleCategory::Task => label.cyan().to_string(),
            ScheduleCategory::Allday => label.blue().to_string(),
            ScheduleCategory::Time => label.dimmed().to_string(),
        }
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        paint(&format!("[{}]", self.name), &self.palette)
    }
}

impl Render for DayKey {
    fn render(&self) -> String {
        let date = self.date();
        let label = date.format("%a %b %-d").to_string();
        if date.weekday().number_from_monday() >= 6 {
            label.dimmed().bold().to_string()
        } else {
            label.bold().to_string()
        }
    }
}

/// One schedule line: time, title, optional calendar tag.
pub fn schedule_line(schedule: &Schedule, calendar: Option<&Calendar>) -> String {
    let title = if schedule.is_pending {
        schedule.to_string().italic().to_string()
    } else {
        paint(&schedule.to_string(), &schedule.palette)
    };

    match calendar {
        Some(calendar) => format!("  {} {} {}", time_label(schedule), title, calendar.render()),
        None => format!("  {} {}", time_label(schedule), title),
    }
}

/// Same as [`schedule_line`], marking schedules that continue past this day.
pub fn more_line(item: &MoreItem<'_>, calendar: Option<&Calendar>) -> String {
    let line = schedule_line(item.schedule, calendar);
    if item.has_multi_dates {
        format!("{} {}", line, "↔".dimmed())
    } else {
        line
    }
}

/// Time of day, or the group name for schedules without one.
fn time_label(schedule: &Schedule) -> String {
    match schedule.group_key() {
        ScheduleCategory::Time => format!(
            "{:>5}-{:<5}",
            schedule.start.format("%H:%M"),
            schedule.end.format("%H:%M")
        ),
        other => format!("{:<11}", other.render()),
    }
}

/// Color `text` with the palette's background color when it is a `#rrggbb` value.
fn paint(text: &str, palette: &Palette) -> String {
    match palette.bg_color.as_deref().and_then(parse_hex) {
        Some((r, g, b)) => text.truecolor(r, g, b).to_string(),
        None => text.to_string(),
    }
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Header for a timezone-pinned view.
pub fn zone_header(title: &str, tz: Tz) -> String {
    format!("{} {}", title.bold(), format!("({})", tz.name()).dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#00a9ff"), Some((0, 169, 255)));
        assert_eq!(parse_hex("00a9ff"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#gg0000"), None);
    }

    #[test]
    fn test_paint_without_color_is_plain() {
        assert_eq!(paint("Standup", &Palette::default()), "Standup");
    }
}
