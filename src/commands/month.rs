use anyhow::{Context, Result};
use calgrid_core::{Controller, DayKey};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use owo_colors::OwoColorize;

use crate::commands::day::is_visible;
use crate::render::{self, Render};

/// Weeks covering a whole month, each starting on `week_start`. Cells before
/// the 1st and after the last day belong to the neighboring months.
pub fn month_grid(year: i32, month: u32, week_start: Weekday) -> Result<Vec<[NaiveDate; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("Invalid month {}-{:02}", year, month))?;

    let offset = (7 + first.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    let mut cursor = first - Duration::days(offset as i64);

    let mut weeks = Vec::new();
    loop {
        let week_first = cursor;
        weeks.push(std::array::from_fn(|i| week_first + Duration::days(i as i64)));
        cursor = cursor + Duration::days(7);
        if cursor.month() != month {
            break;
        }
    }

    Ok(weeks)
}

/// Parse `YYYY-MM`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let date = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}' (expected YYYY-MM)", s))?;
    Ok((date.year(), date.month()))
}

pub fn run(controller: &Controller, year: i32, month: u32, week_start: Weekday) -> Result<()> {
    let weeks = month_grid(year, month, week_start)?;
    let (Some(first_cell), Some(last_cell)) = (
        weeks.first().map(|w| w[0]),
        weeks.last().map(|w| w[6]),
    ) else {
        return Ok(());
    };

    let buckets = controller.find_by_date_range(first_cell, last_cell);

    let title = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    println!("{}", render::zone_header(&title, controller.timezone()));

    let header: Vec<String> = (0..7)
        .map(|i| format!("{:>6}", week_start_plus(week_start, i).to_string()))
        .collect();
    println!("{}", header.join(" ").dimmed());

    for week in &weeks {
        let cells: Vec<String> = week
            .iter()
            .map(|date| {
                let count = buckets
                    .get(&DayKey::new(*date))
                    .map(|list| list.iter().filter(|s| is_visible(controller, s)).count())
                    .unwrap_or(0);
                let cell = if count > 0 {
                    format!("{:>3}•{:<2}", date.day(), count)
                } else {
                    format!("{:>3}   ", date.day())
                };
                if date.month() == month {
                    cell
                } else {
                    cell.dimmed().to_string()
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }

    for (day, schedules) in &buckets {
        if day.date().month() != month {
            continue;
        }
        let visible: Vec<_> = schedules
            .iter()
            .filter(|s| is_visible(controller, s))
            .collect();
        if visible.is_empty() {
            continue;
        }

        println!();
        println!("{}", day.render());
        for schedule in visible {
            println!("{}", render::schedule_line(schedule, controller.calendar_of(schedule)));
        }
    }

    Ok(())
}

fn week_start_plus(start: Weekday, days: u8) -> Weekday {
    (0..days).fold(start, |day, _| day.succ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_grid_sunday_start() {
        // March 2024 starts on a Friday
        let weeks = month_grid(2024, 3, Weekday::Sun).unwrap();

        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0][0], date(2024, 2, 25));
        assert_eq!(weeks[0][5], date(2024, 3, 1));
        assert_eq!(weeks[5][6], date(2024, 4, 6));
    }

    #[test]
    fn test_grid_monday_start() {
        let weeks = month_grid(2024, 3, Weekday::Mon).unwrap();

        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0][0], date(2024, 2, 26));
        assert_eq!(weeks[4][6], date(2024, 3, 31));
    }

    #[test]
    fn test_grid_month_starting_on_week_start() {
        // September 2024 starts on a Sunday
        let weeks = month_grid(2024, 9, Weekday::Sun).unwrap();
        assert_eq!(weeks[0][0], date(2024, 9, 1));
        assert_eq!(weeks.len(), 5);
    }

    #[test]
    fn test_grid_december_rolls_into_next_year() {
        let weeks = month_grid(2024, 12, Weekday::Mon).unwrap();
        assert_eq!(weeks.last().unwrap()[6], date(2025, 1, 5));
    }

    #[test]
    fn test_invalid_month() {
        assert!(month_grid(2024, 13, Weekday::Sun).is_err());
        assert!(parse_month("2024-13").is_err());
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
    }

    #[test]
    fn test_week_start_plus() {
        assert_eq!(week_start_plus(Weekday::Sat, 2), Weekday::Mon);
        assert_eq!(week_start_plus(Weekday::Mon, 0), Weekday::Mon);
    }
}
