mod commands;
mod config;
mod dataset;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use calgrid_core::{Controller, ControllerOptions, DayKey};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use flexi_logger::{Logger, LoggerHandle};

use crate::config::CalgridConfig;
use crate::dataset::Dataset;

#[derive(Parser)]
#[command(name = "calgrid")]
#[command(about = "Browse schedules as month grids and day lists")]
struct Cli {
    /// Log level (error, warn, info, debug, trace). Defaults to $RUST_LOG or "warn"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Month grid with per-day schedule counts
    Month {
        /// Month to show (YYYY-MM). Defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Data file to read instead of the configured one
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Schedules of every day in a range, grouped by kind
    Range {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Everything on a single day
    Day {
        /// YYYY-MM-DD
        date: String,

        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Show config and data paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(cli.log_level.as_deref())?;

    let config = CalgridConfig::load()?;

    match cli.command {
        Commands::Month { month, data } => {
            let controller = load_controller(&config, data)?;
            let (year, month) = match month {
                Some(month) => commands::month::parse_month(&month)?,
                None => {
                    let today = Utc::now().with_timezone(&controller.timezone()).date_naive();
                    (today.year(), today.month())
                }
            };
            commands::month::run(&controller, year, month, config.week_start.weekday())
        }
        Commands::Range { from, to, data } => {
            let controller = load_controller(&config, data)?;
            commands::range::run(&controller, parse_day(&from)?, parse_day(&to)?)
        }
        Commands::Day { date, data } => {
            let controller = load_controller(&config, data)?;
            commands::day::run(&controller, parse_day(&date)?)
        }
        Commands::Config => commands::config::run(&config),
    }
}

/// Log to stderr. The returned handle must stay alive for the program's lifetime.
fn init_logging(level: Option<&str>) -> Result<LoggerHandle> {
    let logger = match level {
        Some(level) => Logger::try_with_str(level),
        None => Logger::try_with_env_or_str("warn"),
    }
    .context("Invalid log level")?;

    logger
        .log_to_stderr()
        .start()
        .context("Could not start logger")
}

fn load_controller(config: &CalgridConfig, data: Option<PathBuf>) -> Result<Controller> {
    let path = data.unwrap_or_else(|| config.data_path());

    if !path.exists() {
        anyhow::bail!(
            "No data file at {}.\n\n\
            Point calgrid at one with:\n  \
            calgrid month --data schedules.json\n\n\
            or set data_file in {}",
            path.display(),
            CalgridConfig::config_path()?.display()
        );
    }

    let options = ControllerOptions {
        timezone: config.timezone()?,
        ..Default::default()
    };

    Dataset::load(&path)?.into_controller(options)
}

fn parse_day(s: &str) -> Result<DayKey> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))?;
    Ok(DayKey::new(date))
}
