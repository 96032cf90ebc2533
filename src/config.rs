//! Global calgrid configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calgrid_core::parse_timezone;
use chrono::Weekday;
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

static DEFAULT_DATA_FILE: &str = "~/calendar/calgrid.json";

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// First column of the month grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }
}

/// Global configuration at ~/.config/calgrid/config.toml
///
/// Every key can be overridden from the environment with a `CALGRID_` prefix,
/// e.g. `CALGRID_TIMEZONE=Europe/Berlin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalgridConfig {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub week_start: WeekStart,

    /// JSON or TOML file holding schedules and calendars
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for CalgridConfig {
    fn default() -> Self {
        CalgridConfig {
            timezone: default_timezone(),
            week_start: WeekStart::default(),
            data_file: default_data_file(),
        }
    }
}

impl CalgridConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("calgrid");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented-out default first if
    /// there is none yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing) plus `CALGRID_*` variables.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: CalgridConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CALGRID"))
            .build()
            .context("Could not read config")?
            .try_deserialize()
            .context("Invalid config")?;

        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# calgrid configuration

# Timezone schedules are shown in (IANA name):
# timezone = \"UTC\"

# First day of the week in month grids, \"sunday\" or \"monday\":
# week_start = \"sunday\"

# Where your schedules live (.json or .toml):
# data_file = \"{}\"
",
            DEFAULT_DATA_FILE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents).context("Could not write config file")?;

        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.timezone).map_err(|e| anyhow::anyhow!(e))
    }

    /// The data file with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_file.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }
}
