use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CalendarError;
use crate::locale::Locale;
use crate::progress::HabitGroups;
use crate::resolver::DEFAULT_MAX_SCAN_STEPS;

const DEFAULT_REQUIRED: [&str; 5] = ["fajr", "dhuhr", "asr", "maghrib", "isha"];
const DEFAULT_OPTIONAL: [&str; 5] = ["morning_adhkar", "evening_adhkar", "quran", "duha", "witr"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read calendar config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed calendar config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] CalendarError),
}

/// Engine settings, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub required_habits: Vec<String>,
    pub optional_habits: Vec<String>,
    pub locale: Locale,
    pub week_start: Weekday,
    pub max_scan_steps: u32,
    pub refresh_interval_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            required_habits: DEFAULT_REQUIRED.iter().map(|s| s.to_string()).collect(),
            optional_habits: DEFAULT_OPTIONAL.iter().map(|s| s.to_string()).collect(),
            locale: Locale::English,
            week_start: Weekday::Sun,
            max_scan_steps: DEFAULT_MAX_SCAN_STEPS,
            refresh_interval_secs: 60,
        }
    }
}

impl CalendarConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: CalendarConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.max_scan_steps == 0 {
            return Err(CalendarError::ZeroScanBudget);
        }
        self.habit_groups().map(|_| ())
    }

    pub fn habit_groups(&self) -> Result<HabitGroups, CalendarError> {
        HabitGroups::new(self.required_habits.clone(), self.optional_habits.clone())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}
