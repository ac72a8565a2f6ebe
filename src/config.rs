//! Configuration loaded from environment variables.

use crate::errors::ConfigError;
use std::path::PathBuf;

/// Thresholds used by the aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSettings {
    /// Minimum percentage for a day to count towards a streak.
    pub good_day_threshold: u32,
    /// Minimum percentage to be listed as a top performer.
    pub top_performer_threshold: u32,
    /// Denominator for a weekly-trend day that has no rows at all.
    pub weekly_fallback_total: u32,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            good_day_threshold: 70,
            top_performer_threshold: 80,
            weekly_fallback_total: 6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub progress: ProgressSettings,
}

impl Config {
    /// | Variable | Default |
    /// |----------|---------|
    /// | `PORT` | `8080` |
    /// | `APP_DATA_PATH` | `data/state.json` |
    /// | `TASK_CATALOG_PATH` | built-in catalog |
    /// | `GOOD_DAY_THRESHOLD` | `70` |
    /// | `TOP_PERFORMER_THRESHOLD` | `80` |
    /// | `WEEKLY_FALLBACK_TOTAL` | `6` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ProgressSettings::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));

        let catalog_path = lookup("TASK_CATALOG_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let progress = ProgressSettings {
            good_day_threshold: percent_var(&lookup, "GOOD_DAY_THRESHOLD", defaults.good_day_threshold)?,
            top_performer_threshold: percent_var(
                &lookup,
                "TOP_PERFORMER_THRESHOLD",
                defaults.top_performer_threshold,
            )?,
            weekly_fallback_total: number_var(
                &lookup,
                "WEEKLY_FALLBACK_TOTAL",
                defaults.weekly_fallback_total,
            )?,
        };

        Ok(Self {
            port,
            data_path,
            catalog_path,
            progress,
        })
    }
}

fn number_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u32,
) -> Result<u32, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}

fn percent_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u32,
) -> Result<u32, ConfigError> {
    let value = number_var(lookup, name, default)?;
    if value > 100 {
        return Err(ConfigError::OutOfRange { name, value });
    }
    Ok(value)
}
