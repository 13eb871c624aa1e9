use std::{env, time::Duration};

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tripool_application::{
    SolveOptions,
    model::{DEFAULT_RELAXED_TIME_LIMIT, DEFAULT_TIME_LIMIT},
};
use tripool_infrastructure::SheetNames;

pub const TIME_LIMIT_KEY: &str = "TRIPOOL_TIME_LIMIT_SECS";
pub const RELAXED_TIME_LIMIT_KEY: &str = "TRIPOOL_RELAXED_TIME_LIMIT_SECS";
pub const BENEFITS_SHEET_KEY: &str = "TRIPOOL_BENEFITS_SHEET";
pub const THRESHOLD_SHEET_KEY: &str = "TRIPOOL_THRESHOLD_SHEET";
pub const POOL_LIMIT_SHEET_KEY: &str = "TRIPOOL_POOL_LIMIT_SHEET";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a positive number of seconds or `none` (found '{value}')")]
    InvalidDuration { key: &'static str, value: String },
}

/// Solver budgets and sheet names, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub solve: SolveOptions,
    pub sheets: SheetNames,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let time_limit = parse_duration(TIME_LIMIT_KEY, lookup(TIME_LIMIT_KEY), DEFAULT_TIME_LIMIT)?;
        let relaxed_time_limit = parse_duration(
            RELAXED_TIME_LIMIT_KEY,
            lookup(RELAXED_TIME_LIMIT_KEY),
            DEFAULT_RELAXED_TIME_LIMIT,
        )?;

        let defaults = SheetNames::default();
        let sheet_name = |key: &str, default: String| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .unwrap_or(default)
        };
        let sheets = SheetNames {
            benefits: sheet_name(BENEFITS_SHEET_KEY, defaults.benefits),
            threshold: sheet_name(THRESHOLD_SHEET_KEY, defaults.threshold),
            pool_limit: sheet_name(POOL_LIMIT_SHEET_KEY, defaults.pool_limit),
        };

        Ok(Self {
            solve: SolveOptions {
                time_limit,
                relaxed_time_limit,
            },
            sheets,
        })
    }
}

/// Unset or blank keeps the default; `0` and `none` disable the limit.
fn parse_duration(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Some(default));
    };
    let value = raw.trim();
    if value.is_empty() {
        return Ok(Some(default));
    }
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(seconds) if seconds == 0.0 => Ok(None),
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
            Ok(Some(Duration::from_secs_f64(seconds)))
        }
        _ => Err(ConfigError::InvalidDuration {
            key,
            value: raw.clone(),
        }),
    }
}

/// Initialize logging and tracing
///
/// Events go to stderr so that stdout only carries the output workbook.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
