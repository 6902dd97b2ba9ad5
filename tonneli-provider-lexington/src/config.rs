//! Provider configuration.
//!
//! Defaults point at the public town pages. Every value can be overridden
//! through `TONNELI_LEXINGTON_*` environment variables.

use std::env;
use std::str::FromStr;

use tonneli_core::projection::{ShiftRule, UnknownShiftRule};
use tonneli_core::resolve::DEFAULT_CUTOFF;
use url::Url;

/// Town page listing the collection weekday of every street.
pub const STREET_SCHEDULE_URL: &str =
    "https://lexingtonma.gov/248/Trash-Recycling-Collection-Schedule-by-S";
/// Town page listing official holidays.
pub const HOLIDAY_URL: &str = "https://lexingtonma.gov/317/Official-Town-Holidays-Other-Closing-Day";

/// Environment variable overriding [`LexingtonConfig::street_schedule_url`].
pub const ENV_STREET_URL: &str = "TONNELI_LEXINGTON_STREET_URL";
/// Environment variable overriding [`LexingtonConfig::holiday_url`].
pub const ENV_HOLIDAY_URL: &str = "TONNELI_LEXINGTON_HOLIDAY_URL";
/// Environment variable overriding [`LexingtonConfig::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "TONNELI_LEXINGTON_TIMEOUT_SECS";
/// Environment variable overriding [`LexingtonConfig::match_cutoff`].
pub const ENV_MATCH_CUTOFF: &str = "TONNELI_LEXINGTON_MATCH_CUTOFF";
/// Environment variable overriding [`LexingtonConfig::horizon`].
pub const ENV_HORIZON: &str = "TONNELI_LEXINGTON_HORIZON";
/// Environment variable overriding [`LexingtonConfig::shift_rule`].
pub const ENV_SHIFT_RULE: &str = "TONNELI_LEXINGTON_SHIFT_RULE";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HORIZON: usize = 8;
const MAX_HORIZON: usize = 366;

/// Settings for the Lexington provider.
#[derive(Debug, Clone, PartialEq)]
pub struct LexingtonConfig {
    /// Street schedule page.
    pub street_schedule_url: Url,
    /// Holiday page.
    pub holiday_url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Minimum similarity for a fuzzy street match, within `0.0..=1.0`.
    pub match_cutoff: f64,
    /// Number of upcoming pickups projected per stream.
    pub horizon: usize,
    /// How holidays delay pickups.
    pub shift_rule: ShiftRule,
}

impl LexingtonConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Default configuration with the public town pages.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] only if the built-in URLs fail to parse.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::from_lookup(|_var| None)
    }

    /// Load configuration, reading overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a looked-up value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |var: &str, default: &str| -> Result<Url, ConfigError> {
            let raw = lookup(var).unwrap_or_else(|| default.to_owned());
            Url::parse(raw.trim()).map_err(|err| ConfigError::InvalidUrl {
                var: var.to_owned(),
                reason: err.to_string(),
            })
        };

        let config = Self {
            street_schedule_url: url(ENV_STREET_URL, STREET_SCHEDULE_URL)?,
            holiday_url: url(ENV_HOLIDAY_URL, HOLIDAY_URL)?,
            timeout_secs: parse_var(&lookup, ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?,
            match_cutoff: parse_var(&lookup, ENV_MATCH_CUTOFF, DEFAULT_CUTOFF)?,
            horizon: parse_var(&lookup, ENV_HORIZON, DEFAULT_HORIZON)?,
            shift_rule: match lookup(ENV_SHIFT_RULE) {
                Some(raw) => raw.parse()?,
                None => ShiftRule::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for a zero timeout, a cutoff outside
    /// `0.0..=1.0` or a horizon outside `1..=366`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(out_of_range(ENV_TIMEOUT_SECS, self.timeout_secs));
        }
        if !(0.0..=1.0).contains(&self.match_cutoff) {
            return Err(out_of_range(ENV_MATCH_CUTOFF, self.match_cutoff));
        }
        if !(1..=MAX_HORIZON).contains(&self.horizon) {
            return Err(out_of_range(ENV_HORIZON, self.horizon));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|_err| ConfigError::InvalidValue {
            var: var.to_owned(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn out_of_range<T: ToString>(var: &str, value: T) -> ConfigError {
    ConfigError::OutOfRange {
        var: var.to_owned(),
        value: value.to_string(),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A URL could not be parsed.
    #[error("invalid URL for {var}: {reason}")]
    InvalidUrl {
        /// Variable holding the URL.
        var: String,
        /// Parser message.
        reason: String,
    },
    /// A number could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable holding the value.
        var: String,
        /// Raw value.
        value: String,
    },
    /// A value parsed but is not allowed.
    #[error("{var} out of range: {value}")]
    OutOfRange {
        /// Variable holding the value.
        var: String,
        /// Offending value.
        value: String,
    },
    /// Unknown holiday shift rule.
    #[error(transparent)]
    ShiftRule(#[from] UnknownShiftRule),
}
