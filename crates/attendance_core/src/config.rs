//! Engine configuration.
//!
//! # Responsibility
//! - Load deployment settings from JSON (file or string).
//! - Hold the deployment zone used to reduce instants to calendar dates.
//!
//! # Invariants
//! - Every field has a default; an empty object `{}` is a valid config.
//! - A config returned from `load`/`from_json_str` has passed `validate`.

use crate::model::calendar_date::calendar_date_of;
use crate::model::class_day::DuplicateClassDayPolicy;
use crate::service::projection::EligibilityPolicy;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidOffset(String),
    InvalidPolicy(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::InvalidOffset(value) => {
                write!(f, "invalid utc offset `{value}`; expected +HH:MM or -HH:MM")
            }
            Self::InvalidPolicy(message) => write!(f, "invalid eligibility policy: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidOffset(_) | Self::InvalidPolicy(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Fixed UTC offset of the deployment, written as `+HH:MM`, `-HH:MM` or `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UtcOffset(FixedOffset);

impl UtcOffset {
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("z") {
            return Ok(Self::utc());
        }

        let invalid = || ConfigError::InvalidOffset(trimmed.to_string());
        let (sign, rest) = if let Some(rest) = trimmed.strip_prefix('+') {
            (1, rest)
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (-1, rest)
        } else {
            return Err(invalid());
        };
        let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if hours > 18 || minutes > 59 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn zone(&self) -> FixedOffset {
        self.0
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self::utc()
    }
}

impl TryFrom<String> for UtcOffset {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UtcOffset> for String {
    fn from(value: UtcOffset) -> Self {
        value.0.to_string()
    }
}

/// Deployment settings for the eligibility engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Zone whose calendar dates define attendance equality.
    pub utc_offset: UtcOffset,
    pub eligibility: EligibilityPolicy,
    pub duplicate_class_days: DuplicateClassDayPolicy,
}

impl EngineConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.eligibility
            .validate()
            .map_err(|message| ConfigError::InvalidPolicy(message.to_string()))
    }

    pub fn zone(&self) -> FixedOffset {
        self.utc_offset.zone()
    }

    /// Calendar date of `now` in the deployment zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        calendar_date_of(now, &self.zone())
    }
}
