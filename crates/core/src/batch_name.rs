//! Typed batch identifiers.
//!
//! A batch is named after the local wall-clock second its run started:
//! `YYYYMMDD-HHMMSS`. The format is fixed-width, so lexicographic order on
//! the name is chronological order, which is what "latest batch" selection
//! relies on.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// `strftime` pattern for batch names.
pub const BATCH_NAME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of a well-formed batch name (`20250102-014551`).
const BATCH_NAME_LEN: usize = 15;

/// A validated `YYYYMMDD-HHMMSS` batch name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchName(String);

impl BatchName {
    /// Name for a batch starting at the current local time.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Name for a batch starting at `at` (second granularity).
    pub fn from_datetime(at: NaiveDateTime) -> Self {
        Self(at.format(BATCH_NAME_FORMAT).to_string())
    }

    /// Parse and validate a batch name.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.len() != BATCH_NAME_LEN {
            return Err(invalid(raw));
        }
        NaiveDateTime::parse_from_str(raw, BATCH_NAME_FORMAT).map_err(|_| invalid(raw))?;
        Ok(Self(raw.to_string()))
    }

    /// The wall-clock start time encoded in the name.
    pub fn started_at(&self) -> NaiveDateTime {
        // Construction guarantees the name parses.
        NaiveDateTime::parse_from_str(&self.0, BATCH_NAME_FORMAT).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(raw: &str) -> CoreError {
    CoreError::Validation(format!(
        "Invalid batch name '{raw}'. Expected YYYYMMDD-HHMMSS"
    ))
}

impl fmt::Display for BatchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BatchName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for BatchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for BatchName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BatchName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
