// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Canonical log record and severity levels.
//!
//! A [`LogRecord`] serializes to a flat JSON object:
//!
//! ```text
//! {"level":"Info","message":"started","timestamp":1700000000000,"host":"web-1","context":"api"}
//! ```
//!
//! The `context` key is omitted entirely when no context tag is set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Severity of a log record, ordered from most to least severe.
///
/// All levels are always delivered; there is no level filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// System is unusable.
    Emergency,
    /// Action must be taken immediately.
    Alert,
    /// Critical conditions.
    Critical,
    /// Runtime errors that do not require immediate action but should be monitored.
    Error,
    /// Exceptional occurrences that are not errors.
    Warning,
    /// Normal but significant events.
    Notice,
    /// Interesting events.
    Info,
    /// Detailed debug information.
    Debug,
}

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Name used in the JSON body and as the index type discriminator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Emergency => "Emergency",
            Level::Alert => "Alert",
            Level::Critical => "Critical",
            Level::Error => "Error",
            Level::Warning => "Warning",
            Level::Notice => "Notice",
            Level::Info => "Info",
            Level::Debug => "Debug",
        }
    }

    /// Syslog (RFC 5424) severity code, 0 for `Emergency` through 7 for `Debug`.
    #[must_use]
    pub fn severity(self) -> u8 {
        self as u8
    }
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Invalid level: '{s}'. Valid levels are: emergency, alert, critical, error, warning, notice, info, debug"
                )
            })
    }
}

/// One log event.
///
/// Immutable once built. The timestamp is taken when the record is created,
/// not when a transport ships it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    level: Level,
    message: String,
    /// Milliseconds since the Unix epoch.
    timestamp: i64,
    host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl LogRecord {
    /// Creates a record stamped with the current wall-clock time.
    #[must_use]
    pub fn new(
        level: Level,
        message: impl Into<String>,
        host: impl Into<String>,
        context: Option<String>,
    ) -> Self {
        Self::with_timestamp(level, message, host, context, now_millis())
    }

    /// Creates a record with an explicit timestamp in epoch milliseconds.
    #[must_use]
    pub fn with_timestamp(
        level: Level,
        message: impl Into<String>,
        host: impl Into<String>,
        context: Option<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp,
            host: host.into(),
            context,
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Serializes the record to its single-line JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the record to a JSON value, e.g. for use as a request body.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Current time in milliseconds since the Unix epoch.
///
/// A clock set before 1970 yields a negative value rather than an error.
#[must_use]
pub fn now_millis() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        Err(before_epoch) => {
            -i64::try_from(before_epoch.duration().as_millis()).unwrap_or(i64::MAX)
        }
    }
}
