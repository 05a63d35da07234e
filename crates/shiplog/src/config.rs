// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the Elasticsearch index transport.
//!
//! Values can be built in code or read from the environment:
//!
//! | Variable                  | Default                 |
//! |---------------------------|-------------------------|
//! | `SHIPLOG_ES_URL`          | `http://localhost:9200` |
//! | `SHIPLOG_ES_INDEX`        | `logs`                  |
//! | `SHIPLOG_ES_TIMEOUT_SECS` | `5`                     |
//! | `SHIPLOG_ES_REFRESH`      | `true`                  |
//! | `SHIPLOG_ES_USERNAME`     | unset                   |
//! | `SHIPLOG_ES_PASSWORD`     | unset                   |

use crate::error::ConfigError;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_INDEX: &str = "logs";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const INVALID_INDEX_CHARS: [char; 12] = ['/', '\\', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// When an indexed document becomes visible to searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Refresh {
    /// Refresh the affected shards immediately (read-after-write).
    #[default]
    True,
    /// Leave visibility to the backend's periodic refresh.
    False,
    /// Block the request until the next periodic refresh.
    WaitFor,
}

impl Refresh {
    /// Value of the `refresh` query parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Refresh::True => "true",
            Refresh::False => "false",
            Refresh::WaitFor => "wait_for",
        }
    }
}

impl fmt::Display for Refresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Refresh {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" => Ok(Refresh::True),
            "false" => Ok(Refresh::False),
            "wait_for" => Ok(Refresh::WaitFor),
            _ => Err(format!(
                "Invalid refresh policy: '{s}'. Valid values are: true, false, wait_for"
            )),
        }
    }
}

/// Settings for [`crate::ElasticsearchClient`] and [`crate::IndexTransport`].
#[derive(Clone, PartialEq, Eq)]
pub struct ElasticsearchConfig {
    /// Base URL of the cluster, e.g. `http://localhost:9200`
    pub url: String,
    /// Index that receives the log documents
    pub index: String,
    /// Timeout applied to every index request
    pub timeout: Duration,
    /// Visibility requested for each document
    pub refresh: Refresh,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            index: DEFAULT_INDEX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            refresh: Refresh::default(),
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for ElasticsearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticsearchConfig")
            .field("url", &self.url)
            .field("index", &self.index)
            .field("timeout", &self.timeout)
            .field("refresh", &self.refresh)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ElasticsearchConfig {
    /// Config for `url` and `index` with every other setting at its default.
    pub fn new(url: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index: index.into(),
            ..Default::default()
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("SHIPLOG_ES_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let index = env::var("SHIPLOG_ES_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());
        let timeout = match env::var("SHIPLOG_ES_TIMEOUT_SECS") {
            Ok(secs) => secs.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                ConfigError::InvalidConfig(format!(
                    "SHIPLOG_ES_TIMEOUT_SECS must be a whole number of seconds, got '{secs}'"
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT,
        };
        let refresh = match env::var("SHIPLOG_ES_REFRESH") {
            Ok(val) => val.parse::<Refresh>().map_err(ConfigError::InvalidConfig)?,
            Err(_) => Refresh::default(),
        };
        let username = env::var("SHIPLOG_ES_USERNAME")
            .ok()
            .filter(|val| !val.is_empty());
        let password = env::var("SHIPLOG_ES_PASSWORD")
            .ok()
            .filter(|val| !val.is_empty());

        let config = Self {
            url,
            index,
            timeout,
            refresh,
            username,
            password,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL cannot be empty".to_string(),
            });
        }
        let parsed = reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        if parsed.host_str().is_none() {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL has no host".to_string(),
            });
        }
        // Document paths are appended to the base URL as text.
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                reason: "URL cannot have a query or fragment".to_string(),
            });
        }

        validate_index_name(&self.index)?;

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::InvalidConfig(
                "a password was given without a username".to_string(),
            ));
        }

        Ok(())
    }
}

/// Checks `index` against the Elasticsearch index naming rules.
pub fn validate_index_name(index: &str) -> Result<(), ConfigError> {
    if index.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "index name cannot be empty".to_string(),
        ));
    }
    if index.chars().any(char::is_uppercase) {
        return Err(ConfigError::InvalidConfig(format!(
            "index name '{index}' must be lowercase"
        )));
    }
    if index.starts_with(['_', '-', '+']) {
        return Err(ConfigError::InvalidConfig(format!(
            "index name '{index}' cannot start with '_', '-' or '+'"
        )));
    }
    if index == "." || index == ".." {
        return Err(ConfigError::InvalidConfig(format!(
            "index name cannot be '{index}'"
        )));
    }
    if let Some(c) = index.chars().find(|c| INVALID_INDEX_CHARS.contains(c)) {
        return Err(ConfigError::InvalidConfig(format!(
            "index name '{index}' contains invalid character '{c}'"
        )));
    }
    Ok(())
}
