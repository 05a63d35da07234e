// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors raised while building a logger or transport.
///
/// These indicate a deployment or programming mistake and are returned to the
/// caller of the constructor.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("HTTP client thread panicked during construction")]
    ClientThread,
}

/// Errors raised while delivering a single record.
///
/// A [`crate::Logger`] never propagates these; it reports them to the
/// diagnostic channel and carries on.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("Failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to send log record: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index request rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client thread panicked while sending log record")]
    ClientThread,
}
