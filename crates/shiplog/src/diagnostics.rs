// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Fallback diagnostic channel.
//!
//! Delivery failures are emitted as `tracing` events. Applications that
//! already install a subscriber receive them there, and [`init`] sets up a
//! plain formatter on standard error. Until some global subscriber exists,
//! failures are also written to standard error directly.

use std::env;
use std::fmt;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

pub const LOG_LEVEL_ENV: &str = "SHIPLOG_LOG_LEVEL";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Directive string for `level` with noisy HTTP internals switched off.
#[must_use]
pub fn env_filter_directives(level: &str) -> String {
    format!("h2=off,hyper=off,hyper_util=off,reqwest=off,rustls=off,{level}")
}

/// Installs a stderr subscriber at `level` as the global default.
///
/// Returns `false` without changing anything when `level` does not parse or a
/// global subscriber is already installed.
pub fn init(level: &str) -> bool {
    let Ok(filter) = EnvFilter::try_new(env_filter_directives(level)) else {
        return false;
    };

    tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .try_init()
        .is_ok()
}

/// Same as [`init`], with the level read from `SHIPLOG_LOG_LEVEL`.
pub fn init_from_env() -> bool {
    let log_level = env::var(LOG_LEVEL_ENV)
        .map(|val| val.to_lowercase())
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    init(&log_level)
}

/// Writes `message` to stderr when no global subscriber would see it.
///
/// Returns whether the message was written.
pub(crate) fn stderr_fallback(message: fmt::Arguments<'_>) -> bool {
    if tracing::dispatcher::has_been_set() {
        return false;
    }
    write_fallback(&mut io::stderr().lock(), message).is_ok()
}

fn write_fallback(out: &mut impl Write, message: fmt::Arguments<'_>) -> io::Result<()> {
    writeln!(out, "shiplog: {message}")?;
    out.flush()
}
