// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hostname detection utilities

use std::env;
use std::sync::OnceLock;
use tracing::warn;

/// Environment variable that overrides hostname detection.
pub const HOSTNAME_OVERRIDE_ENV: &str = "SHIPLOG_HOSTNAME";

const UNKNOWN_HOSTNAME: &str = "unknown";

static PROCESS_HOSTNAME: OnceLock<String> = OnceLock::new();

/// Get the system hostname
///
/// This function tries multiple methods to determine the hostname:
/// 1. SHIPLOG_HOSTNAME environment variable (if set)
/// 2. HOSTNAME environment variable
/// 3. System hostname via nix::unistd::gethostname()
/// 4. Fallback to "unknown" if all methods fail
#[must_use]
pub fn get_hostname() -> String {
    // Empty values count as unset
    for var in [HOSTNAME_OVERRIDE_ENV, "HOSTNAME"] {
        if let Ok(hostname) = env::var(var) {
            if !hostname.is_empty() {
                return hostname;
            }
        }
    }

    if let Some(hostname) = system_hostname() {
        return hostname;
    }

    warn!("Could not determine hostname, using '{UNKNOWN_HOSTNAME}'");
    UNKNOWN_HOSTNAME.to_string()
}

/// Hostname resolved on first use and reused for the rest of the process.
#[must_use]
pub fn process_hostname() -> &'static str {
    PROCESS_HOSTNAME.get_or_init(get_hostname)
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        // Non-UTF8 hostnames are ignored
        Ok(hostname) => hostname
            .to_str()
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!("Failed to get system hostname: {}", e);
            None
        }
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    env::var("COMPUTERNAME").ok().filter(|name| !name.is_empty())
}
