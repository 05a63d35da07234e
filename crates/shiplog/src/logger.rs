// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Leveled logging facade.
//!
//! A [`Logger`] is bound to one [`Transport`] for its whole life. Each leveled
//! method builds a [`LogRecord`] stamped with the creation time, the host and
//! the current context tag, then ships it. Shipping failures are reported via
//! `tracing` and never surface to the caller. Without a global subscriber
//! (see [`crate::diagnostics::init`]) they are written to stderr instead.

use crate::diagnostics;
use crate::hostname::process_hostname;
use crate::record::{Level, LogRecord};
use crate::transport::{MemoryTransport, Transport};
use std::sync::{PoisonError, RwLock};
use tracing::error;

/// Formats log messages and sends them to a transport.
#[derive(Debug)]
pub struct Logger<T> {
    transport: T,
    host: String,
    context: RwLock<Option<String>>,
}

impl Logger<MemoryTransport> {
    /// Logger that keeps every record in memory, for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryTransport::new())
    }
}

impl<T: Transport> Logger<T> {
    /// Logger tagging records with the process hostname.
    pub fn new(transport: T) -> Self {
        Self::with_host(transport, process_hostname())
    }

    /// Logger tagging records with `host`.
    pub fn with_host(transport: T, host: impl Into<String>) -> Self {
        Self {
            transport,
            host: host.into(),
            context: RwLock::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Attaches `tag` to every record created after this call returns.
    pub fn set_context(&self, tag: impl Into<String>) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = Some(tag.into());
    }

    /// Stops attaching a context tag to new records.
    pub fn clear_context(&self) {
        *self.context.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn context(&self) -> Option<String> {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Builds a record at `level` and ships it.
    ///
    /// Never fails: delivery errors go to the diagnostic channel.
    pub fn log(&self, level: Level, message: impl Into<String>) {
        let record = LogRecord::new(level, message, self.host.as_str(), self.context());
        if let Err(e) = self.transport.ship(&record) {
            error!(level = %level, "Failed to ship log record: {e}");
            diagnostics::stderr_fallback(format_args!("failed to ship {level} record: {e}"));
        }
    }

    /// System is unusable.
    pub fn emergency(&self, message: impl Into<String>) {
        self.log(Level::Emergency, message);
    }

    /// Action must be taken immediately.
    pub fn alert(&self, message: impl Into<String>) {
        self.log(Level::Alert, message);
    }

    /// Critical conditions.
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message);
    }

    /// Runtime errors that do not require immediate action.
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Exceptional occurrences that are not errors.
    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    /// Normal but significant events.
    pub fn notice(&self, message: impl Into<String>) {
        self.log(Level::Notice, message);
    }

    /// Interesting events.
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    /// Detailed debug information.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }
}
