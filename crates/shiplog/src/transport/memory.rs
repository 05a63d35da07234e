// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ShipError;
use crate::record::LogRecord;
use crate::transport::Transport;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Keeps every shipped record in memory, in ship order.
///
/// Records are addressed by a 1-based index: the first record shipped is at
/// index 1, the second at index 2, and so on. Shipping never fails.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    logs: Mutex<Vec<LogRecord>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records shipped so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Record at the 1-based `index`, if one has been shipped.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<LogRecord> {
        let position = index.checked_sub(1)?;
        self.lock().get(position).cloned()
    }

    /// Snapshot of all records in ship order.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Snapshot of `(index, record)` pairs in ship order.
    #[must_use]
    pub fn entries(&self) -> Vec<(usize, LogRecord)> {
        self.lock()
            .iter()
            .enumerate()
            .map(|(position, record)| (position + 1, record.clone()))
            .collect()
    }

    // A poisoned lock still holds a consistent Vec; pushes are never partial.
    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        self.lock().push(record.clone());
        Ok(())
    }
}
