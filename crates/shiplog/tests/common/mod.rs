// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Test doubles shared by the integration tests

use shiplog::{LogRecord, ShipError, Transport};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport that rejects every record and counts the attempts
#[derive(Default)]
pub struct FailingTransport {
    attempts: AtomicUsize,
}

#[allow(dead_code)]
impl FailingTransport {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Transport for FailingTransport {
    fn ship(&self, _record: &LogRecord) -> Result<(), ShipError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::Other, "delivery always fails").into())
    }
}

/// Writer whose every write fails, like a closed pipe
#[allow(dead_code)]
pub struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed pipe"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
