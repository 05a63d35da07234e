// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ShipError;
use crate::record::LogRecord;
use crate::transport::Transport;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Writes each record as one line of JSON to a byte sink.
///
/// The whole line, including the trailing newline, is written while the sink
/// is locked, so concurrent callers never interleave partial lines. Write
/// errors are returned as-is and not retried.
#[derive(Debug)]
pub struct StreamTransport<W> {
    sink: Mutex<W>,
}

impl<W: Write + Send> StreamTransport<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Runs `f` with exclusive access to the sink.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut W) -> R) -> R {
        f(&mut self.lock())
    }

    /// Consumes the transport and returns the sink.
    pub fn into_inner(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // Lines are written in one call, so a poisoned sink holds no partial record.
    fn lock(&self) -> MutexGuard<'_, W> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StreamTransport<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StreamTransport<io::Stderr> {
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> Transport for StreamTransport<W> {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut sink = self.lock();
        sink.write_all(&line)?;
        sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;
    use std::sync::Arc;
    use std::thread;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(message: &str, context: Option<&str>) -> LogRecord {
        LogRecord::with_timestamp(
            Level::Notice,
            message,
            "stream-host",
            context.map(str::to_string),
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_ship_writes_one_json_line() {
        let transport = StreamTransport::new(Vec::new());
        transport.ship(&record("WriterMessage", None)).unwrap();

        let output = String::from_utf8(transport.into_inner()).unwrap();
        assert_eq!(
            output,
            "{\"level\":\"Notice\",\"message\":\"WriterMessage\",\"timestamp\":1700000000000,\"host\":\"stream-host\"}\n"
        );
    }

    #[test]
    fn test_each_ship_appends_a_line() {
        let transport = StreamTransport::new(Vec::new());
        transport.ship(&record("one", None)).unwrap();
        transport.ship(&record("two", Some("ctx"))).unwrap();

        let lines = transport.with_sink(|buf| {
            String::from_utf8(buf.clone())
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        assert_eq!(lines.len(), 2);
        let second: LogRecord = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second, record("two", Some("ctx")));
    }

    #[test]
    fn test_write_error_is_returned() {
        let transport = StreamTransport::new(BrokenPipe);
        let err = transport.ship(&record("lost", None)).unwrap_err();
        assert!(matches!(err, ShipError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_concurrent_ships_do_not_interleave() {
        let transport = Arc::new(StreamTransport::new(Vec::new()));
        let long_message = "x".repeat(4096);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let transport = Arc::clone(&transport);
                let message = long_message.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        transport.ship(&record(&message, None)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let output = transport.with_sink(|buf| String::from_utf8(buf.clone()).unwrap());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            let parsed: LogRecord = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.message(), long_message);
        }
    }
}
