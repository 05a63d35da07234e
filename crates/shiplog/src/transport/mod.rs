// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivery backends for log records.
//!
//! # Components
//!
//! - **[`MemoryTransport`]**: keeps every record in memory, indexed from 1, for
//!   inspection in tests
//! - **[`StreamTransport`]**: writes newline-delimited JSON to any `io::Write`
//! - **[`IndexTransport`]**: submits each record as a document to an indexing
//!   service through an [`IndexClient`] (Elasticsearch by default)
//!
//! All transports are synchronous and run on the caller's thread.

use crate::error::ShipError;
use crate::record::LogRecord;
use std::sync::Arc;

mod index;
mod memory;
mod stream;

pub use index::{ElasticsearchClient, IndexClient, IndexRequest, IndexTransport};
pub use memory::MemoryTransport;
pub use stream::StreamTransport;

/// Delivers one [`LogRecord`] somewhere.
///
/// Implementations must be shareable across threads and must not block
/// indefinitely. Errors are returned to the caller of `ship`; the
/// [`crate::Logger`] reports them and continues.
pub trait Transport: Send + Sync {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        (**self).ship(record)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        (**self).ship(record)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        (**self).ship(record)
    }
}
