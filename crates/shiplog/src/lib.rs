// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # shiplog
//!
//! A leveled, structured application logger. Every call on a [`Logger`] produces
//! one [`LogRecord`] and hands it to exactly one [`Transport`]:
//!
//! ```text
//!   logger.info("msg")
//!          │
//!          v
//!   ┌──────────────┐
//!   │  LogRecord   │  (level, message, timestamp, host, context)
//!   └──────┬───────┘
//!          │
//!          v
//!   ┌──────────────┐
//!   │  Transport   │  memory | stream (NDJSON) | index (Elasticsearch)
//!   └──────────────┘
//! ```
//!
//! Delivery is best effort. A transport failure is reported through `tracing`
//! (see [`diagnostics`]) and never returned to the code that logged. Only
//! constructing a transport with a bad configuration fails loudly, with a
//! [`ConfigError`].
//!
//! ```
//! use shiplog::Logger;
//!
//! let logger = Logger::in_memory();
//! logger.set_context("checkout");
//! logger.info("order placed");
//!
//! let record = logger.transport().get(1).unwrap();
//! assert_eq!(record.message(), "order placed");
//! assert_eq!(record.context(), Some("checkout"));
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]
#![deny(unreachable_pub)]

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hostname;
pub mod logger;
pub mod record;
pub mod transport;

pub use config::{ElasticsearchConfig, Refresh};
pub use error::{ConfigError, ShipError};
pub use logger::Logger;
pub use record::{Level, LogRecord};
pub use transport::{
    ElasticsearchClient, IndexClient, IndexRequest, IndexTransport, MemoryTransport,
    StreamTransport, Transport,
};
