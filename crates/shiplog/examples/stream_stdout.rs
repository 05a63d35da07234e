// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Writes a few records to stdout as newline-delimited JSON.
//!
//! ```text
//! cargo run -p shiplog --example stream_stdout
//! ```

use shiplog::{diagnostics, Logger, StreamTransport};

fn main() {
    diagnostics::init_from_env();

    let logger = Logger::new(StreamTransport::stdout());
    logger.notice("service starting");
    logger.set_context("startup");
    logger.info("configuration loaded");
    logger.clear_context();
    logger.warning("running without an index backend");
}
