// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shipping records to a document-indexing service.
//!
//! ```text
//!   LogRecord ──> IndexTransport ──> IndexClient ──> POST /{index}/{Level}?refresh=true
//! ```
//!
//! [`IndexTransport`] owns the shaping (index name, type discriminator, refresh
//! policy) and [`IndexClient`] owns the wire call. [`ElasticsearchClient`] is
//! the `reqwest` implementation; tests substitute their own client.
//!
//! Index failures never reach the logger: they are reported with
//! `tracing::error!` and the record is dropped.
//!
//! The blocking `reqwest` client drives its own runtime and panics when it is
//! entered from inside a tokio runtime. Inside a runtime, client construction
//! and every request therefore run on a scoped thread.

use crate::config::{validate_index_name, ElasticsearchConfig, Refresh};
use crate::diagnostics;
use crate::error::{ConfigError, ShipError};
use crate::record::LogRecord;
use crate::transport::Transport;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::thread;
use tracing::{debug, error};

/// Runs `f` where the blocking client is allowed to block.
fn off_runtime<R: Send>(f: impl FnOnce() -> R + Send) -> thread::Result<R> {
    if tokio::runtime::Handle::try_current().is_err() {
        return Ok(f());
    }
    thread::scope(|scope| scope.spawn(f).join())
}

/// One "index this document" call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexRequest<'a> {
    /// Target index (collection) name
    pub index: &'a str,
    /// Type discriminator, the record's level name
    pub doc_type: &'a str,
    /// JSON document body
    pub body: &'a serde_json::Value,
    pub refresh: Refresh,
}

/// Wire client able to index a single JSON document.
///
/// Implementations must be safe to call from several threads at once.
pub trait IndexClient: Send + Sync {
    fn index(&self, request: &IndexRequest<'_>) -> Result<(), ShipError>;
}

/// Elasticsearch client over blocking `reqwest`.
#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl ElasticsearchClient {
    /// Builds a client for the cluster in `config`.
    ///
    /// Fails if the configuration is invalid (e.g. a malformed URL) or the
    /// HTTP client cannot be created. Safe to call from inside a tokio runtime.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let timeout = config.timeout;
        let client = off_runtime(move || {
            Client::builder()
                .timeout(timeout)
                .default_headers(headers)
                .build()
        })
        .map_err(|_| ConfigError::ClientThread)?
        .map_err(ConfigError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn document_url(&self, request: &IndexRequest<'_>) -> String {
        format!("{}/{}/{}", self.base_url, request.index, request.doc_type)
    }

    fn send(&self, request: &IndexRequest<'_>) -> Result<(), ShipError> {
        let mut builder = self
            .client
            .post(self.document_url(request))
            .query(&[("refresh", request.refresh.as_str())])
            .json(request.body);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_ref());
        }

        let resp = builder.send()?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        Err(ShipError::Status {
            status: status.as_u16(),
            body: resp.text().unwrap_or_default(),
        })
    }
}

impl IndexClient for ElasticsearchClient {
    fn index(&self, request: &IndexRequest<'_>) -> Result<(), ShipError> {
        off_runtime(|| self.send(request)).map_err(|_| ShipError::ClientThread)?
    }
}

/// Ships each record as a document into one index.
///
/// The record's level is used as the document type, and every request asks
/// for the configured [`Refresh`] policy (immediate visibility by default).
#[derive(Debug)]
pub struct IndexTransport<C = ElasticsearchClient> {
    client: C,
    index: String,
    refresh: Refresh,
}

impl IndexTransport<ElasticsearchClient> {
    /// Transport backed by an [`ElasticsearchClient`] built from `config`.
    pub fn elasticsearch(config: &ElasticsearchConfig) -> Result<Self, ConfigError> {
        let client = ElasticsearchClient::new(config)?;
        Ok(Self::new(client, config.index.clone())?.with_refresh(config.refresh))
    }
}

impl<C: IndexClient> IndexTransport<C> {
    /// Transport writing into `index` through `client`.
    ///
    /// Fails if `index` is not a valid index name. The name becomes a path
    /// segment of every request, so it is checked here rather than per record.
    pub fn new(client: C, index: impl Into<String>) -> Result<Self, ConfigError> {
        let index = index.into();
        validate_index_name(&index)?;
        Ok(Self {
            client,
            index,
            refresh: Refresh::default(),
        })
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: Refresh) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[must_use]
    pub fn refresh(&self) -> Refresh {
        self.refresh
    }
}

impl<C: IndexClient> Transport for IndexTransport<C> {
    fn ship(&self, record: &LogRecord) -> Result<(), ShipError> {
        let body = match record.to_json_value() {
            Ok(body) => body,
            Err(e) => {
                error!(index = %self.index, "Failed to serialize log record, dropping it: {e}");
                diagnostics::stderr_fallback(format_args!(
                    "failed to serialize log record for index '{}': {e}",
                    self.index
                ));
                return Ok(());
            }
        };

        let request = IndexRequest {
            index: &self.index,
            doc_type: record.level().as_str(),
            body: &body,
            refresh: self.refresh,
        };

        match self.client.index(&request) {
            Ok(()) => debug!(index = %self.index, level = %record.level(), "Indexed log record"),
            Err(e) => {
                error!(
                    index = %self.index,
                    level = %record.level(),
                    "Failed to index log record: {e}"
                );
                diagnostics::stderr_fallback(format_args!(
                    "failed to index {} record into '{}': {e}",
                    record.level(),
                    self.index
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;
    use serde_json::json;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq)]
    struct Captured {
        index: String,
        doc_type: String,
        body: serde_json::Value,
        refresh: Refresh,
    }

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<Captured>>,
        fail_with_status: Option<u16>,
    }

    impl IndexClient for RecordingClient {
        fn index(&self, request: &IndexRequest<'_>) -> Result<(), ShipError> {
            self.requests.lock().unwrap().push(Captured {
                index: request.index.to_string(),
                doc_type: request.doc_type.to_string(),
                body: request.body.clone(),
                refresh: request.refresh,
            });
            match self.fail_with_status {
                Some(status) => Err(ShipError::Status {
                    status,
                    body: "cluster unavailable".to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    fn record(level: Level) -> LogRecord {
        LogRecord::with_timestamp(level, "payment failed", "api-1", Some("billing".into()), 7)
    }

    #[test]
    fn test_ship_builds_request_from_record() {
        let transport = IndexTransport::new(RecordingClient::default(), "app-logs").unwrap();
        transport.ship(&record(Level::Critical)).unwrap();

        let requests = transport.client().requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![Captured {
                index: "app-logs".to_string(),
                doc_type: "Critical".to_string(),
                body: json!({
                    "level": "Critical",
                    "message": "payment failed",
                    "timestamp": 7,
                    "host": "api-1",
                    "context": "billing",
                }),
                refresh: Refresh::True,
            }]
        );
    }

    #[test]
    fn test_level_is_type_discriminator() {
        let transport = IndexTransport::new(RecordingClient::default(), "logs").unwrap();
        for level in Level::ALL {
            transport.ship(&record(level)).unwrap();
        }

        let requests = transport.client().requests.lock().unwrap();
        let types: Vec<&str> = requests.iter().map(|r| r.doc_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["Emergency", "Alert", "Critical", "Error", "Warning", "Notice", "Info", "Debug"]
        );
    }

    #[test]
    fn test_refresh_policy_is_configurable() {
        let transport = IndexTransport::new(RecordingClient::default(), "logs")
            .unwrap()
            .with_refresh(Refresh::False);
        assert_eq!(transport.refresh(), Refresh::False);
        transport.ship(&record(Level::Info)).unwrap();

        let requests = transport.client().requests.lock().unwrap();
        assert_eq!(requests[0].refresh, Refresh::False);
    }

    #[test]
    #[traced_test]
    fn test_client_error_is_reported_not_returned() {
        let client = RecordingClient {
            fail_with_status: Some(503),
            ..Default::default()
        };
        let transport = IndexTransport::new(client, "logs").unwrap();

        assert!(transport.ship(&record(Level::Error)).is_ok());
        assert!(logs_contain("Failed to index log record"));
        assert!(logs_contain("503"));
    }

    #[test]
    fn test_elasticsearch_rejects_malformed_endpoint() {
        let config = ElasticsearchConfig::new("not a url", "logs");
        assert!(matches!(
            IndexTransport::elasticsearch(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_elasticsearch_client_trims_trailing_slash() {
        let config = ElasticsearchConfig::new("http://localhost:9200/", "logs");
        let client = ElasticsearchClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");

        let body = json!({});
        let request = IndexRequest {
            index: "logs",
            doc_type: "Info",
            body: &body,
            refresh: Refresh::True,
        };
        assert_eq!(client.document_url(&request), "http://localhost:9200/logs/Info");
    }

    #[test]
    fn test_elasticsearch_transport_takes_index_and_refresh_from_config() {
        let config = ElasticsearchConfig {
            refresh: Refresh::WaitFor,
            ..ElasticsearchConfig::new("http://localhost:9200", "audit")
        };
        let transport = IndexTransport::elasticsearch(&config).unwrap();
        assert_eq!(transport.index(), "audit");
        assert_eq!(transport.refresh(), Refresh::WaitFor);
    }

    #[test]
    fn test_new_rejects_index_that_would_change_the_path() {
        for index in ["other/_doc", "Logs", "", "_hidden", "a?b", "with space"] {
            assert!(
                matches!(
                    IndexTransport::new(RecordingClient::default(), index),
                    Err(ConfigError::InvalidConfig(_))
                ),
                "'{index}' should be rejected"
            );
        }
    }

    #[test]
    fn test_off_runtime_runs_inline_without_runtime() {
        let caller = thread::current().id();
        assert_eq!(off_runtime(|| thread::current().id()).unwrap(), caller);
    }

    #[test]
    fn test_off_runtime_leaves_runtime_thread() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let (caller, worker) = runtime.block_on(async {
            (
                thread::current().id(),
                off_runtime(|| thread::current().id()).unwrap(),
            )
        });
        assert_ne!(caller, worker);
    }

    #[test]
    fn test_client_builds_inside_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let config = ElasticsearchConfig::new("http://localhost:9200", "logs");
        let transport = runtime.block_on(async { IndexTransport::elasticsearch(&config) });
        assert!(transport.is_ok());
    }
}
