//! Test app builder that mirrors main.rs wiring with an injectable ledger.
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_app() {
//!     let (app, ledger) = TestAppBuilder::with_rows(sample_rows()).build_with_mock();
//!     // Use app.oneshot(...) to send requests, ledger.fetch_calls() to count reads
//! }
//! ```

use std::sync::Arc;

use axum::Router;
use docverify::{
    config::SecurityHeadersConfig,
    http::{router, AppState},
    ledger::{mock::MockLedgerClient, LedgerHandle, LedgerRow},
};

use super::BASE_URL;

/// Builder for test applications that mirrors main.rs wiring.
pub struct TestAppBuilder {
    /// Ledger handle; defaults to an empty mock ledger
    ledger: Option<LedgerHandle>,
    /// Mock kept for call-count assertions
    mock: Option<Arc<MockLedgerClient>>,
    /// Public base URL used in verification codes
    base_url: String,
    /// Security headers config (disabled unless set)
    security_headers: SecurityHeadersConfig,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    /// Create a builder with an empty mock ledger and security headers disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ledger: None,
            mock: None,
            base_url: BASE_URL.to_string(),
            security_headers: SecurityHeadersConfig {
                enabled: false,
                ..SecurityHeadersConfig::default()
            },
        }
    }

    /// App whose ledger returns `rows` on the first fetch.
    #[must_use]
    pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
        Self::new().with_mock(MockLedgerClient::with_rows(rows))
    }

    /// Use `mock` as the ledger client.
    #[must_use]
    pub fn with_mock(mut self, mock: MockLedgerClient) -> Self {
        let mock = Arc::new(mock);
        self.ledger = Some(LedgerHandle::ready(mock.clone()));
        self.mock = Some(mock);
        self
    }

    /// Use an arbitrary ledger handle (real client, failing factory, ...).
    #[must_use]
    pub fn with_ledger(mut self, ledger: LedgerHandle) -> Self {
        self.ledger = Some(ledger);
        self.mock = None;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Enable security headers with default configuration.
    #[must_use]
    pub fn with_security_headers_default(mut self) -> Self {
        self.security_headers = SecurityHeadersConfig::default();
        self
    }

    /// Build the router and return the mock ledger alongside it.
    #[must_use]
    pub fn build_with_mock(mut self) -> (Router, Arc<MockLedgerClient>) {
        if self.ledger.is_none() {
            self = self.with_mock(MockLedgerClient::new());
        }
        let mock = self
            .mock
            .clone()
            .expect("build_with_mock requires a mock ledger");
        (self.build(), mock)
    }

    /// Build the Axum router through the production `router` function.
    #[must_use]
    pub fn build(self) -> Router {
        let ledger = self
            .ledger
            .unwrap_or_else(|| LedgerHandle::ready(Arc::new(MockLedgerClient::new())));

        let state = AppState {
            ledger,
            base_url: self.base_url,
        };

        router(state, &self.security_headers)
    }
}
