//! Signature ledger access.
//!
//! The ledger is a spreadsheet whose rows record signed documents. This
//! module reads it; it never writes.
//!
//! # Architecture
//!
//! - [`LedgerClient`] - Trait defining the single read operation
//! - [`SheetsLedgerClient`] - Google Sheets v4 implementation using reqwest
//! - [`ServiceAccountTokenSource`] - Service-account JWT to bearer token exchange
//! - [`LedgerHandle`] - Process-wide client, built on first lookup
//! - [`mock::MockLedgerClient`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Testing Patterns
//!
//! Handler tests hand a [`mock::MockLedgerClient`] to [`LedgerHandle::ready`].
//! HTTP-level tests point [`SheetsLedgerClient`] at a `wiremock` server.

mod auth;
mod client;
mod types;

use std::sync::Arc;

use tokio::sync::OnceCell;

pub use auth::{AccessTokenSource, ServiceAccountTokenSource, StaticToken, SHEETS_READONLY_SCOPE};
pub use client::{LedgerClient, LedgerError, SheetsLedgerClient};
pub use types::{LedgerRow, ValueRange};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;

use crate::config::{LedgerConfig, ServiceAccountKey};

type ClientFactory = Box<dyn Fn() -> Result<Arc<dyn LedgerClient>, LedgerError> + Send + Sync>;

struct HandleInner {
    client: OnceCell<Arc<dyn LedgerClient>>,
    factory: ClientFactory,
}

/// Lazily constructed, shared ledger client.
///
/// The client (HTTP connection pool and token cache) is created on the first
/// lookup and lives for the rest of the process. A failed construction is not
/// cached, so the next lookup tries again.
#[derive(Clone)]
pub struct LedgerHandle {
    inner: Arc<HandleInner>,
}

impl LedgerHandle {
    /// Handle that builds its client with `factory` on first use.
    pub fn lazy<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn LedgerClient>, LedgerError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(HandleInner {
                client: OnceCell::new(),
                factory: Box::new(factory),
            }),
        }
    }

    /// Handle for the configured spreadsheet.
    #[must_use]
    pub fn from_config(config: LedgerConfig, key: ServiceAccountKey) -> Self {
        Self::lazy(move || {
            tracing::info!(
                spreadsheet_id = %config.spreadsheet_id,
                range = %config.sheet_range,
                "initializing ledger client"
            );
            let client = SheetsLedgerClient::from_config(&config, &key)?;
            Ok(Arc::new(client) as Arc<dyn LedgerClient>)
        })
    }

    /// Handle around an existing client. Still reports uninitialized until first use.
    #[must_use]
    pub fn ready(client: Arc<dyn LedgerClient>) -> Self {
        Self::lazy(move || Ok(Arc::clone(&client)))
    }

    /// Whether the client has been constructed yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.client.initialized()
    }

    /// The shared client, constructing it if this is the first call.
    ///
    /// # Errors
    /// Propagates the factory's error when construction fails.
    pub async fn client(&self) -> Result<Arc<dyn LedgerClient>, LedgerError> {
        self.inner
            .client
            .get_or_try_init(|| async { (self.inner.factory)() })
            .await
            .map(Arc::clone)
    }

    /// Fetch every ledger row through the shared client.
    ///
    /// # Errors
    /// Returns [`LedgerError`] if the client cannot be built or the fetch fails.
    pub async fn fetch_rows(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        self.client().await?.fetch_rows().await
    }
}
