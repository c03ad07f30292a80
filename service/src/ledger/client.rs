//! Sheets-backed ledger client.
//!
//! Reads the whole configured range in one `spreadsheets.values.get` call.
//! Nothing is retried and no row contents are kept between calls.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docverify::ledger::{LedgerClient, SheetsLedgerClient, StaticToken};
//!
//! let client = SheetsLedgerClient::new(
//!     "https://sheets.googleapis.com",
//!     "1AbCdEf",
//!     "Ledger!A:E",
//!     Arc::new(StaticToken::new("ya29.token")),
//! );
//! let rows = client.fetch_rows().await?;
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use super::auth::{AccessTokenSource, ServiceAccountTokenSource};
use super::types::{LedgerRow, ValueRange};
use crate::config::{LedgerConfig, ServiceAccountKey};

/// Errors that make the ledger unavailable for the current lookup.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Transport failure (DNS, TLS, connection reset, timeout)
    #[error("ledger request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Token exchange rejected, or the API refused our token
    #[error("ledger authentication failed: {status} - {message}")]
    Auth { status: u16, message: String },

    /// API returned a non-success response
    #[error("ledger API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("ledger returned malformed data: {0}")]
    Malformed(String),

    /// Service-account key could not be used to sign an assertion
    #[error("ledger credentials are unusable: {0}")]
    Credentials(String),
}

/// Trait for reading the signature ledger.
///
/// Use [`SheetsLedgerClient`] for real HTTP calls, or
/// [`mock::MockLedgerClient`] in tests.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch every row of the configured range, in sheet order.
    async fn fetch_rows(&self) -> Result<Vec<LedgerRow>, LedgerError>;
}

/// HTTP implementation of `LedgerClient` against the Google Sheets v4 API.
pub struct SheetsLedgerClient {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl SheetsLedgerClient {
    /// Create a client with a default `reqwest::Client`.
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, spreadsheet_id, range, tokens)
    }

    /// Create a client with a custom `reqwest::Client` (timeouts, proxies, tests).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
            tokens,
        }
    }

    /// Build the production client: one shared HTTP client for both the
    /// token exchange and the values call.
    ///
    /// # Errors
    /// Returns [`LedgerError::Request`] if the HTTP client cannot be built, or
    /// [`LedgerError::Credentials`] if the private key is unusable.
    pub fn from_config(config: &LedgerConfig, key: &ServiceAccountKey) -> Result<Self, LedgerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let tokens = ServiceAccountTokenSource::new(client.clone(), key)?;

        Ok(Self::with_client(
            client,
            config.api_base_url.clone(),
            config.spreadsheet_id.clone(),
            config.sheet_range.clone(),
            Arc::new(tokens),
        ))
    }

    fn values_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}?majorDimension=ROWS",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(&self.range)
        )
    }
}

#[async_trait]
impl LedgerClient for SheetsLedgerClient {
    async fn fetch_rows(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(self.values_url())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LedgerError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let value_range: ValueRange =
            serde_json::from_str(&body).map_err(|e| LedgerError::Malformed(e.to_string()))?;
        let rows = value_range.into_rows()?;

        tracing::debug!(
            spreadsheet_id = %self.spreadsheet_id,
            range = %self.range,
            rows = rows.len(),
            "fetched ledger rows"
        );

        Ok(rows)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use super::{LedgerClient, LedgerError, LedgerRow};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mock implementation of `LedgerClient` for unit tests.
    ///
    /// The configured result is returned once; later calls see an empty
    /// ledger. Verify calls with `fetch_calls()`.
    pub struct MockLedgerClient {
        fetch_result: Mutex<Option<Result<Vec<LedgerRow>, LedgerError>>>,
        fetch_calls: Mutex<usize>,
    }

    impl MockLedgerClient {
        pub fn new() -> Self {
            Self {
                fetch_result: Mutex::new(None),
                fetch_calls: Mutex::new(0),
            }
        }

        /// Mock that returns `rows` on the first fetch.
        pub fn with_rows(rows: Vec<LedgerRow>) -> Self {
            let mock = Self::new();
            mock.set_fetch_result(Ok(rows));
            mock
        }

        /// Mock that fails the first fetch with `error`.
        pub fn failing(error: LedgerError) -> Self {
            let mock = Self::new();
            mock.set_fetch_result(Err(error));
            mock
        }

        /// Set the result for the next `fetch_rows` call.
        pub fn set_fetch_result(&self, result: Result<Vec<LedgerRow>, LedgerError>) {
            *self.fetch_result.lock().unwrap() = Some(result);
        }

        /// Number of `fetch_rows` calls so far.
        pub fn fetch_calls(&self) -> usize {
            *self.fetch_calls.lock().unwrap()
        }
    }

    impl Default for MockLedgerClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl LedgerClient for MockLedgerClient {
        async fn fetch_rows(&self) -> Result<Vec<LedgerRow>, LedgerError> {
            *self.fetch_calls.lock().unwrap() += 1;

            self.fetch_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
