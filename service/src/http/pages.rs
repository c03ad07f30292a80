//! Verification page handler.

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};
use dv_qrcode::{make_code_image, verification_url, DOC_PARAM};

use super::AppState;
use crate::page::{DocumentView, Page};
use crate::verify::{verify, VerificationResult};

/// Placeholder shown in the example link of the instructions view.
pub const EXAMPLE_DOC_ID: &str = "<document-id>";

/// `GET /?doc=<id>`
///
/// Without a `doc` parameter the instructions view is returned and the ledger
/// is not touched. A present but empty `doc` is looked up like any other id.
/// Repeated `doc` parameters use the first one.
pub async fn verification_page(
    Extension(state): Extension<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let requested = params
        .into_iter()
        .find(|(key, _)| key == DOC_PARAM)
        .map(|(_, value)| value);

    match requested {
        Some(doc_id) => lookup(&state, &doc_id).await.into_response(),
        None => Page::Instructions {
            example_url: verification_url(&state.base_url, EXAMPLE_DOC_ID),
        }
        .into_response(),
    }
}

/// Fetch the ledger once, match `requested_id` and build the resulting view.
pub async fn lookup(state: &AppState, requested_id: &str) -> Page {
    let rows = match state.ledger.fetch_rows().await {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(doc_id = %requested_id, error = %err, "ledger fetch failed");
            return Page::LedgerUnavailable {
                requested_id: requested_id.to_string(),
                message: err.to_string(),
            };
        }
    };

    let row = match verify(requested_id, &rows) {
        VerificationResult::Found(row) => row,
        VerificationResult::NotFound => {
            tracing::info!(doc_id = %requested_id, rows = rows.len(), "document not found");
            return Page::NotFound {
                requested_id: requested_id.to_string(),
            };
        }
    };

    // The code always carries the ledger's own identifier for the row
    let document = DocumentView::from_row(&row);
    let url = verification_url(
        &state.base_url,
        row.document_id().unwrap_or(requested_id),
    );

    match make_code_image(&url) {
        Ok(code_png) => {
            tracing::info!(doc_id = %requested_id, "document verified");
            Page::Verified {
                document,
                verification_url: url,
                code_png,
            }
        }
        Err(err) => {
            tracing::error!(doc_id = %requested_id, error = %err, "verification code failed");
            Page::CodeFailed {
                requested_id: requested_id.to_string(),
                message: err.to_string(),
            }
        }
    }
}
