//! Document lookup against fetched ledger rows.

use crate::ledger::LedgerRow;

/// Outcome of looking up a document identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The first row whose `document_id` equals the requested identifier.
    Found(LedgerRow),
    /// No row carries the requested identifier.
    NotFound,
}

impl VerificationResult {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Find the row recorded for `requested_id`.
///
/// Comparison is exact and case-sensitive on the first cell; nothing is
/// trimmed or folded. Rows without cells are skipped. When the ledger holds
/// duplicates the earliest row in fetch order wins.
#[must_use]
pub fn verify(requested_id: &str, rows: &[LedgerRow]) -> VerificationResult {
    rows.iter()
        .filter(|row| !row.is_empty())
        .find(|row| row.document_id() == Some(requested_id))
        .cloned()
        .map_or(VerificationResult::NotFound, VerificationResult::Found)
}
