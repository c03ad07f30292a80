//! Ledger rows and the Sheets values payload they are read from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::LedgerError;

/// One recorded signature: `document_id, hash, signer, signed_at, signature`.
///
/// Rows come straight from the sheet, so any of the trailing cells may be
/// missing. Accessors return `None` rather than failing on short rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerRow(Vec<String>);

impl LedgerRow {
    #[must_use]
    pub const fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    #[must_use]
    pub fn cells(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Ledger key, matched exactly by the verifier.
    #[must_use]
    pub fn document_id(&self) -> Option<&str> {
        self.cell(0)
    }

    /// SHA-256 hex digest of the signed document.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.cell(1)
    }

    #[must_use]
    pub fn signer(&self) -> Option<&str> {
        self.cell(2)
    }

    #[must_use]
    pub fn signed_at(&self) -> Option<&str> {
        self.cell(3)
    }

    /// Electronic signature blob, shown verbatim.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.cell(4)
    }
}

impl From<Vec<String>> for LedgerRow {
    fn from(cells: Vec<String>) -> Self {
        Self(cells)
    }
}

impl<S: Into<String>> FromIterator<S> for LedgerRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Response body of `spreadsheets.values.get`.
///
/// `values` is omitted entirely when the range holds no data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Convert the raw cell grid into ledger rows.
    ///
    /// Strings pass through; numbers and booleans are rendered as text.
    ///
    /// # Errors
    /// Returns [`LedgerError::Malformed`] for null, array or object cells.
    pub fn into_rows(self) -> Result<Vec<LedgerRow>, LedgerError> {
        self.values
            .into_iter()
            .enumerate()
            .map(|(row_index, cells)| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(col_index, cell)| match cell {
                        Value::String(s) => Ok(s),
                        Value::Number(n) => Ok(n.to_string()),
                        Value::Bool(b) => Ok(b.to_string()),
                        other => Err(LedgerError::Malformed(format!(
                            "unexpected cell at row {row_index}, column {col_index}: {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(LedgerRow::new)
            })
            .collect()
    }
}
