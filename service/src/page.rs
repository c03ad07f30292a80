//! HTML views of the verification page.
//!
//! Every view is a complete document rendered from owned data; nothing is
//! streamed, so a failure never leaves a half-written page behind.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::ledger::LedgerRow;

/// Shown in place of a field the ledger row does not carry.
pub const PLACEHOLDER: &str = "\u{2014}";

const TITLE: &str = "Document verification";

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:700px;padding:0 1rem}\
h1,h2{text-align:center}\
.ok{color:#1b5e20}.fail{color:#b71c1c}\
pre{background:#f5f5f5;padding:1rem;overflow-x:auto;white-space:pre-wrap;word-break:break-all}\
figure{text-align:center}";

/// Display fields of a confirmed ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub document_id: String,
    pub signer: String,
    pub signed_at: String,
    pub hash: String,
    pub signature: Option<String>,
}

impl DocumentView {
    /// Copy the row's fields, substituting [`PLACEHOLDER`] for missing ones.
    #[must_use]
    pub fn from_row(row: &LedgerRow) -> Self {
        let field = |value: Option<&str>| value.unwrap_or(PLACEHOLDER).to_string();
        Self {
            document_id: field(row.document_id()),
            signer: field(row.signer()),
            signed_at: field(row.signed_at()),
            hash: field(row.hash()),
            signature: row.signature().map(str::to_string),
        }
    }
}

/// A rendered response of the verification page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// No document requested; explains how to use the page.
    Instructions { example_url: String },
    /// The requested document is recorded in the ledger.
    Verified {
        document: DocumentView,
        verification_url: String,
        code_png: Vec<u8>,
    },
    /// The requested document is not in the ledger.
    NotFound { requested_id: String },
    /// The ledger could not be read.
    LedgerUnavailable { requested_id: String, message: String },
    /// The verification code could not be produced.
    CodeFailed { requested_id: String, message: String },
}

impl Page {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Instructions { .. } | Self::Verified { .. } => StatusCode::OK,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::LedgerUnavailable { .. } => StatusCode::BAD_GATEWAY,
            Self::CodeFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the full HTML document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut body = String::new();

        match self {
            Self::Instructions { example_url } => {
                body.push_str("<p>Use the link from the document's QR code:</p>");
                body.push_str(&format!(
                    "<pre><code>{}</code></pre>",
                    escape(example_url)
                ));
            }
            Self::Verified {
                document,
                verification_url,
                code_png,
            } => {
                push_checking(&mut body, &document.document_id);
                body.push_str(
                    "<p class=\"ok\" role=\"status\">&#x2705; Document confirmed in the signature ledger</p>",
                );
                body.push_str("<h2>Details</h2><dl>");
                for (label, value, code) in [
                    ("Document ID", &document.document_id, true),
                    ("Signer", &document.signer, false),
                    ("Date", &document.signed_at, false),
                    ("Hash (SHA-256)", &document.hash, true),
                ] {
                    let value = escape(value);
                    if code {
                        body.push_str(&format!(
                            "<dt>{label}</dt><dd><code>{value}</code></dd>"
                        ));
                    } else {
                        body.push_str(&format!("<dt>{label}</dt><dd>{value}</dd>"));
                    }
                }
                body.push_str("</dl>");
                body.push_str(&format!(
                    "<figure><img src=\"data:image/png;base64,{}\" width=\"120\" height=\"120\" alt=\"QR code for {}\">\
                     <figcaption>QR for verification</figcaption></figure>",
                    STANDARD.encode(code_png),
                    escape(verification_url)
                ));
                body.push_str("<hr><h2>Electronic signature</h2>");
                body.push_str(&format!(
                    "<pre><code>{}</code></pre>",
                    escape(document.signature.as_deref().unwrap_or(PLACEHOLDER))
                ));
            }
            Self::NotFound { requested_id } => {
                push_checking(&mut body, requested_id);
                body.push_str(
                    "<p class=\"fail\" role=\"alert\">&#x274C; Document not found in the ledger.</p>",
                );
            }
            Self::LedgerUnavailable {
                requested_id,
                message,
            } => {
                push_checking(&mut body, requested_id);
                body.push_str(&format!(
                    "<p class=\"fail\" role=\"alert\">The signature ledger could not be read: {}</p>\
                     <p>Reload the page to try again.</p>",
                    escape(message)
                ));
            }
            Self::CodeFailed {
                requested_id,
                message,
            } => {
                push_checking(&mut body, requested_id);
                body.push_str(&format!(
                    "<p class=\"fail\" role=\"alert\">The verification code could not be generated: {}</p>",
                    escape(message)
                ));
            }
        }

        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
             <title>{TITLE}</title><style>{STYLE}</style></head>\
             <body><main><h1>&#x1F50D; {TITLE}</h1>{body}</main></body></html>"
        )
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status(), Html(self.render())).into_response()
    }
}

fn push_checking(body: &mut String, requested_id: &str) {
    body.push_str(&format!(
        "<p>Checking document ID: <code>{}</code></p>",
        escape(requested_id)
    ));
}

/// Escape text for HTML element content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
