//! Common test utilities for integration tests.
//!
//! This module provides:
//!
//! - [`app_builder::TestAppBuilder`] - Build test Axum apps that mirror main.rs wiring
//! - [`http_mock::MockHttpServer`] - Stubbed Sheets and token endpoints
//! - Fixtures: a throwaway service-account key and ledger rows
//! - QR helpers to read the verification code back out of a rendered page

#![allow(dead_code)]

pub mod app_builder;
pub mod http_mock;

use base64::{engine::general_purpose::STANDARD, Engine};
use docverify::config::{Credential, LedgerConfig, ServiceAccountKey};
use docverify::ledger::LedgerRow;

/// Throwaway RSA key generated for tests only.
pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../fixtures/service_account.json");

pub const BASE_URL: &str = "https://verify.example.com";

/// Fixture key with its token endpoint pointed at `token_uri`.
pub fn service_account_key(token_uri: &str) -> ServiceAccountKey {
    let mut key = Credential::Raw(SERVICE_ACCOUNT_JSON.to_string())
        .normalize()
        .expect("fixture key normalizes");
    key.token_uri = token_uri.to_string();
    key
}

/// Ledger settings aimed at a stub server.
pub fn ledger_config(api_base_url: &str) -> LedgerConfig {
    LedgerConfig {
        spreadsheet_id: "sheet-123".into(),
        sheet_range: "Ledger!A:E".into(),
        credentials: Some(Credential::Raw(SERVICE_ACCOUNT_JSON.to_string())),
        api_base_url: api_base_url.to_string(),
        timeout_secs: None,
    }
}

pub fn row(cells: &[&str]) -> LedgerRow {
    cells.iter().copied().collect()
}

/// A small ledger containing `abc-123` as its second row.
pub fn sample_rows() -> Vec<LedgerRow> {
    vec![
        row(&["doc-1", "aaaa", "Alice", "2023-12-31", "sig-1"]),
        row(&["abc-123", "deadbeef", "Jane Doe", "2024-01-01", "sig-blob"]),
        row(&["doc-3", "cccc", "Carol", "2024-03-03"]),
    ]
}

/// Pull the inline PNG out of a rendered verification page.
pub fn extract_code_png(html: &str) -> Option<Vec<u8>> {
    let start = html.find("data:image/png;base64,")? + "data:image/png;base64,".len();
    let end = start + html[start..].find('"')?;
    STANDARD.decode(&html[start..end]).ok()
}

/// Decode the single QR symbol in `png`.
pub fn decode_qr(png: &[u8]) -> String {
    let luma = image::load_from_memory(png)
        .expect("valid png")
        .to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        luma.width() as usize,
        luma.height() as usize,
        |x, y| luma.get_pixel(x as u32, y as u32).0[0],
    );
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "expected exactly one QR symbol");
    grids[0].decode().expect("decodable symbol").1
}
