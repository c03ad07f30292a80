//! Verification codes for docverify
//!
//! A verification code is a QR symbol that encodes the link back to the
//! verification page of a confirmed document. Rendering is a pure function of
//! the URL string: the same input always produces the same PNG bytes.

use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Luma};
use qrcode::{types::QrError, EcLevel, QrCode};

/// Pixel size of one QR module.
pub const MODULE_SIZE: u32 = 10;

/// Query parameter carrying the document identifier.
pub const DOC_PARAM: &str = "doc";

/// Error type for verification code rendering failures
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    /// The URL does not fit in a QR symbol at the chosen error correction level
    #[error("verification URL cannot be encoded as a QR code: {0}")]
    Payload(#[from] QrError),

    /// The rendered symbol could not be written as PNG
    #[error("failed to encode verification code as PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Build the verification link for a document.
///
/// The link is `base_url + "/?doc=" + document_id` with no escaping, so the
/// identifier scanned from the code is byte-for-byte the ledger's identifier.
/// `base_url` is expected without a trailing slash.
#[must_use]
pub fn verification_url(base_url: &str, document_id: &str) -> String {
    format!("{base_url}/?{DOC_PARAM}={document_id}")
}

/// Render `verification_url` as a QR code and return the PNG bytes.
///
/// Uses error correction level M, 10px modules and a 4-module quiet zone.
///
/// # Errors
/// Returns [`CodeError::Payload`] if the URL is too long for any QR version,
/// or [`CodeError::Png`] if PNG encoding fails.
pub fn make_code_image(verification_url: &str) -> Result<Vec<u8>, CodeError> {
    let code = QrCode::with_error_correction_level(verification_url.as_bytes(), EcLevel::M)?;

    let symbol = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .build();

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        symbol.as_raw(),
        symbol.width(),
        symbol.height(),
        ExtendedColorType::L8,
    )?;

    Ok(png)
}
