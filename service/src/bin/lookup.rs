#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout, clippy::print_stderr)]

//! Look up a document in the signature ledger from the command line.
//!
//! Uses the same configuration sources as the server (`config.yaml`, `DV_*`).
//! Exits with status 1 when the document is not recorded and status 2 when
//! the ledger cannot be read. Configuration errors exit through `anyhow`.

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use docverify::{
    config::Config,
    ledger::LedgerHandle,
    page::DocumentView,
    verify::{verify, VerificationResult},
};
use dv_qrcode::{make_code_image, verification_url};

const EXIT_NOT_FOUND: u8 = 1;
const EXIT_LEDGER_UNAVAILABLE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "lookup", about = "Verify a document against the signature ledger")]
struct Args {
    /// Document identifier to look up (exact match).
    #[arg(long)]
    doc: String,

    /// Write the verification QR code PNG to this path when the document is found.
    #[arg(long)]
    qr_out: Option<PathBuf>,

    /// Configuration file (defaults to ./config.yaml).
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = Config::load_from(&args.config).map_err(|e| anyhow::anyhow!("{e}"))?;
    let key = config.ledger.service_account()?;
    let ledger = LedgerHandle::from_config(config.ledger.clone(), key);

    let rows = match ledger.fetch_rows().await {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("The signature ledger could not be read: {err}");
            return Ok(ExitCode::from(EXIT_LEDGER_UNAVAILABLE));
        }
    };

    let row = match verify(&args.doc, &rows) {
        VerificationResult::Found(row) => row,
        VerificationResult::NotFound => {
            println!("Document {} not found in the ledger.", args.doc);
            return Ok(ExitCode::from(EXIT_NOT_FOUND));
        }
    };

    let view = DocumentView::from_row(&row);
    let url = verification_url(&config.site.base_url, &view.document_id);

    println!("Document confirmed in the signature ledger");
    println!("  ID:        {}", view.document_id);
    println!("  Signer:    {}", view.signer);
    println!("  Date:      {}", view.signed_at);
    println!("  SHA-256:   {}", view.hash);
    println!("  Verify at: {url}");
    println!("Electronic signature:");
    println!(
        "{}",
        view.signature
            .as_deref()
            .unwrap_or(docverify::page::PLACEHOLDER)
    );

    if let Some(path) = args.qr_out {
        let png = make_code_image(&url)?;
        std::fs::write(&path, png)
            .with_context(|| format!("writing QR code to {}", path.display()))?;
        println!("QR code written to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}
