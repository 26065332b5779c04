//! End-to-end tests against a real LibreOffice installation.
//!
//! Gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested. The engine is found the normal way
//! (`SOFFICE_PATH`, then the default install locations).
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

use soffice_convert::{
    convert, convert_from_bytes, convert_to_bytes, convert_to_file, soffice_locate,
    ConversionRequest,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip unless E2E_ENABLED is set *and* LibreOffice can be located.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match soffice_locate::locate() {
            Ok(p) => p,
            Err(e) => {
                println!("SKIP: {e}");
                return;
            }
        }
    }};
}

fn write_text(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let p = dir.path().join(name);
    std::fs::write(&p, body).unwrap();
    p
}

// ── Conversions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_txt_to_pdf_file() {
    let engine = e2e_skip_unless_ready!();
    println!("Using {}", engine.display());

    let dir = tempfile::tempdir().unwrap();
    let input = write_text(&dir, "hello.txt", "Hello from soffice-convert\n");
    let dest = dir.path().join("hello.pdf");

    let written = convert_to_file(&input, "pdf", &dest)
        .await
        .expect("txt → pdf should succeed");
    assert_eq!(written, dest);

    let bytes = std::fs::read(&dest).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "not a PDF: {:?}", &bytes[..8.min(bytes.len())]);
}

#[tokio::test]
async fn test_txt_to_docx_bytes() {
    let _engine = e2e_skip_unless_ready!();

    let dir = tempfile::tempdir().unwrap();
    let input = write_text(&dir, "hello.txt", "Hello\n");

    let bytes = convert_to_bytes(&input, "docx").await.unwrap();
    // docx is a zip container
    assert!(bytes.starts_with(b"PK"), "not a zip");
}

#[tokio::test]
async fn test_from_bytes_round_trip() {
    let _engine = e2e_skip_unless_ready!();

    let out = convert_from_bytes(b"Round trip\n".to_vec(), "txt", "odt")
        .await
        .unwrap();
    assert!(!out.is_empty());

    let source = soffice_convert::SourceDocument::Bytes {
        data: out,
        extension: "odt".into(),
    };
    let request = ConversionRequest::builder(source, "txt").build().unwrap();
    let output = convert(&request).await.unwrap();
    let text = String::from_utf8_lossy(output.document.bytes().unwrap()).to_string();
    assert!(text.contains("Round trip"), "got: {text:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_conversions() {
    let _engine = e2e_skip_unless_ready!();

    let dir = tempfile::tempdir().unwrap();
    let a = write_text(&dir, "a.txt", "alpha\n");
    let b = write_text(&dir, "b.txt", "bravo\n");

    let ra = ConversionRequest::builder(a, "pdf").build().unwrap();
    let rb = ConversionRequest::builder(b, "pdf").build().unwrap();
    let (oa, ob) = tokio::join!(convert(&ra), convert(&rb));
    let (oa, ob) = (oa.unwrap(), ob.unwrap());

    assert!(oa.document.bytes().unwrap().starts_with(b"%PDF"));
    assert!(ob.document.bytes().unwrap().starts_with(b"%PDF"));
    assert_ne!(oa.stats.profile_dir, ob.stats.profile_dir);
}
