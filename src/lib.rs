//! # soffice-convert
//!
//! Convert office documents between formats by driving a headless
//! LibreOffice (`soffice`) as a subprocess.
//!
//! The library does no format work itself. It finds the `soffice` binary,
//! stages the input in a private scratch directory, runs
//! `soffice --headless --convert-to <format>`, hands back the result and
//! removes every scratch directory it created.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Resolve   validate input, locate soffice (nothing on disk yet)
//!  ├─ 2. Stage     fresh staging + profile dirs, copy as source.<ext>
//!  ├─ 3. Convert   soffice -env:UserInstallation=… --headless --convert-to …
//!  ├─ 4. Retrieve  copy source.<format> to the destination, or read bytes
//!  └─ 5. Clean up  remove both scratch dirs on every path
//! ```
//!
//! Every conversion gets its own LibreOffice profile directory, so any
//! number of conversions can run at the same time.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use soffice_convert::{convert, ConversionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::builder("hello.docx", "pdf")
//!         .output_path("hello.pdf")
//!         .build()?;
//!     let output = convert(&request).await?;
//!     eprintln!("{} bytes via {}", output.stats.output_bytes, output.stats.engine.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `soffice-convert` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Finding LibreOffice
//!
//! `SOFFICE_PATH` wins when it points to an existing file. Otherwise the
//! usual install locations are tried in order; see [`soffice_locate`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionRequest, ConversionRequestBuilder, OutputTarget, SourceDocument};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_bytes, convert_to_file, Stage,
};
pub use error::ConvertError;
pub use output::{ConversionOutput, ConversionStats, ConvertedDocument};
pub use soffice_locate::{self, Platform};
