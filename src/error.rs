//! Error type for the soffice-convert library.
//!
//! Every failure of a conversion, whichever stage it happens in, is reported
//! as one [`ConvertError`]. There are no partial results: either the caller
//! gets the converted document or an error describing the first thing that
//! went wrong. Scratch-directory cleanup problems are never surfaced here;
//! they are logged and swallowed so they cannot mask the primary failure.

use soffice_locate::{LocateError, Platform};
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the soffice-convert library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source document is missing, unreadable or has no extension.
    #[error("Invalid input '{path}': {reason}")]
    InvalidInputPath { path: PathBuf, reason: String },

    /// The request itself is malformed (empty format, bad filter, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Engine discovery ──────────────────────────────────────────────────
    /// No LibreOffice executable could be found.
    #[error(
        "LibreOffice binary not found for {platform}.\n\
Tried: {}\n\
Install LibreOffice or set SOFFICE_PATH=/path/to/soffice.",
        display_candidates(.candidates)
    )]
    BinaryNotFound {
        platform: Platform,
        candidates: Vec<PathBuf>,
    },

    // ── Scratch workspace ─────────────────────────────────────────────────
    /// Could not create a scratch directory or stage the input into it.
    #[error("Failed to stage input in '{path}': {source}")]
    StagingFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Engine run ────────────────────────────────────────────────────────
    /// The engine could not be launched or exited unsuccessfully.
    #[error("LibreOffice '{binary}' failed: {reason}")]
    SubprocessFailure { binary: PathBuf, reason: String },

    /// The engine exited cleanly but produced no output file.
    #[error(
        "Converted file not found at '{expected}'\n\
Check that the target format is supported for this input type."
    )]
    OutputMissing { expected: PathBuf },

    // ── Output ────────────────────────────────────────────────────────────
    /// The converted file could not be copied to its destination or read.
    #[error("Failed to deliver converted file to '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn display_candidates(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no known install locations for this platform)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<LocateError> for ConvertError {
    fn from(e: LocateError) -> Self {
        match e {
            LocateError::NotFound {
                platform,
                candidates,
            } => ConvertError::BinaryNotFound {
                platform,
                candidates,
            },
        }
    }
}
