//! Result types returned by a successful conversion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The converted document, in the form the request asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedDocument {
    /// The converted file was copied here.
    File(PathBuf),
    /// The converted file's contents.
    Bytes(Vec<u8>),
}

impl ConvertedDocument {
    /// The destination path, if the document was written to disk.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConvertedDocument::File(p) => Some(p),
            ConvertedDocument::Bytes(_) => None,
        }
    }

    /// The document bytes, if the document was returned in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            ConvertedDocument::File(_) => None,
            ConvertedDocument::Bytes(b) => Some(b),
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ConvertedDocument::File(_) => None,
            ConvertedDocument::Bytes(b) => Some(b),
        }
    }
}

/// Facts about one finished conversion.
///
/// `staging_dir` and `profile_dir` name scratch directories that have already
/// been removed by the time the caller sees this; they are kept so runs can be
/// told apart in logs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// The `soffice` executable that ran.
    pub engine: PathBuf,
    /// Target format token.
    pub format: String,
    /// Filter name, if one was requested.
    pub filter: Option<String>,
    /// Per-run staging directory (removed).
    pub staging_dir: PathBuf,
    /// Per-run engine profile directory (removed).
    pub profile_dir: PathBuf,
    /// Size of the converted document in bytes.
    pub output_bytes: u64,
    /// Where the document was written, if it was written to disk.
    pub output_path: Option<PathBuf>,
    /// Time spent inside the engine process.
    pub engine_duration_ms: u64,
    /// Wall-clock time of the whole conversion.
    pub total_duration_ms: u64,
}

/// Everything returned by [`crate::convert::convert`].
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub document: ConvertedDocument,
    pub stats: ConversionStats,
}
