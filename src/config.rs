//! Request types for a single document conversion.
//!
//! Everything one conversion needs is carried by a [`ConversionRequest`],
//! built via its [`ConversionRequestBuilder`]. The request is plain data: it
//! can be cloned, logged and reused, and it holds no open resources. Scratch
//! directories and the engine process only exist while
//! [`crate::convert::convert`] runs.

use crate::error::ConvertError;
use std::fmt;
use std::path::{Path, PathBuf};

/// A request to convert one document with LibreOffice.
///
/// # Example
/// ```rust
/// use soffice_convert::ConversionRequest;
///
/// let request = ConversionRequest::builder("report.docx", "pdf")
///     .output_path("report.pdf")
///     .filter("writer_pdf_Export")
///     .build()
///     .unwrap();
/// assert_eq!(request.format, "pdf");
/// ```
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// The document to convert.
    pub source: SourceDocument,

    /// Target format token passed to `--convert-to`, e.g. `pdf`, `txt`, `docx`.
    ///
    /// Stored without a leading dot. Also the extension of the file the engine
    /// writes, so it must be a bare token (no separators or whitespace).
    pub format: String,

    /// Where the result goes. Default: [`OutputTarget::Bytes`].
    pub output: OutputTarget,

    /// Optional engine filter name, appended as `<format>:"<filter>"`.
    pub filter: Option<String>,

    /// Log the engine command line and its stdout/stderr at INFO instead of
    /// DEBUG. Default: false.
    pub debug: bool,

    /// Explicit `soffice` executable. Skips discovery when set.
    pub soffice_path: Option<PathBuf>,

    /// Parent directory for the scratch directories. Default: system temp dir.
    pub scratch_root: Option<PathBuf>,
}

impl ConversionRequest {
    /// Create a new builder for converting `source` to `format`.
    pub fn builder(
        source: impl Into<SourceDocument>,
        format: impl Into<String>,
    ) -> ConversionRequestBuilder {
        ConversionRequestBuilder {
            request: ConversionRequest {
                source: source.into(),
                format: format.into(),
                output: OutputTarget::default(),
                filter: None,
                debug: false,
                soffice_path: None,
                scratch_root: None,
            },
        }
    }

    /// The `--convert-to` argument: `format` or `format:"filter"`.
    pub fn convert_to_arg(&self) -> String {
        match &self.filter {
            Some(filter) => format!("{}:\"{}\"", self.format, filter),
            None => self.format.clone(),
        }
    }
}

/// Builder for [`ConversionRequest`].
#[derive(Debug)]
pub struct ConversionRequestBuilder {
    request: ConversionRequest,
}

impl ConversionRequestBuilder {
    pub fn output(mut self, output: OutputTarget) -> Self {
        self.request.output = output;
        self
    }

    /// Copy the converted file to `path`.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.output = OutputTarget::File(path.into());
        self
    }

    /// Return the converted file's bytes instead of writing it anywhere.
    pub fn output_bytes(mut self) -> Self {
        self.request.output = OutputTarget::Bytes;
        self
    }

    pub fn filter(mut self, name: impl Into<String>) -> Self {
        self.request.filter = Some(name.into());
        self
    }

    pub fn debug(mut self, v: bool) -> Self {
        self.request.debug = v;
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.request.soffice_path = Some(path.into());
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request.scratch_root = Some(dir.into());
        self
    }

    /// Build the request, normalising and validating the format and filter.
    pub fn build(mut self) -> Result<ConversionRequest, ConvertError> {
        let format = normalise_format(&self.request.format)?;
        self.request.format = format;

        if let Some(ref filter) = self.request.filter {
            if filter.trim().is_empty() {
                return Err(ConvertError::InvalidConfig(
                    "Filter name must not be empty".into(),
                ));
            }
            if filter.contains('"') {
                return Err(ConvertError::InvalidConfig(format!(
                    "Filter name must not contain quotes, got {filter:?}"
                )));
            }
        }

        if let SourceDocument::Bytes {
            ref mut extension, ..
        } = self.request.source
        {
            let bare = bare_token(extension)
                .ok_or_else(|| {
                    ConvertError::InvalidConfig(format!(
                        "In-memory source needs a bare file extension like \"docx\", got {extension:?}"
                    ))
                })?
                .to_string();
            *extension = bare;
        }

        Ok(self.request)
    }
}

/// Strip one leading '.' and check what remains can serve as a file
/// extension inside the staging directory: non-empty, no second leading dot,
/// no separators or whitespace.
pub(crate) fn bare_token(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let token = trimmed.strip_prefix('.').unwrap_or(trimmed);
    let usable = !token.is_empty()
        && !token.starts_with('.')
        && !token
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace());
    usable.then_some(token)
}

fn normalise_format(raw: &str) -> Result<String, ConvertError> {
    if raw.trim().is_empty() {
        return Err(ConvertError::InvalidConfig(
            "Target format must not be empty".into(),
        ));
    }
    bare_token(raw).map(str::to_string).ok_or_else(|| {
        ConvertError::InvalidConfig(format!(
            "Target format must be a bare token like \"pdf\", got {raw:?}"
        ))
    })
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The document to convert.
#[derive(Clone)]
pub enum SourceDocument {
    /// A file on disk. Its extension tells the engine the input type.
    Path(PathBuf),
    /// An in-memory document. `extension` (e.g. `"docx"`) plays the role of
    /// the file extension.
    Bytes { data: Vec<u8>, extension: String },
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDocument::Path(p) => f.debug_tuple("Path").field(p).finish(),
            SourceDocument::Bytes { data, extension } => f
                .debug_struct("Bytes")
                .field("len", &data.len())
                .field("extension", extension)
                .finish(),
        }
    }
}

impl From<PathBuf> for SourceDocument {
    fn from(p: PathBuf) -> Self {
        SourceDocument::Path(p)
    }
}

impl From<&Path> for SourceDocument {
    fn from(p: &Path) -> Self {
        SourceDocument::Path(p.to_path_buf())
    }
}

impl From<&str> for SourceDocument {
    fn from(p: &str) -> Self {
        SourceDocument::Path(PathBuf::from(p))
    }
}

impl From<String> for SourceDocument {
    fn from(p: String) -> Self {
        SourceDocument::Path(PathBuf::from(p))
    }
}

/// Where the converted document is delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Copy the converted file to this path (parent directories are created).
    File(PathBuf),
    /// Read the converted file into memory. (default)
    #[default]
    Bytes,
}
