//! Input validation: make sure the source document is usable before any
//! scratch directory is created or the engine is looked up.
//!
//! The engine infers the input type from the file extension, so a document
//! without one is rejected here rather than producing a confusing engine
//! failure later.

use crate::config::{bare_token, SourceDocument};
use crate::error::ConvertError;
use std::path::Path;
use tracing::debug;

/// Validate `source` and return the input extension (without the dot).
///
/// For a file on disk: the path must exist, be a regular readable file, and
/// have a non-empty extension after the last `.` of its file name.
/// For in-memory bytes: the declared extension, minus one leading dot, must
/// be usable as a file extension.
pub async fn validate_source(source: &SourceDocument) -> Result<String, ConvertError> {
    match source {
        SourceDocument::Path(path) => validate_local(path).await,
        SourceDocument::Bytes { extension, .. } => bare_token(extension)
            .map(str::to_string)
            .ok_or_else(|| {
                ConvertError::InvalidConfig(format!(
                    "In-memory source needs a bare file extension, got {extension:?}"
                ))
            }),
    }
}

async fn validate_local(path: &Path) -> Result<String, ConvertError> {
    let invalid = |reason: &str| ConvertError::InvalidInputPath {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let meta = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(invalid("permission denied"));
        }
        Err(_) => return Err(invalid("file not found")),
    };
    if !meta.is_file() {
        return Err(invalid("not a regular file"));
    }

    // Check read permission by attempting to open
    if let Err(e) = tokio::fs::File::open(path).await {
        return Err(invalid(&format!("cannot be opened: {e}")));
    }

    let ext = file_extension(path).ok_or_else(|| invalid("file has no valid extension"))?;
    debug!("Resolved local input: {} (.{})", path.display(), ext);
    Ok(ext)
}

/// The substring after the last `.` of the file name, if non-empty.
pub fn file_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Path::new("hello.docx")), Some("docx".into()));
        assert_eq!(
            file_extension(Path::new("/a/b/archive.tar.gz")),
            Some("gz".into())
        );
        assert_eq!(file_extension(Path::new("/a.d/README")), None);
        assert_eq!(file_extension(Path::new("trailing.")), None);
        assert_eq!(file_extension(Path::new("")), None);
    }

    #[tokio::test]
    async fn missing_file_is_invalid_input() {
        let src = SourceDocument::Path(PathBuf::from("/definitely/not/here.docx"));
        let err = validate_source(&src).await.unwrap_err();
        assert!(
            matches!(err, ConvertError::InvalidInputPath { ref reason, .. } if reason == "file not found"),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let src = SourceDocument::Path(dir.path().to_path_buf());
        let err = validate_source(&src).await.unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInputPath { .. }));
    }

    #[tokio::test]
    async fn file_without_extension_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("README");
        std::fs::write(&p, b"hello").unwrap();
        let err = validate_source(&SourceDocument::Path(p)).await.unwrap_err();
        assert!(err.to_string().contains("no valid extension"), "got: {err}");
    }

    #[tokio::test]
    async fn valid_file_yields_extension() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("hello.docx");
        std::fs::write(&p, b"PK").unwrap();
        let ext = validate_source(&SourceDocument::Path(p)).await.unwrap();
        assert_eq!(ext, "docx");
    }

    #[tokio::test]
    async fn bytes_source_uses_declared_extension() {
        let src = SourceDocument::Bytes {
            data: b"hello".to_vec(),
            extension: ".txt".into(),
        };
        assert_eq!(validate_source(&src).await.unwrap(), "txt");
    }

    #[tokio::test]
    async fn bytes_source_with_separator_is_rejected() {
        let src = SourceDocument::Bytes {
            data: b"hello".to_vec(),
            extension: "a/b".into(),
        };
        let err = validate_source(&src).await.unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)), "got: {err}");
    }
}
