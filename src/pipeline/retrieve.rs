//! Result retrieval: pick up `<staging>/source.<format>` and deliver it.

use crate::config::OutputTarget;
use crate::error::ConvertError;
use crate::output::ConvertedDocument;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Deliver the engine's output at `produced` to `target`.
///
/// Returns the document and its size in bytes. A missing `produced` file
/// means the engine exited cleanly without converting anything.
pub async fn retrieve(
    produced: &Path,
    target: &OutputTarget,
) -> Result<(ConvertedDocument, u64), ConvertError> {
    match tokio::fs::metadata(produced).await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            return Err(ConvertError::OutputMissing {
                expected: produced.to_path_buf(),
            })
        }
    }

    match target {
        OutputTarget::File(dest) => {
            let size = copy_to_destination(produced, dest).await?;
            debug!("Copied {} bytes to {}", size, dest.display());
            Ok((ConvertedDocument::File(dest.clone()), size))
        }
        OutputTarget::Bytes => {
            let bytes = tokio::fs::read(produced)
                .await
                .map_err(|e| ConvertError::OutputWriteFailed {
                    path: produced.to_path_buf(),
                    source: e,
                })?;
            let size = bytes.len() as u64;
            Ok((ConvertedDocument::Bytes(bytes), size))
        }
    }
}

/// Atomic copy: copy next to `dest` under a `.tmp` name, then rename.
async fn copy_to_destination(produced: &Path, dest: &Path) -> Result<u64, ConvertError> {
    let write_err = |e: std::io::Error| ConvertError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    };

    let tmp_path = tmp_sibling(dest).ok_or_else(|| {
        write_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "destination has no file name",
        ))
    })?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let size = tokio::fs::copy(produced, &tmp_path)
        .await
        .map_err(write_err)?;

    if let Err(e) = tokio::fs::rename(&tmp_path, dest).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }

    Ok(size)
}

/// `dir/name.ext` → `dir/name.ext.tmp`
fn tmp_sibling(dest: &Path) -> Option<PathBuf> {
    let mut name: OsString = dest.file_name()?.to_os_string();
    name.push(".tmp");
    Some(dest.with_file_name(name))
}
