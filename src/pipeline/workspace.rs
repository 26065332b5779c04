//! Per-conversion scratch directories.
//!
//! Each conversion owns two fresh directories:
//!
//! * **staging**: holds `source.<ext>` and the engine's `source.<format>`.
//! * **profile**: an empty LibreOffice user profile. LibreOffice refuses to
//!   start a second instance against a profile that is already in use, so
//!   sharing one would make concurrent conversions fail or hang.
//!
//! Both are [`TempDir`]s, so they disappear when dropped even on panic.
//! [`ScratchWorkspace::release`] removes them eagerly and reports problems
//! through `tracing` instead of returning them.

use crate::config::SourceDocument;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix of the staging directory name.
pub const STAGING_PREFIX: &str = "soffice-convert-";

/// Prefix of the profile directory name.
pub const PROFILE_PREFIX: &str = "soffice-profile-";

/// File stem the input is staged under; the engine names its output after it.
pub const STAGED_STEM: &str = "source";

/// The two scratch directories owned by one conversion.
#[derive(Debug)]
pub struct ScratchWorkspace {
    staging: TempDir,
    profile: TempDir,
}

impl ScratchWorkspace {
    /// Create both directories under `root` (or the system temp dir).
    pub fn create(root: Option<&Path>) -> Result<Self, ConvertError> {
        let staging = make_dir(STAGING_PREFIX, root)?;
        let profile = make_dir(PROFILE_PREFIX, root)?;
        debug!(
            "Scratch workspace: staging={} profile={}",
            staging.path().display(),
            profile.path().display()
        );
        Ok(Self { staging, profile })
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    pub fn profile_dir(&self) -> &Path {
        self.profile.path()
    }

    /// `<staging>/source.<ext>`
    pub fn staged_path(&self, ext: &str) -> PathBuf {
        self.staging.path().join(format!("{STAGED_STEM}.{ext}"))
    }

    /// Copy or write `source` into the staging directory as `source.<ext>`.
    pub async fn stage(&self, source: &SourceDocument, ext: &str) -> Result<PathBuf, ConvertError> {
        let dest = self.staged_path(ext);
        let staged = match source {
            SourceDocument::Path(from) => {
                debug!("Copy file from: {}", from.display());
                tokio::fs::copy(from, &dest).await.map(|_| ())
            }
            SourceDocument::Bytes { data, .. } => tokio::fs::write(&dest, data).await,
        };
        staged.map_err(|e| ConvertError::StagingFailed {
            path: dest.clone(),
            source: e,
        })?;
        debug!("Staged input at: {}", dest.display());
        Ok(dest)
    }

    /// Remove both directories. Never fails; removal errors are logged.
    pub fn release(self) {
        for (label, dir) in [("staging", self.staging), ("profile", self.profile)] {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!("Removed {} dir {}", label, path.display()),
                Err(e) => warn!("Failed to remove {} dir {}: {}", label, path.display(), e),
            }
        }
    }
}

fn make_dir(prefix: &str, root: Option<&Path>) -> Result<TempDir, ConvertError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(prefix);
    let created = match root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    };
    created.map_err(|e| ConvertError::StagingFailed {
        path: root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir),
        source: e,
    })
}
