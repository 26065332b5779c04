//! # soffice-locate
//!
//! Find the LibreOffice `soffice` executable for the current platform.
//!
//! ## How it works
//!
//! On every call to [`locate`]:
//!
//! 1. If `SOFFICE_PATH` is set and points to an existing file, it wins.
//! 2. Otherwise the fixed per-platform candidate table is scanned in order
//!    and the first existing candidate is returned.
//! 3. If nothing exists, [`LocateError::NotFound`] lists every path tried.
//!
//! Nothing is cached: an installation that appears or disappears between two
//! calls is picked up immediately.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use soffice_locate::{locate, locate_with, Platform, PathProbe};
//! use std::path::Path;
//!
//! // Option A: real platform, real environment, real filesystem
//! let soffice = locate().expect("LibreOffice not installed");
//!
//! // Option B: deterministic lookup with an injected filesystem
//! struct Everything;
//! impl PathProbe for Everything {
//!     fn exists(&self, _path: &Path) -> bool { true }
//! }
//! let p = locate_with(&Platform::Linux, &|_| None, &Everything).unwrap();
//! assert_eq!(p, Path::new("/usr/bin/libreoffice"));
//! ```
//!
//! ## Platform support
//!
//! | OS      | Candidates (in order)                                        |
//! |---------|--------------------------------------------------------------|
//! | macOS   | `/Applications/LibreOffice.app/Contents/MacOS/soffice`       |
//! | Linux   | `/usr/bin/libreoffice`, `/usr/bin/soffice`                   |
//! | Windows | `%PROGRAMFILES(X86)%\LIBREO~1\…`, `%PROGRAMFILES(X86)%\LibreOffice\…`, `%PROGRAMFILES%\LibreOffice\…` |

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming an explicit `soffice` executable.
pub const SOFFICE_PATH_ENV: &str = "SOFFICE_PATH";

const MACOS_CANDIDATES: &[&str] = &["/Applications/LibreOffice.app/Contents/MacOS/soffice"];

const LINUX_CANDIDATES: &[&str] = &["/usr/bin/libreoffice", "/usr/bin/soffice"];

/// `(environment variable, path below it)` pairs for Windows.
const WINDOWS_CANDIDATES: &[(&str, &str)] = &[
    ("PROGRAMFILES(X86)", "LIBREO~1/program/soffice.exe"),
    ("PROGRAMFILES(X86)", "LibreOffice/program/soffice.exe"),
    ("PROGRAMFILES", "LibreOffice/program/soffice.exe"),
];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by soffice-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// None of the candidate paths exists on disk.
    #[error("LibreOffice binary not found for {platform} (tried: {})", display_paths(.candidates))]
    NotFound {
        platform: Platform,
        candidates: Vec<PathBuf>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "no known install locations".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Platform ─────────────────────────────────────────────────────────────────

/// Operating-system families with a known LibreOffice layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    /// Any other OS. Has no candidates, so discovery only succeeds via
    /// `SOFFICE_PATH`.
    Unsupported(String),
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value onto a [`Platform`].
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" => Platform::Windows,
            other => Platform::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => f.write_str("macos"),
            Platform::Linux => f.write_str("linux"),
            Platform::Windows => f.write_str("windows"),
            Platform::Unsupported(os) => write!(f, "{os} (unsupported)"),
        }
    }
}

// ── Filesystem probe ─────────────────────────────────────────────────────────

/// Answers "is there an executable file at this path?".
///
/// Injected into [`locate_with`] so discovery can be tested without touching
/// the real filesystem.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// [`PathProbe`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl PathProbe for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// The ordered candidate list for `platform`.
///
/// `env` resolves environment variables (only consulted on Windows). An
/// unset variable yields an empty leading segment; the resulting relative
/// path is kept and simply fails the existence check later.
pub fn candidate_paths(platform: &Platform, env: &dyn Fn(&str) -> Option<String>) -> Vec<PathBuf> {
    match platform {
        Platform::MacOs => MACOS_CANDIDATES.iter().map(PathBuf::from).collect(),
        Platform::Linux => LINUX_CANDIDATES.iter().map(PathBuf::from).collect(),
        Platform::Windows => WINDOWS_CANDIDATES
            .iter()
            .map(|&(var, tail)| PathBuf::from(env(var).unwrap_or_default()).join(tail))
            .collect(),
        Platform::Unsupported(_) => Vec::new(),
    }
}

/// Resolve the `soffice` executable with explicit platform, environment and
/// filesystem.
///
/// The first existing candidate wins. A `SOFFICE_PATH` that does not exist
/// is reported with a warning and discovery continues with the table.
pub fn locate_with(
    platform: &Platform,
    env: &dyn Fn(&str) -> Option<String>,
    probe: &dyn PathProbe,
) -> Result<PathBuf, LocateError> {
    if let Some(explicit) = env(SOFFICE_PATH_ENV).filter(|v| !v.is_empty()) {
        let p = PathBuf::from(explicit);
        if probe.exists(&p) {
            debug!("Using {SOFFICE_PATH_ENV}: {}", p.display());
            return Ok(p);
        }
        warn!(
            "{SOFFICE_PATH_ENV} '{}' not found; falling back to default locations",
            p.display()
        );
    }

    let candidates = candidate_paths(platform, env);
    for candidate in &candidates {
        if probe.exists(candidate) {
            debug!("Binary found at: {}", candidate.display());
            return Ok(candidate.clone());
        }
    }

    Err(LocateError::NotFound {
        platform: platform.clone(),
        candidates,
    })
}

/// Resolve the `soffice` executable for this machine.
pub fn locate() -> Result<PathBuf, LocateError> {
    locate_with(&Platform::current(), &|k| std::env::var(k).ok(), &RealFs)
}

/// Build the `-env:UserInstallation` file URI for a profile directory.
///
/// Windows paths start with a drive letter, so they need a third slash
/// (`file:///C:/…`); absolute Unix paths already start with one.
pub fn profile_uri(platform: &Platform, dir: &Path) -> String {
    match platform {
        Platform::Windows => {
            let p = dir.to_string_lossy().replace('\\', "/");
            format!("file:///{}", p.trim_start_matches('/'))
        }
        _ => format!("file://{}", dir.to_string_lossy()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
