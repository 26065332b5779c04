//! Conversion entry points.
//!
//! One conversion walks a fixed sequence of stages:
//!
//! ```text
//! Idle → Resolving → Staging → Converting → Retrieving → CleaningUp → Done | Failed
//! ```
//!
//! Nothing is created on disk while resolving, so input and engine-discovery
//! failures leave no trace. From `Staging` on, the scratch workspace exists
//! and every exit path, success or failure, goes through `CleaningUp`.

use crate::config::{ConversionRequest, OutputTarget, SourceDocument};
use crate::error::ConvertError;
use crate::output::{ConversionOutput, ConversionStats, ConvertedDocument};
use crate::pipeline::engine::EngineInvocation;
use crate::pipeline::workspace::{ScratchWorkspace, STAGED_STEM};
use crate::pipeline::{input, retrieve};
use soffice_locate::{PathProbe, Platform, RealFs};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where a conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Resolving,
    Staging,
    Converting,
    Retrieving,
    CleaningUp,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Resolving => "resolving",
            Stage::Staging => "staging",
            Stage::Converting => "converting",
            Stage::Retrieving => "retrieving",
            Stage::CleaningUp => "cleaning-up",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn enter(stage: Stage) {
    debug!("stage → {}", stage);
}

fn failed(e: ConvertError) -> ConvertError {
    enter(Stage::Failed);
    warn!("Conversion failed: {}", e);
    e
}

/// Convert one document with LibreOffice.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`ConvertError::InvalidInputPath`]: source missing or without extension
///   (no engine lookup, nothing created on disk)
/// - [`ConvertError::BinaryNotFound`]: no `soffice` found (nothing staged)
/// - [`ConvertError::StagingFailed`], [`ConvertError::SubprocessFailure`],
///   [`ConvertError::OutputMissing`], [`ConvertError::OutputWriteFailed`]
///
/// Scratch directories are removed before this returns, whatever the outcome.
///
/// # Example
/// ```rust,no_run
/// use soffice_convert::{convert, ConversionRequest};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = ConversionRequest::builder("hello.docx", "pdf")
///     .output_path("hello.pdf")
///     .build()?;
/// let output = convert(&request).await?;
/// println!("wrote {} bytes", output.stats.output_bytes);
/// # Ok(())
/// # }
/// ```
pub async fn convert(request: &ConversionRequest) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    info!(
        "Starting conversion: {} → {}",
        describe_source(&request.source),
        request.convert_to_arg()
    );

    // ── Resolving ────────────────────────────────────────────────────────
    enter(Stage::Resolving);
    let input_ext = input::validate_source(&request.source)
        .await
        .map_err(failed)?;
    let engine = resolve_engine(
        request.soffice_path.as_deref(),
        &|k| std::env::var(k).ok(),
        &RealFs,
    )
    .map_err(failed)?;
    info!("Binary found at: {}", engine.display());

    // ── Staging … Retrieving (workspace owned) ───────────────────────────
    enter(Stage::Staging);
    let workspace = ScratchWorkspace::create(request.scratch_root.as_deref()).map_err(failed)?;
    let staging_dir = workspace.staging_dir().to_path_buf();
    let profile_dir = workspace.profile_dir().to_path_buf();

    let result = run_in_workspace(request, &engine, &input_ext, &workspace).await;

    // ── CleaningUp ───────────────────────────────────────────────────────
    enter(Stage::CleaningUp);
    workspace.release();

    let (document, output_bytes, engine_duration_ms) = result.map_err(failed)?;
    enter(Stage::Done);

    let stats = ConversionStats {
        engine,
        format: request.format.clone(),
        filter: request.filter.clone(),
        staging_dir,
        profile_dir,
        output_bytes,
        output_path: document.path().cloned(),
        engine_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} bytes of {} in {}ms",
        stats.output_bytes, stats.format, stats.total_duration_ms
    );

    Ok(ConversionOutput { document, stats })
}

/// Staging → Converting → Retrieving. Never cleans up; the caller does.
async fn run_in_workspace(
    request: &ConversionRequest,
    engine: &Path,
    input_ext: &str,
    workspace: &ScratchWorkspace,
) -> Result<(ConvertedDocument, u64, u64), ConvertError> {
    let staged = workspace.stage(&request.source, input_ext).await?;

    enter(Stage::Converting);
    let invocation = EngineInvocation::new(
        engine,
        &Platform::current(),
        workspace.profile_dir(),
        &request.convert_to_arg(),
        workspace.staging_dir(),
        &staged,
    );
    let run = invocation.run(request.debug).await?;

    enter(Stage::Retrieving);
    let produced = workspace
        .staging_dir()
        .join(format!("{STAGED_STEM}.{}", request.format));
    let (document, size) = retrieve::retrieve(&produced, &request.output).await?;

    Ok((document, size, run.duration.as_millis() as u64))
}

/// Pick the engine: an explicit path (which must exist) or discovery.
///
/// Discovery reads `SOFFICE_PATH` through `env`; a stale value there is only
/// a warning and the platform's install locations are still scanned.
pub fn resolve_engine(
    explicit: Option<&Path>,
    env: &dyn Fn(&str) -> Option<String>,
    probe: &dyn PathProbe,
) -> Result<PathBuf, ConvertError> {
    match explicit {
        Some(path) if probe.exists(path) => Ok(path.to_path_buf()),
        Some(path) => Err(ConvertError::BinaryNotFound {
            platform: Platform::current(),
            candidates: vec![path.to_path_buf()],
        }),
        None => Ok(soffice_locate::locate_with(&Platform::current(), env, probe)?),
    }
}

fn describe_source(source: &SourceDocument) -> String {
    match source {
        SourceDocument::Path(p) => p.display().to_string(),
        SourceDocument::Bytes { data, extension } => {
            format!("<{} bytes of .{}>", data.len(), extension.trim_start_matches('.'))
        }
    }
}

/// Convert a file on disk and copy the result to `output_path`.
///
/// Returns the destination path.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    format: &str,
    output_path: impl AsRef<Path>,
) -> Result<PathBuf, ConvertError> {
    let request = ConversionRequest::builder(input_path.as_ref(), format)
        .output_path(output_path.as_ref())
        .build()?;
    let output = convert(&request).await?;
    Ok(output
        .stats
        .output_path
        .unwrap_or_else(|| output_path.as_ref().to_path_buf()))
}

/// Convert a file on disk and return the converted bytes.
pub async fn convert_to_bytes(
    input_path: impl AsRef<Path>,
    format: &str,
) -> Result<Vec<u8>, ConvertError> {
    let request = ConversionRequest::builder(input_path.as_ref(), format)
        .output_bytes()
        .build()?;
    into_bytes(convert(&request).await?)
}

/// Convert an in-memory document and return the converted bytes.
///
/// `extension` is the input type LibreOffice should assume, e.g. `"docx"`.
///
/// # Example
/// ```rust,no_run
/// use soffice_convert::convert_from_bytes;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let docx: Vec<u8> = std::fs::read("hello.docx")?;
/// let txt = convert_from_bytes(docx, "docx", "txt").await?;
/// println!("{}", String::from_utf8_lossy(&txt));
/// # Ok(())
/// # }
/// ```
pub async fn convert_from_bytes(
    bytes: impl Into<Vec<u8>>,
    extension: &str,
    format: &str,
) -> Result<Vec<u8>, ConvertError> {
    let source = SourceDocument::Bytes {
        data: bytes.into(),
        extension: extension.to_string(),
    };
    let request = ConversionRequest::builder(source, format)
        .output(OutputTarget::Bytes)
        .build()?;
    into_bytes(convert(&request).await?)
}

fn into_bytes(output: ConversionOutput) -> Result<Vec<u8>, ConvertError> {
    output
        .document
        .into_bytes()
        .ok_or_else(|| ConvertError::Internal("expected in-memory output".into()))
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn convert_sync(request: &ConversionRequest) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;
    impl PathProbe for Nothing {
        fn exists(&self, _: &Path) -> bool {
            false
        }
    }

    struct Everything;
    impl PathProbe for Everything {
        fn exists(&self, _: &Path) -> bool {
            true
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    /// Only `/usr/bin/soffice` exists.
    struct OnlyUsrBin;
    impl PathProbe for OnlyUsrBin {
        fn exists(&self, path: &Path) -> bool {
            path == Path::new("/usr/bin/soffice")
        }
    }

    /// Collects formatted log lines for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::CleaningUp.to_string(), "cleaning-up");
        assert_eq!(Stage::Idle.to_string(), "idle");
    }

    #[test]
    fn explicit_engine_used_when_present() {
        let p = resolve_engine(Some(Path::new("/opt/lo/soffice")), &no_env, &Everything).unwrap();
        assert_eq!(p, PathBuf::from("/opt/lo/soffice"));
    }

    #[test]
    fn explicit_engine_missing_is_binary_not_found() {
        let err =
            resolve_engine(Some(Path::new("/opt/lo/soffice")), &no_env, &Nothing).unwrap_err();
        match err {
            ConvertError::BinaryNotFound { candidates, .. } => {
                assert_eq!(candidates, vec![PathBuf::from("/opt/lo/soffice")])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn describe_bytes_source() {
        let s = describe_source(&SourceDocument::Bytes {
            data: vec![1, 2, 3],
            extension: ".odt".into(),
        });
        assert_eq!(s, "<3 bytes of .odt>");
    }

    #[tokio::test]
    async fn missing_input_fails_before_anything_else() {
        let root = tempfile::tempdir().unwrap();
        let request = ConversionRequest::builder("/definitely/not/hello.docx", "pdf")
            .soffice_path("/definitely/not/soffice")
            .scratch_root(root.path())
            .build()
            .unwrap();
        let err = convert(&request).await.unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInputPath { .. }), "got: {err}");
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn stale_soffice_path_falls_through_to_install_locations() {
        let env = |k: &str| (k == "SOFFICE_PATH").then(|| "/stale/soffice".to_string());
        let p = resolve_engine(None, &env, &OnlyUsrBin).unwrap();
        assert_eq!(p, PathBuf::from("/usr/bin/soffice"));
    }

    #[test]
    fn explicit_engine_is_not_replaced_by_discovery() {
        let env = |k: &str| (k == "SOFFICE_PATH").then(|| "/usr/bin/soffice".to_string());
        let err = resolve_engine(Some(Path::new("/stale/soffice")), &env, &OnlyUsrBin).unwrap_err();
        assert!(matches!(err, ConvertError::BinaryNotFound { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn resolving_failure_logs_failed_stage() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let request = ConversionRequest::builder("/definitely/not/hello.docx", "pdf")
            .build()
            .unwrap();
        let err = convert(&request).await.unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInputPath { .. }), "got: {err}");

        let text = logs.contents();
        assert!(text.contains("stage → resolving"), "logs: {text}");
        assert!(text.contains("stage → failed"), "logs: {text}");
        assert!(!text.contains("stage → staging"), "logs: {text}");
    }
}
