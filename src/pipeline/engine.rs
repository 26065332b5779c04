//! Engine invocation: build the `soffice` command line and run it.
//!
//! The command is always
//!
//! ```text
//! soffice -env:UserInstallation=<profile uri> --headless \
//!         --convert-to <format>[:"<filter>"] --outdir <staging> <staging>/source.<ext>
//! ```
//!
//! The process is awaited to completion with no timeout. If LibreOffice
//! hangs, the conversion hangs until the `soffice` process is killed from
//! outside. Dropping the future does not stop the child (`kill_on_drop` is
//! off), so a caller-side deadline would leave it running against a profile
//! directory that has already been removed.

use crate::error::ConvertError;
use soffice_locate::{profile_uri, Platform};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info};

/// Longest stderr excerpt carried in a [`ConvertError::SubprocessFailure`].
const MAX_STDERR_IN_ERROR: usize = 2000;

/// A fully-built engine command, ready to run.
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    binary: PathBuf,
    args: Vec<OsString>,
}

/// Captured result of a successful engine run.
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl EngineInvocation {
    /// Build the argument list for one conversion.
    ///
    /// `convert_to` is the already-formatted `--convert-to` value
    /// (see [`crate::config::ConversionRequest::convert_to_arg`]).
    pub fn new(
        binary: &Path,
        platform: &Platform,
        profile_dir: &Path,
        convert_to: &str,
        outdir: &Path,
        input: &Path,
    ) -> Self {
        let args = vec![
            OsString::from(format!(
                "-env:UserInstallation={}",
                profile_uri(platform, profile_dir)
            )),
            OsString::from("--headless"),
            OsString::from("--convert-to"),
            OsString::from(convert_to),
            OsString::from("--outdir"),
            outdir.as_os_str().to_os_string(),
            input.as_os_str().to_os_string(),
        ];
        Self {
            binary: binary.to_path_buf(),
            args,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Space-joined command line, for logs only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the engine to completion.
    ///
    /// With `verbose`, the command line and captured output are logged at
    /// INFO; otherwise at DEBUG.
    pub async fn run(&self, verbose: bool) -> Result<EngineRun, ConvertError> {
        log_at(verbose, &format!("command: {}", self.command_line()));

        let start = Instant::now();
        let output = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ConvertError::SubprocessFailure {
                binary: self.binary.clone(),
                reason: format!("could not be launched: {e}"),
            })?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        log_at(
            verbose,
            &format!(
                "soffice finished in {}ms ({})\nstdout: {}\nstderr: {}",
                duration.as_millis(),
                output.status,
                stdout.trim_end(),
                stderr.trim_end()
            ),
        );

        if !output.status.success() {
            return Err(ConvertError::SubprocessFailure {
                binary: self.binary.clone(),
                reason: format!("{}: {}", output.status, stderr_excerpt(&stderr)),
            });
        }

        Ok(EngineRun {
            stdout,
            stderr,
            duration,
        })
    }
}

fn log_at(verbose: bool, msg: &str) {
    if verbose {
        info!("{}", msg);
    } else {
        debug!("{}", msg);
    }
}

/// The tail of `stderr`, capped so huge engine logs don't flood the error.
fn stderr_excerpt(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return "(no stderr output)".to_string();
    }
    if trimmed.len() <= MAX_STDERR_IN_ERROR {
        return trimmed.to_string();
    }
    let mut cut = trimmed.len() - MAX_STDERR_IN_ERROR;
    while !trimmed.is_char_boundary(cut) {
        cut += 1;
    }
    format!("\u{2026}{}", &trimmed[cut..])
}
