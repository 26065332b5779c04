//! CLI binary for soffice-convert.
//!
//! A thin shim over the library crate that maps CLI flags
//! to a `ConversionRequest` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use soffice_convert::{convert, soffice_locate, ConversionRequest, OutputTarget};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Word → PDF, written next to the input as report.pdf
  soffice-convert report.docx --to pdf

  # Explicit output path
  soffice-convert report.docx --to pdf -o out/report.pdf

  # Plain text with a named export filter, to stdout
  soffice-convert notes.odt --to txt --filter Text -o -

  # Show the engine command line and its output
  soffice-convert slides.pptx --to pdf --debug

  # Which soffice would be used?
  soffice-convert --locate

ENVIRONMENT VARIABLES:
  SOFFICE_PATH                  Preferred soffice executable; ignored with a
                                warning when missing (use --soffice to insist)
  SOFFICE_CONVERT_SCRATCH_DIR   Parent directory for per-run scratch dirs
  RUST_LOG                      Override the log filter (e.g. debug)

DEFAULT INSTALL LOCATIONS:
  macOS    /Applications/LibreOffice.app/Contents/MacOS/soffice
  Linux    /usr/bin/libreoffice, /usr/bin/soffice
  Windows  %PROGRAMFILES(X86)%\LIBREO~1\program\soffice.exe
           %PROGRAMFILES(X86)%\LibreOffice\program\soffice.exe
           %PROGRAMFILES%\LibreOffice\program\soffice.exe
"#;

/// Convert office documents with a headless LibreOffice.
#[derive(Parser, Debug)]
#[command(
    name = "soffice-convert",
    version,
    about = "Convert office documents between formats with a headless LibreOffice",
    long_about = "Convert documents (docx, odt, xlsx, pptx, rtf, ...) to another format by \
running LibreOffice in headless mode. Each run uses private scratch and profile directories, \
so several conversions can run side by side.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document to convert.
    #[arg(required_unless_present = "locate")]
    input: Option<PathBuf>,

    /// Target format understood by LibreOffice (pdf, txt, docx, odt, html, ...).
    #[arg(short = 't', long = "to", env = "SOFFICE_CONVERT_FORMAT",
          required_unless_present = "locate")]
    format: Option<String>,

    /// Output file. Default: input path with the target extension. `-` writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// LibreOffice filter name, passed as `<format>:"<filter>"`.
    #[arg(long, env = "SOFFICE_CONVERT_FILTER")]
    filter: Option<String>,

    /// Explicit soffice executable (skips discovery). `SOFFICE_PATH` is
    /// honoured by discovery instead and falls back to the install locations.
    #[arg(long = "soffice")]
    soffice: Option<PathBuf>,

    /// Parent directory for the per-run scratch directories.
    #[arg(long, env = "SOFFICE_CONVERT_SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Log the engine command line and its stdout/stderr.
    #[arg(long, env = "SOFFICE_CONVERT_DEBUG")]
    debug: bool,

    /// Print conversion stats as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "SOFFICE_CONVERT_NO_PROGRESS")]
    no_progress: bool,

    /// Print the soffice executable that would be used, then exit.
    #[arg(long)]
    locate: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let to_stdout = cli.output.as_deref() == Some(Path::new("-"));
    if to_stdout && cli.json {
        anyhow::bail!("--json cannot be combined with `-o -`");
    }

    // ── Logging setup ────────────────────────────────────────────────────
    // While the spinner is visible only errors are logged; the spinner line
    // would otherwise be torn apart by INFO output.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.locate && !cli.debug && !cli.verbose;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Locate-only mode ─────────────────────────────────────────────────
    if cli.locate {
        let path = match cli.soffice {
            Some(ref p) if p.is_file() => p.clone(),
            Some(ref p) => anyhow::bail!("soffice not found at {}", p.display()),
            None => soffice_locate::locate().context("Failed to locate LibreOffice")?,
        };
        println!("{}", path.display());
        return Ok(());
    }

    let request = build_request(&cli, to_stdout)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let spinner = show_progress.then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.set_message(format!("→ {}", request.format));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = convert(&request).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Conversion failed")?;

    if let Some(bytes) = output.document.bytes() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(bytes)
            .context("Failed to write to stdout")?;
        handle.flush().ok();
    }

    if cli.json {
        let json =
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise stats")?;
        println!("{json}");
    } else if !cli.quiet {
        let destination = output
            .stats
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string());
        eprintln!(
            "{}  {}  →  {}  {}",
            green("✔"),
            dim(&format!("{} bytes", output.stats.output_bytes)),
            bold(&destination),
            dim(&format!("{}ms", output.stats.total_duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to a `ConversionRequest`.
fn build_request(cli: &Cli, to_stdout: bool) -> Result<ConversionRequest> {
    let input = cli
        .input
        .clone()
        .context("An input document is required")?;
    let format = cli
        .format
        .clone()
        .context("A target format is required (--to)")?;

    let output = if to_stdout {
        OutputTarget::Bytes
    } else {
        OutputTarget::File(match cli.output {
            Some(ref p) => p.clone(),
            None => default_output_path(&input, &format)?,
        })
    };

    let mut builder = ConversionRequest::builder(input, format)
        .output(output)
        .debug(cli.debug);

    if let Some(ref f) = cli.filter {
        builder = builder.filter(f.clone());
    }
    if let Some(ref p) = cli.soffice {
        builder = builder.soffice_path(p.clone());
    }
    if let Some(ref d) = cli.scratch_dir {
        builder = builder.scratch_root(d.clone());
    }

    builder.build().context("Invalid request")
}

/// `dir/report.docx` + `pdf` → `dir/report.pdf`, refusing to overwrite the input.
fn default_output_path(input: &Path, format: &str) -> Result<PathBuf> {
    let ext = format.trim().trim_start_matches('.');
    let out = input.with_extension(ext);
    if out == input {
        anyhow::bail!(
            "Output would overwrite the input {}; pass -o to choose another path",
            input.display()
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("soffice-convert").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn soffice_path_env_is_left_to_discovery() {
        std::env::set_var("SOFFICE_PATH", "/stale/soffice");
        let cli = parse(&["report.docx", "--to", "pdf"]);
        assert!(cli.soffice.is_none());

        let request = build_request(&cli, false).unwrap();
        assert!(request.soffice_path.is_none());
        std::env::remove_var("SOFFICE_PATH");
    }

    #[test]
    fn soffice_flag_is_explicit_override() {
        let cli = parse(&["report.docx", "--to", "pdf", "--soffice", "/opt/lo/soffice"]);
        let request = build_request(&cli, false).unwrap();
        assert_eq!(request.soffice_path, Some(PathBuf::from("/opt/lo/soffice")));
    }

    #[test]
    fn default_output_replaces_extension() {
        let out = default_output_path(Path::new("dir/report.docx"), ".pdf").unwrap();
        assert_eq!(out, PathBuf::from("dir/report.pdf"));
        assert!(default_output_path(Path::new("dir/report.pdf"), "pdf").is_err());
    }
}
