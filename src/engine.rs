//! External rendering engine boundary
//!
//! The engine is probed once at startup. Its [`EngineStatus`] is fixed for
//! the life of the process and checked before every render, so a missing
//! binary fails fast instead of surfacing as an opaque spawn error.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Leading bytes of every PDF file
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// How often a running engine is checked against its deadline
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Supported HTML-to-PDF engines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Wkhtmltopdf,
    Weasyprint,
}

impl EngineKind {
    /// Binary name looked up on `PATH` when no explicit location is configured
    #[must_use]
    pub const fn default_binary(self) -> &'static str {
        match self {
            Self::Wkhtmltopdf => "wkhtmltopdf",
            Self::Weasyprint => "weasyprint",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_binary())
    }
}

/// Engine settings, part of the service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub kind: EngineKind,

    /// Explicit binary location; falls back to the kind's default name
    pub binary: Option<PathBuf>,

    pub page_size: String,
    pub margin_mm: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            binary: None,
            page_size: "A4".to_string(),
            margin_mm: 15,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.kind.default_binary()))
    }
}

/// Result of the startup probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Available { version: String },
    Unavailable { reason: String },
}

impl EngineStatus {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Version string or the reason the engine is unusable
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Available { version } => version,
            Self::Unavailable { reason } => reason,
        }
    }
}

/// Anything that turns a self-contained HTML document into PDF bytes
pub trait PdfEngine: Send + Sync {
    /// Human-readable engine name for health reporting
    fn name(&self) -> String;

    /// Availability as determined at startup
    fn status(&self) -> &EngineStatus;

    /// Render markup to an in-memory PDF. An engine still running at
    /// `deadline` is stopped and [`RenderError::TimedOut`] returned.
    fn render_pdf(&self, markup: &str, deadline: Option<Instant>) -> Result<Vec<u8>, RenderError>;
}

/// Engine driven as a child process: markup on stdin, PDF on stdout
#[derive(Debug, Clone)]
pub struct CommandEngine {
    config: EngineConfig,
    binary: PathBuf,
    status: EngineStatus,
}

impl CommandEngine {
    /// Probe the configured binary with `--version`. Never fails; an unusable
    /// binary is recorded as [`EngineStatus::Unavailable`].
    #[must_use]
    pub fn detect(config: EngineConfig) -> Self {
        let binary = config.binary_path();
        let status = probe(&binary);

        match &status {
            EngineStatus::Available { version } => {
                info!("Rendering engine {} available: {}", binary.display(), version);
            }
            EngineStatus::Unavailable { reason } => {
                warn!("Rendering engine unavailable: {reason}");
            }
        }

        Self {
            config,
            binary,
            status,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match self.config.kind {
            EngineKind::Wkhtmltopdf => {
                let margin = format!("{}mm", self.config.margin_mm);
                args.extend(["--quiet", "--encoding", "utf-8", "--page-size"].map(String::from));
                args.push(self.config.page_size.clone());
                for side in ["--margin-top", "--margin-right", "--margin-bottom", "--margin-left"] {
                    args.push(side.to_string());
                    args.push(margin.clone());
                }
                args.extend(
                    [
                        "--disable-javascript",
                        "--load-error-handling",
                        "ignore",
                        "--load-media-error-handling",
                        "ignore",
                    ]
                    .map(String::from),
                );
            }
            EngineKind::Weasyprint => {
                args.extend(["--encoding", "utf-8"].map(String::from));
            }
        }

        // stdin to stdout
        args.extend(["-", "-"].map(String::from));
        args
    }
}

impl PdfEngine for CommandEngine {
    fn name(&self) -> String {
        format!("{} ({})", self.config.kind, self.binary.display())
    }

    fn status(&self) -> &EngineStatus {
        &self.status
    }

    fn render_pdf(&self, markup: &str, deadline: Option<Instant>) -> Result<Vec<u8>, RenderError> {
        if let EngineStatus::Unavailable { reason } = &self.status {
            return Err(RenderError::EngineUnavailable(reason.clone()));
        }

        debug!("Invoking {} on {} bytes of markup", self.binary.display(), markup.len());

        let mut child = Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            kill_and_reap(&mut child);
            return Err(io::Error::other("engine stdio was not captured").into());
        };

        // Pipes are drained on their own threads so the child never blocks on
        // a full buffer while we poll it against the deadline
        let (status, written, stdout, stderr) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(markup.as_bytes()));
            let out_reader = scope.spawn(move || read_pipe(stdout));
            let err_reader = scope.spawn(move || read_pipe(stderr));

            let status = wait_until(&mut child, deadline);

            (
                status,
                join_pipe(writer),
                join_pipe(out_reader),
                join_pipe(err_reader),
            )
        });
        let status = status?;
        let stdout = stdout?;
        let stderr = String::from_utf8_lossy(&stderr.unwrap_or_default())
            .trim()
            .to_string();

        if let Err(e) = written {
            warn!("Engine stopped reading input early: {e}");
        }

        let is_pdf = stdout.starts_with(PDF_MAGIC);

        if !status.success() {
            if is_pdf {
                // wkhtmltopdf exits non-zero on unreachable remote resources
                warn!("Engine exited with {status} but produced a PDF: {stderr}");
                return Ok(stdout);
            }
            return Err(RenderError::EngineFailed { status, stderr });
        }

        if !is_pdf {
            return Err(RenderError::InvalidOutput(format!(
                "missing PDF header in {} bytes of output",
                stdout.len()
            )));
        }

        Ok(stdout)
    }
}

/// Wait for the child, killing it once `deadline` passes
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> Result<ExitStatus, RenderError> {
    let Some(deadline) = deadline else {
        return Ok(child.wait()?);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        let now = Instant::now();
        if now >= deadline {
            warn!("Engine pid {} still running at the deadline, killing it", child.id());
            kill_and_reap(child);
            return Err(RenderError::TimedOut);
        }

        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Engine pid {} already gone: {e}", child.id());
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap engine pid {}: {e}", child.id());
    }
}

fn read_pipe(mut pipe: impl Read) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(buf)
}

fn join_pipe<T>(handle: ScopedJoinHandle<'_, io::Result<T>>) -> io::Result<T> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("engine pipe thread panicked")))
}

fn probe(binary: &Path) -> EngineStatus {
    match Command::new(binary)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
    {
        Ok(out) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let stderr = String::from_utf8_lossy(&out.stderr);
            let version = stdout
                .lines()
                .chain(stderr.lines())
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("unknown version")
                .to_string();
            EngineStatus::Available { version }
        }
        Ok(out) => EngineStatus::Unavailable {
            reason: format!(
                "{} --version exited with {}: {}",
                binary.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        },
        Err(e) => EngineStatus::Unavailable {
            reason: format!("{} could not be executed: {e}", binary.display()),
        },
    }
}
