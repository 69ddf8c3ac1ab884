//! Where dependency forests come from.
//!
//! The package-cycle workflow needs the installed packages' dependency forest.
//! In production that is the JSON report of an external tool (`pipdeptree
//! --json` by default); tests and offline runs read a file or use a fixture.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::error::DecycleError;
use crate::forest::{Forest, parse_forest};

/// Supplies a dependency forest.
pub trait ForestSource {
    /// Produce the forest.
    ///
    /// # Errors
    ///
    /// Returns [`DecycleError::ExternalTool`] when the underlying tool or file
    /// cannot produce a parsable forest.
    fn fetch(&self) -> Result<Forest, DecycleError>;
}

/// Runs an external program and parses its stdout as a forest.
///
/// The program is executed directly (no shell). Its stdout and stderr are
/// drained on helper threads while the caller polls for exit, so a chatty
/// tool cannot block on a full pipe. One deadline covers both the exit and
/// the end of output: a background process that keeps the pipes open past it
/// fails the run like a slow tool. On timeout the child is killed.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSource {
    const POLL_INTERVAL: Duration = Duration::from_millis(10);
    const MAX_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// `pipdeptree --json` with the given timeout.
    #[must_use]
    pub fn pipdeptree(timeout: Duration) -> Self {
        Self::new("pipdeptree", vec!["--json".to_string()], timeout)
    }

    /// Command line as displayed in errors and logs.
    #[must_use]
    pub fn display_name(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the program and return its stdout.
    ///
    /// # Errors
    ///
    /// Spawn failure, timeout, non-zero exit, or non-UTF-8 output.
    #[instrument(skip(self), fields(command = %self.display_name()))]
    pub fn run(&self) -> Result<String, DecycleError> {
        let name = self.display_name();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| DecycleError::external(&name, format!("failed to start: {err}")))?;

        let (tx, rx) = mpsc::channel();
        spawn_drain(Stream::Stdout, child.stdout.take(), tx.clone());
        spawn_drain(Stream::Stderr, child.stderr.take(), tx);

        let started = Instant::now();
        let deadline = started
            .checked_add(self.timeout)
            .unwrap_or_else(|| started + Self::MAX_TIMEOUT);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(DecycleError::external(&name, format!("wait failed: {err}")));
                }
            }

            if Instant::now() >= deadline {
                warn!(waited = ?started.elapsed(), "external tool timed out; killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out(&name));
            }

            thread::sleep(Self::POLL_INTERVAL);
        };

        let (mut stdout, mut stderr) = (None, None);
        while stdout.is_none() || stderr.is_none() {
            match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                Ok((Stream::Stdout, buf)) => stdout = Some(buf),
                Ok((Stream::Stderr, buf)) => stderr = Some(buf),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(waited = ?started.elapsed(), "external tool output still open");
                    return Err(self.timed_out(&name));
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let stdout = stdout.unwrap_or_default();
        let stderr = stderr.unwrap_or_default();

        if !status.success() {
            let detail = String::from_utf8_lossy(&stderr);
            let detail = detail.trim();
            let code = status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(DecycleError::external(
                &name,
                if detail.is_empty() {
                    format!("exited with status {code}")
                } else {
                    format!("exited with status {code}: {detail}")
                },
            ));
        }

        debug!(bytes = stdout.len(), elapsed = ?started.elapsed(), "external tool finished");
        String::from_utf8(stdout)
            .map_err(|_| DecycleError::external(&name, "output is not valid UTF-8"))
    }

    fn timed_out(&self, name: &str) -> DecycleError {
        DecycleError::external(name, format!("timed out after {:?}", self.timeout))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn spawn_drain<R>(stream: Stream, pipe: Option<R>, tx: Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let _ = tx.send((stream, drain(pipe)));
    });
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

impl ForestSource for CommandSource {
    fn fetch(&self) -> Result<Forest, DecycleError> {
        let output = self.run()?;
        let forest = parse_forest(&output).map_err(|err| {
            DecycleError::external(self.display_name(), format!("unparsable output: {err}"))
        })?;
        info!(roots = forest.len(), "fetched dependency forest");
        Ok(forest)
    }
}

/// Reads a JSON forest from a file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ForestSource for FileSource {
    fn fetch(&self) -> Result<Forest, DecycleError> {
        let name = self.path.display().to_string();
        let text = std::fs::read_to_string(&self.path)
            .map_err(|err| DecycleError::external(&name, format!("cannot read: {err}")))?;
        parse_forest(&text)
            .map_err(|err| DecycleError::external(&name, format!("unparsable forest: {err}")))
    }
}

/// An in-memory forest, for fixtures.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Forest);

impl ForestSource for StaticSource {
    fn fetch(&self) -> Result<Forest, DecycleError> {
        Ok(self.0.clone())
    }
}
