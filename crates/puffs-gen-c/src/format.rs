//! Source normalization.
//!
//! Generated C is complete but unindented. A [`Formatter`] turns it into
//! the published layout. The default is an external `clang-format`
//! process: the text is piped to its stdin and the normalized text read
//! back from its stdout. Any failure aborts the run; there is no retry
//! and no fallback to the unformatted text.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;
use tracing::debug;

/// Errors raised by a [`Formatter`].
#[derive(Debug, Error)]
pub enum FormatError {
    /// The formatter process could not be started.
    #[error("failed to start formatter {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Piping text to or from the formatter failed.
    #[error("I/O error talking to formatter {program:?}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The formatter exited unsuccessfully.
    #[error("formatter {program:?} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The formatter printed something that is not UTF-8.
    #[error("formatter {program:?} produced invalid UTF-8")]
    InvalidOutput { program: String },
}

/// Normalizes generated C text.
pub trait Formatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Passes text through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unformatted;

impl Formatter for Unformatted {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        Ok(source.to_string())
    }
}

/// Runs `<program> -style=<style>` as a blocking filter.
#[derive(Debug, Clone)]
pub struct ClangFormat {
    pub program: String,
    pub style: String,
}

impl ClangFormat {
    pub fn new(program: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            style: style.into(),
        }
    }
}

impl Default for ClangFormat {
    fn default() -> Self {
        Self::new("clang-format", "Chromium")
    }
}

impl Formatter for ClangFormat {
    #[tracing::instrument(skip_all, fields(program = %self.program, style = %self.style))]
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let io_err = |source: std::io::Error| FormatError::Io {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg(format!("-style={}", self.style))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The child may fill its stdout pipe before draining stdin.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            io_err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdin was not captured",
            ))
        })?;
        let input = source.as_bytes().to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child.wait_with_output().map_err(io_err)?;
        match writer.join() {
            Ok(result) => {
                // A formatter that exits early closes the pipe; its exit
                // status below is the better diagnostic.
                if output.status.success() {
                    result.map_err(io_err)?;
                }
            }
            Err(_) => {
                return Err(io_err(std::io::Error::other("stdin writer panicked")));
            }
        }

        if !output.status.success() {
            return Err(FormatError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let formatted = String::from_utf8(output.stdout).map_err(|_| FormatError::InvalidOutput {
            program: self.program.clone(),
        })?;
        debug!(bytes_in = source.len(), bytes_out = formatted.len(), "formatted");
        Ok(formatted)
    }
}
