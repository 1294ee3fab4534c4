//! Error types reported by the interpreter.
//!
//! Every variant here is recoverable: the execution loop prints it and prompts
//! again. Exec failures never show up as a [`ShellError`] because they happen
//! inside the forked child, which reports them itself.

use nix::errno::Errno;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Which input limit a line ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLimit {
    /// The whole line is longer than the configured line length.
    ///
    /// `len` counts the bytes that were read; a [`ReaderSource`] stops reading
    /// an over-long line one byte past the limit.
    ///
    /// [`ReaderSource`]: crate::io_adapters::ReaderSource
    Line { len: usize, max: usize },
    /// A single token is longer than the per-token length.
    Token { len: usize, max: usize },
    /// The line splits into more tokens than allowed.
    TokenCount { max: usize },
}

impl std::fmt::Display for InputLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputLimit::Line { max, .. } => write!(f, "line is longer than {max} bytes"),
            InputLimit::Token { len, max } => {
                write!(f, "token is {len} bytes, limit is {max}")
            }
            InputLimit::TokenCount { max } => write!(f, "more than {max} tokens"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("input too long: {0}")]
    InputTooLong(InputLimit),

    #[error("cannot create process: {0}")]
    ResourceExhaustion(#[source] Errno),

    #[error("cd: {}: {source}", path.display())]
    DirectoryChange {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot configure SIGINT handling: {0}")]
    SignalSetup(#[source] Errno),

    #[error("SIGINT forwarding is already installed")]
    RouterInstalled,

    #[error("cd: HOME not set")]
    HomeNotSet,

    #[error("{0}: argument contains a NUL byte")]
    InvalidArgument(String),

    #[error("waiting for child {pid} failed: {source}")]
    Wait {
        pid: i32,
        #[source]
        source: Errno,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
