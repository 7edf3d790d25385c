//! Error types for the `ttyrelay` core library.

use thiserror::Error;

/// Result type alias using the `ttyrelay` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for relay operations.
///
/// Stream-level failures during an active session are handled locally by
/// the session coordinator (teardown) and never surface through this enum;
/// the remote client only observes its connection closing.
#[derive(Debug, Error)]
pub enum Error {
    /// No candidate path for the terminal program exists.
    #[error("no executable found for `{program}` (tried working directory and install path)")]
    Resolution { program: String },

    /// Executable found but the process or PTY could not be created.
    #[error("failed to start terminal process: {reason}")]
    Spawn { reason: String },

    /// PTY resize failed. Non-fatal: the directive is dropped.
    #[error("failed to apply terminal geometry: {reason}")]
    Geometry { reason: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
