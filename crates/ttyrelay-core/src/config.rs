//! Relay configuration.
//!
//! All knobs that affect accepting and running a session live in one
//! explicit value constructed at startup and handed to the router. There is
//! no process-wide mutable configuration.

use std::path::PathBuf;

/// Configuration for the relay server and the sessions it spawns.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Name of the terminal program to run. Resolved first relative to the
    /// working directory, then under `install_dir`.
    pub program: String,
    /// Fixed installation path tried when the program is not present in the
    /// working directory.
    pub install_dir: PathBuf,
    /// Value forced into the child's `TERM` environment variable.
    pub term: String,
    /// `Origin` header allowlist for the websocket upgrade. Empty means
    /// allow all origins.
    pub allowed_origins: Vec<String>,
    /// Size of the bounded chunk read from the PTY per output-pump
    /// iteration.
    pub read_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            program: "ttyapp".to_string(),
            install_dir: PathBuf::from("/usr/local/bin"),
            term: "xterm-256color".to_string(),
            allowed_origins: Vec::new(),
            read_buffer_size: 1024,
        }
    }
}

impl RelayConfig {
    /// Returns true if `origin` is acceptable under the allowlist policy.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
    }
}
