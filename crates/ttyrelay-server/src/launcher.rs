//! Terminal program launcher.
//!
//! Resolves the program binary and starts it attached to a newly allocated
//! pseudo-terminal. The caller owns every returned handle and is
//! responsible for releasing the process and the PTY.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use portable_pty::{Child, CommandBuilder, MasterPty, PtySize, native_pty_system};
use tracing::{debug, info};
use ttyrelay_core::{Error, Geometry, RelayConfig, Result};

/// Owns the child process and pseudo-terminal handles for one session.
pub struct PtyProcess {
    pub child: Box<dyn Child + Send + Sync>,
    pub master: Box<dyn MasterPty + Send>,
    pub reader: Box<dyn Read + Send>,
    pub writer: Box<dyn Write + Send>,
}

impl std::fmt::Debug for PtyProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyProcess").finish_non_exhaustive()
    }
}

/// Resolve the program by trying an ordered list of candidate locations:
/// a path relative to the current working directory, then the fixed
/// install path. First existing match wins.
pub fn resolve_program(program: &str, install_dir: &Path) -> Result<PathBuf> {
    let local = PathBuf::from(program);
    if local.exists() {
        return Ok(local);
    }
    let installed = install_dir.join(program);
    if installed.exists() {
        return Ok(installed);
    }
    Err(Error::Resolution {
        program: program.to_string(),
    })
}

/// Start the configured program under a fresh PTY with the default initial
/// geometry and the inherited environment plus a forced `TERM`.
pub fn launch(config: &RelayConfig) -> Result<PtyProcess> {
    let path = resolve_program(&config.program, &config.install_dir)?;
    debug!(path = %path.display(), "resolved terminal program");

    let geometry = Geometry::default();
    let pty_system = native_pty_system();
    let pair = pty_system
        .openpty(PtySize {
            rows: geometry.rows,
            cols: geometry.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::Spawn {
            reason: format!("failed to open PTY: {e}"),
        })?;

    let mut cmd = CommandBuilder::new(&path);
    cmd.env("TERM", &config.term);

    let child = pair.slave.spawn_command(cmd).map_err(|e| Error::Spawn {
        reason: format!("failed to spawn `{}`: {e}", path.display()),
    })?;

    let reader = pair
        .master
        .try_clone_reader()
        .map_err(|e| Error::Spawn {
            reason: format!("failed to clone PTY reader: {e}"),
        })?;
    let writer = pair.master.take_writer().map_err(|e| Error::Spawn {
        reason: format!("failed to take PTY writer: {e}"),
    })?;

    info!(program = %path.display(), %geometry, "spawned terminal process");

    Ok(PtyProcess {
        child,
        master: pair.master,
        reader,
        writer,
    })
}
