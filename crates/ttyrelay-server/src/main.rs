//! `ttyrelay` server binary.
//!
//! Serves the landing page and the websocket endpoint; every accepted
//! upgrade runs one terminal-program session under a fresh PTY.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use ttyrelay_core::RelayConfig;
use ttyrelay_server::routes::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "ttyrelay-server")]
#[command(version, about = "Web terminal relay - PTY sessions over websockets")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "TTYRELAY_ADDR")]
    addr: SocketAddr,

    /// Terminal program to run per session, resolved against the working
    /// directory first, then the install directory.
    #[arg(long, default_value = "ttyapp", env = "TTYRELAY_PROGRAM")]
    program: String,

    /// Fallback installation directory for the terminal program
    #[arg(long, default_value = "/usr/local/bin", env = "TTYRELAY_INSTALL_DIR")]
    install_dir: PathBuf,

    /// TERM value exported to the terminal program
    #[arg(long, default_value = "xterm-256color", env = "TTYRELAY_TERM")]
    term: String,

    /// Allowed Origin header values for the websocket upgrade (repeatable).
    /// When empty, all origins are accepted.
    #[arg(long = "allowed-origin", env = "TTYRELAY_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// PTY read chunk size in bytes
    #[arg(long, default_value_t = 1024, env = "TTYRELAY_READ_BUFFER")]
    read_buffer_size: usize,

    /// Log level filter (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "TTYRELAY_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "TTYRELAY_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_filter = format!("ttyrelay_server={0},ttyrelay_core={0}", args.log_level);
    ttyrelay_core::tracing_init::init_tracing(&log_filter, args.log_json);

    let config = Arc::new(RelayConfig {
        program: args.program,
        install_dir: args.install_dir,
        term: args.term,
        allowed_origins: args.allowed_origins,
        read_buffer_size: args.read_buffer_size,
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        program = %config.program,
        "starting ttyrelay-server"
    );

    let app = build_router(AppState { config });
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
