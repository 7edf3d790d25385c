//! Session coordinator and relay pumps.
//!
//! One session couples exactly one websocket connection, one child process,
//! and one pseudo-terminal for their entire lifetime. Two pumps run
//! concurrently: the output pump streams PTY output to the client as binary
//! frames, and the input demultiplexer routes client messages to the
//! process input, intercepting resize directives on the way. There is no
//! cancellation token; teardown closes the shared handles so whichever pump
//! is still blocked fails out promptly.

use std::io::{Read, Write};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use portable_pty::{MasterPty, PtySize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use ttyrelay_core::{ControlDirective, Error, Geometry, RelayConfig, Result, classify};

use crate::launcher::{self, PtyProcess};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Closing,
    Closed,
}

/// One client connection paired with one process and one PTY.
pub struct Session {
    id: String,
    geometry: Geometry,
    state: SessionState,
}

impl Session {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            geometry: Geometry::default(),
            state: SessionState::Active,
        }
    }

    /// Run one full session on an established websocket.
    ///
    /// Launches the terminal program; on launch failure a single diagnostic
    /// text message is sent and the session ends without starting any pump.
    pub async fn run(socket: WebSocket, config: Arc<RelayConfig>) {
        let mut session = Self::new();
        session.relay(socket, &config).await;
    }

    async fn relay(&mut self, mut socket: WebSocket, config: &RelayConfig) {
        info!(session = %self.id, "client connected");

        let process = match launcher::launch(config) {
            Ok(process) => process,
            Err(e) => {
                warn!(session = %self.id, error = %e, "could not start session");
                let _ = socket
                    .send(Message::Text(format!("Error starting terminal: {e}").into()))
                    .await;
                return;
            }
        };

        let PtyProcess {
            mut child,
            master,
            reader,
            writer,
        } = process;

        // Single writer per handle: the writer thread is the only PTY
        // writer, the output pump the only transport writer.
        let (input_tx, input_rx) = mpsc::channel::<Vec<u8>>(32);
        let _writer_thread = spawn_writer_thread(self.id.clone(), writer, input_rx);
        let (ws_sink, ws_stream) = socket.split();

        tokio::select! {
            bytes = pump_output(reader, ws_sink, config.read_buffer_size, &self.id) => {
                debug!(session = %self.id, bytes, "output pump finished first");
            }
            stats = pump_input(ws_stream, input_tx, master, &mut self.geometry, &self.id) => {
                debug!(
                    session = %self.id,
                    bytes = stats.bytes,
                    resizes = stats.resizes,
                    "input demultiplexer finished first",
                );
            }
        }

        // Coordinated teardown, regardless of which pump stopped: release
        // the PTY, terminate the child, and let the transport drop. Closing
        // the handles unblocks whichever sibling is still mid-read.
        self.state = SessionState::Closing;
        let _ = tokio::task::spawn_blocking(move || {
            if let Err(e) = child.kill() {
                debug!(error = %e, "kill after session end");
            }
            let _ = child.wait();
        })
        .await;

        self.state = SessionState::Closed;
        info!(session = %self.id, geometry = %self.geometry, "session closed");
    }
}

/// Apply a resize directive to the pseudo-terminal.
///
/// The device operation delivers the standard resize notification to the
/// attached process. Failures leave the current geometry unchanged.
fn apply_geometry(master: &dyn MasterPty, directive: ControlDirective) -> Result<Geometry> {
    let geometry = directive.geometry();
    master
        .resize(PtySize {
            rows: geometry.rows,
            cols: geometry.cols,
            pixel_width: 0,
            pixel_height: 0,
        })
        .map_err(|e| Error::Geometry {
            reason: e.to_string(),
        })?;
    Ok(geometry)
}

/// PTY output -> transport.
///
/// Reads bounded chunks off the blocking PTY reader and forwards them as
/// binary frames. Chunk boundaries carry no meaning; only byte order does.
/// Returns the total bytes forwarded.
async fn pump_output(
    mut reader: Box<dyn Read + Send>,
    mut sink: SplitSink<WebSocket, Message>,
    buffer_size: usize,
    session: &str,
) -> u64 {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let joined = tokio::task::spawn_blocking(move || {
            let result = reader.read(&mut buf);
            (reader, buf, result)
        })
        .await;

        let (returned_reader, returned_buf, result) = match joined {
            Ok(parts) => parts,
            Err(e) => {
                warn!(session, error = %e, "PTY read task failed");
                break;
            }
        };
        reader = returned_reader;
        buf = returned_buf;

        match result {
            Ok(0) => {
                debug!(session, "PTY reached end of stream");
                break;
            }
            Ok(n) => {
                total = total.saturating_add(u64::try_from(n).unwrap_or(u64::MAX));
                if sink
                    .send(Message::Binary(buf[..n].to_vec().into()))
                    .await
                    .is_err()
                {
                    debug!(session, "transport closed while forwarding output");
                    break;
                }
            }
            Err(e) => {
                // Expected when the child exits or teardown closes the PTY.
                debug!(session, error = %e, "PTY read ended");
                break;
            }
        }
    }

    total
}

#[derive(Debug, Default)]
struct InputStats {
    bytes: u64,
    resizes: u64,
}

/// Transport -> PTY input, with the embedded control channel.
///
/// Binary frames are forwarded verbatim. Text frames are classified first:
/// a valid resize directive goes to the geometry controller and is never
/// forwarded; anything else falls through as raw input bytes.
async fn pump_input(
    mut stream: SplitStream<WebSocket>,
    input_tx: mpsc::Sender<Vec<u8>>,
    master: Box<dyn MasterPty + Send>,
    geometry: &mut Geometry,
    session: &str,
) -> InputStats {
    let mut stats = InputStats::default();

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!(session, error = %e, "transport read ended");
                break;
            }
        };

        let payload: Vec<u8> = match message {
            Message::Binary(data) => data.to_vec(),
            Message::Text(text) => {
                if let Some(directive) = classify(text.as_str()) {
                    match apply_geometry(master.as_ref(), directive) {
                        Ok(applied) => {
                            *geometry = applied;
                            stats.resizes = stats.resizes.saturating_add(1);
                            debug!(session, geometry = %applied, "applied resize directive");
                        }
                        Err(e) => {
                            warn!(session, error = %e, "resize failed, directive dropped");
                        }
                    }
                    continue;
                }
                text.as_str().as_bytes().to_vec()
            }
            Message::Close(_) => {
                debug!(session, "client closed the connection");
                break;
            }
            // Ping/pong are answered by the protocol layer.
            Message::Ping(_) | Message::Pong(_) => continue,
        };

        stats.bytes = stats
            .bytes
            .saturating_add(u64::try_from(payload.len()).unwrap_or(u64::MAX));
        if input_tx.send(payload).await.is_err() {
            debug!(session, "process input closed");
            break;
        }
    }

    stats
}

/// Dedicated OS thread draining the input channel into the blocking PTY
/// writer. Exits when the channel closes or a write fails; dropping its
/// receiver is what surfaces write failures to the input demultiplexer.
fn spawn_writer_thread(
    session: String,
    mut writer: Box<dyn Write + Send>,
    mut input_rx: mpsc::Receiver<Vec<u8>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while let Some(data) = input_rx.blocking_recv() {
            if let Err(e) = writer.write_all(&data).and_then(|()| writer.flush()) {
                debug!(session, error = %e, "PTY write failed, stopping writer");
                break;
            }
        }
        debug!(session, "PTY writer thread finished");
    })
}
