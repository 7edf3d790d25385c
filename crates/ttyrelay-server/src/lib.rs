//! `ttyrelay` server library.
//!
//! Exposes an interactive terminal program to a browser client: an axum
//! HTTP server serves a landing page and a websocket endpoint; each
//! accepted upgrade spawns the program under a fresh pseudo-terminal and
//! relays bytes between the PTY and the socket until either side closes.

pub mod launcher;
pub mod routes;
pub mod session;
