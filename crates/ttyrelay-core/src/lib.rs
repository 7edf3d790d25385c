//! `ttyrelay` Core Library
//!
//! Shared functionality for `ttyrelay` components:
//! - Control directive classification for the websocket channel
//! - Relay configuration
//! - Common error types

pub mod config;
pub mod control;
pub mod error;
pub mod tracing_init;

pub use config::RelayConfig;
pub use control::{ControlDirective, Geometry, classify};
pub use error::{Error, Result};
