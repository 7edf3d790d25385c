//! Embedded control protocol for the terminal relay channel.
//!
//! The websocket carries both raw terminal bytes and geometry-change
//! requests on a single channel. A text message whose first non-whitespace
//! character is `{` and which parses as a two-field positive-integer JSON
//! object is a resize directive; everything else is raw input. The
//! classification is deliberately heuristic: there is no message-type tag,
//! so a literal input line shaped like a directive is consumed as one.

use serde::Deserialize;

/// Terminal dimensions (rows, columns) of a pseudo-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub rows: u16,
    pub cols: u16,
}

impl Default for Geometry {
    /// The geometry every session starts with before the first resize.
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A geometry-change request received from the client.
///
/// Valid only for the message it arrived in; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ControlDirective {
    #[serde(alias = "columns")]
    pub cols: u16,
    pub rows: u16,
}

impl ControlDirective {
    /// The geometry this directive requests.
    pub const fn geometry(self) -> Geometry {
        Geometry {
            rows: self.rows,
            cols: self.cols,
        }
    }
}

/// Classify a text message from the relay channel.
///
/// Returns `Some` when the message is a well-formed resize directive with
/// strictly positive dimensions. Returns `None` for everything else, in
/// which case the caller must forward the original bytes verbatim to the
/// process input.
pub fn classify(text: &str) -> Option<ControlDirective> {
    if !text.trim_start().starts_with('{') {
        return None;
    }
    let directive: ControlDirective = serde_json::from_str(text).ok()?;
    (directive.cols > 0 && directive.rows > 0).then_some(directive)
}
