//! HTTP surface: landing page and websocket upgrade.

use std::sync::Arc;

use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::warn;
use ttyrelay_core::RelayConfig;

use crate::session::Session;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
}

const INDEX_HTML: &str = include_str!("static/index.html");

/// Build the relay router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — the embedded terminal client.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /ws` — upgrade the connection and hand it to a new session.
async fn ws_upgrade(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let origin = headers.get("origin").and_then(|v| v.to_str().ok());
    if !state.config.origin_allowed(origin) {
        warn!(origin = origin.unwrap_or("<none>"), "rejected upgrade from disallowed origin");
        return (StatusCode::FORBIDDEN, "Origin not allowed").into_response();
    }

    ws.on_upgrade(move |socket| Session::run(socket, state.config))
}
