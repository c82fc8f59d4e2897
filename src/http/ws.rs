use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::info;

use super::state::AppState;
use crate::session::SessionOrchestrator;
use crate::tts::resolve_voice;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,

    #[serde(rename = "voiceId")]
    pub voice_id: Option<String>,
}

/// GET /ws?sessionId=...&voiceId=...
/// Upgrade to the duplex interview connection and hand the socket to a
/// session orchestrator. Session validation happens after the upgrade so the
/// rejection can carry a close code.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let voice = resolve_voice(
        params.voice_id.as_deref(),
        &state.config.tts.default_voice,
    )
    .to_string();
    info!(
        "WebSocket upgrade requested (session: {:?}, voice: {voice})",
        params.session_id
    );

    let limits = &state.config.session;
    let orchestrator = SessionOrchestrator::new(
        Arc::clone(&state.store),
        Arc::clone(&state.agent),
        Arc::clone(&state.speech),
        Arc::clone(&state.stt),
        voice,
        Duration::from_secs(limits.listen_timeout_secs),
        Duration::from_secs(limits.end_grace_secs),
        limits.vad_threshold,
    );

    ws.on_upgrade(move |socket| orchestrator.run(socket, params.session_id))
}
