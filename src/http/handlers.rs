use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use serde::Deserialize;
use tracing::error;

use super::state::AppState;
use crate::session::prompts::VOICE_SAMPLE_TEXT;
use crate::tts::{pcm_to_wav, resolve_voice, TTS_SAMPLE_RATE};

#[derive(Debug, Deserialize)]
pub struct SampleParams {
    #[serde(rename = "voiceId")]
    pub voice_id: Option<String>,
}

/// GET /voice/sample?voiceId=...
/// Synthesize a short fixed demo line with the requested voice and return it
/// as a WAV clip. Independent of any session.
pub async fn voice_sample(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> impl IntoResponse {
    let Some(requested) = params.voice_id else {
        return (StatusCode::BAD_REQUEST, "Missing voiceId").into_response();
    };
    let voice = resolve_voice(Some(&requested), &state.config.tts.default_voice);

    let pcm = match state.speech.synthesize(voice, VOICE_SAMPLE_TEXT).await {
        Ok(pcm) => pcm,
        Err(e) => {
            error!("Voice sample synthesis failed: {e:#}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "TTS failed").into_response();
        }
    };

    match pcm_to_wav(&pcm, TTS_SAMPLE_RATE) {
        Ok(wav) => ([(header::CONTENT_TYPE, "audio/wav")], wav).into_response(),
        Err(e) => {
            error!("Failed to frame voice sample as WAV: {e:#}");
            (StatusCode::INTERNAL_SERVER_ERROR, "TTS failed").into_response()
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
