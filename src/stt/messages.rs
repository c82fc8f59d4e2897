use serde::Deserialize;

use crate::events::TranscriptEvent;

/// Inbound message from the streaming transcription backend.
///
/// The set is closed: anything that fails to decode is dropped by the reader.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum SttMessage {
    /// Connection handshake; carries the backend session id. Ignored here.
    Begin {
        id: String,
        #[serde(default)]
        expires_at: i64,
    },

    /// Live recognition state for the current turn.
    Turn(TurnMessage),

    /// Backend is about to close the connection. Ignored here.
    Termination {
        #[serde(default)]
        audio_duration_seconds: f64,
        #[serde(default)]
        session_duration_seconds: f64,
    },

    /// Fatal backend error; the connection is done.
    Error { error: String },
}

#[derive(Debug, Deserialize)]
pub struct TurnMessage {
    #[serde(default)]
    pub turn_order: u32,

    /// Formatted turns are the backend's finalized text for the utterance
    pub turn_is_formatted: bool,

    #[serde(default)]
    pub end_of_turn: bool,

    pub transcript: String,

    #[serde(default)]
    pub end_of_turn_confidence: f64,
}

impl TurnMessage {
    /// Map a turn update onto the pipeline's transcript event. Formatted turns
    /// with an empty transcript carry no work and map to `None`.
    pub fn into_transcript(self) -> Option<TranscriptEvent> {
        if self.turn_is_formatted {
            if self.transcript.is_empty() {
                None
            } else {
                Some(TranscriptEvent::finalized(self.transcript))
            }
        } else {
            Some(TranscriptEvent::interim(self.transcript))
        }
    }
}
