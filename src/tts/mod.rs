//! Streaming text-to-speech client
//!
//! Turns finalized agent utterances into playable PCM chunks. The
//! `SpeechBackend` trait is the seam to the synthesis API; `SpeechSynthesizer`
//! handles chunk framing and the always-emitted completion marker; the
//! synthesis stage accumulates agent text between turn boundaries.

mod client;
mod stage;

pub use client::{
    pcm_to_wav, resolve_voice, OpenAiSpeech, SpeechBackend, SpeechSynthesizer, CHUNK_BYTES,
    DEFAULT_VOICE, TTS_SAMPLE_RATE, VALID_VOICES,
};
pub use stage::synthesis_stage;
