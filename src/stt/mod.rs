//! Streaming speech-to-text client
//!
//! This module owns one lazily-established connection per session to the
//! streaming transcription backend:
//! - `messages`: the closed set of backend message shapes and their mapping
//!   to transcript events
//! - `client`: the `SpeechTranscriber` (outgoing audio batching) and the
//!   `SttConnector`/`SttTransport` seam that the real WebSocket connector
//!   plugs into

mod client;
pub mod messages;

pub use client::{
    AssemblyAiConnector, SpeechTranscriber, SttConfig, SttConnector, SttTransport, MIN_FLUSH_BYTES,
};
pub use messages::{SttMessage, TurnMessage};
