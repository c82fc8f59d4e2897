//! Event plumbing between pipeline stages
//!
//! Every stage of a session pipeline talks to its neighbors through an
//! `EventQueue`/`EventStream` pair: producers push without blocking, the single
//! consumer awaits the next value, and `cancel()` tears the stream down. The
//! event types here are the shapes that cross those queues and the wire.

mod queue;
mod types;

pub use queue::{channel, EventQueue, EventStream};
pub use types::{
    AudioEvent, ClientMessage, ControlDirective, PipelineInput, TranscriptEvent, VoiceEvent,
};
