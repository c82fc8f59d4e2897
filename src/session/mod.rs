//! Interview session management
//!
//! This module owns everything scoped to one live connection:
//! - the persistence contract (`SessionStore`) the pipeline reads and writes
//! - the hidden prompt payloads (greeting, priming context, end command)
//! - pipeline wiring: VAD → STT → turn manager → synthesis, stitched with
//!   event queues
//! - the `SessionOrchestrator` and its turn state machine, the single point
//!   of wire serialization for a session

mod orchestrator;
mod pipeline;
pub mod prompts;
mod store;

pub use orchestrator::{Session, SessionOrchestrator, TurnState};
pub use pipeline::{spawn_pipeline, AudioInput, Pipeline};
pub use store::{
    FeedbackPayload, FeedbackSummary, MemorySessionStore, QuestionEntry, QuestionFeedback,
    SessionRecord, SessionStore,
};
