pub mod agent;
pub mod config;
pub mod events;
pub mod http;
pub mod session;
pub mod stt;
pub mod tts;
pub mod vad;

pub use agent::{
    AgentMessage, AgentThread, ChatAgent, ConversationalAgent, ConversationalTurnManager,
    InterviewToolbox,
};
pub use config::Config;
pub use events::{
    AudioEvent, ClientMessage, ControlDirective, EventQueue, EventStream, PipelineInput,
    TranscriptEvent, VoiceEvent,
};
pub use http::{create_router, AppState};
pub use session::{
    spawn_pipeline, AudioInput, FeedbackPayload, MemorySessionStore, Session, SessionOrchestrator,
    SessionRecord, SessionStore, TurnState,
};
pub use stt::{AssemblyAiConnector, SpeechTranscriber, SttConfig, SttConnector, SttTransport};
pub use tts::{OpenAiSpeech, SpeechBackend, SpeechSynthesizer};
pub use vad::VoiceActivityFilter;
