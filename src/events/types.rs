use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recognized utterance fragment from the transcription backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Transcribed text
    pub text: String,

    /// Final transcripts are the unit of work for the agent; interim ones are
    /// advisory only
    pub is_final: bool,

    /// Epoch milliseconds when the event was produced
    pub ts: i64,
}

impl TranscriptEvent {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            ts: now_ms(),
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            ts: now_ms(),
        }
    }
}

/// A chunk of synthesized audio. A stream of payload chunks is terminated by
/// exactly one `done` marker with an empty payload.
#[derive(Debug, Clone)]
pub struct AudioEvent {
    pub payload: Vec<u8>,
    pub done: bool,
}

impl AudioEvent {
    pub fn chunk(payload: Vec<u8>) -> Self {
        Self {
            payload,
            done: false,
        }
    }

    pub fn done() -> Self {
        Self {
            payload: Vec::new(),
            done: true,
        }
    }
}

/// Outward wire event, serialized as `{"type": ..., ..., "ts": ...}` JSON text
/// frames on the session socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoiceEvent {
    /// Interim (partial) recognition of the current utterance
    SttChunk { transcript: String, ts: i64 },

    /// Finalized transcript, echoed so the client can log the conversation
    SttOutput { transcript: String, ts: i64 },

    /// A fragment of the interviewer's reply
    AgentChunk { text: String, ts: i64 },

    /// End of one agent turn; emitted exactly once per visible turn
    AgentEnd { ts: i64 },

    /// The agent invoked a tool
    ToolCall {
        id: String,
        name: String,
        args: Value,
        ts: i64,
    },

    /// The tool invocation resolved
    ToolResult {
        #[serde(rename = "toolCallId")]
        tool_call_id: String,
        name: String,
        result: String,
        ts: i64,
    },

    /// Base64-encoded PCM audio for playback; `done` closes the utterance
    TtsChunk { audio: String, done: bool, ts: i64 },
}

impl VoiceEvent {
    pub fn stt_chunk(transcript: impl Into<String>) -> Self {
        Self::SttChunk {
            transcript: transcript.into(),
            ts: now_ms(),
        }
    }

    pub fn stt_output(transcript: impl Into<String>) -> Self {
        Self::SttOutput {
            transcript: transcript.into(),
            ts: now_ms(),
        }
    }

    pub fn agent_chunk(text: impl Into<String>) -> Self {
        Self::AgentChunk {
            text: text.into(),
            ts: now_ms(),
        }
    }

    pub fn agent_end() -> Self {
        Self::AgentEnd { ts: now_ms() }
    }

    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self::ToolCall {
            id: id.into(),
            name: name.into(),
            args,
            ts: now_ms(),
        }
    }

    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self::ToolResult {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            result: result.into(),
            ts: now_ms(),
        }
    }

    pub fn tts_chunk(audio: impl Into<String>, done: bool) -> Self {
        Self::TtsChunk {
            audio: audio.into(),
            done,
            ts: now_ms(),
        }
    }
}

/// Input to the turn manager: either a transcript from the STT stage or an
/// injected control directive. Control payloads are a distinct variant so that
/// suppression is a type decision, not string matching on transcripts.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    Transcript(TranscriptEvent),
    Control(ControlDirective),
}

/// Hidden turns the orchestrator injects into the conversation. Neither
/// variant is ever echoed to the client transcript log.
#[derive(Debug, Clone)]
pub enum ControlDirective {
    /// Session-context priming at connection open; the agent's reply to it is
    /// discarded entirely
    PrimeSession { prompt: String },

    /// Explicit end-of-interview command; the agent's reply (goodbye plus the
    /// feedback tool call) is still emitted and spoken
    EndInterview { prompt: String },
}

/// Control envelope received from the client as a text frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    EndSession,
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
