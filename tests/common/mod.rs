// Shared fakes for the pipeline and HTTP integration tests.
//
// Each fake stands in for one external capability behind its trait seam, so
// the tests exercise the real pipeline wiring without any network.
#![allow(dead_code)]

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use interview_agent::agent::{AgentMessage, AgentThread, ConversationalAgent};
use interview_agent::config::{
    AgentSettings, Config, HttpConfig, ServiceConfig, SessionSettings, SttSettings, TtsSettings,
};
use interview_agent::events::{EventQueue, EventStream, TranscriptEvent, VoiceEvent};
use interview_agent::stt::{SttConnector, SttTransport};
use interview_agent::tts::SpeechBackend;
use interview_agent::vad::FRAME_BYTES;

/// STT connector that records every outgoing write and hands the transcript
/// queue back to the test, which then plays the role of the backend.
#[derive(Default)]
pub struct RecordingConnector {
    pub sent: Arc<Mutex<Vec<Vec<u8>>>>,
    pub transcripts: Arc<Mutex<Option<EventQueue<TranscriptEvent>>>>,
}

struct RecordingTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait]
impl SttConnector for RecordingConnector {
    async fn connect(
        &self,
        events: EventQueue<TranscriptEvent>,
        _closed: Arc<AtomicBool>,
    ) -> Result<Box<dyn SttTransport>> {
        *self.transcripts.lock().unwrap() = Some(events);
        Ok(Box::new(RecordingTransport {
            sent: Arc::clone(&self.sent),
        }))
    }
}

#[async_trait]
impl SttTransport for RecordingTransport {
    async fn send(&mut self, audio: &[u8]) -> Result<()> {
        self.sent.lock().unwrap().push(audio.to_vec());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Connector whose connection attempt always fails.
pub struct FailingConnector;

#[async_trait]
impl SttConnector for FailingConnector {
    async fn connect(
        &self,
        _events: EventQueue<TranscriptEvent>,
        _closed: Arc<AtomicBool>,
    ) -> Result<Box<dyn SttTransport>> {
        anyhow::bail!("connection refused")
    }
}

/// Synthesis backend returning a fixed PCM buffer for any text.
pub struct CannedSpeech {
    pub pcm: Vec<u8>,
}

#[async_trait]
impl SpeechBackend for CannedSpeech {
    async fn synthesize(&self, _voice: &str, _text: &str) -> Result<Vec<u8>> {
        Ok(self.pcm.clone())
    }
}

/// Synthesis backend that records the voice of every request.
pub struct VoiceRecorder {
    pub voices: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SpeechBackend for VoiceRecorder {
    async fn synthesize(&self, voice: &str, _text: &str) -> Result<Vec<u8>> {
        self.voices.lock().unwrap().push(voice.to_string());
        Ok(vec![0u8; 32])
    }
}

/// Synthesis backend that always fails.
pub struct FailingSpeech;

#[async_trait]
impl SpeechBackend for FailingSpeech {
    async fn synthesize(&self, _voice: &str, _text: &str) -> Result<Vec<u8>> {
        anyhow::bail!("synthesis unavailable")
    }
}

/// Agent that answers every turn with a single text fragment.
pub struct EchoAgent;

#[async_trait]
impl ConversationalAgent for EchoAgent {
    async fn run_turn(
        &self,
        _thread: &mut AgentThread,
        user_text: &str,
        events: &EventQueue<AgentMessage>,
    ) -> Result<()> {
        events.push(AgentMessage::Text(format!("You said {user_text}")));
        Ok(())
    }
}

/// One frame of pure silence.
pub fn silent_frame() -> Vec<u8> {
    vec![0u8; FRAME_BYTES]
}

/// One frame where every sample has the given amplitude.
pub fn frame_of(sample: i16) -> Vec<u8> {
    sample
        .to_le_bytes()
        .iter()
        .copied()
        .cycle()
        .take(FRAME_BYTES)
        .collect()
}

/// Configuration for in-process test servers; endpoints point nowhere because
/// every capability is faked.
pub fn test_config() -> Config {
    Config {
        service: ServiceConfig {
            name: "interview-agent".into(),
            http: HttpConfig {
                bind: "127.0.0.1".into(),
                port: 0,
            },
        },
        stt: SttSettings {
            url: "wss://localhost/v3/ws".into(),
            sample_rate: 16000,
        },
        agent: AgentSettings {
            base_url: "http://localhost/v1".into(),
            model: "gpt-4o".into(),
        },
        tts: TtsSettings {
            base_url: "http://localhost/v1".into(),
            default_voice: "nova".into(),
        },
        session: SessionSettings {
            listen_timeout_secs: 30,
            end_grace_secs: 30,
            vad_threshold: 5.0,
        },
    }
}

/// Drain an event stream to completion.
pub async fn collect_events(mut stream: EventStream<VoiceEvent>) -> Vec<VoiceEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}
