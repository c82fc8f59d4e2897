use anyhow::{Context, Result};
use tracing::warn;

use crate::events::AudioEvent;

/// Bytes per emitted audio chunk.
pub const CHUNK_BYTES: usize = 8192;

/// Sample rate of synthesized PCM (16-bit mono).
pub const TTS_SAMPLE_RATE: u32 = 24000;

pub const DEFAULT_VOICE: &str = "nova";

pub const VALID_VOICES: &[&str] = &[
    "alloy", "echo", "fable", "onyx", "nova", "shimmer", "ash", "coral", "sage",
];

const TTS_MODEL: &str = "tts-1";

/// Resolve a requested voice id against the configured default. Anything
/// unrecognized falls back to the default; a misconfigured default falls back
/// to the built-in one.
pub fn resolve_voice<'a>(voice: Option<&'a str>, default: &'a str) -> &'a str {
    match voice {
        Some(v) if VALID_VOICES.contains(&v) => v,
        _ if VALID_VOICES.contains(&default) => default,
        _ => DEFAULT_VOICE,
    }
}

/// Synthesis capability: text in, raw 24 kHz mono s16le PCM out.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, voice: &str, text: &str) -> Result<Vec<u8>>;
}

/// OpenAI speech API backend.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiSpeech {
    pub fn new(base_url: String, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("OpenAI API key is required (set OPENAI_API_KEY)");
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }
}

#[async_trait::async_trait]
impl SpeechBackend for OpenAiSpeech {
    async fn synthesize(&self, voice: &str, text: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": TTS_MODEL,
                "voice": voice,
                "input": text,
                "response_format": "pcm",
            }))
            .send()
            .await
            .context("Speech request failed")?
            .error_for_status()
            .context("Speech request rejected")?;

        let audio = response
            .bytes()
            .await
            .context("Failed to read speech response")?;

        Ok(audio.to_vec())
    }
}

/// Frame raw s16le mono PCM as a WAV file, for the voice-preview endpoint.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
        for pair in pcm.chunks_exact(2) {
            writer
                .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize().context("Failed to finalize WAV")?;
    }

    Ok(cursor.into_inner())
}

/// Per-utterance synthesis: one request per finalized agent reply, streamed
/// back as fixed-size chunks plus a terminal `done` marker.
pub struct SpeechSynthesizer {
    backend: std::sync::Arc<dyn SpeechBackend>,
    voice: String,
}

impl SpeechSynthesizer {
    pub fn new(backend: std::sync::Arc<dyn SpeechBackend>, voice: impl Into<String>) -> Self {
        Self {
            backend,
            voice: voice.into(),
        }
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize one utterance. The returned sequence always ends with
    /// exactly one empty `done` marker, so a client playback loop can never
    /// hang on a failed synthesis; the failure itself is isolated to this
    /// utterance and logged.
    pub async fn speak(&self, text: &str) -> Vec<AudioEvent> {
        let mut events = Vec::new();

        match self.backend.synthesize(&self.voice, text).await {
            Ok(pcm) => {
                for chunk in pcm.chunks(CHUNK_BYTES) {
                    events.push(AudioEvent::chunk(chunk.to_vec()));
                }
            }
            Err(e) => {
                warn!("Synthesis failed for utterance: {e:#}");
            }
        }

        events.push(AudioEvent::done());
        events
    }
}
