use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub stt: SttSettings,
    pub agent: AgentSettings,
    pub tts: TtsSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SttSettings {
    /// Streaming transcription WebSocket endpoint
    pub url: String,
    /// Inbound microphone sample rate in Hz
    pub sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct TtsSettings {
    pub base_url: String,
    pub default_voice: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    /// Seconds of listening before the microphone is force-flushed
    pub listen_timeout_secs: u64,
    /// Seconds to wait for the final feedback turn after end_session
    pub end_grace_secs: u64,
    /// RMS threshold for the voice activity gate
    pub vad_threshold: f64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
