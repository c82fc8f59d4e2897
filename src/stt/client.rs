use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::messages::SttMessage;
use crate::events::{channel, EventQueue, EventStream, TranscriptEvent};

/// Minimum accumulated bytes before audio is pushed over the wire. Bounds the
/// latency before recognition sees audio while avoiding tiny network writes.
pub const MIN_FLUSH_BYTES: usize = 3200;

const END_UTTERANCE_SILENCE_THRESHOLD_MS: u32 = 700;

/// Connection settings for the streaming transcription backend.
#[derive(Debug, Clone)]
pub struct SttConfig {
    pub url: String,
    pub api_key: String,
    pub sample_rate: u32,
    pub format_turns: bool,
}

/// Outgoing half of an established transcription connection.
#[async_trait::async_trait]
pub trait SttTransport: Send {
    async fn send(&mut self, audio: &[u8]) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}

/// Establishes a transcription connection. The connector is responsible for
/// spawning whatever reader is needed to push decoded transcript events into
/// the supplied queue, and when the connection ends it must set the shared
/// `closed` flag and cancel that queue, so the sender side stops immediately.
#[async_trait::async_trait]
pub trait SttConnector: Send + Sync {
    async fn connect(
        &self,
        events: EventQueue<TranscriptEvent>,
        closed: Arc<AtomicBool>,
    ) -> Result<Box<dyn SttTransport>>;
}

/// Streaming STT client for one session.
///
/// Batches outgoing audio into `MIN_FLUSH_BYTES` writes and exposes decoded
/// transcript events through the stream returned by `new`. Exactly one
/// connection is created, lazily on the first flush, and is never recreated:
/// after a connect or send failure the client is closed and further sends are
/// no-ops.
pub struct SpeechTranscriber {
    connector: Arc<dyn SttConnector>,
    events: EventQueue<TranscriptEvent>,
    transport: Option<Box<dyn SttTransport>>,
    buffer: Vec<u8>,
    /// Shared with the connector's reader task, which sets it the moment the
    /// backend errors or hangs up, so in-flight sends become no-ops without
    /// waiting for a failed write.
    closed: Arc<AtomicBool>,
}

impl SpeechTranscriber {
    pub fn new(connector: Arc<dyn SttConnector>) -> (Self, EventStream<TranscriptEvent>) {
        let (events, stream) = channel();
        (
            Self {
                connector,
                events,
                transport: None,
                buffer: Vec::new(),
                closed: Arc::new(AtomicBool::new(false)),
            },
            stream,
        )
    }

    /// Append audio to the accumulator, flushing once it reaches the minimum
    /// write size.
    pub async fn send_audio(&mut self, audio: &[u8]) {
        if self.is_closed() {
            return;
        }

        self.buffer.extend_from_slice(audio);

        if self.buffer.len() >= MIN_FLUSH_BYTES {
            self.flush_buffer().await;
        }
    }

    /// Force transmission of a sub-threshold remainder, e.g. at stream end or
    /// when the listen timer fires.
    pub async fn flush_audio(&mut self) {
        if self.is_closed() || self.buffer.is_empty() {
            return;
        }
        self.flush_buffer().await;
    }

    /// Bytes currently held in the accumulator.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Close the connection and cancel the transcript stream. Idempotent.
    pub async fn close(&mut self) {
        self.closed.store(true, Ordering::Relaxed);
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close().await {
                warn!("Error closing STT connection: {e:#}");
            }
        }
        self.events.cancel();
    }

    async fn flush_buffer(&mut self) {
        if self.transport.is_none() {
            let connect = self
                .connector
                .connect(self.events.clone(), Arc::clone(&self.closed));
            match connect.await {
                Ok(transport) => self.transport = Some(transport),
                Err(e) => {
                    error!("Failed to connect to STT backend: {e:#}");
                    self.closed.store(true, Ordering::Relaxed);
                    self.events.cancel();
                    return;
                }
            }
        }

        // The backend may have failed between the connect and this write.
        if self.is_closed() {
            return;
        }

        if let Some(transport) = self.transport.as_mut() {
            if let Err(e) = transport.send(&self.buffer).await {
                warn!("STT send failed, closing client: {e:#}");
                self.closed.store(true, Ordering::Relaxed);
                self.events.cancel();
                return;
            }
            self.buffer.clear();
        }
    }
}

/// Real connector for the AssemblyAI v3 streaming API.
pub struct AssemblyAiConnector {
    config: SttConfig,
}

impl AssemblyAiConnector {
    /// Fails when no API credential is configured; that is a fatal
    /// configuration error, caught at startup rather than mid-session.
    pub fn new(config: SttConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("AssemblyAI API key is required (set ASSEMBLYAI_API_KEY)");
        }
        Ok(Self { config })
    }

    fn websocket_url(&self) -> String {
        format!(
            "{}?sample_rate={}&format_turns={}&end_utterance_silence_threshold={}",
            self.config.url,
            self.config.sample_rate,
            self.config.format_turns,
            END_UTTERANCE_SILENCE_THRESHOLD_MS,
        )
    }
}

#[async_trait::async_trait]
impl SttConnector for AssemblyAiConnector {
    async fn connect(
        &self,
        events: EventQueue<TranscriptEvent>,
        closed: Arc<AtomicBool>,
    ) -> Result<Box<dyn SttTransport>> {
        let mut request = self
            .websocket_url()
            .into_client_request()
            .context("Invalid STT WebSocket URL")?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&self.config.api_key).context("Invalid STT API key")?,
        );

        let (socket, _) = connect_async(request)
            .await
            .context("Failed to connect to STT backend")?;
        info!("Connected to STT backend");

        let (sink, mut reader) = socket.split();

        tokio::spawn(async move {
            while let Some(frame) = reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        let message: SttMessage = match serde_json::from_str(&text) {
                            Ok(m) => m,
                            Err(_) => continue,
                        };
                        match message {
                            SttMessage::Begin { id, .. } => {
                                debug!("STT session began: {id}");
                            }
                            SttMessage::Turn(turn) => {
                                if let Some(event) = turn.into_transcript() {
                                    events.push(event);
                                }
                            }
                            SttMessage::Termination {
                                audio_duration_seconds,
                                ..
                            } => {
                                debug!("STT session terminated after {audio_duration_seconds}s of audio");
                            }
                            SttMessage::Error { error: message } => {
                                error!("STT backend error: {message}");
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("STT read error: {e}");
                        break;
                    }
                }
            }
            closed.store(true, Ordering::Relaxed);
            events.cancel();
            debug!("STT reader task stopped");
        });

        Ok(Box::new(WsTransport { sink }))
    }
}

struct WsTransport {
    sink: futures::stream::SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
}

#[async_trait::async_trait]
impl SttTransport for WsTransport {
    async fn send(&mut self, audio: &[u8]) -> Result<()> {
        self.sink
            .send(Message::Binary(audio.to_vec()))
            .await
            .context("Failed to send audio frame")
    }

    async fn close(&mut self) -> Result<()> {
        self.sink.close().await.context("Failed to close STT socket")
    }
}
