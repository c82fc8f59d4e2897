use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use base64::Engine;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use super::pipeline::{spawn_pipeline, AudioInput};
use super::prompts;
use super::store::{SessionRecord, SessionStore};
use crate::agent::ConversationalAgent;
use crate::events::{ClientMessage, ControlDirective, PipelineInput, VoiceEvent};
use crate::stt::SttConnector;
use crate::tts::{SpeechBackend, SpeechSynthesizer};

/// Close code sent when the session id is missing or unknown.
const POLICY_VIOLATION: u16 = 1008;

/// Conversation state for one connection. Only the orchestrator mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Connecting,
    Greeting,
    Listening,
    Processing,
    Speaking,
    Ended,
}

/// One live interview session. Created when the connection is accepted,
/// destroyed when it closes.
pub struct Session {
    pub id: String,

    /// Conversational continuity for the agent capability, scoped to this
    /// connection
    pub thread_id: String,

    pub state: TurnState,
}

impl Session {
    fn from_record(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            thread_id: record.id.clone(),
            state: TurnState::Connecting,
        }
    }
}

/// Owns one duplex connection end to end: loads the session record, speaks
/// the greeting, wires the pipeline, drives the turn state machine, and is
/// the single writer of outward events to the socket.
pub struct SessionOrchestrator {
    store: Arc<dyn SessionStore>,
    agent: Arc<dyn ConversationalAgent>,
    speech: Arc<dyn SpeechBackend>,
    stt: Arc<dyn SttConnector>,
    voice: String,
    listen_timeout: Duration,
    end_grace: Duration,
    vad_threshold: f64,
}

impl SessionOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn SessionStore>,
        agent: Arc<dyn ConversationalAgent>,
        speech: Arc<dyn SpeechBackend>,
        stt: Arc<dyn SttConnector>,
        voice: String,
        listen_timeout: Duration,
        end_grace: Duration,
        vad_threshold: f64,
    ) -> Self {
        Self {
            store,
            agent,
            speech,
            stt,
            voice,
            listen_timeout,
            end_grace,
            vad_threshold,
        }
    }

    pub async fn run(self, mut socket: WebSocket, session_id: Option<String>) {
        let record = match self.accept(&mut socket, session_id).await {
            Some(record) => record,
            None => return,
        };

        let greeting = prompts::greeting_for(&record);
        let prime = (record.resume_text.is_some() || record.job_description.is_some())
            .then(|| prompts::prime_context(&record));

        let mut session = Session::from_record(&record);
        info!("Session {} connected", session.id);

        let pipeline = spawn_pipeline(
            Arc::clone(&self.agent),
            Arc::clone(&self.stt),
            SpeechSynthesizer::new(Arc::clone(&self.speech), self.voice.clone()),
            &session.thread_id,
            self.vad_threshold,
        );

        if let Some(prompt) = prime {
            pipeline.input.push(PipelineInput::Control(
                ControlDirective::PrimeSession { prompt },
            ));
        }

        let (mut ws_tx, mut ws_rx) = socket.split();

        // The greeting is spoken immediately, before the main pipeline has
        // anything to say.
        self.transition(&mut session, TurnState::Greeting);
        if self.speak_greeting(&mut ws_tx, greeting).await.is_err() {
            warn!("Session {}: connection lost during greeting", session.id);
            pipeline.audio.cancel();
            pipeline.input.cancel();
            return;
        }

        self.transition(&mut session, TurnState::Listening);
        let mut listen_deadline = Instant::now() + self.listen_timeout;
        let mut end_deadline: Option<Instant> = None;
        let mut final_turn_ended = false;
        let mut events = pipeline.events;

        loop {
            let grace = end_deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                inbound = ws_rx.next() => {
                    match inbound {
                        Some(Ok(Message::Binary(data))) => {
                            // Microphone audio is only consumed while
                            // listening; the client mic is re-engaged when
                            // the done marker flips the state back.
                            if session.state == TurnState::Listening {
                                pipeline.audio.push(AudioInput::Frame(data));
                            }
                        }
                        Some(Ok(Message::Text(text))) => {
                            // Malformed control JSON is silently ignored.
                            if let Ok(ClientMessage::EndSession) = serde_json::from_str(&text) {
                                if session.state != TurnState::Ended {
                                    info!("Session {}: end of interview requested", session.id);
                                    pipeline.input.push(PipelineInput::Control(
                                        ControlDirective::EndInterview {
                                            prompt: prompts::end_interview_command(&session.id),
                                        },
                                    ));
                                    self.transition(&mut session, TurnState::Ended);
                                    end_deadline = Some(Instant::now() + self.end_grace);
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!("Session {}: socket error: {e}", session.id);
                            break;
                        }
                    }
                }
                outbound = events.next() => {
                    let Some(event) = outbound else { break };

                    self.observe(&mut session, &event, &mut listen_deadline, &mut final_turn_ended);

                    let Ok(frame) = serde_json::to_string(&event) else { continue };
                    if ws_tx.send(Message::Text(frame)).await.is_err() {
                        break;
                    }

                    if session.state == TurnState::Ended
                        && final_turn_ended
                        && matches!(event, VoiceEvent::TtsChunk { done: true, .. })
                    {
                        info!("Session {}: final turn spoken, closing", session.id);
                        break;
                    }
                }
                _ = sleep_until(listen_deadline), if session.state == TurnState::Listening => {
                    debug!("Session {}: listen timeout, flushing audio", session.id);
                    pipeline.audio.push(AudioInput::Flush);
                    self.transition(&mut session, TurnState::Processing);
                }
                _ = sleep_until(grace), if end_deadline.is_some() => {
                    warn!(
                        "Session {}: grace period elapsed before the final turn completed",
                        session.id
                    );
                    break;
                }
            }
        }

        // Cascade shutdown through the pipeline.
        pipeline.audio.cancel();
        pipeline.input.cancel();
        let _ = ws_tx.send(Message::Close(None)).await;
        info!("Session {} closed", session.id);
    }

    /// Validate the session id and load its record; on failure the connection
    /// is closed with a policy-violation code and no pipeline is started.
    async fn accept(
        &self,
        socket: &mut WebSocket,
        session_id: Option<String>,
    ) -> Option<SessionRecord> {
        let Some(id) = session_id else {
            warn!("Connection rejected: no session id");
            Self::reject(socket).await;
            return None;
        };

        match self.store.load_session(&id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                warn!("Connection rejected: unknown session {id}");
                Self::reject(socket).await;
                None
            }
            Err(e) => {
                error!("Failed to load session {id}: {e:#}");
                Self::reject(socket).await;
                None
            }
        }
    }

    async fn reject(socket: &mut WebSocket) {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: POLICY_VIOLATION,
                reason: "Invalid session".into(),
            })))
            .await;
    }

    /// Synthesize and stream the opening line. The greeting text is also sent
    /// as an agent chunk so the client can display it, and the utterance ends
    /// with an extra empty done marker on top of the synthesizer's own.
    async fn speak_greeting(
        &self,
        ws_tx: &mut SplitSink<WebSocket, Message>,
        greeting: &str,
    ) -> Result<(), axum::Error> {
        send_event(ws_tx, &VoiceEvent::agent_chunk(greeting)).await?;

        let greeter = SpeechSynthesizer::new(Arc::clone(&self.speech), self.voice.clone());
        for audio in greeter.speak(greeting).await {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&audio.payload);
            send_event(ws_tx, &VoiceEvent::tts_chunk(encoded, audio.done)).await?;
        }

        send_event(ws_tx, &VoiceEvent::tts_chunk("", true)).await
    }

    fn transition(&self, session: &mut Session, next: TurnState) {
        debug!(
            "Session {}: {:?} -> {:?}",
            session.id, session.state, next
        );
        session.state = next;
    }

    /// Update the state machine from an outward-bound event before it is
    /// written to the wire.
    fn observe(
        &self,
        session: &mut Session,
        event: &VoiceEvent,
        listen_deadline: &mut Instant,
        final_turn_ended: &mut bool,
    ) {
        match event {
            VoiceEvent::SttOutput { .. } => {
                if session.state == TurnState::Listening {
                    self.transition(session, TurnState::Processing);
                }
            }
            VoiceEvent::AgentEnd { .. } => {
                if session.state == TurnState::Ended {
                    *final_turn_ended = true;
                }
            }
            VoiceEvent::TtsChunk { done: false, .. } => {
                if session.state == TurnState::Processing {
                    self.transition(session, TurnState::Speaking);
                }
            }
            VoiceEvent::TtsChunk { done: true, .. } => {
                if session.state != TurnState::Ended {
                    self.transition(session, TurnState::Listening);
                    *listen_deadline = Instant::now() + self.listen_timeout;
                }
            }
            _ => {}
        }
    }
}

async fn send_event(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    event: &VoiceEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(frame) => ws_tx.send(Message::Text(frame)).await,
        Err(e) => {
            warn!("Failed to encode event: {e}");
            Ok(())
        }
    }
}
