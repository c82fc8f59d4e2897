use std::sync::Arc;

use tracing::{debug, warn};

use super::{AgentMessage, AgentThread, ConversationalAgent};
use crate::events::{channel, ControlDirective, EventQueue, EventStream, PipelineInput, VoiceEvent};

/// Bridges finalized transcripts and control directives to the agent
/// capability, demultiplexing its streamed output into outward events.
///
/// Visibility rules:
/// - interim transcripts are forwarded as `stt_chunk` and go no further;
/// - final transcripts are echoed as `stt_output` and run as a visible turn
///   (fragments, tool activity, then exactly one `agent_end`);
/// - `PrimeSession` runs a fully suppressed turn: the prompt is consumed, the
///   agent's output is discarded, nothing reaches the client;
/// - `EndInterview` runs an unechoed turn whose output stays visible, so the
///   closing words are still spoken.
pub struct ConversationalTurnManager {
    agent: Arc<dyn ConversationalAgent>,
    thread: AgentThread,
}

impl ConversationalTurnManager {
    pub fn new(agent: Arc<dyn ConversationalAgent>, thread_id: impl Into<String>) -> Self {
        Self {
            agent,
            thread: AgentThread::new(thread_id),
        }
    }

    /// Consume pipeline inputs until the queue ends, then cancel downstream.
    pub async fn run(mut self, mut input: EventStream<PipelineInput>, out: EventQueue<VoiceEvent>) {
        while let Some(item) = input.next().await {
            match item {
                PipelineInput::Transcript(transcript) => {
                    if !transcript.is_final {
                        out.push(VoiceEvent::stt_chunk(transcript.text));
                        continue;
                    }
                    out.push(VoiceEvent::stt_output(&transcript.text));
                    self.turn(&transcript.text, &out, true).await;
                }
                PipelineInput::Control(ControlDirective::PrimeSession { prompt }) => {
                    debug!("Running suppressed priming turn");
                    self.turn(&prompt, &out, false).await;
                }
                PipelineInput::Control(ControlDirective::EndInterview { prompt }) => {
                    debug!("Running end-of-interview turn");
                    self.turn(&prompt, &out, true).await;
                }
            }
        }

        debug!("Turn manager stopped for thread {}", self.thread.id);
        out.cancel();
    }

    async fn turn(&mut self, text: &str, out: &EventQueue<VoiceEvent>, visible: bool) {
        let (events, mut stream) = channel::<AgentMessage>();

        // Forward agent output live while the turn runs; for suppressed turns
        // the receiver is simply dropped and pushes go nowhere.
        let forwarder = if visible {
            let out = out.clone();
            Some(tokio::spawn(async move {
                while let Some(message) = stream.next().await {
                    out.push(message.into_event());
                }
            }))
        } else {
            None
        };

        let result = self.agent.run_turn(&mut self.thread, text, &events).await;
        events.cancel();

        if let Some(task) = forwarder {
            let _ = task.await;
        }

        if let Err(e) = result {
            warn!("Agent turn failed: {e:#}");
        }

        if visible {
            out.push(VoiceEvent::agent_end());
        }
    }
}

impl AgentMessage {
    fn into_event(self) -> VoiceEvent {
        match self {
            AgentMessage::Text(text) => VoiceEvent::agent_chunk(text),
            AgentMessage::ToolCall { id, name, args } => VoiceEvent::tool_call(id, name, args),
            AgentMessage::ToolResult {
                tool_call_id,
                name,
                result,
            } => VoiceEvent::tool_result(tool_call_id, name, result),
        }
    }
}
