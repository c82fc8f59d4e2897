use std::sync::Arc;

use tracing::debug;

use crate::agent::{ConversationalAgent, ConversationalTurnManager};
use crate::events::{channel, EventQueue, EventStream, PipelineInput, VoiceEvent};
use crate::stt::{SpeechTranscriber, SttConnector};
use crate::tts::{synthesis_stage, SpeechSynthesizer};
use crate::vad::VoiceActivityFilter;

/// Commands on the inbound audio queue.
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Raw PCM bytes from the connection, arbitrary chunk boundaries
    Frame(Vec<u8>),

    /// Force the STT accumulator out, used when the listen timer fires
    Flush,
}

/// Handles to one running session pipeline.
///
/// Cancellation cascades from here: cancelling `audio` ends the VAD/STT send
/// loop (which flushes and closes the STT connection, ending its transcript
/// stream), and cancelling `input` ends the turn manager, which cancels the
/// synthesis stage, which cancels `events`.
pub struct Pipeline {
    /// Raw audio in; single producer (the connection loop)
    pub audio: EventQueue<AudioInput>,

    /// Merged turn-manager input; the STT stage and the orchestrator's
    /// control injections interleave here
    pub input: EventQueue<PipelineInput>,

    /// Serialized outward events, ready for the wire
    pub events: EventStream<VoiceEvent>,
}

/// Wire up the stages of one session pipeline and spawn their tasks. Each
/// stage suspends only on queue reads and its own I/O; no state is shared
/// between stages except the queues.
pub fn spawn_pipeline(
    agent: Arc<dyn ConversationalAgent>,
    stt: Arc<dyn SttConnector>,
    synthesizer: SpeechSynthesizer,
    thread_id: &str,
    vad_threshold: f64,
) -> Pipeline {
    let (audio_tx, mut audio_rx) = channel::<AudioInput>();
    let (input_tx, input_rx) = channel::<PipelineInput>();
    let (agent_tx, agent_rx) = channel::<VoiceEvent>();
    let (wire_tx, wire_rx) = channel::<VoiceEvent>();

    let (mut transcriber, mut transcripts) = SpeechTranscriber::new(stt);

    // VAD → STT send loop
    tokio::spawn(async move {
        let mut vad = VoiceActivityFilter::new(vad_threshold);
        while let Some(command) = audio_rx.next().await {
            match command {
                AudioInput::Frame(bytes) => {
                    for frame in vad.filter(&bytes) {
                        transcriber.send_audio(&frame).await;
                    }
                }
                AudioInput::Flush => transcriber.flush_audio().await,
            }
        }
        transcriber.flush_audio().await;
        transcriber.close().await;
        debug!("Audio send loop stopped");
    });

    // STT transcripts → merged input. The merged queue is not cancelled when
    // transcription ends: control directives must still get through after an
    // STT failure.
    {
        let input = input_tx.clone();
        tokio::spawn(async move {
            while let Some(transcript) = transcripts.next().await {
                input.push(PipelineInput::Transcript(transcript));
            }
            debug!("Transcript forwarder stopped");
        });
    }

    let manager = ConversationalTurnManager::new(agent, thread_id);
    tokio::spawn(manager.run(input_rx, agent_tx));

    tokio::spawn(synthesis_stage(synthesizer, agent_rx, wire_tx));

    Pipeline {
        audio: audio_tx,
        input: input_tx,
        events: wire_rx,
    }
}
