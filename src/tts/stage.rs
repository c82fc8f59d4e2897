use base64::Engine;
use tracing::debug;

use super::SpeechSynthesizer;
use crate::events::{EventQueue, EventStream, VoiceEvent};

/// Pipeline stage between the turn manager and the wire.
///
/// Every event passes through unchanged. Agent text fragments are additionally
/// accumulated into one utterance buffer; when the turn ends and the buffer is
/// non-blank, the utterance is synthesized and the resulting audio chunks are
/// appended as base64 `tts_chunk` events. The buffer is cleared whether or not
/// synthesis succeeded.
pub async fn synthesis_stage(
    synthesizer: SpeechSynthesizer,
    mut input: EventStream<VoiceEvent>,
    out: EventQueue<VoiceEvent>,
) {
    let mut utterance = String::new();

    while let Some(event) = input.next().await {
        let turn_ended = matches!(event, VoiceEvent::AgentEnd { .. });
        if let VoiceEvent::AgentChunk { text, .. } = &event {
            if !text.trim().is_empty() {
                utterance.push_str(text);
            }
        }

        out.push(event);

        if turn_ended {
            if !utterance.trim().is_empty() {
                for audio in synthesizer.speak(&utterance).await {
                    let encoded = base64::engine::general_purpose::STANDARD.encode(&audio.payload);
                    out.push(VoiceEvent::tts_chunk(encoded, audio.done));
                }
            }
            utterance.clear();
        }
    }

    debug!("Synthesis stage stopped");
    out.cancel();
}
