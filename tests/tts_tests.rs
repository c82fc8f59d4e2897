// Chunk framing, voice resolution, WAV framing, and the synthesis stage's
// utterance accumulation.

mod common;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use common::{collect_events, CannedSpeech, FailingSpeech};
use interview_agent::events::{channel, VoiceEvent};
use interview_agent::tts::{
    pcm_to_wav, resolve_voice, synthesis_stage, SpeechBackend, SpeechSynthesizer, CHUNK_BYTES,
    DEFAULT_VOICE,
};

#[tokio::test]
async fn test_speak_chunks_audio_and_terminates() {
    let backend = Arc::new(CannedSpeech {
        pcm: vec![7u8; 20000],
    });
    let synthesizer = SpeechSynthesizer::new(backend, "nova");

    let events = synthesizer.speak("Tell me about yourself.").await;

    assert_eq!(events.len(), 4);
    assert_eq!(events[0].payload.len(), CHUNK_BYTES);
    assert_eq!(events[1].payload.len(), CHUNK_BYTES);
    assert_eq!(events[2].payload.len(), 20000 - 2 * CHUNK_BYTES);
    assert!(events[..3].iter().all(|e| !e.done));

    let last = events.last().unwrap();
    assert!(last.done);
    assert!(last.payload.is_empty());
}

#[tokio::test]
async fn test_speak_failure_still_emits_done() {
    let synthesizer = SpeechSynthesizer::new(Arc::new(FailingSpeech), "nova");

    let events = synthesizer.speak("Hello").await;

    assert_eq!(events.len(), 1);
    assert!(events[0].done);
}

#[tokio::test]
async fn test_speak_empty_audio_emits_only_done() {
    let synthesizer = SpeechSynthesizer::new(Arc::new(CannedSpeech { pcm: Vec::new() }), "nova");

    let events = synthesizer.speak("Hello").await;

    assert_eq!(events.len(), 1);
    assert!(events[0].done);
}

#[test]
fn test_resolve_voice() {
    assert_eq!(resolve_voice(Some("ash"), "nova"), "ash");
    assert_eq!(resolve_voice(Some("robot"), "coral"), "coral");
    assert_eq!(resolve_voice(None, "coral"), "coral");
    assert_eq!(resolve_voice(None, "bogus"), DEFAULT_VOICE);
}

#[test]
fn test_pcm_to_wav_frames_a_playable_file() {
    let pcm: Vec<u8> = [100i16, -100, 200, -200]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();

    let wav = pcm_to_wav(&pcm, 24000).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(
        u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
        24000
    );
    assert_eq!(wav.len(), 44 + pcm.len(), "canonical header plus samples");
    assert_eq!(&wav[44..], &pcm[..]);
}

#[tokio::test]
async fn test_stage_passes_events_and_appends_audio() {
    let synthesizer = SpeechSynthesizer::new(
        Arc::new(CannedSpeech {
            pcm: vec![3u8; 10000],
        }),
        "nova",
    );
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();
    tokio::spawn(synthesis_stage(synthesizer, input_rx, out));

    input.push(VoiceEvent::agent_chunk("Hello "));
    input.push(VoiceEvent::agent_chunk("there."));
    input.push(VoiceEvent::agent_end());
    input.cancel();

    let events = collect_events(out_rx).await;

    // Two fragments and the turn end pass through, then the audio.
    assert_eq!(events.len(), 6);
    assert!(matches!(events[2], VoiceEvent::AgentEnd { .. }));

    let VoiceEvent::TtsChunk { audio, done, .. } = &events[3] else {
        panic!("expected audio after the turn end");
    };
    assert!(!done);
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(audio)
        .unwrap();
    assert_eq!(decoded.len(), CHUNK_BYTES);

    assert!(matches!(&events[5], VoiceEvent::TtsChunk { done: true, .. }));
}

#[tokio::test]
async fn test_stage_skips_synthesis_for_blank_turns() {
    let synthesizer = SpeechSynthesizer::new(Arc::new(FailingSpeech), "nova");
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();
    tokio::spawn(synthesis_stage(synthesizer, input_rx, out));

    input.push(VoiceEvent::agent_chunk("   "));
    input.push(VoiceEvent::agent_end());
    input.cancel();

    let events = collect_events(out_rx).await;

    assert_eq!(events.len(), 2);
    assert!(!events
        .iter()
        .any(|e| matches!(e, VoiceEvent::TtsChunk { .. })));
}

#[tokio::test]
async fn test_stage_failure_still_closes_utterance() {
    let synthesizer = SpeechSynthesizer::new(Arc::new(FailingSpeech), "nova");
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();
    tokio::spawn(synthesis_stage(synthesizer, input_rx, out));

    input.push(VoiceEvent::agent_chunk("Goodbye."));
    input.push(VoiceEvent::agent_end());
    input.cancel();

    let events = collect_events(out_rx).await;

    assert_eq!(events.len(), 3);
    assert!(matches!(&events[2], VoiceEvent::TtsChunk { done: true, .. }));
}

/// Backend that records the text of every request.
struct CapturingSpeech {
    texts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl SpeechBackend for CapturingSpeech {
    async fn synthesize(&self, _voice: &str, text: &str) -> Result<Vec<u8>> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(vec![0u8; 16])
    }
}

#[tokio::test]
async fn test_stage_clears_utterance_between_turns() {
    let texts = Arc::new(Mutex::new(Vec::new()));
    let synthesizer = SpeechSynthesizer::new(
        Arc::new(CapturingSpeech {
            texts: Arc::clone(&texts),
        }),
        "nova",
    );
    let (input, input_rx) = channel();
    let (out, out_rx) = channel();
    tokio::spawn(synthesis_stage(synthesizer, input_rx, out));

    input.push(VoiceEvent::agent_chunk("First answer."));
    input.push(VoiceEvent::agent_end());
    input.push(VoiceEvent::agent_chunk("Second answer."));
    input.push(VoiceEvent::agent_end());
    input.cancel();

    collect_events(out_rx).await;

    let texts = texts.lock().unwrap();
    assert_eq!(texts.as_slice(), ["First answer.", "Second answer."]);
}
