//! Energy-based voice activity detection
//!
//! Frame-level RMS gate that trims steady silence out of the inbound audio
//! stream before it reaches the transcription backend. Warm-up frames always
//! pass (so the start of speech is never clipped before the gate has seen any
//! signal), and a hangover budget keeps passing sub-threshold frames after
//! speech so trailing syllables and mid-sentence pauses survive.

/// Samples per analysis frame (16-bit mono, so 1024 bytes).
pub const FRAME_SAMPLES: usize = 512;

/// Bytes per analysis frame.
pub const FRAME_BYTES: usize = FRAME_SAMPLES * 2;

/// Default RMS threshold above which a frame counts as speech.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// Consecutive sub-threshold frames passed after speech before gating resumes.
pub const HANGOVER_FRAMES: u32 = 150;

/// Frames at stream start that pass regardless of energy.
pub const WARMUP_FRAMES: u64 = 20;

/// Stateful silence gate for one audio stream. One-shot: construct a new
/// filter per connection.
pub struct VoiceActivityFilter {
    threshold: f64,
    pending: Vec<u8>,
    frames_seen: u64,
    silent_since_speech: u32,
    speech_detected: bool,
}

impl VoiceActivityFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            pending: Vec::new(),
            frames_seen: 0,
            silent_since_speech: 0,
            speech_detected: false,
        }
    }

    /// Feed a chunk of raw PCM bytes (arbitrary boundaries) and get back the
    /// frame-aligned buffers that pass the gate, in order. Trailing bytes that
    /// do not fill a frame are held until the next call.
    pub fn filter(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);

        let mut passed = Vec::new();

        while self.pending.len() >= FRAME_BYTES {
            let frame: Vec<u8> = self.pending.drain(..FRAME_BYTES).collect();
            self.frames_seen += 1;

            let is_speech = frame_rms(&frame) > self.threshold;

            if self.should_pass(is_speech) {
                if is_speech {
                    self.speech_detected = true;
                    self.silent_since_speech = 0;
                } else if self.speech_detected {
                    self.silent_since_speech += 1;
                }
                passed.push(frame);
            }
        }

        passed
    }

    fn should_pass(&self, is_speech: bool) -> bool {
        if is_speech {
            return true;
        }
        if self.speech_detected && self.silent_since_speech < HANGOVER_FRAMES {
            return true;
        }
        self.frames_seen < WARMUP_FRAMES
    }
}

impl Default for VoiceActivityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Root-mean-square energy of a frame of little-endian i16 samples.
pub fn frame_rms(frame: &[u8]) -> f64 {
    let sample_count = frame.len() / 2;
    if sample_count == 0 {
        return 0.0;
    }

    let mut sum_squares = 0.0f64;
    for pair in frame.chunks_exact(2) {
        let sample = i16::from_le_bytes([pair[0], pair[1]]) as f64;
        sum_squares += sample * sample;
    }

    (sum_squares / sample_count as f64).sqrt()
}
