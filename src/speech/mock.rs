//! Mock speech provider for offline previews and testing
//!
//! Produces no real speech. Each request becomes a 16-bit mono WAV tone whose
//! length grows with the text, which is enough to exercise the full pipeline
//! and to hear the echo settings without network access.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::engine::{generate_tone, BitDepth, Encoder, WavCodec};
use crate::error::{EchovoxError, Result};
use crate::speech::{SpeechRequest, TtsProvider};

/// Sample rate of the generated tone
pub const MOCK_SAMPLE_RATE: u32 = 24000;

/// Tone length per character of text
const SECS_PER_CHAR: f64 = 0.06;

/// Shortest tone produced
const MIN_DURATION_SECS: f64 = 0.1;

const TONE_FREQUENCY: f64 = 220.0;
const TONE_AMPLITUDE: f64 = 0.5;

/// Offline provider that "speaks" a tone
#[derive(Debug, Default)]
pub struct MockTtsProvider {
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockTtsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every request fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of synthesize calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tone duration produced for `text`
    pub fn duration_for(text: &str) -> f64 {
        (text.chars().count() as f64 * SECS_PER_CHAR).max(MIN_DURATION_SECS)
    }
}

impl TtsProvider for MockTtsProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(EchovoxError::Provider {
                provider: self.name().to_string(),
                reason: reason.clone(),
            });
        }

        let tone = generate_tone(
            TONE_FREQUENCY,
            TONE_AMPLITUDE,
            Self::duration_for(&request.text),
            MOCK_SAMPLE_RATE,
            BitDepth::Sixteen,
        );
        WavCodec.encode(&tone)
    }
}
