//! Speech rendering pipeline
//!
//! provider -> decoder -> echo -> encoder. Each stage boundary is a
//! cancellation point; the echo itself runs to completion once started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::dsp::{apply_echo, EchoParameters};
use crate::engine::{Decoder, Encoder, WavCodec};
use crate::error::{EchovoxError, Result};
use crate::speech::{SpeechRequest, TtsProvider};

/// Renders text into echo-processed encoded audio
pub struct SpeechPipeline {
    provider: Box<dyn TtsProvider>,
    decoder: Box<dyn Decoder>,
    encoder: Box<dyn Encoder>,
}

impl SpeechPipeline {
    /// Pipeline whose provider speaks WAV, encoding the result as WAV
    pub fn new(provider: Box<dyn TtsProvider>) -> Self {
        Self::with_codecs(provider, Box::new(WavCodec), Box::new(WavCodec))
    }

    /// Pipeline with explicit codecs on both sides of the echo
    pub fn with_codecs(
        provider: Box<dyn TtsProvider>,
        decoder: Box<dyn Decoder>,
        encoder: Box<dyn Encoder>,
    ) -> Self {
        Self {
            provider,
            decoder,
            encoder,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Render `request` with the given echo settings
    pub fn render(&self, request: &SpeechRequest, params: &EchoParameters) -> Result<Vec<u8>> {
        self.render_with_cancel(request, params, &AtomicBool::new(false))
    }

    /// Render, checking `cancel` between stages
    ///
    /// # Errors
    /// * `Cancelled` - if `cancel` was set before a stage started
    /// * `InvalidParameter` - if `params` are out of domain (checked before
    ///   contacting the provider)
    /// * any error from the provider or codecs
    pub fn render_with_cancel(
        &self,
        request: &SpeechRequest,
        params: &EchoParameters,
        cancel: &AtomicBool,
    ) -> Result<Vec<u8>> {
        let start = Instant::now();

        request.validate()?;
        params.validate()?;

        check_cancelled(cancel)?;
        info!(
            provider = self.provider.name(),
            language = %request.language,
            accent = %request.accent,
            chars = request.text.chars().count(),
            "synthesizing speech"
        );
        let encoded = self.provider.synthesize(request)?;

        check_cancelled(cancel)?;
        let audio = self.decoder.decode(&encoded)?;
        debug!(
            frames = audio.num_frames(),
            sample_rate = audio.sample_rate(),
            "decoded speech"
        );

        check_cancelled(cancel)?;
        let echoed = apply_echo(&audio, params)?;

        check_cancelled(cancel)?;
        let output = self.encoder.encode(&echoed)?;

        info!(
            bytes = output.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rendered speech"
        );
        Ok(output)
    }
}

fn check_cancelled(cancel: &AtomicBool) -> Result<()> {
    if cancel.load(Ordering::SeqCst) {
        Err(EchovoxError::Cancelled)
    } else {
        Ok(())
    }
}
