//! Text-to-speech provider interface
//!
//! Providers are external collaborators: they turn text into encoded audio
//! bytes and may fail for reasons outside our control (network, quota).

use crate::error::Result;
use crate::speech::SpeechRequest;

/// Trait that all speech providers must implement
pub trait TtsProvider: Send + Sync {
    /// Short identifier used in logs and errors
    fn name(&self) -> &str;

    /// Synthesize `request` into encoded audio bytes
    ///
    /// Failures are reported as `EchovoxError::Provider` and are fatal for
    /// this request only.
    fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>>;
}
