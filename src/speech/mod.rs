//! Speech Module
//!
//! Turns response text into echo-processed audio:
//! - Provider interface for external text-to-speech services
//! - Rendering pipeline (provider -> decode -> echo -> encode)
//! - Background worker with cancellation
//! - Offline mock provider

pub mod mock;
pub mod pipeline;
pub mod provider;
pub mod request;
pub mod worker;

pub use mock::MockTtsProvider;
pub use pipeline::SpeechPipeline;
pub use provider::TtsProvider;
pub use request::{SpeechRequest, SpeechSettings, DEFAULT_ACCENT, DEFAULT_LANGUAGE};
pub use worker::{SpeechOutcome, SpeechWorker};
