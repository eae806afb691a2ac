//! Echovox - echo synthesis for spoken language-model responses
//!
//! A front-end speaks model responses aloud with a decaying echo. This crate
//! holds the parts of that product worth engineering:
//! 1. Echo synthesis over signed PCM buffers (`dsp`)
//! 2. PCM buffers and the WAV codec boundary (`engine`)
//! 3. Text-to-speech rendering pipeline and background worker (`speech`)
//!
//! The GUI, the model runner and transcript storage live outside this crate.

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod speech;

pub use dsp::{apply_echo, EchoParameters};
pub use engine::{AudioBuffer, BitDepth};
pub use error::{EchovoxError, Result};
