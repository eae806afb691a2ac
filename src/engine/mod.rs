//! Audio Engine Module
//!
//! Core audio plumbing shared by the effects and the speech pipeline:
//! - PCM audio buffer and level helpers
//! - WAV codec and file I/O
//! - Test signal generators

pub mod buffer;
pub mod io;

pub use buffer::{db_to_linear, linear_to_db, AudioBuffer, BitDepth};
pub use io::{
    export_audio, generate_impulse, generate_tone, import_audio, Decoder, Encoder, WavCodec,
};
