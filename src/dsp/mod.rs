//! DSP Effects Library
//!
//! The echo synthesizer and the effect trait it is exposed through.

mod echo;
mod effect;

pub use echo::{
    apply_echo, layer_gain, Echo, EchoParameters, DECAY_RANGE, DELAY_MS_RANGE, REPEATS_RANGE,
};
pub use effect::{Effect, EffectParams};
