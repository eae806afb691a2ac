//! Echo Effect
//!
//! Fixed-step decaying-delay overlay. Each layer is a copy of the original
//! signal shifted by one more base delay than the previous layer and
//! attenuated by `20 * volume` dB, where `volume` starts at `decay` and is
//! multiplied by `decay` after every layer.
//!
//! Layers are truncated to the input length: echoes that would land past the
//! end of the buffer are dropped rather than extending the output.

use std::ops::RangeInclusive;

use crate::dsp::effect::{Effect, EffectParams};
use crate::engine::{db_to_linear, AudioBuffer};
use crate::error::{EchovoxError, Result};
use crate::impl_effect_common;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

// ============================================================================
// Control Ranges
// ============================================================================

/// Delay slider range in milliseconds
pub const DELAY_MS_RANGE: RangeInclusive<u32> = 20..=200;

/// Decay slider range
pub const DECAY_RANGE: RangeInclusive<f64> = 0.1..=0.9;

/// Repeats slider range
pub const REPEATS_RANGE: RangeInclusive<u32> = 1..=5;

const DEFAULT_DELAY_MS: u32 = 80;
const DEFAULT_DECAY: f64 = 0.6;
const DEFAULT_REPEATS: u32 = 2;

// ============================================================================
// Parameters
// ============================================================================

/// Echo parameters
///
/// Built fresh for every render from the current control values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoParameters {
    /// Offset of the first echo in milliseconds; layer `n` sits at `n * delay_ms`
    pub delay_ms: u32,
    /// Per-layer attenuation factor, strictly between 0 and 1
    pub decay: f64,
    /// Number of echo layers
    pub repeats: u32,
}

impl Default for EchoParameters {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            decay: DEFAULT_DECAY,
            repeats: DEFAULT_REPEATS,
        }
    }
}

impl EchoParameters {
    /// Create validated parameters
    ///
    /// # Errors
    /// * `InvalidParameter` - `delay_ms == 0`, `decay` outside `(0, 1)`, or `repeats == 0`
    pub fn new(delay_ms: u32, decay: f64, repeats: u32) -> Result<Self> {
        let params = Self {
            delay_ms,
            decay,
            repeats,
        };
        params.validate()?;
        Ok(params)
    }

    /// Build parameters from raw slider positions
    ///
    /// Sliders report continuous values; integer controls are rounded and
    /// every value is clamped into its control range. Non-finite values fall
    /// back to the default for that control.
    pub fn from_controls(delay_ms: f64, decay: f64, repeats: f64) -> Self {
        let defaults = Self::default();
        Self {
            delay_ms: clamp_integer_control(delay_ms, &DELAY_MS_RANGE, defaults.delay_ms),
            decay: if decay.is_finite() {
                decay.clamp(*DECAY_RANGE.start(), *DECAY_RANGE.end())
            } else {
                defaults.decay
            },
            repeats: clamp_integer_control(repeats, &REPEATS_RANGE, defaults.repeats),
        }
    }

    /// Validate all parameters are inside their domains
    pub fn validate(&self) -> Result<()> {
        if self.delay_ms == 0 {
            return Err(EchovoxError::InvalidParameter {
                param: "delay_ms".to_string(),
                value: self.delay_ms.to_string(),
                expected: "at least 1 ms".to_string(),
            });
        }
        // Written so NaN fails too
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(EchovoxError::InvalidParameter {
                param: "decay".to_string(),
                value: self.decay.to_string(),
                expected: "0.0 < decay < 1.0".to_string(),
            });
        }
        if self.repeats == 0 {
            return Err(EchovoxError::InvalidParameter {
                param: "repeats".to_string(),
                value: self.repeats.to_string(),
                expected: "at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Linear gain of each echo layer, first layer first
    pub fn layer_gains(&self) -> Vec<f64> {
        let mut volume = self.decay;
        (0..self.repeats)
            .map(|_| {
                let gain = layer_gain(volume);
                volume *= self.decay;
                gain
            })
            .collect()
    }
}

fn clamp_integer_control(value: f64, range: &RangeInclusive<u32>, default: u32) -> u32 {
    if !value.is_finite() {
        return default;
    }
    value
        .round()
        .clamp(*range.start() as f64, *range.end() as f64) as u32
}

/// Linear gain for a layer whose volume factor is `volume`
///
/// The layer is reduced by `20 * volume` dB.
#[inline]
pub fn layer_gain(volume: f64) -> f64 {
    db_to_linear(-20.0 * volume)
}

// ============================================================================
// Echo Synthesis
// ============================================================================

/// Overlay `repeats` delayed, attenuated copies of `input` onto itself
///
/// Returns a new buffer with the input's length, sample rate, channel count
/// and bit depth. Mixing saturates at the bit depth's limits.
///
/// # Errors
/// * `InvalidParameter` - if `params` fails [`EchoParameters::validate`]
/// * `InvalidInput` - if `input` holds no frames
pub fn apply_echo(input: &AudioBuffer, params: &EchoParameters) -> Result<AudioBuffer> {
    params.validate()?;

    if input.is_empty() {
        return Err(EchovoxError::invalid_input("audio buffer contains no frames"));
    }

    let channels = input.channels() as usize;
    let num_frames = input.num_frames();
    let depth = input.bit_depth();
    let original = input.samples();

    let base_delay = input.ms_to_frames(params.delay_ms);
    let mut delay = base_delay;
    let mut volume = params.decay;
    let mut output = original.to_vec();

    for layer in 0..params.repeats {
        let gain = layer_gain(volume);

        // A layer delayed past the end contributes only silence
        if delay < num_frames {
            let offset = delay * channels;
            let source = &original[..original.len() - offset];

            for (out, &sample) in output[offset..].iter_mut().zip(source) {
                let echo = depth.clip((sample as f64 * gain) as i64);
                *out = depth.clip(*out as i64 + echo as i64);
            }
        }

        debug!(layer, delay_frames = delay, gain, "overlaid echo layer");

        delay = delay.saturating_add(base_delay);
        volume *= params.decay;

        // Delays only grow, so every remaining layer would be silent
        if base_delay > 0 && delay >= num_frames {
            break;
        }
    }

    Ok(input.with_samples(output))
}

// ============================================================================
// Effect Adapter
// ============================================================================

/// Echo effect bound to user controls
///
/// Setters clamp into the control ranges; [`apply_echo`] still validates the
/// resulting parameters on every render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    params: EffectParams,
    echo: EchoParameters,
}

impl Echo {
    /// Create an echo effect with the given parameters
    pub fn new(echo: EchoParameters) -> Self {
        Self {
            params: EffectParams::default(),
            echo,
        }
    }

    /// Current echo parameters
    pub fn parameters(&self) -> EchoParameters {
        self.echo
    }

    /// Set delay in milliseconds (clamped to 20-200)
    pub fn set_delay_ms(&mut self, ms: u32) {
        self.echo.delay_ms = ms.clamp(*DELAY_MS_RANGE.start(), *DELAY_MS_RANGE.end());
    }

    pub fn delay_ms(&self) -> u32 {
        self.echo.delay_ms
    }

    /// Set decay (clamped to 0.1-0.9)
    pub fn set_decay(&mut self, decay: f64) {
        self.echo.decay = decay.clamp(*DECAY_RANGE.start(), *DECAY_RANGE.end());
    }

    pub fn decay(&self) -> f64 {
        self.echo.decay
    }

    /// Set number of echo layers (clamped to 1-5)
    pub fn set_repeats(&mut self, repeats: u32) {
        self.echo.repeats = repeats.clamp(*REPEATS_RANGE.start(), *REPEATS_RANGE.end());
    }

    pub fn repeats(&self) -> u32 {
        self.echo.repeats
    }
}

impl Default for Echo {
    fn default() -> Self {
        Self::new(EchoParameters::default())
    }
}

fn invalid_value(param: &str, value: &Value, expected: &str) -> EchovoxError {
    EchovoxError::InvalidParameter {
        param: param.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}

impl Effect for Echo {
    impl_effect_common!("echo", "Echo");

    fn process(&self, input: &AudioBuffer) -> Result<AudioBuffer> {
        if !self.params.enabled {
            return Ok(input.clone());
        }
        apply_echo(input, &self.echo)
    }

    fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(EchovoxError::Serialization)
    }

    fn from_json(&mut self, json: &Value) -> Result<()> {
        let parsed: Echo = serde_json::from_value(json.clone())?;
        parsed.echo.validate()?;

        self.params = parsed.params;
        self.echo = parsed.echo;
        Ok(())
    }

    fn get_params(&self) -> Value {
        json!({
            "id": self.params.id,
            "enabled": self.params.enabled,
            "delay_ms": self.echo.delay_ms,
            "decay": self.echo.decay,
            "repeats": self.echo.repeats
        })
    }

    fn set_param(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "delay_ms" => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| invalid_value(name, value, "a number of milliseconds"))?;
                self.echo.delay_ms = clamp_integer_control(v, &DELAY_MS_RANGE, self.echo.delay_ms);
                Ok(())
            }
            "decay" => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| invalid_value(name, value, "a number"))?;
                self.set_decay(v);
                Ok(())
            }
            "repeats" => {
                let v = value
                    .as_f64()
                    .ok_or_else(|| invalid_value(name, value, "a whole number"))?;
                self.echo.repeats = clamp_integer_control(v, &REPEATS_RANGE, self.echo.repeats);
                Ok(())
            }
            "enabled" => {
                let v = value
                    .as_bool()
                    .ok_or_else(|| invalid_value(name, value, "true or false"))?;
                self.set_enabled(v);
                Ok(())
            }
            _ => Err(invalid_value(name, value, "one of delay_ms, decay, repeats, enabled")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{generate_impulse, generate_tone, BitDepth};
    use approx::assert_relative_eq;
    use test_case::test_case;

    const FULL_SCALE: f64 = 32767.0;

    fn impulse_44k(num_frames: usize) -> AudioBuffer {
        generate_impulse(num_frames, 0, 1, 44100, BitDepth::Sixteen)
    }

    #[test]
    fn test_default_parameters() {
        let params = EchoParameters::default();
        assert_eq!(params.delay_ms, 80);
        assert_relative_eq!(params.decay, 0.6);
        assert_eq!(params.repeats, 2);
        assert!(params.validate().is_ok());
    }

    #[test_case(0, 0.5, 1, "delay_ms" ; "zero delay")]
    #[test_case(100, 0.0, 1, "decay" ; "zero decay")]
    #[test_case(100, 1.0, 1, "decay" ; "unit decay")]
    #[test_case(100, -0.2, 1, "decay" ; "negative decay")]
    #[test_case(100, f64::NAN, 1, "decay" ; "nan decay")]
    #[test_case(100, 0.5, 0, "repeats" ; "zero repeats")]
    fn test_invalid_parameters(delay_ms: u32, decay: f64, repeats: u32, expected_param: &str) {
        let err = EchoParameters::new(delay_ms, decay, repeats).unwrap_err();
        match err {
            EchovoxError::InvalidParameter { param, .. } => assert_eq!(param, expected_param),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_from_controls_clamps_and_rounds() {
        let params = EchoParameters::from_controls(87.6, 0.95, 7.2);
        assert_eq!(params.delay_ms, 88);
        assert_relative_eq!(params.decay, 0.9);
        assert_eq!(params.repeats, 5);

        let params = EchoParameters::from_controls(1.0, 0.0, 0.0);
        assert_eq!(params.delay_ms, 20);
        assert_relative_eq!(params.decay, 0.1);
        assert_eq!(params.repeats, 1);

        let params = EchoParameters::from_controls(f64::NAN, f64::INFINITY, f64::NAN);
        assert_eq!(params, EchoParameters::default());
    }

    #[test]
    fn test_layer_gains_follow_decay() {
        let params = EchoParameters::new(100, 0.5, 3).unwrap();
        let gains = params.layer_gains();
        assert_eq!(gains.len(), 3);
        assert_relative_eq!(gains[0], 10f64.powf(-0.5), epsilon = 1e-12);
        assert_relative_eq!(gains[1], 10f64.powf(-0.25), epsilon = 1e-12);
        assert_relative_eq!(gains[2], 10f64.powf(-0.125), epsilon = 1e-12);
        assert!(gains.iter().all(|&g| g > 0.0 && g < 1.0));
    }

    #[test]
    fn test_empty_input_rejected() {
        let empty = AudioBuffer::silence(0, 1, 44100, BitDepth::Sixteen);
        let err = apply_echo(&empty, &EchoParameters::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_invalid_parameters_checked_before_input() {
        let params = EchoParameters {
            delay_ms: 100,
            decay: 1.5,
            repeats: 1,
        };
        let err = apply_echo(&impulse_44k(100), &params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETER");
    }

    #[test]
    fn test_single_repeat_impulse() {
        let input = impulse_44k(44100);
        let params = EchoParameters::new(100, 0.5, 1).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        assert_eq!(output.num_frames(), input.num_frames());
        assert_eq!(output.get_sample(0, 0), Some(32767));

        let expected = (FULL_SCALE * 10f64.powf(-0.5)) as i32;
        assert_eq!(output.get_sample(4410, 0), Some(expected));

        // Nothing else is non-zero
        assert_eq!(output.peak_in(1..4410), 0);
        assert_eq!(output.peak_in(4411..44100), 0);
    }

    #[test]
    fn test_two_repeats_impulse() {
        let input = impulse_44k(44100);
        let params = EchoParameters::new(100, 0.5, 2).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        assert_eq!(output.get_sample(0, 0), Some(32767));
        assert_eq!(
            output.get_sample(4410, 0),
            Some((FULL_SCALE * 10f64.powf(-0.5)) as i32)
        );
        assert_eq!(
            output.get_sample(8820, 0),
            Some((FULL_SCALE * 10f64.powf(-0.25)) as i32)
        );
        assert_eq!(output.peak_in(8821..44100), 0);
    }

    #[test]
    fn test_stereo_delay_is_per_frame() {
        let input = generate_impulse(1000, 0, 2, 10000, BitDepth::Sixteen);
        let params = EchoParameters::new(10, 0.5, 1).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        // 10 ms at 10 kHz = 100 frames, both channels
        let expected = (FULL_SCALE * 10f64.powf(-0.5)) as i32;
        assert_eq!(output.get_sample(100, 0), Some(expected));
        assert_eq!(output.get_sample(100, 1), Some(expected));
        assert_eq!(output.peak_in(1..100), 0);
    }

    #[test]
    fn test_delay_beyond_buffer_is_silent_layer() {
        let input = impulse_44k(1000);
        // 200 ms = 8820 frames, longer than the buffer
        let params = EchoParameters::new(200, 0.5, 3).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        assert_eq!(output, input);
    }

    #[test]
    fn test_huge_repeat_count_stops_past_buffer_end() {
        let input = impulse_44k(10);
        let params = EchoParameters::new(100, 0.5, u32::MAX).unwrap();

        let started = std::time::Instant::now();
        let output = apply_echo(&input, &params).unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(output, input);
    }

    #[test]
    fn test_late_layers_truncated() {
        let input = impulse_44k(6000);
        // Layer 1 at 4410 fits, layer 2 at 8820 does not
        let params = EchoParameters::new(100, 0.5, 2).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        assert_eq!(output.num_frames(), 6000);
        assert!(output.get_sample(4410, 0).unwrap() > 0);
        assert_eq!(output.peak_in(4411..6000), 0);
    }

    #[test]
    fn test_mixing_clips_instead_of_wrapping() {
        let full = BitDepth::Sixteen.max_sample();
        let input = AudioBuffer::new(vec![full; 2000], 1, 1000, BitDepth::Sixteen).unwrap();
        let params = EchoParameters::new(100, 0.1, 5).unwrap();
        let output = apply_echo(&input, &params).unwrap();

        assert!(output.samples().iter().all(|&s| s == full));

        let low = BitDepth::Sixteen.min_sample();
        let input = AudioBuffer::new(vec![low; 2000], 1, 1000, BitDepth::Sixteen).unwrap();
        let output = apply_echo(&input, &params).unwrap();
        assert!(output.samples().iter().all(|&s| s == low));
    }

    #[test]
    fn test_format_preserved() {
        let input = generate_tone(220.0, 0.8, 0.25, 22050, BitDepth::TwentyFour);
        let output = apply_echo(&input, &EchoParameters::default()).unwrap();

        assert!(output.same_format(&input));
        assert_eq!(output.len(), input.len());
        assert_ne!(output, input);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = impulse_44k(10000);
        let before = input.clone();
        let _ = apply_echo(&input, &EchoParameters::default()).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_effect_process_and_bypass() {
        let input = impulse_44k(44100);
        let mut echo = Echo::new(EchoParameters::new(100, 0.5, 1).unwrap());

        let processed = echo.process(&input).unwrap();
        assert!(processed.get_sample(4410, 0).unwrap() > 0);

        echo.set_enabled(false);
        assert_eq!(echo.process(&input).unwrap(), input);
    }

    #[test]
    fn test_effect_setters_clamp() {
        let mut echo = Echo::default();
        echo.set_delay_ms(5);
        assert_eq!(echo.delay_ms(), 20);
        echo.set_delay_ms(5000);
        assert_eq!(echo.delay_ms(), 200);
        echo.set_decay(2.0);
        assert_relative_eq!(echo.decay(), 0.9);
        echo.set_repeats(0);
        assert_eq!(echo.repeats(), 1);
    }

    #[test]
    fn test_effect_set_param() {
        let mut echo = Echo::default();

        echo.set_param("delay_ms", &json!(120.4)).unwrap();
        assert_eq!(echo.delay_ms(), 120);

        echo.set_param("decay", &json!(0.3)).unwrap();
        assert_relative_eq!(echo.decay(), 0.3);

        echo.set_param("repeats", &json!(4)).unwrap();
        assert_eq!(echo.repeats(), 4);

        echo.set_param("enabled", &json!(false)).unwrap();
        assert!(!echo.is_enabled());
    }

    #[test]
    fn test_effect_set_param_invalid() {
        let mut echo = Echo::default();
        assert!(echo.set_param("feedback", &json!(0.5)).is_err());
        assert!(echo.set_param("decay", &json!("loud")).is_err());
        assert!(echo.set_param("enabled", &json!(1)).is_err());
    }

    #[test]
    fn test_effect_serialization() {
        let mut echo = Echo::new(EchoParameters::new(150, 0.4, 3).unwrap());
        echo.set_enabled(false);
        let json = echo.to_json().unwrap();

        let mut restored = Echo::default();
        restored.from_json(&json).unwrap();

        assert_eq!(restored.parameters(), echo.parameters());
        assert_eq!(restored.id(), echo.id());
        assert!(!restored.is_enabled());
    }

    #[test]
    fn test_effect_from_json_rejects_invalid() {
        let mut echo = Echo::default();
        let json = json!({
            "params": { "id": "echo-1", "enabled": true },
            "echo": { "delay_ms": 100, "decay": 1.2, "repeats": 2 }
        });
        assert!(echo.from_json(&json).is_err());
        assert_eq!(echo.parameters(), EchoParameters::default());
    }

    #[test]
    fn test_effect_type() {
        let echo = Echo::default();
        assert_eq!(echo.effect_type(), "echo");
        assert_eq!(echo.display_name(), "Echo");
        assert_eq!(echo.get_params()["repeats"], json!(2));
    }
}
