//! Audio Buffer Management
//!
//! Provides the PCM audio buffer type and level helpers for Echovox.
//! Samples are kept as signed integers at the bit depth they were decoded
//! with, so mixing can clip to exactly the range the format can represent.

use crate::error::{EchovoxError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (1.0 at 0 dB)
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns `f64::NEG_INFINITY` for zero input.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Bit Depth
// ============================================================================

/// Signed integer PCM sample width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    Eight,
    #[default]
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

impl BitDepth {
    /// Number of bits per sample
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::TwentyFour => 24,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// Create a BitDepth from a bit count
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(BitDepth::Eight),
            16 => Some(BitDepth::Sixteen),
            24 => Some(BitDepth::TwentyFour),
            32 => Some(BitDepth::ThirtyTwo),
            _ => None,
        }
    }

    /// Largest representable sample value (full scale)
    #[inline]
    pub fn max_sample(&self) -> i32 {
        match self {
            BitDepth::ThirtyTwo => i32::MAX,
            other => (1i32 << (other.bits() - 1)) - 1,
        }
    }

    /// Smallest representable sample value
    #[inline]
    pub fn min_sample(&self) -> i32 {
        match self {
            BitDepth::ThirtyTwo => i32::MIN,
            other => -(1i32 << (other.bits() - 1)),
        }
    }

    /// Saturate a wide intermediate value into this format's range
    #[inline]
    pub fn clip(&self, value: i64) -> i32 {
        value.clamp(self.min_sample() as i64, self.max_sample() as i64) as i32
    }

    /// Whether `value` fits this format without clipping
    #[inline]
    pub fn contains(&self, value: i32) -> bool {
        (self.min_sample()..=self.max_sample()).contains(&value)
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Interleaved signed PCM audio
///
/// Samples are stored interleaved: `[L0, R0, L1, R1, ...]`. A *frame* is one
/// sample per channel. Buffers are never mutated by the DSP code; effects
/// build a new buffer with the same format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    samples: Vec<i32>,
    channels: u16,
    sample_rate: u32,
    bit_depth: BitDepth,
}

impl AudioBuffer {
    /// Create a buffer from interleaved samples
    ///
    /// # Errors
    /// * `InvalidInput` - zero channels, zero sample rate, a partial trailing
    ///   frame, or a sample outside the bit depth's range
    pub fn new(
        samples: Vec<i32>,
        channels: u16,
        sample_rate: u32,
        bit_depth: BitDepth,
    ) -> Result<Self> {
        if channels == 0 {
            return Err(EchovoxError::invalid_input("channel count must be at least 1"));
        }
        if sample_rate == 0 {
            return Err(EchovoxError::invalid_input("sample rate must be positive"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(EchovoxError::invalid_input(format!(
                "sample count {} is not divisible by channel count {}",
                samples.len(),
                channels
            )));
        }
        if let Some((index, value)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !bit_depth.contains(**s))
        {
            return Err(EchovoxError::invalid_input(format!(
                "sample {} at index {} exceeds the {}-bit range",
                value,
                index,
                bit_depth.bits()
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
            bit_depth,
        })
    }

    /// Create a silent buffer holding `num_frames` frames
    pub fn silence(num_frames: usize, channels: u16, sample_rate: u32, bit_depth: BitDepth) -> Self {
        Self {
            samples: vec![0; num_frames * channels.max(1) as usize],
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            bit_depth,
        }
    }

    /// Build a buffer with this buffer's format and new content.
    ///
    /// Callers guarantee the samples are in range and frame-aligned.
    pub(crate) fn with_samples(&self, samples: Vec<i32>) -> Self {
        debug_assert_eq!(samples.len() % self.channels as usize, 0);
        Self {
            samples,
            channels: self.channels,
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
        }
    }

    /// All interleaved samples
    #[inline]
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Number of channels
    #[inline]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Total number of interleaved samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Convert a millisecond offset into a frame count at this sample rate
    ///
    /// Integer arithmetic, rounding down: 100 ms at 44.1 kHz is 4410 frames.
    pub fn ms_to_frames(&self, ms: u32) -> usize {
        (ms as u64 * self.sample_rate as u64 / 1000) as usize
    }

    /// Whether `other` has the same sample rate, channel count and bit depth
    pub fn same_format(&self, other: &AudioBuffer) -> bool {
        self.sample_rate == other.sample_rate
            && self.channels == other.channels
            && self.bit_depth == other.bit_depth
    }

    /// Get a sample at the given frame and channel
    #[inline]
    pub fn get_sample(&self, frame: usize, channel: usize) -> Option<i32> {
        if frame < self.num_frames() && channel < self.channels as usize {
            Some(self.samples[frame * self.channels as usize + channel])
        } else {
            None
        }
    }

    /// Largest absolute sample value within a frame range, across channels
    pub fn peak_in(&self, frames: std::ops::Range<usize>) -> u32 {
        let channels = self.channels as usize;
        let start = frames.start.min(self.num_frames()) * channels;
        let end = frames.end.min(self.num_frames()) * channels;
        if start >= end {
            return 0;
        }
        self.samples[start..end]
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// Largest absolute sample value in the whole buffer
    pub fn peak(&self) -> u32 {
        self.peak_in(0..self.num_frames())
    }

    /// Peak level relative to full scale, in dBFS
    pub fn peak_dbfs(&self) -> f64 {
        linear_to_db(self.peak() as f64 / self.bit_depth.max_sample() as f64)
    }
}
