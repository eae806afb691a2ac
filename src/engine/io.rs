//! Audio codec boundary for Echovox
//!
//! The echo core only understands [`AudioBuffer`]. Anything compressed or
//! containerised crosses the [`Decoder`] / [`Encoder`] traits first. The crate
//! ships one implementation, [`WavCodec`], for signed integer PCM WAV.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use crate::engine::buffer::{AudioBuffer, BitDepth};
use crate::error::{EchovoxError, Result};

/// Converts an encoded byte stream into PCM
pub trait Decoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer>;
}

/// Converts PCM back into an encoded byte stream
pub trait Encoder: Send + Sync {
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>>;
}

/// Signed integer PCM WAV codec (8, 16, 24 or 32 bit; mono or stereo)
#[derive(Debug, Clone, Copy, Default)]
pub struct WavCodec;

impl Decoder for WavCodec {
    fn decode(&self, bytes: &[u8]) -> Result<AudioBuffer> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| EchovoxError::from_wav("failed to parse WAV header", e))?;

        let spec = reader.spec();

        if spec.sample_format == SampleFormat::Float {
            return Err(EchovoxError::UnsupportedFormat {
                format: "floating-point WAV (only integer PCM supported)".to_string(),
            });
        }

        // Reject multi-channel audio (>2 channels)
        if spec.channels == 0 || spec.channels > 2 {
            return Err(EchovoxError::UnsupportedFormat {
                format: format!("{}-channel audio (only mono/stereo supported)", spec.channels),
            });
        }

        let bit_depth = BitDepth::from_bits(spec.bits_per_sample).ok_or_else(|| {
            EchovoxError::UnsupportedFormat {
                format: format!("{}-bit integer audio", spec.bits_per_sample),
            }
        })?;

        let samples = reader
            .into_samples::<i32>()
            .collect::<std::result::Result<Vec<i32>, _>>()
            .map_err(|e| {
                EchovoxError::from_wav(&format!("failed to read {}-bit samples", spec.bits_per_sample), e)
            })?;

        debug!(
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            bits = spec.bits_per_sample,
            samples = samples.len(),
            "decoded WAV"
        );

        AudioBuffer::new(samples, spec.channels, spec.sample_rate, bit_depth).map_err(|e| {
            EchovoxError::InvalidAudio {
                reason: e.to_string(),
                source: Some(Box::new(e)),
            }
        })
    }
}

impl Encoder for WavCodec {
    fn encode(&self, buffer: &AudioBuffer) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: buffer.bit_depth().bits(),
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.len() * 4));
        {
            let mut writer = WavWriter::new(&mut cursor, spec)
                .map_err(|e| EchovoxError::from_wav("failed to start WAV stream", e))?;

            for &sample in buffer.samples() {
                writer
                    .write_sample(sample)
                    .map_err(|e| EchovoxError::from_wav("failed to write sample", e))?;
            }

            writer
                .finalize()
                .map_err(|e| EchovoxError::from_wav("failed to finalize WAV stream", e))?;
        }

        Ok(cursor.into_inner())
    }
}

/// Import a WAV file from disk
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` / `UnsupportedFormat` - If the file cannot be decoded
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    if !path.exists() {
        return Err(EchovoxError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path)?;
    WavCodec.decode(&bytes)
}

/// Export a buffer to a WAV file, keeping its sample rate and bit depth
pub fn export_audio(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let bytes = WavCodec.encode(buffer)?;
    fs::write(path, bytes)?;
    Ok(())
}

// ============================================================================
// Test Signals
// ============================================================================

/// Generate a full-scale unit impulse at `position` on every channel
///
/// Positions past the end produce silence.
pub fn generate_impulse(
    num_frames: usize,
    position: usize,
    channels: u16,
    sample_rate: u32,
    bit_depth: BitDepth,
) -> AudioBuffer {
    let silent = AudioBuffer::silence(num_frames, channels, sample_rate, bit_depth);
    let channels = silent.channels() as usize;
    let mut samples = silent.samples().to_vec();

    if position < num_frames {
        let start = position * channels;
        samples[start..start + channels].fill(bit_depth.max_sample());
    }

    silent.with_samples(samples)
}

/// Generate a mono sine tone
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `amplitude` - Peak level relative to full scale (clamped to 0..=1)
pub fn generate_tone(
    frequency: f64,
    amplitude: f64,
    duration_secs: f64,
    sample_rate: u32,
    bit_depth: BitDepth,
) -> AudioBuffer {
    let num_frames = (duration_secs.max(0.0) * sample_rate as f64) as usize;
    let scale = amplitude.clamp(0.0, 1.0) * bit_depth.max_sample() as f64;
    let angular_freq = 2.0 * std::f64::consts::PI * frequency / sample_rate.max(1) as f64;

    let samples = (0..num_frames)
        .map(|i| bit_depth.clip(((angular_freq * i as f64).sin() * scale).round() as i64))
        .collect();

    AudioBuffer::silence(0, 1, sample_rate, bit_depth).with_samples(samples)
}
