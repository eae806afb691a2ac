//! Integration Tests
//!
//! End-to-end behaviour of the echo synthesizer through the public API.

use approx::assert_relative_eq;
use echovox::dsp::{layer_gain, Echo, Effect};
use echovox::engine::{
    export_audio, generate_impulse, generate_tone, import_audio, Decoder, Encoder, WavCodec,
};
use echovox::{apply_echo, AudioBuffer, BitDepth, EchoParameters};
use pretty_assertions::assert_eq;
use test_case::test_case;

const FULL_SCALE: f64 = 32767.0;

/// One second of 44.1 kHz mono silence with a full-scale sample at index 0
fn unit_impulse() -> AudioBuffer {
    generate_impulse(44100, 0, 1, 44100, BitDepth::Sixteen)
}

fn amplitude_at(buffer: &AudioBuffer, frame: usize) -> f64 {
    buffer.get_sample(frame, 0).unwrap() as f64 / FULL_SCALE
}

// === Format Preservation ===

#[test_case(1, 44100, BitDepth::Sixteen ; "mono 16-bit")]
#[test_case(2, 48000, BitDepth::Sixteen ; "stereo 16-bit")]
#[test_case(2, 22050, BitDepth::TwentyFour ; "stereo 24-bit")]
#[test_case(1, 8000, BitDepth::Eight ; "mono 8-bit")]
#[test_case(1, 16000, BitDepth::ThirtyTwo ; "mono 32-bit")]
fn test_output_format_matches_input(channels: u16, sample_rate: u32, depth: BitDepth) {
    let input = generate_impulse(sample_rate as usize / 2, 3, channels, sample_rate, depth);

    for params in [
        EchoParameters::default(),
        EchoParameters::new(1, 0.99, 5).unwrap(),
        EchoParameters::new(200, 0.1, 1).unwrap(),
    ] {
        let output = apply_echo(&input, &params).unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output.num_frames(), input.num_frames());
        assert_eq!(output.sample_rate(), input.sample_rate());
        assert_eq!(output.channels(), input.channels());
        assert_eq!(output.bit_depth(), input.bit_depth());
    }
}

// === Impulse Response ===

#[test]
fn test_concrete_two_repeat_scenario() {
    let input = unit_impulse();
    let params = EchoParameters::new(100, 0.5, 2).unwrap();
    let output = apply_echo(&input, &params).unwrap();

    // Original sample untouched
    assert_relative_eq!(amplitude_at(&output, 0), 1.0);

    // First echo at 4410 frames, -10 dB
    assert_relative_eq!(amplitude_at(&output, 4410), 10f64.powf(-0.5), epsilon = 1e-4);

    // Second echo at 8820 frames, -5 dB
    assert_relative_eq!(amplitude_at(&output, 8820), 10f64.powf(-0.25), epsilon = 1e-4);

    // Silence everywhere else
    assert_eq!(output.peak_in(1..4410), 0);
    assert_eq!(output.peak_in(4411..8820), 0);
    assert_eq!(output.peak_in(8821..44100), 0);
}

#[test]
fn test_single_repeat_offset_and_level() {
    let input = unit_impulse();

    for (delay_ms, decay) in [(20, 0.1), (80, 0.6), (200, 0.9)] {
        let params = EchoParameters::new(delay_ms, decay, 1).unwrap();
        let output = apply_echo(&input, &params).unwrap();
        let offset = input.ms_to_frames(delay_ms);

        assert_relative_eq!(amplitude_at(&output, offset), layer_gain(decay), epsilon = 1e-4);
        assert_eq!(output.peak_in(1..offset), 0);
        assert_eq!(output.peak_in(offset + 1..44100), 0);
    }
}

#[test]
fn test_every_layer_quieter_than_original() {
    let input = unit_impulse();
    let params = EchoParameters::new(50, 0.7, 5).unwrap();
    let output = apply_echo(&input, &params).unwrap();
    let step = input.ms_to_frames(50);

    let gains = params.layer_gains();
    for (n, gain) in gains.iter().enumerate() {
        let frame = step * (n + 1);
        let level = amplitude_at(&output, frame);
        assert_relative_eq!(level, *gain, epsilon = 1e-4);
        assert!(level < 1.0, "layer {} at {} is not attenuated", n + 1, level);
    }

    // The dB reduction shrinks with every layer because the volume factor
    // compounds: 20 * decay^n dB.
    for pair in gains.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

// === Composition ===

#[test]
fn test_applying_twice_differs_from_doubled_repeats() {
    let input = unit_impulse();
    let params = EchoParameters::new(100, 0.5, 2).unwrap();
    let doubled = EchoParameters::new(100, 0.5, 4).unwrap();

    let twice = apply_echo(&apply_echo(&input, &params).unwrap(), &params).unwrap();
    let once = apply_echo(&input, &doubled).unwrap();

    assert!(twice.same_format(&once));
    assert_ne!(twice, once);

    // The second pass echoes the first pass's echoes, so 8820 collects energy
    // from both passes and saturates
    assert_ne!(twice.get_sample(8820, 0), once.get_sample(8820, 0));
}

// === Boundaries ===

#[test]
fn test_delay_longer_than_buffer() {
    let input = generate_impulse(2000, 0, 2, 44100, BitDepth::Sixteen);
    let params = EchoParameters::new(100, 0.5, 3).unwrap();
    let output = apply_echo(&input, &params).unwrap();

    assert_eq!(output, input);
}

#[test]
fn test_single_frame_buffer() {
    let input = AudioBuffer::new(vec![1000, -1000], 2, 44100, BitDepth::Sixteen).unwrap();
    let output = apply_echo(&input, &EchoParameters::default()).unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_sub_frame_delay_overlays_in_place() {
    // 1 ms at 800 Hz rounds down to zero frames; each layer lands on the original
    let input = AudioBuffer::new(vec![1000; 8], 1, 800, BitDepth::Sixteen).unwrap();
    let params = EchoParameters::new(1, 0.5, 1).unwrap();
    let output = apply_echo(&input, &params).unwrap();

    let expected = 1000 + (1000.0 * layer_gain(0.5)) as i32;
    assert!(output.samples().iter().all(|&s| s == expected));
}

#[test]
fn test_empty_buffer_rejected() {
    let empty = AudioBuffer::new(Vec::new(), 2, 44100, BitDepth::Sixteen).unwrap();
    let err = apply_echo(&empty, &EchoParameters::default()).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INPUT");
}

#[test]
fn test_loud_signal_saturates() {
    let input = generate_tone(100.0, 1.0, 0.5, 8000, BitDepth::Sixteen);
    let params = EchoParameters::new(10, 0.1, 5).unwrap();
    let output = apply_echo(&input, &params).unwrap();

    let min = BitDepth::Sixteen.min_sample();
    let max = BitDepth::Sixteen.max_sample();
    assert!(output.samples().iter().all(|&s| (min..=max).contains(&s)));
    assert!(output.samples().iter().any(|&s| s == max));
}

// === Codec Round Trip ===

#[test]
fn test_echo_through_wav_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.wav");
    let target = dir.path().join("target.wav");

    let tone = generate_tone(330.0, 0.3, 0.5, 24000, BitDepth::Sixteen);
    export_audio(&tone, &source).unwrap();

    let params = EchoParameters::default();
    let echoed = apply_echo(&import_audio(&source).unwrap(), &params).unwrap();
    export_audio(&echoed, &target).unwrap();

    let reread = import_audio(&target).unwrap();
    assert_eq!(reread, apply_echo(&tone, &params).unwrap());
}

#[test]
fn test_in_memory_codec() {
    let input = unit_impulse();
    let bytes = WavCodec.encode(&input).unwrap();
    let decoded = WavCodec.decode(&bytes).unwrap();
    let output = apply_echo(&decoded, &EchoParameters::default()).unwrap();
    assert_eq!(output.num_frames(), 44100);
}

// === Effect Surface ===

#[test]
fn test_effect_matches_function() {
    let input = unit_impulse();
    let params = EchoParameters::new(60, 0.3, 3).unwrap();
    let effect: Box<dyn Effect> = Box::new(Echo::new(params));

    assert_eq!(effect.process(&input).unwrap(), apply_echo(&input, &params).unwrap());

    let cloned = effect.clone();
    assert_eq!(cloned.id(), effect.id());
}
