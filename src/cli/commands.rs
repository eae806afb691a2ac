//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::info;

use crate::cli::EchoArgs;
use crate::config::EchovoxConfig;
use crate::dsp::{apply_echo, EchoParameters};
use crate::engine::{export_audio, generate_impulse, import_audio, BitDepth};
use crate::error::{EchovoxError, Result};
use crate::speech::{MockTtsProvider, SpeechPipeline, SpeechRequest};

/// Merge command-line overrides onto the configured echo parameters
pub fn resolve_echo(config: &EchovoxConfig, args: &EchoArgs) -> Result<EchoParameters> {
    let base = config.echo;
    EchoParameters::new(
        args.delay_ms.unwrap_or(base.delay_ms),
        args.decay.unwrap_or(base.decay),
        args.repeats.unwrap_or(base.repeats),
    )
}

/// Apply the echo to a WAV file.
pub fn echo_file(
    config: &EchovoxConfig,
    input: &Path,
    output: &Path,
    args: &EchoArgs,
) -> Result<()> {
    let params = resolve_echo(config, args)?;
    info!(
        "Applying echo to {} (delay {} ms, decay {}, repeats {})",
        input.display(),
        params.delay_ms,
        params.decay,
        params.repeats
    );

    let audio = import_audio(input)?;
    let echoed = apply_echo(&audio, &params)?;
    export_audio(&echoed, output)?;

    println!(
        "Wrote {} ({} frames, {} Hz, {} ch, {}-bit, peak {:.1} dBFS)",
        output.display(),
        echoed.num_frames(),
        echoed.sample_rate(),
        echoed.channels(),
        echoed.bit_depth().bits(),
        echoed.peak_dbfs()
    );
    Ok(())
}

/// Write a 16-bit unit impulse test file.
pub fn write_impulse(
    output: &Path,
    sample_rate: u32,
    duration_secs: f64,
    channels: u16,
) -> Result<()> {
    if sample_rate == 0 {
        return Err(EchovoxError::invalid_input("sample rate must be positive"));
    }
    if !(1..=2).contains(&channels) {
        return Err(EchovoxError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        });
    }

    let num_frames = (duration_secs.max(0.0) * sample_rate as f64) as usize;
    if num_frames == 0 {
        return Err(EchovoxError::invalid_input("impulse duration is shorter than one frame"));
    }

    info!("Writing {} frame impulse to {}", num_frames, output.display());
    let impulse = generate_impulse(num_frames, 0, channels, sample_rate, BitDepth::Sixteen);
    export_audio(&impulse, output)?;

    println!("Wrote {}", output.display());
    Ok(())
}

/// Render text with the mock provider and write the result.
pub fn preview(config: &EchovoxConfig, text: &str, output: &Path, args: &EchoArgs) -> Result<()> {
    let params = resolve_echo(config, args)?;
    let pipeline = SpeechPipeline::new(Box::new(MockTtsProvider::new()));
    let request = SpeechRequest::with_settings(text, &config.speech);

    info!("Rendering preview with provider '{}'", pipeline.provider_name());
    let bytes = pipeline.render(&request, &params)?;
    fs::write(output, &bytes)?;

    println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}

/// Print the effective configuration as JSON.
pub fn show_config(config: &EchovoxConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
