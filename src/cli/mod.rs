//! CLI Module
//!
//! Command-line interface for the Echovox echo and speech tools.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Echovox - echo synthesis for spoken model responses
#[derive(Parser, Debug)]
#[command(name = "echovox")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Echo settings that override the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EchoArgs {
    /// Delay between echoes in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u32>,

    /// Per-echo decay factor (0 < decay < 1)
    #[arg(long)]
    pub decay: Option<f64>,

    /// Number of echo layers
    #[arg(long)]
    pub repeats: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply the echo to a WAV file
    #[command(name = "echo")]
    Echo {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        echo: EchoArgs,
    },

    /// Write a unit impulse WAV file for inspecting echo settings
    #[command(name = "impulse")]
    Impulse {
        /// Output WAV file
        output: PathBuf,

        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,

        #[arg(long, default_value_t = 1.0)]
        duration_secs: f64,

        #[arg(long, default_value_t = 1)]
        channels: u16,
    },

    /// Render text through the speech pipeline using the offline mock voice
    #[command(name = "preview")]
    Preview {
        /// Text to speak
        text: String,

        /// Output WAV file
        output: PathBuf,

        #[command(flatten)]
        echo: EchoArgs,
    },

    /// Print the effective configuration
    #[command(name = "show-config")]
    ShowConfig,
}
