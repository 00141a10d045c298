/// Command-line arguments
use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "convfade")]
#[command(version, about = "Crossfade two audio files through a lowpass-filtered transition", long_about = None)]
pub struct Cli {
    /// Outgoing audio file (fades out)
    #[arg(short, long)]
    pub start: PathBuf,

    /// Incoming audio file (fades in)
    #[arg(short, long)]
    pub end: PathBuf,

    /// Output WAV file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Transition length in seconds
    #[arg(short, long)]
    pub length: Option<f64>,

    /// Transition length in samples (overrides --length)
    #[arg(long, conflicts_with = "length")]
    pub length_samples: Option<usize>,

    /// Lowpass cutoff frequency in Hz
    #[arg(short, long)]
    pub frequency: Option<f64>,

    /// Impulse response length (odd)
    #[arg(short, long)]
    pub taps: Option<usize>,

    /// Window applied to the sinc taps
    #[arg(long, value_parser = ["hamming", "hann", "blackman"])]
    pub window: Option<String>,

    /// Which side(s) of the transition to filter
    #[arg(long, value_parser = ["both", "outgoing", "incoming", "dry"])]
    pub policy: Option<String>,

    /// Transition algorithm
    #[arg(short, long, value_parser = ["filtered", "spectral"])]
    pub mode: Option<String>,

    /// Spectral frame length in milliseconds
    #[arg(long)]
    pub frame_ms: Option<u32>,

    /// Downmix both inputs to mono
    #[arg(long)]
    pub mono: bool,

    /// Peak-normalise the output
    #[arg(long)]
    pub normalize: bool,

    /// Output bit depth (16, 24, or 32 for float)
    #[arg(short, long, value_parser = parse_bit_depth)]
    pub bit_depth: Option<u16>,

    /// Configuration file path
    #[arg(short, long, env = "CONVFADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags that take precedence over file and environment configuration
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            length_secs: self.length,
            length_samples: self.length_samples,
            cutoff_hz: self.frequency,
            taps: self.taps,
            window: self.window.clone(),
            policy: self.policy.clone(),
            mode: self.mode.clone(),
            frame_ms: self.frame_ms,
            mono: self.mono.then_some(true),
            normalize: self.normalize.then_some(true),
            bit_depth: self.bit_depth,
        }
    }

    /// Default tracing filter for this invocation
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "convfade=debug,convfade_cli=debug,convfade_core=debug,convfade_audio=debug"
        } else {
            "convfade=info,convfade_cli=info,convfade_core=info,convfade_audio=info"
        }
    }
}

fn parse_bit_depth(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("expected 16, 24 or 32, got '{}'", value)),
    }
}
