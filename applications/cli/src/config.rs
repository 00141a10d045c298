/// Crossfade configuration
///
/// Layered lowest to highest: built-in defaults, TOML file, `CONVFADE_*`
/// environment variables, command-line flags.
use crate::error::{CliError, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, FileFormat, Value, ValueKind};
use convfade_audio::BitDepth;
use convfade_core::{
    frame_len_from_ms, ConvolutionPolicy, CrossfadeMode, CrossfadeSettings, WindowFunction,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "convfade.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CONVFADE";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CrossfadeConfig {
    /// Transition length in seconds
    #[serde(default = "default_length_secs")]
    pub length_secs: f64,

    /// Transition length in samples; takes precedence over `length_secs`
    #[serde(default)]
    pub length_samples: Option<usize>,

    #[serde(default = "default_cutoff_hz")]
    pub cutoff_hz: f64,

    #[serde(default = "default_taps")]
    pub taps: usize,

    #[serde(default)]
    pub window: WindowFunction,

    #[serde(default)]
    pub policy: ConvolutionPolicy,

    #[serde(default)]
    pub mode: TransitionMode,

    /// Spectral frame length in milliseconds
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u32,

    /// Downmix both inputs to mono before crossfading
    #[serde(default)]
    pub mono: bool,

    /// Peak-normalise the output to full scale
    #[serde(default)]
    pub normalize: bool,

    /// Output bit depth (16, 24, or 32 for float)
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionMode {
    #[default]
    Filtered,
    Spectral,
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub length_secs: Option<f64>,
    pub length_samples: Option<usize>,
    pub cutoff_hz: Option<f64>,
    pub taps: Option<usize>,
    pub window: Option<String>,
    pub policy: Option<String>,
    pub mode: Option<String>,
    pub frame_ms: Option<u32>,
    pub mono: Option<bool>,
    pub normalize: Option<bool>,
    pub bit_depth: Option<u16>,
}

impl ConfigOverrides {
    fn apply(&self, builder: ConfigBuilder<DefaultState>) -> Result<ConfigBuilder<DefaultState>> {
        let mut builder = builder.set_override_option("length_secs", self.length_secs)?;

        builder = match self.length_samples {
            Some(samples) => builder.set_override("length_samples", samples as i64)?,
            // A length in seconds on the command line beats samples from a file
            None if self.length_secs.is_some() => {
                builder.set_override("length_samples", Value::new(None, ValueKind::Nil))?
            }
            None => builder,
        };

        Ok(builder
            .set_override_option("cutoff_hz", self.cutoff_hz)?
            .set_override_option("taps", self.taps.map(|t| t as i64))?
            .set_override_option("window", self.window.clone())?
            .set_override_option("policy", self.policy.clone())?
            .set_override_option("mode", self.mode.clone())?
            .set_override_option("frame_ms", self.frame_ms.map(i64::from))?
            .set_override_option("mono", self.mono)?
            .set_override_option("normalize", self.normalize)?
            .set_override_option("bit_depth", self.bit_depth.map(i64::from))?)
    }
}

impl CrossfadeConfig {
    /// Load configuration from file, environment and command-line overrides
    ///
    /// `path` must exist when given; otherwise `convfade.toml` in the working
    /// directory is used if present.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        Self::load_with_env(path, overrides, None)
    }

    /// Like [`load`](Self::load), reading variables from `env` instead of the
    /// process environment when given
    pub fn load_with_env(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(
                    config::File::from(path)
                        .format(FileFormat::Toml)
                        .required(true),
                );
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(
                        config::File::from(default_path).format(FileFormat::Toml),
                    );
                }
            }
        }

        // Override with environment variables (CONVFADE_CUTOFF_HZ, ...)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        settings = overrides.apply(settings)?;

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.length_samples.is_none()
            && (!self.length_secs.is_finite() || self.length_secs <= 0.0)
        {
            return Err(CliError::Config(format!(
                "length_secs must be positive, got {}",
                self.length_secs
            )));
        }

        if !self.cutoff_hz.is_finite() || self.cutoff_hz <= 0.0 {
            return Err(CliError::Config(format!(
                "cutoff_hz must be positive, got {}",
                self.cutoff_hz
            )));
        }

        if self.taps < 3 || self.taps % 2 == 0 {
            return Err(CliError::Config(format!(
                "taps must be odd and at least 3, got {}",
                self.taps
            )));
        }

        if self.frame_ms == 0 {
            return Err(CliError::Config("frame_ms must be positive".to_string()));
        }

        if BitDepth::from_bits(self.bit_depth).is_err() {
            return Err(CliError::Config(format!(
                "bit_depth must be 16, 24 or 32, got {}",
                self.bit_depth
            )));
        }

        Ok(())
    }

    /// Transition length in frames at `sample_rate`
    pub fn transition_frames(&self, sample_rate: u32) -> usize {
        self.length_samples.unwrap_or_else(|| {
            CrossfadeSettings::transition_frames_for(self.length_secs, sample_rate)
        })
    }

    /// Engine settings for signals at `sample_rate`
    pub fn crossfade_settings(&self, sample_rate: u32) -> CrossfadeSettings {
        let mode = match self.mode {
            TransitionMode::Filtered => CrossfadeMode::Filtered,
            TransitionMode::Spectral => CrossfadeMode::Spectral {
                frame_len: frame_len_from_ms(self.frame_ms, sample_rate),
            },
        };
        CrossfadeSettings::new(self.transition_frames(sample_rate))
            .with_cutoff(self.cutoff_hz)
            .with_taps(self.taps)
            .with_window(self.window)
            .with_policy(self.policy)
            .with_mode(mode)
    }

    /// Output sample format
    pub fn output_bit_depth(&self) -> Result<BitDepth> {
        BitDepth::from_bits(self.bit_depth).map_err(|e| CliError::Config(e.to_string()))
    }
}

// Default values
fn default_length_secs() -> f64 {
    3.0
}

fn default_cutoff_hz() -> f64 {
    convfade_core::DEFAULT_CUTOFF_HZ
}

fn default_taps() -> usize {
    convfade_core::DEFAULT_TAP_COUNT
}

fn default_frame_ms() -> u32 {
    100
}

fn default_bit_depth() -> u16 {
    16
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            length_secs: default_length_secs(),
            length_samples: None,
            cutoff_hz: default_cutoff_hz(),
            taps: default_taps(),
            window: WindowFunction::default(),
            policy: ConvolutionPolicy::default(),
            mode: TransitionMode::default(),
            frame_ms: default_frame_ms(),
            mono: false,
            normalize: false,
            bit_depth: default_bit_depth(),
        }
    }
}
