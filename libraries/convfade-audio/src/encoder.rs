//! WAV encoding using hound
//!
//! Output is written to a hidden sibling file first and renamed into place once
//! the writer has been finalised, so an interrupted encode never leaves a
//! truncated file at the destination.

use crate::error::{AudioIoError, Result};
use convfade_core::Signal;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Output sample format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// 16-bit signed integer PCM
    #[default]
    Int16,
    /// 24-bit signed integer PCM
    Int24,
    /// 32-bit IEEE float
    Float32,
}

impl BitDepth {
    /// Parse a bit count (16, 24 or 32)
    pub fn from_bits(bits: u16) -> Result<Self> {
        match bits {
            16 => Ok(BitDepth::Int16),
            24 => Ok(BitDepth::Int24),
            32 => Ok(BitDepth::Float32),
            other => Err(AudioIoError::EncodeError(format!(
                "unsupported bit depth {} (expected 16, 24 or 32)",
                other
            ))),
        }
    }

    /// Bits per sample
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    fn sample_format(self) -> SampleFormat {
        match self {
            BitDepth::Float32 => SampleFormat::Float,
            BitDepth::Int16 | BitDepth::Int24 => SampleFormat::Int,
        }
    }

    /// Full-scale magnitude for integer formats (2^(N-1))
    fn full_scale(self) -> f32 {
        match self {
            BitDepth::Int16 => 32768.0,
            BitDepth::Int24 => 8388608.0,
            BitDepth::Float32 => 1.0,
        }
    }
}

/// WAV file encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder {
    bit_depth: BitDepth,
}

impl WavEncoder {
    /// Create an encoder for the given sample format
    pub fn new(bit_depth: BitDepth) -> Self {
        Self { bit_depth }
    }

    /// Get the output sample format
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Write `signal` to `path` as interleaved WAV
    pub fn write(&self, path: &Path, signal: &Signal) -> Result<()> {
        let channels = u16::try_from(signal.channel_count()).map_err(|_| {
            AudioIoError::EncodeError(format!(
                "{} channels exceed the WAV limit",
                signal.channel_count()
            ))
        })?;
        let spec = WavSpec {
            channels,
            sample_rate: signal.sample_rate(),
            bits_per_sample: self.bit_depth.bits(),
            sample_format: self.bit_depth.sample_format(),
        };

        let partial = partial_path(path)?;
        if let Err(e) = self.write_samples(&partial, spec, signal) {
            // Best effort; the original error is what matters
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, path)?;

        tracing::debug!(
            "Wrote {} frames x {} channels ({}-bit) to {}",
            signal.frames(),
            signal.channel_count(),
            self.bit_depth.bits(),
            path.display()
        );
        Ok(())
    }

    fn write_samples(&self, path: &Path, spec: WavSpec, signal: &Signal) -> Result<()> {
        let mut writer = WavWriter::create(path, spec)?;
        let mut clipped = 0usize;

        for sample in signal.to_interleaved() {
            match self.bit_depth {
                BitDepth::Float32 => writer.write_sample(sample)?,
                BitDepth::Int16 | BitDepth::Int24 => {
                    if sample.abs() > 1.0 {
                        clipped += 1;
                    }
                    writer.write_sample(quantize(sample, self.bit_depth.full_scale()))?;
                }
            }
        }
        writer.finalize()?;

        if clipped > 0 {
            tracing::warn!("Clipped {} samples to full scale while encoding", clipped);
        }
        Ok(())
    }
}

/// Write `signal` to a WAV file
pub fn write_wav(path: &Path, signal: &Signal, bit_depth: BitDepth) -> Result<()> {
    WavEncoder::new(bit_depth).write(path, signal)
}

/// Clamp to [-1, 1] and scale to the integer range
fn quantize(sample: f32, full_scale: f32) -> i32 {
    let max = full_scale - 1.0;
    (sample.clamp(-1.0, 1.0) * full_scale).round().clamp(-full_scale, max) as i32
}

/// `dir/.name.partial` next to the destination
fn partial_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        AudioIoError::EncodeError(format!("{} is not a file path", path.display()))
    })?;
    let mut partial = std::ffi::OsString::from(".");
    partial.push(name);
    partial.push(".partial");
    Ok(path.with_file_name(partial))
}
