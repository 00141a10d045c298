//! Decoded audio signal type
//!
//! Samples are stored planar: one `Vec<f32>` per channel, all of equal length.
//! Values are nominally in [-1.0, 1.0] but nothing here clips.

use crate::error::{CrossfadeError, Result};
use std::ops::Range;

/// A fully decoded, fixed-rate audio signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Signal {
    /// Create a signal from planar channel data
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if channels.is_empty() {
            return Err(CrossfadeError::invalid("signal must have at least one channel"));
        }
        if sample_rate == 0 {
            return Err(CrossfadeError::invalid("sample rate must be positive"));
        }
        let frames = channels[0].len();
        if let Some((index, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frames)
        {
            return Err(CrossfadeError::InvalidParameter(format!(
                "channel {} has {} frames, channel 0 has {}",
                index,
                ch.len(),
                frames
            )));
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Assemble channels already known to be non-empty, equal in length and at a valid rate
    pub(crate) fn from_parts(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        debug_assert!(!channels.is_empty());
        debug_assert!(channels.iter().all(|ch| ch.len() == channels[0].len()));
        Self {
            channels,
            sample_rate,
        }
    }

    /// Create a signal from interleaved samples ([L, R, L, R, ...] for stereo)
    pub fn from_interleaved(samples: &[f32], channel_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count == 0 {
            return Err(CrossfadeError::invalid("signal must have at least one channel"));
        }
        if samples.len() % channel_count != 0 {
            return Err(CrossfadeError::InvalidParameter(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                channel_count
            )));
        }
        let frames = samples.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in samples.chunks_exact(channel_count) {
            for (ch, &sample) in channels.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }
        Self::new(channels, sample_rate)
    }

    /// Create a silent signal
    pub fn silence(channel_count: usize, frames: usize, sample_rate: u32) -> Result<Self> {
        Self::new(vec![vec![0.0; frames]; channel_count], sample_rate)
    }

    /// Concatenate signals end to end
    ///
    /// All parts must share channel count and sample rate.
    pub fn concat(parts: &[&Signal]) -> Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| CrossfadeError::invalid("nothing to concatenate"))?;
        for part in &parts[1..] {
            first.check_compatible(part)?;
        }

        let total: usize = parts.iter().map(|p| p.frames()).sum();
        let channels = (0..first.channel_count())
            .map(|ch| {
                let mut out = Vec::with_capacity(total);
                for part in parts {
                    out.extend_from_slice(&part.channels[ch]);
                }
                out
            })
            .collect();

        Self::new(channels, first.sample_rate)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Check if the signal holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Samples of one channel
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels, planar
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Consume the signal, returning its planar channel data
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Interleave the channels into one buffer
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channel_count());
        for i in 0..self.frames() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Copy a frame range out into a new signal
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.frames() {
            return Err(CrossfadeError::InvalidParameter(format!(
                "frame range {}..{} outside signal of {} frames",
                range.start,
                range.end,
                self.frames()
            )));
        }
        let channels = self
            .channels
            .iter()
            .map(|ch| ch[range.clone()].to_vec())
            .collect();
        Self::new(channels, self.sample_rate)
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Average all channels into one
    pub fn downmix_to_mono(&self) -> Self {
        let count = self.channel_count() as f32;
        let mono = (0..self.frames())
            .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f32>() / count)
            .collect();
        Self {
            channels: vec![mono],
            sample_rate: self.sample_rate,
        }
    }

    /// Scale so the peak equals `target`
    ///
    /// Silent signals come back unchanged.
    pub fn normalize_peak(&self, target: f32) -> Self {
        let peak = self.peak();
        if peak <= f32::EPSILON {
            return self.clone();
        }
        let gain = target / peak;
        tracing::debug!("Normalizing peak {:.4} to {:.4} (gain {:.4})", peak, target, gain);
        let channels = self
            .channels
            .iter()
            .map(|ch| ch.iter().map(|s| s * gain).collect())
            .collect();
        Self {
            channels,
            sample_rate: self.sample_rate,
        }
    }

    /// Ensure another signal can be mixed with this one
    pub fn check_compatible(&self, other: &Signal) -> Result<()> {
        if self.channel_count() != other.channel_count() {
            return Err(CrossfadeError::InvalidParameter(format!(
                "channel count mismatch: {} vs {}",
                self.channel_count(),
                other.channel_count()
            )));
        }
        if self.sample_rate != other.sample_rate {
            return Err(CrossfadeError::InvalidParameter(format!(
                "sample rate mismatch: {} Hz vs {} Hz",
                self.sample_rate, other.sample_rate
            )));
        }
        Ok(())
    }
}
