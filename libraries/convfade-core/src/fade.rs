//! Complementary fade weights for the transition region
//!
//! The fade curve is a crossfade *position*, not audio. `fade_out` weights the
//! outgoing signal and runs 1.0 → 0.0; `fade_in` is its mirror, and the two sum
//! to 1.0 at every index.

use crate::error::{CrossfadeError, Result};

/// Shape of the amplitude fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeShape {
    /// Linear amplitude fade (constant amplitude sum, not constant power)
    #[default]
    Linear,
}

impl FadeShape {
    /// Fade-in gain at a normalised position in [0.0, 1.0]
    #[inline]
    pub fn gain_at(&self, position: f64) -> f64 {
        let t = position.clamp(0.0, 1.0);
        match self {
            FadeShape::Linear => t,
        }
    }

    /// Get a human-readable name for the shape
    pub fn display_name(&self) -> &'static str {
        match self {
            FadeShape::Linear => "Linear",
        }
    }
}

/// Per-sample blend weights for a transition of fixed length
#[derive(Debug, Clone, PartialEq)]
pub struct FadeCurve {
    fade_out: Vec<f64>,
    fade_in: Vec<f64>,
}

impl FadeCurve {
    /// Generate a curve of `length` samples with the given shape
    ///
    /// A single-sample curve sits at the midpoint (0.5 / 0.5).
    pub fn new(length: usize, shape: FadeShape) -> Result<Self> {
        if length == 0 {
            return Err(CrossfadeError::invalid("fade length must be positive"));
        }

        let fade_in: Vec<f64> = if length == 1 {
            vec![shape.gain_at(0.5)]
        } else {
            let last = (length - 1) as f64;
            (0..length).map(|i| shape.gain_at(i as f64 / last)).collect()
        };
        let fade_out = fade_in.iter().map(|w| 1.0 - w).collect();

        Ok(Self { fade_out, fade_in })
    }

    /// Weights applied to the outgoing signal (1.0 → 0.0)
    pub fn fade_out(&self) -> &[f64] {
        &self.fade_out
    }

    /// Weights applied to the incoming signal (0.0 → 1.0)
    pub fn fade_in(&self) -> &[f64] {
        &self.fade_in
    }

    /// Number of samples in the curve
    pub fn len(&self) -> usize {
        self.fade_in.len()
    }

    /// Always false: zero-length curves are rejected at construction
    pub fn is_empty(&self) -> bool {
        self.fade_in.is_empty()
    }

    /// Largest weight change between adjacent samples
    pub fn max_step(&self) -> f64 {
        self.fade_in
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max)
    }
}

/// Generate a linear complementary fade of `length` samples
pub fn generate_fade_curve(length: usize) -> Result<FadeCurve> {
    FadeCurve::new(length, FadeShape::Linear)
}
