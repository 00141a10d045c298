//! Windowed-sinc lowpass impulse responses
//!
//! The ideal lowpass response is a sinc centred on the middle tap. Truncating it
//! to a finite length causes ringing (Gibbs phenomenon), so the taps are shaped
//! by a window function before being normalised to unity DC gain.

use crate::error::{CrossfadeError, Result};
use std::f64::consts::PI;

/// Window applied across the sinc taps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WindowFunction {
    /// Hamming window: ~43 dB sidelobe rejection, narrow main lobe
    #[default]
    Hamming,
    /// Hann window: tapers to zero at both ends
    Hann,
    /// Blackman window: ~58 dB sidelobe rejection, wider transition band
    Blackman,
}

impl WindowFunction {
    /// Window coefficient for tap `index` of `length`
    ///
    /// Symmetric: `coefficient(i, n) == coefficient(n - 1 - i, n)`.
    pub fn coefficient(&self, index: usize, length: usize) -> f64 {
        if length <= 1 {
            return 1.0;
        }
        let phase = 2.0 * PI * index as f64 / (length - 1) as f64;
        match self {
            WindowFunction::Hamming => 0.54 - 0.46 * phase.cos(),
            WindowFunction::Hann => 0.5 - 0.5 * phase.cos(),
            WindowFunction::Blackman => 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos(),
        }
    }

    /// Get a human-readable name for the window
    pub fn display_name(&self) -> &'static str {
        match self {
            WindowFunction::Hamming => "Hamming",
            WindowFunction::Hann => "Hann",
            WindowFunction::Blackman => "Blackman",
        }
    }
}

/// Finite impulse response of odd length with a well-defined center tap
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    taps: Vec<f64>,
}

impl ImpulseResponse {
    /// Wrap caller-supplied taps
    ///
    /// The length must be odd so the center tap is unambiguous.
    pub fn from_taps(taps: Vec<f64>) -> Result<Self> {
        if taps.len() % 2 == 0 {
            return Err(CrossfadeError::InvalidParameter(format!(
                "impulse response length must be odd, got {}",
                taps.len()
            )));
        }
        Ok(Self { taps })
    }

    /// Dirac response: 1.0 at the center, zero elsewhere
    pub fn identity(tap_count: usize) -> Result<Self> {
        let mut taps = vec![0.0; tap_count];
        if let Some(center) = taps.get_mut(tap_count / 2) {
            *center = 1.0;
        }
        Self::from_taps(taps)
    }

    /// The filter coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Number of taps
    pub fn len(&self) -> usize {
        self.taps.len()
    }

    /// Always false: the constructors reject even (including zero) lengths
    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    /// Index of the center tap, `(len - 1) / 2`
    pub fn center(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Response at 0 Hz (sum of taps)
    pub fn dc_gain(&self) -> f64 {
        self.taps.iter().sum()
    }
}

/// Build a Hamming-windowed sinc lowpass
///
/// # Arguments
/// * `cutoff_hz` - Cutoff frequency, `0 < cutoff_hz < sample_rate / 2`
/// * `tap_count` - Filter length, odd and at least 3
/// * `sample_rate` - Sample rate in Hz
pub fn build_impulse_response(
    cutoff_hz: f64,
    tap_count: usize,
    sample_rate: u32,
) -> Result<ImpulseResponse> {
    build_impulse_response_with_window(cutoff_hz, tap_count, sample_rate, WindowFunction::Hamming)
}

/// Build a windowed sinc lowpass with an explicit window
pub fn build_impulse_response_with_window(
    cutoff_hz: f64,
    tap_count: usize,
    sample_rate: u32,
    window: WindowFunction,
) -> Result<ImpulseResponse> {
    if sample_rate == 0 {
        return Err(CrossfadeError::invalid("sample rate must be positive"));
    }
    let nyquist = f64::from(sample_rate) / 2.0;
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 || cutoff_hz >= nyquist {
        return Err(CrossfadeError::InvalidParameter(format!(
            "cutoff {} Hz must lie in (0, {}) for {} Hz audio",
            cutoff_hz, nyquist, sample_rate
        )));
    }
    if tap_count < 3 || tap_count % 2 == 0 {
        return Err(CrossfadeError::InvalidParameter(format!(
            "tap count must be odd and at least 3, got {}",
            tap_count
        )));
    }

    let normalized_cutoff = cutoff_hz / f64::from(sample_rate);
    let center = (tap_count - 1) / 2;

    let mut taps: Vec<f64> = (0..tap_count)
        .map(|i| {
            let offset = i as f64 - center as f64;
            let ideal = 2.0 * normalized_cutoff * sinc(2.0 * normalized_cutoff * offset);
            ideal * window.coefficient(i, tap_count)
        })
        .collect();

    // Unity gain at DC
    let sum: f64 = taps.iter().sum();
    if sum.abs() < f64::EPSILON {
        return Err(CrossfadeError::InvalidParameter(format!(
            "{} taps cannot realise a {} Hz cutoff at {} Hz",
            tap_count, cutoff_hz, sample_rate
        )));
    }
    for tap in &mut taps {
        *tap /= sum;
    }

    // Floating-point summation order can leave the mirrored halves a few ulps apart
    let (left, right) = taps.split_at_mut(center + 1);
    for (l, r) in left.iter_mut().zip(right.iter_mut().rev()) {
        let mirrored = (*l + *r) * 0.5;
        *l = mirrored;
        *r = mirrored;
    }

    tracing::trace!(
        "Built {}-tap {} lowpass at {} Hz (fc = {:.6}), center tap {:.6}",
        tap_count,
        window.display_name(),
        cutoff_hz,
        normalized_cutoff,
        taps[center]
    );

    Ok(ImpulseResponse { taps })
}

/// Normalised sinc: sin(πx) / (πx)
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}
