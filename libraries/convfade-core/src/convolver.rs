//! Block convolution in "same" mode
//!
//! Output has exactly as many frames as the input segment and is aligned on the
//! impulse response's center tap:
//!
//! ```text
//! out[i] = Σ_k taps[k] · in[i + center - k]     (in[j] = 0 outside the segment)
//! ```
//!
//! Two interchangeable methods are provided:
//! - Direct time-domain convolution, O(N·taps), for short responses
//! - FFT convolution via rustfft, O(N log N), for longer ones
//!
//! Both accumulate in f64. Nothing is clipped: overshoot stays visible.

use crate::impulse::ImpulseResponse;
use crate::signal::Signal;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

/// Responses up to this many taps use direct convolution under `Auto`
pub const TIME_DOMAIN_THRESHOLD: usize = 64;

/// How the convolution sum is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolutionMethod {
    /// Direct time-domain sum
    Direct,
    /// Frequency-domain multiply (zero-padded to avoid circular wrap)
    Fft,
    /// Direct for short responses, FFT otherwise
    #[default]
    Auto,
}

impl ConvolutionMethod {
    fn resolve(self, tap_count: usize) -> Self {
        match self {
            ConvolutionMethod::Auto if tap_count <= TIME_DOMAIN_THRESHOLD => {
                ConvolutionMethod::Direct
            }
            ConvolutionMethod::Auto => ConvolutionMethod::Fft,
            other => other,
        }
    }
}

/// Convolves multi-channel segments against an impulse response
///
/// Channels are independent; with `parallel` enabled each one is convolved on
/// the rayon pool into its own output vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConvolver {
    method: ConvolutionMethod,
    parallel: bool,
}

impl Default for BlockConvolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockConvolver {
    /// Create a convolver with automatic method selection, parallel across channels
    pub fn new() -> Self {
        Self {
            method: ConvolutionMethod::Auto,
            parallel: true,
        }
    }

    /// Use a specific convolution method
    #[must_use]
    pub fn with_method(mut self, method: ConvolutionMethod) -> Self {
        self.method = method;
        self
    }

    /// Enable or disable per-channel parallelism
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The configured method
    pub fn method(&self) -> ConvolutionMethod {
        self.method
    }

    /// Convolve every channel of `segment`, returning a segment of the same shape
    pub fn convolve(&self, segment: &Signal, ir: &ImpulseResponse) -> Signal {
        let method = self.method.resolve(ir.len());
        tracing::trace!(
            "Convolving {} frames x {} channels with {} taps ({:?})",
            segment.frames(),
            segment.channel_count(),
            ir.len(),
            method
        );

        let convolve_one = |samples: &Vec<f32>| convolve_channel(samples, ir, method);
        let channels: Vec<Vec<f32>> = if self.parallel && segment.channel_count() > 1 {
            segment.channels().par_iter().map(convolve_one).collect()
        } else {
            segment.channels().iter().map(convolve_one).collect()
        };

        Signal::from_parts(channels, segment.sample_rate())
    }
}

/// Convolve a segment with the default convolver
pub fn convolve_segment(segment: &Signal, ir: &ImpulseResponse) -> Signal {
    BlockConvolver::default().convolve(segment, ir)
}

/// Convolve a single channel in "same" mode
pub fn convolve_channel(
    samples: &[f32],
    ir: &ImpulseResponse,
    method: ConvolutionMethod,
) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    match method.resolve(ir.len()) {
        ConvolutionMethod::Fft => convolve_fft(samples, ir),
        _ => convolve_direct(samples, ir),
    }
}

/// Direct time-domain convolution, cropped on the center tap
fn convolve_direct(samples: &[f32], ir: &ImpulseResponse) -> Vec<f32> {
    let taps = ir.taps();
    let center = ir.center();
    let n = samples.len();

    (0..n)
        .map(|i| {
            // Input index j = i + center - k must stay inside [0, n)
            let k_min = (i + center + 1).saturating_sub(n);
            let k_max = (i + center).min(taps.len() - 1);
            let acc: f64 = taps[k_min..=k_max]
                .iter()
                .zip(samples[i + center - k_max..=i + center - k_min].iter().rev())
                .map(|(&t, &x)| t * f64::from(x))
                .sum();
            acc as f32
        })
        .collect()
}

/// FFT convolution: full linear convolution, then the `center..center + n` window
fn convolve_fft(samples: &[f32], ir: &ImpulseResponse) -> Vec<f32> {
    let n = samples.len();
    let taps = ir.taps();
    let full_len = n + taps.len() - 1;
    let fft_size = full_len.next_power_of_two();

    let mut planner = FftPlanner::<f64>::new();
    let fft_forward = planner.plan_fft_forward(fft_size);
    let fft_inverse = planner.plan_fft_inverse(fft_size);

    let mut signal: Vec<Complex<f64>> = samples
        .iter()
        .map(|&x| Complex::new(f64::from(x), 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_size)
        .collect();
    let mut kernel: Vec<Complex<f64>> = taps
        .iter()
        .map(|&t| Complex::new(t, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(fft_size)
        .collect();

    fft_forward.process(&mut signal);
    fft_forward.process(&mut kernel);

    for (s, k) in signal.iter_mut().zip(&kernel) {
        *s *= k;
    }

    fft_inverse.process(&mut signal);
    let scale = 1.0 / fft_size as f64;

    signal[ir.center()..ir.center() + n]
        .iter()
        .map(|c| (c.re * scale) as f32)
        .collect()
}
