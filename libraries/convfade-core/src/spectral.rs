//! Spectral (STFT) transition
//!
//! An alternative to the filtered amplitude fade: both segments are cut into
//! overlapping Hann-windowed frames, and each frame pair is mixed in the
//! frequency domain:
//!
//! ```text
//! Y = s·A + e·B + (s·A ⊙ e·B) / N
//! ```
//!
//! The product term is the circular convolution of the two frames averaged over
//! the frame length. `s` holds at 1.0 for the first half of the frames and then
//! ramps to 0; `e` ramps up over the first half and then holds at 1.0. The
//! lowest bins of both spectra are dropped to keep DC and sub-audio rumble out
//! of the transition.

use crate::compositor::TransitionWindow;
use crate::error::{CrossfadeError, Result};
use crate::signal::Signal;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Number of low-frequency bins removed from each frame
const LOW_BINS_REMOVED: usize = 3;

/// Smallest usable frame (hop is a quarter frame)
const MIN_FRAME_LEN: usize = 4;

/// Convert a frame length in milliseconds to samples
pub fn frame_len_from_ms(frame_ms: u32, sample_rate: u32) -> usize {
    ((u64::from(frame_ms) * u64::from(sample_rate)) / 1000) as usize
}

/// Build the spectral transition for an extracted window
pub fn spectral_transition(window: &TransitionWindow, frame_len: usize) -> Result<Signal> {
    let frames = window.frames();
    if frame_len < MIN_FRAME_LEN {
        return Err(CrossfadeError::InvalidParameter(format!(
            "spectral frame length must be at least {} samples, got {}",
            MIN_FRAME_LEN, frame_len
        )));
    }
    if frame_len > frames {
        return Err(CrossfadeError::InvalidParameter(format!(
            "spectral frame length {} exceeds transition length {}",
            frame_len, frames
        )));
    }

    let stft = Stft::new(frame_len);
    tracing::debug!(
        "Spectral transition: {} frames, STFT size {} (hop {})",
        frames,
        frame_len,
        stft.hop
    );

    let channels: Vec<Vec<f32>> = window
        .tail()
        .channels()
        .par_iter()
        .zip(window.head().channels().par_iter())
        .map(|(tail, head)| stft.mix_channel(tail, head))
        .collect();

    Ok(Signal::from_parts(channels, window.tail().sample_rate()))
}

/// Planned transforms and window for one frame size
struct Stft {
    size: usize,
    hop: usize,
    window: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Stft {
    fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        // Periodic Hann sums to a constant under quarter-frame overlap
        let window = (0..size)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / size as f64).cos())
            .collect();
        Self {
            size,
            hop: size / 4,
            window,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Mix one channel's tail and head, returning exactly `tail.len()` samples
    fn mix_channel(&self, tail: &[f32], head: &[f32]) -> Vec<f32> {
        let length = tail.len();
        let pad = self.size / 2;
        let padded_len = length + 2 * pad;
        let frame_count = 1 + (padded_len - self.size).div_ceil(self.hop);
        let span = (frame_count - 1) * self.hop + self.size;

        let tail = padded(tail, pad, span);
        let head = padded(head, pad, span);

        let mut output = vec![0.0f64; span];
        let mut weight = vec![0.0f64; span];
        let mut a = vec![Complex::new(0.0, 0.0); self.size];
        let mut b = vec![Complex::new(0.0, 0.0); self.size];
        let half = frame_count as f64 / 2.0;

        for k in 0..frame_count {
            let offset = k * self.hop;
            self.analyze(&tail[offset..offset + self.size], &mut a);
            self.analyze(&head[offset..offset + self.size], &mut b);

            let (out_scale, in_scale) = frame_scales(k as f64, half);
            let norm = 1.0 / self.size as f64;
            for (x, y) in a.iter_mut().zip(&b) {
                let sa = *x * out_scale;
                let eb = *y * in_scale;
                *x = sa + eb + sa * eb * norm;
            }

            self.inverse.process(&mut a);
            for (n, z) in a.iter().enumerate() {
                let w = self.window[n];
                output[offset + n] += z.re * norm * w;
                weight[offset + n] += w * w;
            }
        }

        (pad..pad + length)
            .map(|i| {
                if weight[i] > 1e-10 {
                    (output[i] / weight[i]) as f32
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Windowed forward FFT with the lowest bins (and their mirrors) cleared
    fn analyze(&self, frame: &[f64], spectrum: &mut [Complex<f64>]) {
        for ((bin, &x), &w) in spectrum.iter_mut().zip(frame).zip(&self.window) {
            *bin = Complex::new(x * w, 0.0);
        }
        self.forward.process(spectrum);

        let zero = Complex::new(0.0, 0.0);
        spectrum[..LOW_BINS_REMOVED].fill(zero);
        spectrum[self.size + 1 - LOW_BINS_REMOVED..].fill(zero);
    }
}

/// Outgoing and incoming scale for frame `k` of `2·half`
fn frame_scales(k: f64, half: f64) -> (f64, f64) {
    if k < half {
        (1.0, k / half)
    } else {
        ((2.0 * half - k) / half, 1.0)
    }
}

fn padded(samples: &[f32], pad: usize, span: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; span];
    for (dst, &s) in out[pad..].iter_mut().zip(samples) {
        *dst = f64::from(s);
    }
    out
}
