//! Convolution-filtered crossfading for ConvFade
//!
//! This crate provides:
//! - A planar multichannel `Signal` type
//! - Windowed-sinc lowpass design (Hamming, Hann, Blackman)
//! - "Same"-length convolution, direct or FFT-based, parallel across channels
//! - Complementary linear fade weights
//! - Transition compositing and final buffer assembly
//! - An optional spectral (STFT) transition mode
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐
//! │ Outgoing A  │ ──► │ Tail (last n)│ ──┐
//! └─────────────┘     └──────────────┘   │   ┌──────────────┐   ┌────────────┐
//!                                        ├─► │  Convolver   │──►│   Blend    │
//! ┌─────────────┐     ┌──────────────┐   │   └──────────────┘   └────────────┘
//! │ Incoming B  │ ──► │ Head (first n)│──┘          ▲                  │
//! └─────────────┘     └──────────────┘      ┌──────────────┐           ▼
//!                                           │ Sinc lowpass │   ┌────────────────┐
//!                                           └──────────────┘   │ A[..] ++ T ++  │
//!                                                              │ B[n..]         │
//!                                                              └────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use convfade_core::{crossfade, Signal};
//!
//! # fn example() -> convfade_core::Result<()> {
//! let a = Signal::new(vec![vec![1.0; 10_000]], 44100)?;
//! let b = Signal::new(vec![vec![0.0; 10_000]], 44100)?;
//!
//! let out = crossfade(&a, &b, 4410, 150.0, 101)?;
//! assert_eq!(out.frames(), 10_000 + 10_000 - 4410);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod assembler;
mod compositor;
mod convolver;
mod crossfade;
mod error;
mod fade;
mod impulse;
mod signal;
mod spectral;

pub use assembler::assemble;
pub use compositor::{composite_transition, BoundaryExtension, Compositor, ConvolutionPolicy, TransitionWindow};
pub use convolver::{
    convolve_channel, convolve_segment, BlockConvolver, ConvolutionMethod, TIME_DOMAIN_THRESHOLD,
};
pub use crossfade::{crossfade, CrossfadeMode, CrossfadeSettings, Crossfader};
pub use error::{CrossfadeError, Result, SignalRole};
pub use fade::{generate_fade_curve, FadeCurve, FadeShape};
pub use impulse::{
    build_impulse_response, build_impulse_response_with_window, ImpulseResponse, WindowFunction,
};
pub use signal::Signal;
pub use spectral::{frame_len_from_ms, spectral_transition};

/// Default lowpass cutoff in Hz
pub const DEFAULT_CUTOFF_HZ: f64 = 150.0;

/// Default impulse response length
pub const DEFAULT_TAP_COUNT: usize = 101;
