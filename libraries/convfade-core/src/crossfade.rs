//! Crossfade orchestration
//!
//! Ties the pieces together: validation, impulse response design, transition
//! compositing and final assembly.

use crate::assembler::assemble;
use crate::compositor::{check_length, BoundaryExtension, Compositor, ConvolutionPolicy, TransitionWindow};
use crate::convolver::{BlockConvolver, ConvolutionMethod};
use crate::error::{Result, SignalRole};
use crate::impulse::{build_impulse_response_with_window, ImpulseResponse, WindowFunction};
use crate::signal::Signal;
use crate::spectral::spectral_transition;

/// How the transition region is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossfadeMode {
    /// Lowpass-filtered segments blended with a linear amplitude fade
    #[default]
    Filtered,
    /// STFT frames mixed in the frequency domain
    Spectral {
        /// Analysis frame length in samples
        frame_len: usize,
    },
}

/// Crossfade settings
#[derive(Debug, Clone, PartialEq)]
pub struct CrossfadeSettings {
    /// Transition length in frames (0 = straight concatenation)
    pub transition_frames: usize,

    /// Lowpass cutoff in Hz
    pub cutoff_hz: f64,

    /// Impulse response length (odd, >= 3)
    pub tap_count: usize,

    /// Window shaping the sinc taps
    pub window: WindowFunction,

    /// Which sides get filtered
    pub policy: ConvolutionPolicy,

    /// Direct, FFT or automatic convolution
    pub method: ConvolutionMethod,

    /// Filter context at segment edges
    pub boundary: BoundaryExtension,

    /// Filtered or spectral transition
    pub mode: CrossfadeMode,

    /// Convolve channels on the rayon pool
    pub parallel: bool,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            transition_frames: 0,
            cutoff_hz: 150.0,
            tap_count: 101,
            window: WindowFunction::Hamming,
            policy: ConvolutionPolicy::Both,
            method: ConvolutionMethod::Auto,
            boundary: BoundaryExtension::Hold,
            mode: CrossfadeMode::Filtered,
            parallel: true,
        }
    }
}

impl CrossfadeSettings {
    /// Create settings with a specific transition length
    pub fn new(transition_frames: usize) -> Self {
        Self {
            transition_frames,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_transition(mut self, transition_frames: usize) -> Self {
        self.transition_frames = transition_frames;
        self
    }

    #[must_use]
    pub fn with_cutoff(mut self, cutoff_hz: f64) -> Self {
        self.cutoff_hz = cutoff_hz;
        self
    }

    #[must_use]
    pub fn with_taps(mut self, tap_count: usize) -> Self {
        self.tap_count = tap_count;
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: WindowFunction) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConvolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: ConvolutionMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryExtension) -> Self {
        self.boundary = boundary;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CrossfadeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Get a transition length in frames for a duration in seconds
    pub fn transition_frames_for(seconds: f64, sample_rate: u32) -> usize {
        if seconds <= 0.0 || !seconds.is_finite() {
            return 0;
        }
        (seconds * f64::from(sample_rate)).round() as usize
    }
}

/// Convolution crossfader
///
/// Stateless apart from its settings; every run designs a fresh impulse response.
#[derive(Debug, Clone, Default)]
pub struct Crossfader {
    settings: CrossfadeSettings,
}

impl Crossfader {
    /// Create a crossfader with the given settings
    pub fn new(settings: CrossfadeSettings) -> Self {
        Self { settings }
    }

    /// Get current settings
    pub fn settings(&self) -> &CrossfadeSettings {
        &self.settings
    }

    /// Crossfade `outgoing` into `incoming`
    ///
    /// Output frames = `outgoing.frames() + incoming.frames() - transition_frames`.
    /// On error no output is produced.
    pub fn run(&self, outgoing: &Signal, incoming: &Signal) -> Result<Signal> {
        let span = tracing::debug_span!(
            "crossfade",
            transition = self.settings.transition_frames,
            cutoff_hz = self.settings.cutoff_hz,
            taps = self.settings.tap_count
        );
        let _enter = span.enter();

        let transition = self.transition(outgoing, incoming)?;
        let output = assemble(
            outgoing,
            incoming,
            &transition,
            self.settings.transition_frames,
        )?;

        let peak = output.peak();
        if peak > 1.0 {
            tracing::warn!("Crossfade output peaks at {:.3} (above full scale)", peak);
        }
        Ok(output)
    }

    /// Build only the transition region
    pub fn transition(&self, outgoing: &Signal, incoming: &Signal) -> Result<Signal> {
        let settings = &self.settings;
        let frames = settings.transition_frames;

        outgoing.check_compatible(incoming)?;
        let ir = self.impulse_response(outgoing.sample_rate())?;
        check_length(outgoing, SignalRole::Outgoing, frames)?;
        check_length(incoming, SignalRole::Incoming, frames)?;

        if frames == 0 {
            tracing::debug!("Zero-length transition: concatenating");
            return Signal::silence(outgoing.channel_count(), 0, outgoing.sample_rate());
        }

        match settings.mode {
            CrossfadeMode::Filtered => {
                let convolver = BlockConvolver::new()
                    .with_method(settings.method)
                    .with_parallel(settings.parallel);
                Compositor::new()
                    .with_convolver(convolver)
                    .with_policy(settings.policy)
                    .with_boundary(settings.boundary)
                    .composite(outgoing, incoming, frames, &ir)
            }
            CrossfadeMode::Spectral { frame_len } => {
                let window = TransitionWindow::extract(outgoing, incoming, frames)?;
                spectral_transition(&window, frame_len)
            }
        }
    }

    fn impulse_response(&self, sample_rate: u32) -> Result<ImpulseResponse> {
        build_impulse_response_with_window(
            self.settings.cutoff_hz,
            self.settings.tap_count,
            sample_rate,
            self.settings.window,
        )
    }
}

/// Crossfade two signals through a windowed-sinc lowpass
///
/// # Arguments
/// * `outgoing` - Signal A, whose tail fades out
/// * `incoming` - Signal B, whose head fades in
/// * `transition_frames` - Overlap length in frames
/// * `cutoff_hz` - Lowpass cutoff in Hz
/// * `tap_count` - Impulse response length (odd, >= 3)
pub fn crossfade(
    outgoing: &Signal,
    incoming: &Signal,
    transition_frames: usize,
    cutoff_hz: f64,
    tap_count: usize,
) -> Result<Signal> {
    let settings = CrossfadeSettings::new(transition_frames)
        .with_cutoff(cutoff_hz)
        .with_taps(tap_count);
    Crossfader::new(settings).run(outgoing, incoming)
}
