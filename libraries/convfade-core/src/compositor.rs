//! Transition compositing
//!
//! Takes the last `n` frames of the outgoing signal and the first `n` frames of
//! the incoming one, filters each against the impulse response, and blends them
//! with complementary fade weights:
//!
//! ```text
//! out[i] = fade_out[i] · filtered_tail[i] + fade_in[i] · filtered_head[i]
//! ```

use crate::convolver::BlockConvolver;
use crate::error::{CrossfadeError, Result, SignalRole};
use crate::fade::{FadeCurve, FadeShape};
use crate::impulse::ImpulseResponse;
use crate::signal::Signal;
use std::ops::Range;

/// Which sides of the transition pass through the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConvolutionPolicy {
    /// Filter both the outgoing tail and the incoming head
    #[default]
    Both,
    /// Filter only the outgoing tail
    #[cfg_attr(feature = "serde", serde(rename = "outgoing"))]
    OutgoingOnly,
    /// Filter only the incoming head
    #[cfg_attr(feature = "serde", serde(rename = "incoming"))]
    IncomingOnly,
    /// No filtering: a plain amplitude crossfade
    Dry,
}

impl ConvolutionPolicy {
    fn filters(self, role: SignalRole) -> bool {
        match self {
            ConvolutionPolicy::Both => true,
            ConvolutionPolicy::OutgoingOnly => role == SignalRole::Outgoing,
            ConvolutionPolicy::IncomingOnly => role == SignalRole::Incoming,
            ConvolutionPolicy::Dry => false,
        }
    }
}

/// What the filter sees beyond the edges of a transition segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryExtension {
    /// Real neighbouring frames from the source signal, holding its first or
    /// last frame where the source itself ends
    #[default]
    Hold,
    /// Silence: the bare segment is convolved with zero padding
    Zero,
}

/// The two overlapping segments that make up a transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionWindow {
    tail: Signal,
    head: Signal,
}

impl TransitionWindow {
    /// Cut the tail of `outgoing` and the head of `incoming`, `frames` long each
    pub fn extract(outgoing: &Signal, incoming: &Signal, frames: usize) -> Result<Self> {
        outgoing.check_compatible(incoming)?;
        check_length(outgoing, SignalRole::Outgoing, frames)?;
        check_length(incoming, SignalRole::Incoming, frames)?;

        let tail = outgoing.slice(tail_range(outgoing, frames))?;
        let head = incoming.slice(0..frames)?;
        Ok(Self { tail, head })
    }

    /// Last frames of the outgoing signal
    pub fn tail(&self) -> &Signal {
        &self.tail
    }

    /// First frames of the incoming signal
    pub fn head(&self) -> &Signal {
        &self.head
    }

    /// Frames in each segment
    pub fn frames(&self) -> usize {
        self.tail.frames()
    }
}

pub(crate) fn check_length(signal: &Signal, role: SignalRole, required: usize) -> Result<()> {
    if signal.frames() < required {
        return Err(CrossfadeError::InsufficientLength {
            role,
            required,
            available: signal.frames(),
        });
    }
    Ok(())
}

fn tail_range(signal: &Signal, frames: usize) -> Range<usize> {
    signal.frames() - frames..signal.frames()
}

/// Builds the filtered, blended transition segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Compositor {
    convolver: BlockConvolver,
    policy: ConvolutionPolicy,
    boundary: BoundaryExtension,
    shape: FadeShape,
}

impl Compositor {
    /// Create a compositor with default convolver, policy and boundary handling
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_convolver(mut self, convolver: BlockConvolver) -> Self {
        self.convolver = convolver;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConvolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_boundary(mut self, boundary: BoundaryExtension) -> Self {
        self.boundary = boundary;
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: FadeShape) -> Self {
        self.shape = shape;
        self
    }

    /// Composite the transition between `outgoing` and `incoming`
    ///
    /// Returns exactly `frames` frames with the inputs' channel count.
    pub fn composite(
        &self,
        outgoing: &Signal,
        incoming: &Signal,
        frames: usize,
        ir: &ImpulseResponse,
    ) -> Result<Signal> {
        outgoing.check_compatible(incoming)?;
        check_length(outgoing, SignalRole::Outgoing, frames)?;
        check_length(incoming, SignalRole::Incoming, frames)?;
        let curve = FadeCurve::new(frames, self.shape)?;

        let tail = self.prepare(outgoing, tail_range(outgoing, frames), SignalRole::Outgoing, ir)?;
        let head = self.prepare(incoming, 0..frames, SignalRole::Incoming, ir)?;

        tracing::debug!(
            "Blending {} frames x {} channels ({:?}, {:?} boundary)",
            frames,
            outgoing.channel_count(),
            self.policy,
            self.boundary
        );

        Ok(blend(&tail, &head, &curve))
    }

    /// Produce one side's segment, filtered or dry per policy
    fn prepare(
        &self,
        source: &Signal,
        range: Range<usize>,
        role: SignalRole,
        ir: &ImpulseResponse,
    ) -> Result<Signal> {
        if !self.policy.filters(role) {
            return source.slice(range);
        }
        match self.boundary {
            BoundaryExtension::Zero => Ok(self.convolver.convolve(&source.slice(range)?, ir)),
            BoundaryExtension::Hold => {
                let context = ir.center();
                let padded = held_context(source, &range, context);
                let filtered = self.convolver.convolve(&padded, ir);
                filtered.slice(context..context + range.len())
            }
        }
    }
}

/// Copy `range` plus `context` frames each side, clamping reads to the source
fn held_context(source: &Signal, range: &Range<usize>, context: usize) -> Signal {
    let last = source.frames() - 1;
    let start = range.start as isize - context as isize;
    let end = (range.end + context) as isize;

    let channels = source
        .channels()
        .iter()
        .map(|ch| {
            (start..end)
                .map(|idx| ch[idx.clamp(0, last as isize) as usize])
                .collect()
        })
        .collect();

    Signal::from_parts(channels, source.sample_rate())
}

/// Weighted sum of the two segments, accumulated in f64
fn blend(tail: &Signal, head: &Signal, curve: &FadeCurve) -> Signal {
    let channels = tail
        .channels()
        .iter()
        .zip(head.channels())
        .map(|(tail_ch, head_ch)| {
            tail_ch
                .iter()
                .zip(head_ch)
                .zip(curve.fade_out().iter().zip(curve.fade_in()))
                .map(|((&t, &h), (&out_w, &in_w))| {
                    (out_w * f64::from(t) + in_w * f64::from(h)) as f32
                })
                .collect()
        })
        .collect();

    Signal::from_parts(channels, tail.sample_rate())
}

/// Composite a transition with the default compositor
pub fn composite_transition(
    outgoing: &Signal,
    incoming: &Signal,
    frames: usize,
    ir: &ImpulseResponse,
) -> Result<Signal> {
    Compositor::default().composite(outgoing, incoming, frames, ir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impulse::build_impulse_response;

    fn constant(value: f32, frames: usize) -> Signal {
        Signal::new(vec![vec![value; frames]], 44100).unwrap()
    }

    fn ramp(frames: usize) -> Signal {
        Signal::new(vec![(0..frames).map(|i| i as f32).collect()], 44100).unwrap()
    }

    #[test]
    fn test_extract_window() {
        let window = TransitionWindow::extract(&ramp(10), &ramp(8), 3).unwrap();
        assert_eq!(window.tail().channel(0).unwrap(), &[7.0, 8.0, 9.0]);
        assert_eq!(window.head().channel(0).unwrap(), &[0.0, 1.0, 2.0]);
        assert_eq!(window.frames(), 3);
    }

    #[test]
    fn test_extract_rejects_short_signal() {
        let result = TransitionWindow::extract(&ramp(5), &ramp(50), 10);
        assert_eq!(
            result,
            Err(CrossfadeError::InsufficientLength {
                role: SignalRole::Outgoing,
                required: 10,
                available: 5,
            })
        );
    }

    #[test]
    fn test_transition_has_requested_shape() {
        let a = Signal::silence(2, 1000, 44100).unwrap();
        let b = Signal::silence(2, 800, 44100).unwrap();
        let ir = build_impulse_response(500.0, 51, 44100).unwrap();
        let out = composite_transition(&a, &b, 300, &ir).unwrap();
        assert_eq!(out.frames(), 300);
        assert_eq!(out.channel_count(), 2);
    }

    #[test]
    fn test_identity_response_gives_linear_crossfade() {
        let a = constant(1.0, 100);
        let b = constant(0.0, 100);
        let ir = ImpulseResponse::identity(11).unwrap();
        let out = composite_transition(&a, &b, 11, &ir).unwrap();
        let samples = out.channel(0).unwrap();
        for (i, s) in samples.iter().enumerate() {
            let expected = 1.0 - i as f32 / 10.0;
            assert!((s - expected).abs() < 1e-6, "sample {}: {} vs {}", i, s, expected);
        }
    }

    #[test]
    fn test_dry_policy_matches_identity_filter() {
        let a = ramp(200);
        let b = constant(0.5, 200);
        let lowpass = build_impulse_response(1000.0, 31, 44100).unwrap();
        let dry = Compositor::new()
            .with_policy(ConvolutionPolicy::Dry)
            .composite(&a, &b, 50, &lowpass)
            .unwrap();
        let identity = composite_transition(&a, &b, 50, &ImpulseResponse::identity(31).unwrap())
            .unwrap();
        for (d, i) in dry.channel(0).unwrap().iter().zip(identity.channel(0).unwrap()) {
            assert!((d - i).abs() < 1e-4);
        }
    }

    #[test]
    fn test_hold_boundary_keeps_constant_level() {
        // A constant signal filtered with held context stays constant at the edges
        let a = constant(1.0, 500);
        let b = constant(1.0, 500);
        let ir = build_impulse_response(150.0, 101, 44100).unwrap();
        let out = composite_transition(&a, &b, 200, &ir).unwrap();
        for s in out.channel(0).unwrap() {
            assert!((s - 1.0).abs() < 1e-5, "got {}", s);
        }
    }

    #[test]
    fn test_zero_boundary_rolls_off_edges() {
        let a = constant(1.0, 500);
        let b = constant(1.0, 500);
        let ir = build_impulse_response(150.0, 101, 44100).unwrap();
        let out = Compositor::new()
            .with_boundary(BoundaryExtension::Zero)
            .composite(&a, &b, 200, &ir)
            .unwrap();
        let samples = out.channel(0).unwrap();
        assert!(samples[0] < 0.6, "edge = {}", samples[0]);
        assert!((samples[100] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_sided_policies() {
        let a = ramp(300);
        let b = ramp(300);
        let ir = build_impulse_response(200.0, 61, 44100).unwrap();
        for policy in [ConvolutionPolicy::OutgoingOnly, ConvolutionPolicy::IncomingOnly] {
            let out = Compositor::new()
                .with_policy(policy)
                .composite(&a, &b, 100, &ir)
                .unwrap();
            assert_eq!(out.frames(), 100);
            assert!(out.channel(0).unwrap().iter().all(|s| s.is_finite()));
        }
        assert!(ConvolutionPolicy::OutgoingOnly.filters(SignalRole::Outgoing));
        assert!(!ConvolutionPolicy::OutgoingOnly.filters(SignalRole::Incoming));
        assert!(!ConvolutionPolicy::Dry.filters(SignalRole::Outgoing));
    }

    #[test]
    fn test_mismatched_channels_rejected() {
        let a = Signal::silence(1, 100, 44100).unwrap();
        let b = Signal::silence(2, 100, 44100).unwrap();
        let ir = ImpulseResponse::identity(3).unwrap();
        assert!(matches!(
            composite_transition(&a, &b, 10, &ir),
            Err(CrossfadeError::InvalidParameter(_))
        ));
    }
}
