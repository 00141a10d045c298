//! End-to-end crossfade tests
//!
//! Runs the full pipeline (filter design, convolution, blend, assembly) on
//! synthetic signals with known expected shapes.

use convfade_core::{
    crossfade, BoundaryExtension, ConvolutionMethod, ConvolutionPolicy, CrossfadeError,
    CrossfadeMode, CrossfadeSettings, Crossfader, Signal, SignalRole, WindowFunction,
};
use std::f32::consts::PI;

// =============================================================================
// Test Utilities
// =============================================================================

fn constant(value: f32, frames: usize, sample_rate: u32) -> Signal {
    Signal::new(vec![vec![value; frames]], sample_rate).unwrap()
}

fn sine_stereo(frequency: f32, sample_rate: u32, frames: usize) -> Signal {
    let left: Vec<f32> = (0..frames)
        .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect();
    let right: Vec<f32> = left.iter().map(|s| -s).collect();
    Signal::new(vec![left, right], sample_rate).unwrap()
}

fn max_jump(samples: &[f32]) -> f32 {
    samples
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0f32, f32::max)
}

fn mean_abs(samples: &[f32]) -> f64 {
    samples.iter().map(|&s| f64::from(s.abs())).sum::<f64>() / samples.len() as f64
}

// =============================================================================
// Fade from full scale DC to silence
// =============================================================================

#[test]
fn test_dc_to_silence_decays_monotonically() {
    let transition = 4410;
    let a = constant(1.0, 10_000, 44100);
    let b = constant(0.0, 10_000, 44100);

    let out = crossfade(&a, &b, transition, 150.0, 101).unwrap();
    assert_eq!(out.frames(), 10_000 + 10_000 - transition);

    let samples = out.channel(0).unwrap();
    let start = 10_000 - transition;
    let region = &samples[start..start + transition];

    // Mean level over each tenth of the transition keeps falling
    let block = transition / 10;
    let levels: Vec<f64> = region.chunks(block).take(10).map(mean_abs).collect();
    for pair in levels.windows(2) {
        assert!(pair[1] < pair[0], "levels not decreasing: {:?}", levels);
    }

    // No step anywhere in the output exceeds one fade increment
    let limit = 1.0 / (transition - 1) as f32 + 1e-4;
    let jump = max_jump(samples);
    assert!(jump <= limit, "max jump {} exceeds {}", jump, limit);

    assert!((region[0] - 1.0).abs() < 1e-4);
    assert!(region[transition - 1].abs() < 1e-4);
}

#[test]
fn test_dc_to_silence_with_fft_matches_direct() {
    let a = constant(1.0, 6000, 44100);
    let b = constant(0.0, 6000, 44100);
    let run = |method| {
        let settings = CrossfadeSettings::new(2000).with_method(method);
        Crossfader::new(settings).run(&a, &b).unwrap()
    };
    let direct = run(ConvolutionMethod::Direct);
    let fft = run(ConvolutionMethod::Fft);
    for (d, f) in direct.channel(0).unwrap().iter().zip(fft.channel(0).unwrap()) {
        assert!((d - f).abs() < 1e-5);
    }
}

// =============================================================================
// Length and validation
// =============================================================================

#[test]
fn test_length_invariant_across_settings() {
    let a = sine_stereo(440.0, 48000, 9000);
    let b = sine_stereo(220.0, 48000, 7000);

    for window in [WindowFunction::Hamming, WindowFunction::Hann, WindowFunction::Blackman] {
        for policy in [
            ConvolutionPolicy::Both,
            ConvolutionPolicy::OutgoingOnly,
            ConvolutionPolicy::IncomingOnly,
            ConvolutionPolicy::Dry,
        ] {
            let settings = CrossfadeSettings::new(3000)
                .with_window(window)
                .with_policy(policy)
                .with_cutoff(400.0)
                .with_taps(63);
            let out = Crossfader::new(settings).run(&a, &b).unwrap();
            assert_eq!(out.frames(), 9000 + 7000 - 3000);
            assert_eq!(out.channel_count(), 2);
            assert_eq!(out.sample_rate(), 48000);
        }
    }
}

#[test]
fn test_zero_transition_is_plain_concatenation() {
    let a = sine_stereo(440.0, 44100, 300);
    let b = sine_stereo(880.0, 44100, 200);
    let out = crossfade(&a, &b, 0, 150.0, 101).unwrap();
    let expected = Signal::concat(&[&a, &b]).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn test_transition_longer_than_outgoing_fails() {
    let a = constant(0.5, 500, 44100);
    let b = constant(0.5, 5000, 44100);
    let err = crossfade(&a, &b, 1000, 150.0, 101).unwrap_err();
    assert_eq!(
        err,
        CrossfadeError::InsufficientLength {
            role: SignalRole::Outgoing,
            required: 1000,
            available: 500,
        }
    );
    assert!(err.to_string().contains("500"));
}

#[test]
fn test_transition_longer_than_incoming_fails() {
    let a = constant(0.5, 5000, 44100);
    let b = constant(0.5, 10, 44100);
    assert!(matches!(
        crossfade(&a, &b, 11, 150.0, 101),
        Err(CrossfadeError::InsufficientLength {
            role: SignalRole::Incoming,
            ..
        })
    ));
}

#[test]
fn test_channel_mismatch_fails() {
    let a = sine_stereo(440.0, 44100, 1000);
    let b = constant(0.0, 1000, 44100);
    assert!(matches!(
        crossfade(&a, &b, 100, 150.0, 101),
        Err(CrossfadeError::InvalidParameter(_))
    ));
}

#[test]
fn test_invalid_filter_parameters_fail() {
    let a = constant(0.5, 1000, 44100);
    let b = constant(0.5, 1000, 44100);
    for (cutoff, taps) in [(0.0, 101), (-10.0, 101), (22050.0, 101), (150.0, 100), (150.0, 1)] {
        assert!(
            matches!(
                crossfade(&a, &b, 100, cutoff, taps),
                Err(CrossfadeError::InvalidParameter(_))
            ),
            "cutoff {} taps {} accepted",
            cutoff,
            taps
        );
    }
}

// =============================================================================
// Behaviour of the filtered blend
// =============================================================================

#[test]
fn test_high_frequency_content_is_attenuated_in_transition() {
    // A 5 kHz tone passed through a 150 Hz lowpass is almost gone mid-transition
    let a = Signal::new(
        vec![(0..20_000)
            .map(|i| 0.8 * (2.0 * PI * 5000.0 * i as f32 / 44100.0).sin())
            .collect()],
        44100,
    )
    .unwrap();
    let b = constant(0.0, 20_000, 44100);
    let out = crossfade(&a, &b, 8820, 150.0, 101).unwrap();
    let samples = out.channel(0).unwrap();
    let start = 20_000 - 8820;
    let early = &samples[start + 200..start + 1200];
    assert!(early.iter().all(|s| s.abs() < 0.05), "peak {}", out.peak());
}

#[test]
fn test_zero_boundary_differs_from_hold_at_edges() {
    let a = constant(1.0, 4000, 44100);
    let b = constant(1.0, 4000, 44100);
    let run = |boundary| {
        let settings = CrossfadeSettings::new(1000).with_boundary(boundary);
        Crossfader::new(settings).run(&a, &b).unwrap()
    };
    let hold = run(BoundaryExtension::Hold);
    let zero = run(BoundaryExtension::Zero);
    let edge = 4000 - 1000;
    assert!((hold.channel(0).unwrap()[edge] - 1.0).abs() < 1e-4);
    assert!(zero.channel(0).unwrap()[edge] < 0.9);
}

#[test]
fn test_serial_and_parallel_runs_agree() {
    let a = sine_stereo(300.0, 44100, 5000);
    let b = sine_stereo(700.0, 44100, 5000);
    let serial = Crossfader::new(CrossfadeSettings::new(2000).with_parallel(false))
        .run(&a, &b)
        .unwrap();
    let parallel = Crossfader::new(CrossfadeSettings::new(2000))
        .run(&a, &b)
        .unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn test_spectral_mode_end_to_end() {
    let a = sine_stereo(440.0, 44100, 12_000);
    let b = sine_stereo(660.0, 44100, 12_000);
    let settings = CrossfadeSettings::new(4410)
        .with_mode(CrossfadeMode::Spectral { frame_len: 1024 });
    let out = Crossfader::new(settings).run(&a, &b).unwrap();
    assert_eq!(out.frames(), 12_000 + 12_000 - 4410);
    assert!(out.channels().iter().flatten().all(|s| s.is_finite()));
}
