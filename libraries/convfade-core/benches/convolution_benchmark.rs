//! Performance benchmarks for block convolution and full crossfades
//!
//! Run with: cargo bench -p convfade-core --bench convolution_benchmark

use convfade_core::{
    build_impulse_response, convolve_channel, BlockConvolver, ConvolutionMethod, CrossfadeMode,
    CrossfadeSettings, Crossfader, Signal,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::f32::consts::PI;

/// Generate a test signal (1kHz sine wave)
fn generate_test_signal(sample_rate: u32, duration_secs: f32, channels: usize) -> Signal {
    let frames = (sample_rate as f32 * duration_secs) as usize;
    let channel: Vec<f32> = (0..frames)
        .map(|i| (2.0 * PI * 1000.0 * i as f32 / sample_rate as f32).sin())
        .collect();
    Signal::new(vec![channel; channels], sample_rate).unwrap()
}

fn bench_direct_vs_fft(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution_method");
    let signal = generate_test_signal(44100, 1.0, 1);
    let samples = signal.channel(0).unwrap().to_vec();
    group.throughput(Throughput::Elements(samples.len() as u64));

    for taps in [31, 101, 255, 1023] {
        let ir = build_impulse_response(150.0, taps, 44100).unwrap();
        for method in [ConvolutionMethod::Direct, ConvolutionMethod::Fft] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", method), taps),
                &samples,
                |b, samples| b.iter(|| black_box(convolve_channel(black_box(samples), &ir, method))),
            );
        }
    }

    group.finish();
}

fn bench_channel_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_parallelism");
    let ir = build_impulse_response(150.0, 101, 48000).unwrap();

    for channels in [2, 6] {
        let signal = generate_test_signal(48000, 3.0, channels);
        for parallel in [false, true] {
            let convolver = BlockConvolver::new().with_parallel(parallel);
            group.bench_with_input(
                BenchmarkId::new(if parallel { "parallel" } else { "serial" }, channels),
                &signal,
                |b, signal| b.iter(|| black_box(convolver.convolve(black_box(signal), &ir))),
            );
        }
    }

    group.finish();
}

fn bench_full_crossfade(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossfade");
    group.sample_size(20);
    let a = generate_test_signal(44100, 10.0, 2);
    let b = generate_test_signal(44100, 10.0, 2);
    let transition = CrossfadeSettings::transition_frames_for(3.0, 44100);

    let modes = [
        ("filtered", CrossfadeMode::Filtered),
        ("spectral", CrossfadeMode::Spectral { frame_len: 4410 }),
    ];
    for (name, mode) in modes {
        let crossfader = Crossfader::new(CrossfadeSettings::new(transition).with_mode(mode));
        group.bench_function(name, |bench| {
            bench.iter(|| black_box(crossfader.run(black_box(&a), black_box(&b)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_direct_vs_fft,
    bench_channel_parallelism,
    bench_full_crossfade
);
criterion_main!(benches);
