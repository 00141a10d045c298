/// Decode → crossfade → encode
use crate::config::CrossfadeConfig;
use anyhow::{bail, Context};
use convfade_audio::{decode_file, write_wav};
use convfade_core::{Crossfader, Signal};
use std::path::{Path, PathBuf};

/// Input and output files for one crossfade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub start: PathBuf,
    pub end: PathBuf,
    pub output: PathBuf,
}

/// What was written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
    pub transition_frames: usize,
    pub peak: f32,
}

impl RunSummary {
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate)
    }
}

/// Run one crossfade job
///
/// Nothing is written unless decoding and crossfading both succeed.
pub fn run(job: &Job, config: &CrossfadeConfig) -> anyhow::Result<RunSummary> {
    let outgoing = load(&job.start, config)?;
    let incoming = load(&job.end, config)?;

    if outgoing.sample_rate() != incoming.sample_rate() {
        bail!(
            "Sample rates differ: {} is {} Hz, {} is {} Hz (resampling is not supported)",
            job.start.display(),
            outgoing.sample_rate(),
            job.end.display(),
            incoming.sample_rate()
        );
    }

    let settings = config.crossfade_settings(outgoing.sample_rate());
    let transition_frames = settings.transition_frames;
    tracing::info!(
        "Crossfading over {} frames ({:.2}s), cutoff {} Hz, {} taps, {:?}",
        transition_frames,
        transition_frames as f64 / f64::from(outgoing.sample_rate()),
        settings.cutoff_hz,
        settings.tap_count,
        settings.mode
    );

    let mut output = Crossfader::new(settings)
        .run(&outgoing, &incoming)
        .context("Crossfade failed")?;

    if config.normalize {
        output = output.normalize_peak(1.0);
    }

    let bit_depth = config.output_bit_depth()?;
    write_wav(&job.output, &output, bit_depth)
        .with_context(|| format!("Failed to write {}", job.output.display()))?;

    let summary = RunSummary {
        frames: output.frames(),
        channels: output.channel_count(),
        sample_rate: output.sample_rate(),
        transition_frames,
        peak: output.peak(),
    };
    tracing::info!(
        "Wrote {} ({:.2}s, {} channels, {}-bit)",
        job.output.display(),
        summary.duration_secs(),
        summary.channels,
        bit_depth.bits()
    );
    Ok(summary)
}

fn load(path: &Path, config: &CrossfadeConfig) -> anyhow::Result<Signal> {
    let signal =
        decode_file(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(if config.mono {
        signal.downmix_to_mono()
    } else {
        signal
    })
}
