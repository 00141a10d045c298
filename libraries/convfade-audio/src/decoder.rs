/// Audio file decoding using Symphonia
use crate::error::{AudioIoError, Result};
use convfade_core::Signal;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal as _};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Full-file decoder using Symphonia
///
/// Supports: MP3, FLAC, OGG, WAV, AAC, ALAC, PCM in common containers
///
/// Every channel of the default track is kept, planar, at the file's native
/// rate. Nothing is downmixed or resampled here.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode an entire file into memory
    pub fn decode(&self, path: &Path) -> Result<Signal> {
        if !path.exists() {
            return Err(AudioIoError::FileNotFound(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                AudioIoError::UnsupportedFormat(format!("{}: {}", path.display(), e))
            })?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioIoError::DecodeError("No audio tracks found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioIoError::DecodeError("Track has no sample rate".to_string()))?;
        let track_id = track.id;
        let mut channels: Vec<Vec<f32>> = track
            .codec_params
            .channels
            .map(|c| vec![Vec::new(); c.count()])
            .unwrap_or_default();
        if let Some(n_frames) = track.codec_params.n_frames {
            for ch in &mut channels {
                ch.reserve(n_frames as usize);
            }
        }

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioIoError::Symphonia(format!("Failed to create decoder: {}", e)))?;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(AudioIoError::Symphonia(format!(
                        "Error reading packet: {}",
                        e
                    )));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => append_planar(decoded, &mut channels)?,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                }
                Err(e) => return Err(AudioIoError::DecodeError(e.to_string())),
            }
        }

        if channels.is_empty() {
            return Err(AudioIoError::DecodeError(
                "Could not determine channel layout".to_string(),
            ));
        }

        let signal = Signal::new(channels, sample_rate)?;
        tracing::debug!(
            "Decoded {}: {} frames x {} channels at {} Hz ({:.2}s)",
            path.display(),
            signal.frames(),
            signal.channel_count(),
            signal.sample_rate(),
            signal.duration_secs()
        );
        Ok(signal)
    }
}

/// Decode an audio file with the default decoder
pub fn decode_file(path: &Path) -> Result<Signal> {
    SymphoniaDecoder::new().decode(path)
}

/// Append a decoded packet to the planar channel buffers
///
/// Signed integers use symmetric scaling (divide by 2^(N-1)), so full-scale
/// negative maps to exactly -1.0.
fn append_planar(decoded: AudioBufferRef<'_>, channels: &mut Vec<Vec<f32>>) -> Result<()> {
    let count = decoded.spec().channels.count();
    if channels.is_empty() {
        channels.resize(count, Vec::new());
    }
    if count != channels.len() {
        return Err(AudioIoError::DecodeError(format!(
            "Channel count changed mid-stream ({} -> {})",
            channels.len(),
            count
        )));
    }

    match decoded {
        AudioBufferRef::F32(buf) => extend(&buf, channels, |s| s),
        AudioBufferRef::F64(buf) => extend(&buf, channels, |s| s as f32),
        AudioBufferRef::S32(buf) => extend(&buf, channels, |s| s as f32 / 2147483648.0),
        AudioBufferRef::S24(buf) => extend(&buf, channels, |s| s.inner() as f32 / 8388608.0),
        AudioBufferRef::S16(buf) => extend(&buf, channels, |s| f32::from(s) / 32768.0),
        AudioBufferRef::S8(buf) => extend(&buf, channels, |s| f32::from(s) / 128.0),
        AudioBufferRef::U32(buf) => {
            extend(&buf, channels, |s| (f64::from(s) / 2147483648.0 - 1.0) as f32)
        }
        AudioBufferRef::U24(buf) => {
            extend(&buf, channels, |s| s.inner() as f32 / 8388608.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => extend(&buf, channels, |s| f32::from(s) / 32768.0 - 1.0),
        AudioBufferRef::U8(buf) => extend(&buf, channels, |s| f32::from(s) / 128.0 - 1.0),
    }
    Ok(())
}

fn extend<T, F>(buf: &AudioBuffer<T>, channels: &mut [Vec<f32>], normalize: F)
where
    T: Sample + Copy,
    F: Fn(T) -> f32,
{
    for (index, out) in channels.iter_mut().enumerate() {
        out.extend(buf.chan(index).iter().map(|&s| normalize(s)));
    }
}
