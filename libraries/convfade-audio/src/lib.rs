//! ConvFade Audio I/O
//!
//! File collaborators for the crossfade engine.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, FLAC, OGG, WAV, AAC, ...) into planar `Signal`s
//! - WAV encoding via hound (16/24-bit integer or 32-bit float)
//!
//! # Example
//!
//! ```rust,no_run
//! use convfade_audio::{decode_file, write_wav, BitDepth};
//! use std::path::Path;
//!
//! # fn example() -> convfade_audio::Result<()> {
//! let signal = decode_file(Path::new("/music/song.flac"))?;
//! println!("{} frames x {} channels at {} Hz",
//!     signal.frames(), signal.channel_count(), signal.sample_rate());
//!
//! write_wav(Path::new("/tmp/copy.wav"), &signal, BitDepth::Int16)?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod decoder;
mod encoder;
mod error;

pub use decoder::{decode_file, SymphoniaDecoder};
pub use encoder::{write_wav, BitDepth, WavEncoder};
pub use error::{AudioIoError, Result};
