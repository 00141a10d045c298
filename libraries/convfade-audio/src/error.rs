/// Audio I/O errors
use convfade_core::CrossfadeError;
use thiserror::Error;

/// Result type alias using `AudioIoError`
pub type Result<T> = std::result::Result<T, AudioIoError>;

/// Audio I/O error types
#[derive(Error, Debug)]
pub enum AudioIoError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Container or codec not recognised
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding error
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),

    /// WAV writer error
    #[error("WAV error: {0}")]
    Hound(#[from] hound::Error),

    /// Decoded audio could not form a valid signal
    #[error(transparent)]
    Core(#[from] CrossfadeError),
}
