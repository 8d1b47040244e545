/// Crate-level error type for the skiffle separation library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid parameter value.
    #[error("invalid parameter `{name}`: got {value}, {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Audio data is empty when a non-empty signal was required.
    #[error("audio data is empty")]
    EmptyAudio,

    /// Audio data contains non-finite values (NaN or Inf).
    #[error("audio data contains non-finite values")]
    NonFiniteAudio,

    /// Input arrays disagree in shape for the operation.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    /// A required dimension is zero or invalid.
    #[error("invalid size for `{name}`: {value} ({reason})")]
    InvalidSize {
        name: &'static str,
        value: usize,
        reason: &'static str,
    },

    /// WAV read/write errors.
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    /// Resampling errors.
    #[error("resampling error: {0}")]
    Resample(String),

    /// File I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for skiffle operations.
pub type Result<T> = std::result::Result<T, Error>;
