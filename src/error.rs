//! Error handling for Echovox
//!
//! Every error carries a stable code and, where it makes sense, recovery
//! suggestions that a front-end can show next to the message.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Echovox operations
pub type Result<T> = std::result::Result<T, EchovoxError>;

/// Main error type for Echovox operations
#[derive(Error, Debug)]
pub enum EchovoxError {
    // Echo Errors
    #[error("Invalid parameter '{param}': got {value}, expected {expected}")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // File Errors
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Invalid audio data: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // Speech Errors
    #[error("Speech provider '{provider}' failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Speech job was cancelled")]
    Cancelled,

    #[error("Speech worker stopped without reporting a result")]
    WorkerDisconnected,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EchovoxError {
    /// Shorthand for an [`EchovoxError::InvalidInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        EchovoxError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Wrap a hound error as invalid audio data
    pub(crate) fn from_wav(context: &str, err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => EchovoxError::Io(io),
            other => EchovoxError::InvalidAudio {
                reason: format!("{}: {}", context, other),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EchovoxError::InvalidParameter { .. } => "INVALID_PARAMETER",
            EchovoxError::InvalidInput { .. } => "INVALID_INPUT",
            EchovoxError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EchovoxError::InvalidAudio { .. } => "INVALID_AUDIO",
            EchovoxError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            EchovoxError::Provider { .. } => "PROVIDER_ERROR",
            EchovoxError::Cancelled => "CANCELLED",
            EchovoxError::WorkerDisconnected => "WORKER_DISCONNECTED",
            EchovoxError::Io(_) => "IO_ERROR",
            EchovoxError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if retrying the surrounding request could succeed.
    ///
    /// Echo failures are deterministic, so only the external collaborators
    /// (provider, files) are worth another attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EchovoxError::Provider { .. }
                | EchovoxError::FileNotFound { .. }
                | EchovoxError::Io(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EchovoxError::InvalidParameter { .. } => vec![
                "Delay must be at least 1 ms",
                "Decay must lie strictly between 0 and 1",
                "Repeats must be at least 1",
            ],
            EchovoxError::InvalidInput { .. } => vec![
                "Check that the audio contains at least one frame",
                "Speech text must not be blank",
            ],
            EchovoxError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            EchovoxError::InvalidAudio { .. } => vec![
                "Check if the file plays in another application",
                "Re-export the file as PCM WAV",
            ],
            EchovoxError::UnsupportedFormat { .. } => vec![
                "Convert to mono or stereo integer PCM WAV",
                "Supported bit depths: 8, 16, 24, 32",
            ],
            EchovoxError::Provider { .. } => vec![
                "Check the network connection",
                "Try the request again in a moment",
            ],
            _ => vec![],
        }
    }
}
