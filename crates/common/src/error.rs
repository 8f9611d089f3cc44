//! Error types shared across Loopscan crates.

use std::path::PathBuf;

/// Top-level error type for Loopscan operations.
#[derive(Debug, thiserror::Error)]
pub enum LoopscanError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The frame source could not be opened or produced an unusable buffer.
    #[error("Source error: {message}")]
    Source { message: String },

    /// A failure inside the per-instant capture loop.
    #[error("Capture error: {message}")]
    Capture { message: String },

    /// Audio decoding failed. Callers treat this as recoverable.
    #[error("Audio error: {message}")]
    Audio { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using LoopscanError.
pub type LoopscanResult<T> = Result<T, LoopscanError>;

impl LoopscanError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error came from the caller aborting the run.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = LoopscanError::source("ffprobe returned no video stream");
        assert_eq!(
            err.to_string(),
            "Source error: ffprobe returned no video stream"
        );
    }

    #[test]
    fn test_cancelled_is_detected() {
        assert!(LoopscanError::Cancelled.is_cancelled());
        assert!(!LoopscanError::capture("seek failed").is_cancelled());
    }
}
