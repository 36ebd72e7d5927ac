//! Error handling for Narravox
//!
//! Every error carries enough context (chunk index, path, expected vs.
//! actual value) for the caller to retry or report.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Narravox operations
pub type Result<T> = std::result::Result<T, NarravoxError>;

/// Main error type for Narravox operations
#[derive(Error, Debug)]
pub enum NarravoxError {
    // Project State Errors
    #[error("Project manifest not found at {path}")]
    ProjectNotFound { path: PathBuf },

    #[error("Corrupt project manifest: {reason}")]
    CorruptManifest { reason: String },

    #[error("Chunk {index} not found in project")]
    ChunkNotFound { index: u32 },

    // Timeline / Validation Errors
    #[error(
        "Crossfade of {crossfade_ms} ms is not shorter than chunk {index} ({duration_ms} ms)"
    )]
    InvalidCrossfade {
        index: u32,
        crossfade_ms: u32,
        duration_ms: u64,
    },

    #[error(
        "Locked replacement of chunk {index} needs a {ratio:.2}x stretch (limit {limit:.1}x)"
    )]
    StretchOutOfBounds { index: u32, ratio: f64, limit: f64 },

    // Audio Errors
    #[error("Sample rate mismatch for {path}: expected {expected} Hz, got {actual} Hz")]
    SampleRateMismatch {
        path: PathBuf,
        expected: u32,
        actual: u32,
    },

    #[error("Invalid audio file {path}: {reason}")]
    InvalidAudio { path: PathBuf, reason: String },

    #[error("Chunk audio missing: {path}")]
    AudioNotFound { path: PathBuf },

    // Rendering Errors
    #[error("Render failed: {reason}")]
    RenderError { reason: String },

    #[error("Script produced no chunks")]
    EmptyScript,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NarravoxError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            NarravoxError::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            NarravoxError::CorruptManifest { .. } => "CORRUPT_MANIFEST",
            NarravoxError::ChunkNotFound { .. } => "CHUNK_NOT_FOUND",
            NarravoxError::InvalidCrossfade { .. } => "INVALID_CROSSFADE",
            NarravoxError::StretchOutOfBounds { .. } => "STRETCH_OUT_OF_BOUNDS",
            NarravoxError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            NarravoxError::InvalidAudio { .. } => "INVALID_AUDIO",
            NarravoxError::AudioNotFound { .. } => "AUDIO_NOT_FOUND",
            NarravoxError::RenderError { .. } => "RENDER_ERROR",
            NarravoxError::EmptyScript => "EMPTY_SCRIPT",
            NarravoxError::Io(_) => "IO_ERROR",
            NarravoxError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if retrying the failed operation is safe without inspecting
    /// on-disk state first. A failure during the final atomic save is the
    /// one case where the caller must re-check the manifest before retrying.
    pub fn is_safely_retryable(&self) -> bool {
        !matches!(self, NarravoxError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = NarravoxError::ChunkNotFound { index: 7 };
        assert_eq!(err.error_code(), "CHUNK_NOT_FOUND");

        let err = NarravoxError::SampleRateMismatch {
            path: PathBuf::from("import.wav"),
            expected: 24000,
            actual: 44100,
        };
        assert_eq!(err.error_code(), "SAMPLE_RATE_MISMATCH");
    }

    #[test]
    fn test_messages_carry_context() {
        let err = NarravoxError::InvalidCrossfade {
            index: 2,
            crossfade_ms: 1200,
            duration_ms: 1000,
        };
        let msg = err.to_string();
        assert!(msg.contains("1200"));
        assert!(msg.contains("chunk 2"));
    }

    #[test]
    fn test_retryability() {
        let err = NarravoxError::RenderError {
            reason: "bridge offline".to_string(),
        };
        assert!(err.is_safely_retryable());

        let err = NarravoxError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "rename failed",
        ));
        assert!(!err.is_safely_retryable());
    }
}
