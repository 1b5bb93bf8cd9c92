//! Error types for clavis-voice.

use crate::backend::SampleId;
use thiserror::Error;

/// Result type alias for clavis-voice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the audio subsystem while starting a voice.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend failed to start playback.
    #[error("Audio error: {0}")]
    Audio(String),

    /// No sample is loaded for this note.
    #[error("No sample loaded for {0}")]
    MissingSample(SampleId),
}
