//! Centralized error type for the clavis umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A MIDI file could not be read or parsed. The engine keeps its previous song.
    #[error("Failed to load {}: {source}", path.display())]
    LoadFailure {
        path: PathBuf,
        #[source]
        source: clavis_midi::Error,
    },

    #[error("No song loaded")]
    NoSong,

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("MIDI: {0}")]
    Midi(#[from] clavis_midi::Error),

    #[error("Voice: {0}")]
    Voice(#[from] clavis_voice::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
