//! Error types for note data and MIDI file loading.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("MIDI parse error: {0}")]
    MidiFileParse(String),

    #[error("Unsupported MIDI timing format")]
    MidiUnsupportedTiming,

    #[error("Invalid note event at index {index}: {reason}")]
    InvalidEvent { index: usize, reason: String },

    #[error("Invalid keyboard range: {lowest}..={highest}")]
    InvalidKeyboard { lowest: u8, highest: u8 },
}

impl From<midly::Error> for Error {
    fn from(e: midly::Error) -> Self {
        Error::MidiFileParse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
