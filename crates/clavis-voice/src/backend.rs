//! Audio subsystem seam.
//!
//! The engine never decodes or mixes audio itself. It asks an [`AudioBackend`]
//! to start a sample and keeps the returned [`PlaybackHandle`] until the note
//! has to stop. Releasing consumes the handle, so a voice can only be released
//! once.

use clavis_midi::note_name;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Result;

/// Identifies the per-note sample to play (one recording per MIDI note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SampleId(pub u8);

impl SampleId {
    pub const fn note(self) -> u8 {
        self.0
    }

    /// Conventional file name for directory-based sample sets, e.g. `Cs4.wav`.
    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{}", note_name(self.0), extension)
    }
}

impl From<u8> for SampleId {
    fn from(note: u8) -> Self {
        SampleId(note)
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (note {})", note_name(self.0), self.0)
    }
}

/// A currently-sounding sample.
pub trait PlaybackHandle {
    /// Fade the voice out over `fade_ms` and give it back to the audio subsystem.
    fn release(self, fade_ms: u32);
}

/// Starts samples. Implemented by the audio output collaborator.
pub trait AudioBackend {
    type Handle: PlaybackHandle;

    /// Start `sample` with its volume scaled by `velocity` (0-127).
    fn play(&mut self, sample: SampleId, velocity: u8) -> Result<Self::Handle>;
}

impl<B: AudioBackend + ?Sized> AudioBackend for Box<B> {
    type Handle = B::Handle;

    fn play(&mut self, sample: SampleId, velocity: u8) -> Result<Self::Handle> {
        (**self).play(sample, velocity)
    }
}
