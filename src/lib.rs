//! # Clavis - Virtual Piano Engine
//!
//! Plays sampled piano notes from live input and from MIDI files, with a
//! falling-note lookahead that stays in step with what is sounding.
//!
//! ## Architecture
//!
//! Clavis is an umbrella crate that coordinates:
//! - **clavis-midi** - Note events, keyboard layout, Standard MIDI File loading
//! - **clavis-voice** - Velocity mapping, voice allocation, sustain pedal
//! - **clavis-core** - Playback scheduler, lookahead window, clocks, transport
//!
//! ## Quick Start
//!
//! ```ignore
//! use clavis::prelude::*;
//!
//! let mut engine = PianoEngineBuilder::new()
//!     .geometry(keyboard_view)
//!     .build(backend)?;
//!
//! engine.handle_input(InputEvent::PedalDown)?;
//! engine.handle_input(InputEvent::KeyDown('a'))?; // C4
//!
//! engine.load_file("song.mid")?;
//! engine.play()?;
//!
//! // every frame
//! engine.tick();
//! for note in engine.upcoming() {
//!     // note.event, note.time_to_impact_ms
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `test-support` - Recording audio backend (`voice::testing`)
//!
//! Audio decoding and output live behind [`AudioBackend`]; window, rendering
//! and hit-testing geometry behind [`KeyGeometry`].

pub use clavis_core as core;
pub use clavis_midi as midi;
pub use clavis_voice as voice;

// Data model
pub use clavis_midi::{KeyboardLayout, NoteEvent, NoteSequence, ParsedMidiFile, Register};

// Voices
pub use clavis_voice::{
    AudioBackend, NoteIdentity, PedalState, PlaybackHandle, SampleId, VelocityMapper,
};

// Playback
pub use clavis_core::{AdvanceReport, Clock, Incoming, ManualClock, SystemClock, Upcoming};

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{EngineConfig, KeyBinding};

mod input;
pub use input::{pick_hit, InputEvent, KeyGeometry, KeyHit};

mod builder;
mod engine;

pub use builder::PianoEngineBuilder;
pub use engine::{LoadedSong, PianoEngine};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{EngineConfig, PianoEngine, PianoEngineBuilder};

    // Input
    pub use crate::{InputEvent, KeyGeometry, KeyHit};

    // Audio seam
    pub use crate::{AudioBackend, PlaybackHandle, SampleId};

    // Song data
    pub use crate::{KeyboardLayout, NoteEvent, NoteSequence, Register};

    // Clocks
    pub use crate::{Clock, ManualClock, SystemClock};

    pub use crate::{Error, Result};
}
