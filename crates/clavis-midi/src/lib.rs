//! Note data for the clavis piano engine.
//!
//! - [`NoteEvent`] / [`NoteSequence`] - immutable, time-sorted notes the engine plays
//! - [`KeyboardLayout`] - white/black key addressing for a key range
//! - [`ParsedMidiFile`] - Standard MIDI File loading (single fixed tempo, all tracks merged)
//!
//! # Example
//!
//! ```ignore
//! use clavis_midi::{KeyboardLayout, ParsedMidiFile};
//!
//! let file = ParsedMidiFile::load("song.mid", &KeyboardLayout::default())?;
//! for event in file.sequence.iter() {
//!     println!("{} at {} ms", event.note, event.start_time_ms);
//! }
//! ```

pub mod error;
pub use error::{Error, Result};

pub(crate) mod event;
pub use event::{NoteEvent, NoteSequence};

pub mod keyboard;
pub use keyboard::{is_black, note_name, KeySlot, KeyboardLayout, Register};

pub(crate) mod file;
pub use file::ParsedMidiFile;

pub(crate) mod utils;
pub use utils::tempo_to_bpm;
