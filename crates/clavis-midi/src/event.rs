//! Note events and the immutable, time-sorted sequences the engine plays.

use crate::error::{Error, Result};
use crate::keyboard::{KeyboardLayout, KeySlot, Register};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// A single note to be played and drawn.
///
/// `key_index` and `register` address the key within the keyboard layout the
/// sequence was built for; `note` is the MIDI note number used to pick a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_time_ms: u64,
    pub duration_ms: u64,
    pub note: u8,
    pub key_index: u16,
    pub register: Register,
    pub velocity: u8,
}

impl NoteEvent {
    /// Build an event for `note` on `layout`. `None` if the key is not on the layout.
    pub fn on_layout(
        layout: &KeyboardLayout,
        note: u8,
        start_time_ms: u64,
        duration_ms: u64,
        velocity: u8,
    ) -> Option<Self> {
        let slot = layout.locate(note)?;
        Some(Self {
            start_time_ms,
            duration_ms,
            note,
            key_index: slot.key_index,
            register: slot.register,
            velocity,
        })
    }

    pub fn end_time_ms(&self) -> u64 {
        self.start_time_ms.saturating_add(self.duration_ms)
    }

    pub fn slot(&self) -> KeySlot {
        KeySlot {
            register: self.register,
            key_index: self.key_index,
        }
    }
}

/// Validated note events, sorted ascending by start time.
///
/// Ties keep their original order. Cloning is cheap (the events are shared).
#[derive(Debug, Clone, Default)]
pub struct NoteSequence {
    events: Arc<[NoteEvent]>,
}

impl NoteSequence {
    /// Validate and stable-sort `events`.
    pub fn new(mut events: Vec<NoteEvent>) -> Result<Self> {
        for (index, event) in events.iter().enumerate() {
            if event.duration_ms == 0 {
                return Err(Error::InvalidEvent {
                    index,
                    reason: "duration must be positive".into(),
                });
            }
            if event.velocity > 127 {
                return Err(Error::InvalidEvent {
                    index,
                    reason: format!("velocity {} out of range 0..=127", event.velocity),
                });
            }
        }
        events.sort_by_key(|e| e.start_time_ms);
        Ok(Self {
            events: events.into(),
        })
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Time at which the last note ends.
    pub fn duration_ms(&self) -> u64 {
        self.events
            .iter()
            .map(NoteEvent::end_time_ms)
            .max()
            .unwrap_or(0)
    }
}

impl Deref for NoteSequence {
    type Target = [NoteEvent];

    fn deref(&self) -> &[NoteEvent] {
        &self.events
    }
}

impl TryFrom<Vec<NoteEvent>> for NoteSequence {
    type Error = Error;

    fn try_from(events: Vec<NoteEvent>) -> Result<Self> {
        Self::new(events)
    }
}
