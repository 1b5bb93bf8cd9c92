//! Keyboard layout: maps MIDI notes onto white/black key rows.
//!
//! The renderer draws the two registers as separate rows, so every note in the
//! layout is addressed by its [`Register`] plus an index counted from the lowest
//! key of that register.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Pitch classes (0 = C) that sit on black keys.
const BLACK_PITCH_CLASSES: [u8; 5] = [1, 3, 6, 8, 10];

const PITCH_NAMES: [&str; 12] = [
    "C", "Cs", "D", "Ds", "E", "F", "Fs", "G", "Gs", "A", "As", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    White,
    Black,
}

impl Register {
    pub const fn of(note: u8) -> Self {
        if is_black(note) {
            Register::Black
        } else {
            Register::White
        }
    }
}

/// Position of a note within the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySlot {
    pub register: Register,
    pub key_index: u16,
}

/// True if the note is a sharp/flat.
pub const fn is_black(note: u8) -> bool {
    let pc = note % 12;
    let mut i = 0;
    while i < BLACK_PITCH_CLASSES.len() {
        if BLACK_PITCH_CLASSES[i] == pc {
            return true;
        }
        i += 1;
    }
    false
}

/// Returns -1 to 9.
pub const fn octave(note: u8) -> i8 {
    (note / 12) as i8 - 1
}

/// Scientific pitch name with `s` for sharps, e.g. `C4`, `Fs3`, `Csm1`.
pub fn note_name(note: u8) -> String {
    let name = PITCH_NAMES[(note % 12) as usize];
    match octave(note) {
        -1 => format!("{name}m1"),
        o => format!("{name}{o}"),
    }
}

/// Contiguous range of playable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub lowest: u8,
    pub highest: u8,
}

impl Default for KeyboardLayout {
    /// 61 keys, C2..=C7.
    fn default() -> Self {
        Self {
            lowest: 36,
            highest: 96,
        }
    }
}

impl KeyboardLayout {
    /// Full 88-key piano, A0..=C8.
    pub const PIANO_88: KeyboardLayout = KeyboardLayout {
        lowest: 21,
        highest: 108,
    };

    pub fn new(lowest: u8, highest: u8) -> Result<Self> {
        let layout = Self { lowest, highest };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lowest > self.highest || self.highest > 127 {
            return Err(Error::InvalidKeyboard {
                lowest: self.lowest,
                highest: self.highest,
            });
        }
        Ok(())
    }

    pub fn contains(&self, note: u8) -> bool {
        (self.lowest..=self.highest).contains(&note)
    }

    /// `None` if the note is outside the layout.
    pub fn locate(&self, note: u8) -> Option<KeySlot> {
        if !self.contains(note) {
            return None;
        }
        let register = Register::of(note);
        let key_index = (self.lowest..note)
            .filter(|&n| Register::of(n) == register)
            .count() as u16;
        Some(KeySlot {
            register,
            key_index,
        })
    }

    /// Inverse of [`locate`](Self::locate).
    pub fn note_at(&self, slot: KeySlot) -> Option<u8> {
        self.notes()
            .filter(|&n| Register::of(n) == slot.register)
            .nth(slot.key_index as usize)
    }

    pub fn notes(&self) -> impl Iterator<Item = u8> {
        self.lowest..=self.highest
    }

    pub fn key_count(&self, register: Register) -> usize {
        self.notes().filter(|&n| Register::of(n) == register).count()
    }
}
