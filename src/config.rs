//! Engine configuration.
//!
//! Everything here has a sensible default, so a JSON file only needs the
//! fields it wants to change:
//!
//! ```json
//! { "fadeout_ms": 150, "keyboard": { "lowest": 21, "highest": 108 } }
//! ```

use crate::{Error, Result};
use clavis_midi::KeyboardLayout;
use clavis_voice::{DEFAULT_FADEOUT_MS, MAX_VELOCITY};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_LOOKAHEAD_HORIZON_MS: u64 = 3000;
pub const DEFAULT_KEYBOARD_VELOCITY: u8 = 100;

/// Computer keys mapped to C4..=C5, laid out like a piano row.
const DEFAULT_BINDING_KEYS: [char; 13] = [
    'a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k',
];
const DEFAULT_BINDING_BASE_NOTE: u8 = 60;

/// One computer key playing one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: char,
    pub note: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fade applied to every released voice
    pub fadeout_ms: u32,
    /// How far ahead falling notes are shown
    pub lookahead_horizon_ms: u64,
    /// Velocity for computer-keyboard notes, which carry no position
    pub keyboard_velocity: u8,
    pub keyboard: KeyboardLayout,
    pub key_bindings: Vec<KeyBinding>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fadeout_ms: DEFAULT_FADEOUT_MS,
            lookahead_horizon_ms: DEFAULT_LOOKAHEAD_HORIZON_MS,
            keyboard_velocity: DEFAULT_KEYBOARD_VELOCITY,
            keyboard: KeyboardLayout::default(),
            key_bindings: DEFAULT_BINDING_KEYS
                .iter()
                .zip(DEFAULT_BINDING_BASE_NOTE..)
                .map(|(&key, note)| KeyBinding { key, note })
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookahead_horizon_ms == 0 {
            return Err(Error::Config("lookahead_horizon_ms must be positive".into()));
        }
        if self.keyboard_velocity > MAX_VELOCITY {
            return Err(Error::Config(format!(
                "keyboard_velocity {} exceeds {MAX_VELOCITY}",
                self.keyboard_velocity
            )));
        }
        self.keyboard.validate()?;

        let mut seen = HashSet::new();
        for binding in &self.key_bindings {
            if !seen.insert(binding.key) {
                return Err(Error::Config(format!(
                    "key '{}' is bound more than once",
                    binding.key
                )));
            }
            if !self.keyboard.contains(binding.note) {
                return Err(Error::Config(format!(
                    "key '{}' is bound to note {} outside the keyboard",
                    binding.key, binding.note
                )));
            }
        }
        Ok(())
    }

    /// Note bound to a computer key.
    pub fn note_for_key(&self, key: char) -> Option<u8> {
        self.key_bindings
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.note)
    }
}
