//! Builder for configuring and constructing a `PianoEngine`.

use crate::config::{EngineConfig, KeyBinding};
use crate::input::KeyGeometry;
use crate::{PianoEngine, Result};
use clavis_core::{Clock, SystemClock};
use clavis_midi::KeyboardLayout;
use clavis_voice::AudioBackend;

/// Starts from [`EngineConfig::default`]. Settings are checked in `build`.
///
/// # Example
///
/// ```ignore
/// use clavis::prelude::*;
///
/// let engine = PianoEngineBuilder::new()
///     .keyboard(KeyboardLayout::PIANO_88)
///     .fadeout_ms(150)
///     .bind_key('z', 48)
///     .geometry(keyboard_view)
///     .build(backend)?;
/// ```
#[derive(Default)]
pub struct PianoEngineBuilder {
    config: EngineConfig,
    geometry: Option<Box<dyn KeyGeometry>>,
}

impl PianoEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting at once, e.g. with one read by [`EngineConfig::load`].
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 300
    pub fn fadeout_ms(mut self, ms: u32) -> Self {
        self.config.fadeout_ms = ms;
        self
    }

    /// Default: 3000
    pub fn lookahead_horizon_ms(mut self, ms: u64) -> Self {
        self.config.lookahead_horizon_ms = ms;
        self
    }

    /// Default: 100
    pub fn keyboard_velocity(mut self, velocity: u8) -> Self {
        self.config.keyboard_velocity = velocity;
        self
    }

    /// Default: 61 keys, C2..=C7
    pub fn keyboard(mut self, layout: KeyboardLayout) -> Self {
        self.config.keyboard = layout;
        self
    }

    /// Bind `key` to `note`, replacing any earlier binding of that key.
    pub fn bind_key(mut self, key: char, note: u8) -> Self {
        self.config.key_bindings.retain(|b| b.key != key);
        self.config.key_bindings.push(KeyBinding { key, note });
        self
    }

    pub fn clear_key_bindings(mut self) -> Self {
        self.config.key_bindings.clear();
        self
    }

    /// Key rectangles for pointer input. Without one, pointer events are ignored.
    pub fn geometry(mut self, geometry: impl KeyGeometry + 'static) -> Self {
        self.geometry = Some(Box::new(geometry));
        self
    }

    pub fn build<B: AudioBackend>(self, backend: B) -> Result<PianoEngine<B>> {
        self.build_with_clock(backend, SystemClock::new())
    }

    /// Build with a custom time source, e.g. a `ManualClock` for tests or
    /// offline stepping.
    pub fn build_with_clock<B: AudioBackend, C: Clock>(
        self,
        backend: B,
        clock: C,
    ) -> Result<PianoEngine<B, C>> {
        self.config.validate()?;
        tracing::debug!(
            keyboard = ?self.config.keyboard,
            bindings = self.config.key_bindings.len(),
            "building piano engine"
        );
        Ok(PianoEngine::from_parts(
            self.config,
            backend,
            clock,
            self.geometry,
        ))
    }
}
