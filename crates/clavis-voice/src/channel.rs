//! Per-key voice ownership.
//!
//! [`ChannelManager`] holds every sounding voice in exactly one of two places:
//! - the key state, one voice per [`NoteIdentity`] that is still held down
//! - the sustained set, voices whose key went up while the pedal was down
//!
//! Moving a voice between them never touches audio. Only [`trigger`],
//! [`release`] and the drain methods start or stop sound.
//!
//! [`trigger`]: ChannelManager::trigger
//! [`release`]: ChannelManager::release

use crate::backend::{AudioBackend, PlaybackHandle, SampleId};
use crate::sustain::PedalState;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

/// Fadeout applied when a voice is released, in milliseconds.
pub const DEFAULT_FADEOUT_MS: u32 = 300;

/// Unique identifier for a voice instance.
pub type VoiceId = u64;

/// What is holding a note down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteIdentity {
    /// A computer-keyboard key
    Key(char),
    /// The mouse button
    Pointer,
    /// A note started by file playback, keyed by MIDI note number
    Playback(u8),
}

/// Outcome of [`ChannelManager::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Nothing was held under that identity
    NotHeld,
    /// Moved to the sustained set; still sounding
    Sustained,
    /// Fading out
    Released,
}

struct Voice<H> {
    id: VoiceId,
    note: u8,
    handle: H,
}

pub struct ChannelManager<B: AudioBackend> {
    backend: B,
    fadeout_ms: u32,
    key_state: HashMap<NoteIdentity, Voice<B::Handle>>,
    sustained: Vec<Voice<B::Handle>>,
    next_voice_id: VoiceId,
}

impl<B: AudioBackend> ChannelManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_fadeout(backend, DEFAULT_FADEOUT_MS)
    }

    pub fn with_fadeout(backend: B, fadeout_ms: u32) -> Self {
        Self {
            backend,
            fadeout_ms,
            key_state: HashMap::new(),
            sustained: Vec::new(),
            next_voice_id: 1,
        }
    }

    /// Start `sample` for `identity`.
    ///
    /// A voice already held under the same identity is faded out first, so a
    /// re-trigger never doubles up. Voices in the sustained set are left alone.
    pub fn trigger(
        &mut self,
        identity: NoteIdentity,
        sample: SampleId,
        velocity: u8,
    ) -> Result<VoiceId> {
        if let Some(old) = self.key_state.remove(&identity) {
            trace!(?identity, voice = old.id, "re-trigger, fading previous voice");
            old.handle.release(self.fadeout_ms);
        }

        let handle = self.backend.play(sample, velocity.min(127))?;

        let id = self.next_voice_id;
        self.next_voice_id += 1;
        self.key_state.insert(
            identity,
            Voice {
                id,
                note: sample.note(),
                handle,
            },
        );
        trace!(?identity, voice = id, velocity, "voice started");

        Ok(id)
    }

    /// Key-up for `identity`.
    ///
    /// With the pedal down the voice moves to the sustained set and keeps
    /// sounding; otherwise it fades out. Unknown identities are ignored.
    pub fn release(&mut self, identity: NoteIdentity, pedal: PedalState) -> ReleaseOutcome {
        let Some(voice) = self.key_state.remove(&identity) else {
            return ReleaseOutcome::NotHeld;
        };

        match pedal {
            PedalState::Down => {
                trace!(?identity, voice = voice.id, "sustaining");
                self.sustained.push(voice);
                ReleaseOutcome::Sustained
            }
            PedalState::Up => {
                trace!(?identity, voice = voice.id, "releasing");
                voice.handle.release(self.fadeout_ms);
                ReleaseOutcome::Released
            }
        }
    }

    /// Fade out `identity` only if it still owns voice `id`, ignoring the pedal.
    ///
    /// Used for time-based note ends: if the voice was stolen by a re-trigger
    /// in the meantime, the newer voice is left untouched.
    pub fn release_voice(&mut self, identity: NoteIdentity, id: VoiceId) -> bool {
        match self.key_state.get(&identity) {
            Some(voice) if voice.id == id => {}
            _ => return false,
        }
        if let Some(voice) = self.key_state.remove(&identity) {
            voice.handle.release(self.fadeout_ms);
        }
        true
    }

    /// Fade out everything in the sustained set. No-op when it is empty.
    pub fn release_all_sustained(&mut self) -> usize {
        let count = self.sustained.len();
        for voice in self.sustained.drain(..) {
            voice.handle.release(self.fadeout_ms);
        }
        if count > 0 {
            trace!(count, "released sustained voices");
        }
        count
    }

    /// Fade out every voice, held or sustained.
    pub fn release_all(&mut self) -> usize {
        let held = self.key_state.len();
        for (_, voice) in self.key_state.drain() {
            voice.handle.release(self.fadeout_ms);
        }
        held + self.release_all_sustained()
    }

    /// Voice currently held under `identity`.
    pub fn held(&self, identity: NoteIdentity) -> Option<VoiceId> {
        self.key_state.get(&identity).map(|v| v.id)
    }

    pub fn is_held(&self, identity: NoteIdentity) -> bool {
        self.key_state.contains_key(&identity)
    }

    /// MIDI notes of held voices, for key highlighting. May repeat a note held
    /// by two identities.
    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.key_state.values().map(|v| v.note)
    }

    /// MIDI notes ringing only because of the pedal.
    pub fn sustained_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.sustained.iter().map(|v| v.note)
    }

    pub fn held_count(&self) -> usize {
        self.key_state.len()
    }

    pub fn sustained_count(&self) -> usize {
        self.sustained.len()
    }

    pub fn fadeout_ms(&self) -> u32 {
        self.fadeout_ms
    }

    pub fn set_fadeout_ms(&mut self, fadeout_ms: u32) {
        self.fadeout_ms = fadeout_ms;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: AudioBackend> Drop for ChannelManager<B> {
    fn drop(&mut self) {
        self.release_all();
    }
}
