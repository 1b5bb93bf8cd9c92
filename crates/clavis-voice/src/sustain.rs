//! Sustain pedal state machine.
//!
//! ```text
//!   Up --press--> Down      (flag only)
//!   Down --release--> Up    (flag, then drain the sustained set)
//! ```
//!
//! The flag flips before the drain so a key-up routed during the drain can
//! never land in the set being emptied.

use crate::backend::AudioBackend;
use crate::channel::{ChannelManager, NoteIdentity, ReleaseOutcome};
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PedalState {
    #[default]
    Up,
    Down,
}

/// Result of a pedal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedalTransition {
    /// Already in the requested state
    None,
    Pressed,
    /// Pedal lifted; carries the number of sustained voices released
    Lifted(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SustainController {
    state: PedalState,
}

impl SustainController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PedalState {
        self.state
    }

    pub fn is_down(&self) -> bool {
        self.state == PedalState::Down
    }

    pub fn press(&mut self) -> PedalTransition {
        match self.state {
            PedalState::Up => {
                self.state = PedalState::Down;
                trace!("sustain pedal down");
                PedalTransition::Pressed
            }
            PedalState::Down => PedalTransition::None,
        }
    }

    pub fn lift<B: AudioBackend>(&mut self, channels: &mut ChannelManager<B>) -> PedalTransition {
        match self.state {
            PedalState::Down => {
                self.state = PedalState::Up;
                let released = channels.release_all_sustained();
                trace!(released, "sustain pedal up");
                PedalTransition::Lifted(released)
            }
            PedalState::Up => PedalTransition::None,
        }
    }

    /// Route a key-up through the current pedal state.
    pub fn route_release<B: AudioBackend>(
        &self,
        channels: &mut ChannelManager<B>,
        identity: NoteIdentity,
    ) -> ReleaseOutcome {
        channels.release(identity, self.state)
    }

    /// Back to `Up` without touching audio. Callers drain voices first.
    pub fn reset(&mut self) {
        self.state = PedalState::Up;
    }
}
