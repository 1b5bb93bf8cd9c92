//! Voice handling for the clavis piano engine.
//!
//! - **[`VelocityMapper`]** - pointer position on a key to velocity
//! - **[`ChannelManager`]** - one voice per held key, sustain transfer, fadeout
//! - **[`SustainController`]** - pedal state machine that drains sustained voices
//! - **[`AudioBackend`]** / **[`PlaybackHandle`]** - seam to the audio output
//!
//! # Quick Start
//!
//! ```ignore
//! use clavis_voice::{ChannelManager, NoteIdentity, SampleId, SustainController};
//!
//! let mut channels = ChannelManager::new(backend);
//! let mut pedal = SustainController::new();
//!
//! channels.trigger(NoteIdentity::Key('a'), SampleId(60), 100)?;
//! pedal.press();
//! pedal.route_release(&mut channels, NoteIdentity::Key('a')); // keeps ringing
//! pedal.lift(&mut channels);                                  // fades out
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `test-support` | [`testing::RecordingBackend`] for downstream tests |

pub mod error;
pub use error::{Error, Result};

mod backend;
pub use backend::{AudioBackend, PlaybackHandle, SampleId};

mod velocity;
pub use velocity::{VelocityMapper, MAX_VELOCITY};

mod channel;
pub use channel::{ChannelManager, NoteIdentity, ReleaseOutcome, VoiceId, DEFAULT_FADEOUT_MS};

mod sustain;
pub use sustain::{PedalState, PedalTransition, SustainController};

#[cfg(any(test, feature = "test-support"))]
pub mod testing;
