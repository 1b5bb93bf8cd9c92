//! Playback runtime for the clavis piano engine.
//!
//! # Primary API
//!
//! - [`PlaybackScheduler`]: fires due note events through a [`ChannelManager`](clavis_voice::ChannelManager)
//! - [`LookaheadWindow`]: upcoming events for falling-note rendering
//! - [`Clock`]: [`SystemClock`] for real time, [`ManualClock`] for tests
//! - [`TransportFSM`]: stopped/rolling state with a finish edge
//!
//! # Example
//!
//! ```ignore
//! use clavis_core::{Clock, PlaybackScheduler, SystemClock};
//!
//! let clock = SystemClock::new();
//! let mut scheduler = PlaybackScheduler::new(sequence, clock.now_ms());
//!
//! // once per frame
//! let report = scheduler.advance(clock.now_ms(), &mut channels);
//! for note in scheduler.lookahead().query(clock.now_ms(), 3000) {
//!     draw(note.event, note.fall_progress(3000));
//! }
//! if report.completed { /* stop */ }
//! ```

mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

mod lookahead;
pub use lookahead::{Incoming, LookaheadWindow, Upcoming};

mod scheduler;
pub use scheduler::{AdvanceReport, PlaybackCursor, PlaybackScheduler};

pub mod transport;
pub use transport::{MotionState, TransitionResult, TransportEvent, TransportFSM};
