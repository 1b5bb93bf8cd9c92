//! Read-only view of the events about to play, for falling-note rendering.

use clavis_midi::NoteEvent;

/// An event inside the lookahead horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Incoming<'a> {
    /// Index in the full sequence
    pub index: usize,
    pub event: &'a NoteEvent,
    /// Milliseconds until the note starts; negative once it is due but not
    /// yet fired.
    pub time_to_impact_ms: i64,
}

impl Incoming<'_> {
    /// How far the note has fallen: 0.0 at the top of the horizon, 1.0 on impact.
    pub fn fall_progress(&self, horizon_ms: u64) -> f32 {
        if horizon_ms == 0 {
            return 1.0;
        }
        let horizon = horizon_ms as f64;
        let remaining = (self.time_to_impact_ms.max(0) as f64).min(horizon);
        (1.0 - remaining / horizon) as f32
    }
}

/// Events from the playback cursor onward.
///
/// Never reaches behind the cursor, so a note appears here until it fires and
/// never after.
#[derive(Debug, Clone, Copy)]
pub struct LookaheadWindow<'a> {
    events: &'a [NoteEvent],
    floor: usize,
    session_start_time_ms: u64,
}

impl<'a> LookaheadWindow<'a> {
    /// `events` starts at sequence index `floor`.
    pub fn new(events: &'a [NoteEvent], floor: usize, session_start_time_ms: u64) -> Self {
        Self {
            events,
            floor,
            session_start_time_ms,
        }
    }

    /// Events starting within `horizon_ms` of `now_ms`, in start order.
    ///
    /// Cheap to call every frame; the returned iterator can be cloned to walk
    /// the window more than once.
    pub fn query(&self, now_ms: u64, horizon_ms: u64) -> Upcoming<'a> {
        // Negative before the session starts
        let elapsed = i128::from(now_ms) - i128::from(self.session_start_time_ms);
        Upcoming {
            events: self.events,
            floor: self.floor,
            position: 0,
            elapsed_ms: elapsed,
            limit_ms: elapsed + i128::from(horizon_ms),
        }
    }

    /// Unfired events remaining, regardless of horizon.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Iterator returned by [`LookaheadWindow::query`].
#[derive(Debug, Clone)]
pub struct Upcoming<'a> {
    events: &'a [NoteEvent],
    floor: usize,
    position: usize,
    elapsed_ms: i128,
    limit_ms: i128,
}

impl<'a> Iterator for Upcoming<'a> {
    type Item = Incoming<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.events.get(self.position)?;
        // Sorted by start time: the first event past the horizon ends the walk
        let start = i128::from(event.start_time_ms);
        if start > self.limit_ms {
            self.position = self.events.len();
            return None;
        }
        let index = self.floor + self.position;
        self.position += 1;
        Some(Incoming {
            index,
            event,
            time_to_impact_ms: i64::try_from(start - self.elapsed_ms).unwrap_or(i64::MAX),
        })
    }
}
