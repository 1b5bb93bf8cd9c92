//! File playback scheduler.
//!
//! Walks a [`NoteSequence`] against a monotonic clock. Every call to
//! [`advance`](PlaybackScheduler::advance) fires all events that became due
//! since the previous call, in sequence order, so a slow frame never drops
//! notes. Each fired note also gets a deferred release at its end time; file
//! notes are not held by any key and end on time regardless of the pedal.

use clavis_midi::{NoteEvent, NoteSequence};
use clavis_voice::{AudioBackend, ChannelManager, NoteIdentity, SampleId, VoiceId};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::ops::Range;
use tracing::{debug, warn};

use crate::lookahead::LookaheadWindow;

/// Position of the scheduler in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackCursor {
    /// First event not fired yet. Only moves forward until a reset.
    pub next_unfired_index: usize,
    /// Clock time at which the sequence's time zero plays.
    pub session_start_time_ms: u64,
}

/// What one `advance` call did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvanceReport {
    /// Indices of the events fired by this call
    pub fired: Range<usize>,
    /// Deferred note ends that silenced a voice
    pub released: usize,
    /// True exactly once: on the call that finished playback
    pub completed: bool,
}

/// A fired note waiting for its end time. Ordered by due time, then voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingRelease {
    due_ms: u64,
    voice: VoiceId,
    note: u8,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Release,
    Fire,
}

pub struct PlaybackScheduler {
    sequence: NoteSequence,
    cursor: PlaybackCursor,
    pending: BinaryHeap<Reverse<PendingRelease>>,
    finished: bool,
}

impl PlaybackScheduler {
    pub fn new(sequence: NoteSequence, session_start_time_ms: u64) -> Self {
        Self {
            sequence,
            cursor: PlaybackCursor {
                next_unfired_index: 0,
                session_start_time_ms,
            },
            pending: BinaryHeap::new(),
            finished: false,
        }
    }

    pub fn sequence(&self) -> &NoteSequence {
        &self.sequence
    }

    pub fn cursor(&self) -> PlaybackCursor {
        self.cursor
    }

    /// Sequence time corresponding to clock time `now_ms`. `None` before the
    /// session starts.
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        now_ms.checked_sub(self.cursor.session_start_time_ms)
    }

    /// Fire everything due at `now_ms`.
    ///
    /// Note ends and note starts are interleaved in time order; at equal times
    /// ends go first so a repeated pitch is not cut by its predecessor's end.
    /// A note the backend refuses is logged and counted as fired.
    pub fn advance<B: AudioBackend>(
        &mut self,
        now_ms: u64,
        channels: &mut ChannelManager<B>,
    ) -> AdvanceReport {
        let first = self.cursor.next_unfired_index;
        let Some(elapsed) = self.elapsed_ms(now_ms) else {
            return AdvanceReport {
                fired: first..first,
                ..AdvanceReport::default()
            };
        };
        let mut released = 0;

        loop {
            let next_end = self
                .pending
                .peek()
                .map(|Reverse(r)| r.due_ms)
                .filter(|&due| due <= elapsed);
            let next_start = self
                .sequence
                .get(self.cursor.next_unfired_index)
                .map(|e| e.start_time_ms)
                .filter(|&start| start <= elapsed);

            let step = match (next_end, next_start) {
                (Some(end), Some(start)) if end <= start => Step::Release,
                (_, Some(_)) => Step::Fire,
                (Some(_), None) => Step::Release,
                (None, None) => break,
            };

            match step {
                Step::Release => {
                    if let Some(Reverse(due)) = self.pending.pop() {
                        if channels.release_voice(NoteIdentity::Playback(due.note), due.voice) {
                            released += 1;
                        }
                    }
                }
                Step::Fire => {
                    let index = self.cursor.next_unfired_index;
                    let event = self.sequence[index];
                    self.fire(index, &event, channels);
                    self.cursor.next_unfired_index += 1;
                }
            }
        }

        let fired = first..self.cursor.next_unfired_index;
        let completed = !self.finished && self.is_exhausted() && self.pending.is_empty();
        if completed {
            self.finished = true;
            debug!(
                events = self.sequence.len(),
                elapsed_ms = elapsed,
                "playback complete"
            );
        }

        AdvanceReport {
            fired,
            released,
            completed,
        }
    }

    fn fire<B: AudioBackend>(
        &mut self,
        index: usize,
        event: &NoteEvent,
        channels: &mut ChannelManager<B>,
    ) {
        // The voice this steals will never end on its own schedule
        self.pending.retain(|Reverse(r)| r.note != event.note);

        let identity = NoteIdentity::Playback(event.note);
        match channels.trigger(identity, SampleId(event.note), event.velocity) {
            Ok(voice) => self.pending.push(Reverse(PendingRelease {
                due_ms: event.end_time_ms(),
                voice,
                note: event.note,
            })),
            Err(e) => warn!(index, note = event.note, "skipping note: {e}"),
        }
    }

    /// Rewind to the first event, playing from `session_start_time_ms`.
    ///
    /// Voices started by the previous run keep sounding; silence them first.
    pub fn reset(&mut self, session_start_time_ms: u64) {
        self.cursor = PlaybackCursor {
            next_unfired_index: 0,
            session_start_time_ms,
        };
        self.pending.clear();
        self.finished = false;
    }

    /// Every event has fired.
    pub fn is_exhausted(&self) -> bool {
        self.cursor.next_unfired_index >= self.sequence.len()
    }

    /// Completion has been reported.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fired notes whose end time has not come yet.
    pub fn pending_releases(&self) -> usize {
        self.pending.len()
    }

    /// Upcoming events, bounded below by the cursor.
    pub fn lookahead(&self) -> LookaheadWindow<'_> {
        LookaheadWindow::new(
            &self.sequence[self.cursor.next_unfired_index..],
            self.cursor.next_unfired_index,
            self.cursor.session_start_time_ms,
        )
    }
}
