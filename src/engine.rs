//! PianoEngine: one interactive piano session.

use crate::config::EngineConfig;
use crate::input::{pick_hit, InputEvent, KeyGeometry};
use crate::{Error, Result};
use clavis_core::{
    AdvanceReport, Clock, LookaheadWindow, PlaybackScheduler, SystemClock, TransitionResult,
    TransportEvent, TransportFSM, Upcoming,
};
use clavis_midi::{NoteSequence, ParsedMidiFile};
use clavis_voice::{
    AudioBackend, ChannelManager, NoteIdentity, PedalState, PedalTransition, ReleaseOutcome,
    SampleId, SustainController, VelocityMapper,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Song currently loaded into the engine.
#[derive(Debug, Clone)]
pub struct LoadedSong {
    /// `None` for sequences handed over directly
    pub path: Option<PathBuf>,
    pub tempo_bpm: Option<f64>,
    pub dropped_notes: usize,
}

/// Owns all session state: held keys, the sustained set, the pedal, the
/// loaded song and its playback cursor.
///
/// Everything runs on the caller's frame loop. Per frame: feed input through
/// [`handle_input`](Self::handle_input), call [`tick`](Self::tick), then draw
/// from [`upcoming`](Self::upcoming) and [`held_notes`](Self::held_notes).
///
/// # Example
///
/// ```ignore
/// use clavis::prelude::*;
///
/// let mut engine = PianoEngineBuilder::new()
///     .geometry(keyboard_view)
///     .build(backend)?;
///
/// engine.load_file("song.mid")?;
/// engine.play()?;
///
/// loop {
///     for event in window.poll() {
///         engine.handle_input(event)?;
///     }
///     engine.tick();
///     for note in engine.upcoming() {
///         draw_falling(note.event, note.fall_progress(engine.config().lookahead_horizon_ms));
///     }
/// }
/// ```
///
/// Dropping the engine fades out every voice it still owns.
pub struct PianoEngine<B: AudioBackend, C: Clock = SystemClock> {
    config: EngineConfig,
    channels: ChannelManager<B>,
    sustain: SustainController,
    scheduler: Option<PlaybackScheduler>,
    song: Option<LoadedSong>,
    transport: TransportFSM,
    clock: C,
    geometry: Option<Box<dyn KeyGeometry>>,
}

impl<B: AudioBackend, C: Clock> PianoEngine<B, C> {
    pub(crate) fn from_parts(
        config: EngineConfig,
        backend: B,
        clock: C,
        geometry: Option<Box<dyn KeyGeometry>>,
    ) -> Self {
        let channels = ChannelManager::with_fadeout(backend, config.fadeout_ms);
        Self {
            config,
            channels,
            sustain: SustainController::new(),
            scheduler: None,
            song: None,
            transport: TransportFSM::new(),
            clock,
            geometry,
        }
    }

    // =========================================================================
    // Live input
    // =========================================================================

    /// Apply one input event.
    ///
    /// Fails only when the audio backend cannot start a note; the session is
    /// still consistent afterwards.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::KeyDown(key) => {
                let Some(note) = self.config.note_for_key(key) else {
                    trace!(key = %key, "unbound key");
                    return Ok(());
                };
                let velocity = self.config.keyboard_velocity;
                self.channels
                    .trigger(NoteIdentity::Key(key), SampleId(note), velocity)?;
            }
            InputEvent::KeyUp(key) => {
                self.route_release(NoteIdentity::Key(key));
            }
            InputEvent::PedalDown => {
                self.sustain.press();
            }
            InputEvent::PedalUp => {
                if let PedalTransition::Lifted(count) = self.sustain.lift(&mut self.channels) {
                    trace!(count, "pedal lifted");
                }
            }
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y)?,
            InputEvent::PointerUp => {
                self.route_release(NoteIdentity::Pointer);
            }
        }
        Ok(())
    }

    fn route_release(&mut self, identity: NoteIdentity) -> ReleaseOutcome {
        self.sustain.route_release(&mut self.channels, identity)
    }

    fn pointer_down(&mut self, x: f32, y: f32) -> Result<()> {
        let Some(geometry) = self.geometry.as_ref() else {
            warn!("pointer input without key geometry");
            return Ok(());
        };
        let hits = geometry.hit_test(x, y);
        let Some(hit) = pick_hit(&hits) else {
            return Ok(());
        };
        let Some(velocity) = VelocityMapper::checked_map(y, hit.top_y, hit.height) else {
            warn!(note = hit.note, height = hit.height, "ignoring key with malformed geometry");
            return Ok(());
        };
        self.channels
            .trigger(NoteIdentity::Pointer, SampleId(hit.note), velocity)?;
        Ok(())
    }

    // =========================================================================
    // Song loading
    // =========================================================================

    /// Load a Standard MIDI File and make it the current song.
    ///
    /// On failure the previous song, cursor and voices are left as they were.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&LoadedSong> {
        let path = path.as_ref();
        let parsed = ParsedMidiFile::load(path, &self.config.keyboard).map_err(|source| {
            Error::LoadFailure {
                path: path.to_path_buf(),
                source,
            }
        })?;

        if parsed.dropped_notes > 0 {
            warn!(
                path = %path.display(),
                dropped = parsed.dropped_notes,
                "notes outside the keyboard were dropped"
            );
        }
        debug!(
            path = %path.display(),
            events = parsed.sequence.len(),
            tempo_bpm = parsed.tempo_bpm,
            "song loaded"
        );

        Ok(self.install(
            parsed.sequence,
            LoadedSong {
                path: Some(path.to_path_buf()),
                tempo_bpm: Some(parsed.tempo_bpm),
                dropped_notes: parsed.dropped_notes,
            },
        ))
    }

    /// Make an already-built sequence the current song.
    pub fn load_sequence(&mut self, sequence: NoteSequence) -> &LoadedSong {
        debug!(events = sequence.len(), "sequence loaded");
        self.install(
            sequence,
            LoadedSong {
                path: None,
                tempo_bpm: None,
                dropped_notes: 0,
            },
        )
    }

    fn install(&mut self, sequence: NoteSequence, song: LoadedSong) -> &LoadedSong {
        self.stop();
        self.scheduler = Some(PlaybackScheduler::new(sequence, self.clock.now_ms()));
        self.song.insert(song)
    }

    pub fn song(&self) -> Option<&LoadedSong> {
        self.song.as_ref()
    }

    pub fn sequence(&self) -> Option<&NoteSequence> {
        self.scheduler.as_ref().map(|s| s.sequence())
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Start the loaded song from the beginning. Restarts if already playing.
    pub fn play(&mut self) -> Result<()> {
        let now = self.clock.now_ms();
        let scheduler = self.scheduler.as_mut().ok_or(Error::NoSong)?;
        if self.transport.is_rolling() {
            self.channels.release_all();
        }
        scheduler.reset(now);
        self.transport.transition(TransportEvent::Play);
        debug!(events = scheduler.sequence().len(), "playback started");
        Ok(())
    }

    /// Silence everything and rewind. The pedal returns to up.
    pub fn stop(&mut self) {
        let released = self.channels.release_all();
        self.sustain.reset();
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.reset(self.clock.now_ms());
        }
        if let TransitionResult::MotionChanged(_) = self.transport.transition(TransportEvent::Stop)
        {
            debug!(released, "playback stopped");
        }
    }

    /// Advance playback to the current clock time.
    ///
    /// Call once per frame. Returns an empty report while stopped. When the
    /// song ends the transport stops by itself and the report says so once.
    pub fn tick(&mut self) -> AdvanceReport {
        if !self.transport.is_rolling() {
            return AdvanceReport::default();
        }
        let Some(scheduler) = self.scheduler.as_mut() else {
            return AdvanceReport::default();
        };

        let report = scheduler.advance(self.clock.now_ms(), &mut self.channels);
        if report.completed {
            self.transport.transition(TransportEvent::Finish);
        }
        report
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_rolling()
    }

    // =========================================================================
    // Render queries
    // =========================================================================

    /// Notes falling within the configured horizon.
    pub fn upcoming(&self) -> Upcoming<'_> {
        self.upcoming_within(self.config.lookahead_horizon_ms)
    }

    /// Empty while stopped.
    pub fn upcoming_within(&self, horizon_ms: u64) -> Upcoming<'_> {
        let now = self.clock.now_ms();
        match self.scheduler.as_ref() {
            Some(scheduler) if self.transport.is_rolling() => {
                scheduler.lookahead().query(now, horizon_ms)
            }
            _ => LookaheadWindow::new(&[], 0, 0).query(now, horizon_ms),
        }
    }

    /// Notes held down by a key, the pointer or playback.
    pub fn held_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.held_notes()
    }

    /// Notes ringing only because of the pedal.
    pub fn sustained_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.channels.sustained_notes()
    }

    pub fn pedal(&self) -> PedalState {
        self.sustain.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn channels(&self) -> &ChannelManager<B> {
        &self.channels
    }

    pub fn backend(&self) -> &B {
        self.channels.backend()
    }
}
