//! Test helpers and fixtures for clavis integration tests
//!
//! - Engines run on a [`ManualClock`] and a [`RecordingBackend`] so every test
//!   steps time by hand and inspects exactly what reached the audio side.
//! - [`TestKeyboard`] is a one-octave key geometry for pointer input.
//! - [`write_midi`] writes a Standard MIDI File where one tick is one millisecond.

#![allow(dead_code)]

use clavis::prelude::*;
use clavis::voice::testing::RecordingBackend;
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use smallvec::SmallVec;
use std::path::{Path, PathBuf};

pub type TestEngine = PianoEngine<RecordingBackend, ManualClock>;

/// Clock reading when a test engine is created. Non-zero so that session
/// offsets are exercised.
pub const TEST_START_MS: u64 = 10_000;

/// 500 ticks per beat at 120 BPM: one tick per millisecond.
pub const TEST_TICKS_PER_BEAT: u16 = 500;

pub const WHITE_KEY_WIDTH: f32 = 20.0;
pub const WHITE_KEY_HEIGHT: f32 = 100.0;
pub const BLACK_KEY_WIDTH: f32 = 12.0;
pub const BLACK_KEY_HEIGHT: f32 = 60.0;

/// Route engine logs through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Engine with default config, a manual clock and a recording backend.
pub fn test_engine() -> (TestEngine, RecordingBackend, ManualClock) {
    test_engine_with(PianoEngineBuilder::new())
}

pub fn test_engine_with(builder: PianoEngineBuilder) -> (TestEngine, RecordingBackend, ManualClock) {
    init_tracing();
    let audio = RecordingBackend::new();
    let clock = ManualClock::new(TEST_START_MS);
    let engine = builder
        .geometry(TestKeyboard::c4_octave())
        .build_with_clock(audio.clone(), clock.clone())
        .expect("Failed to create test engine");
    (engine, audio, clock)
}

/// `[{t=0, dur=500, C2 white key 0, vel 64}, {t=1000, dur=300, Ds2 black key 1, vel 90}]`
pub fn two_note_sequence() -> NoteSequence {
    let layout = KeyboardLayout::default();
    NoteSequence::new(vec![
        NoteEvent::on_layout(&layout, 36, 0, 500, 64).unwrap(),
        NoteEvent::on_layout(&layout, 39, 1000, 300, 90).unwrap(),
    ])
    .unwrap()
}

/// Key rectangles drawn the usual way: white keys side by side, black keys
/// shorter and straddling the gap between two white keys.
pub struct TestKeyboard {
    keys: Vec<(KeyHit, f32, f32)>,
}

impl TestKeyboard {
    /// C4..=B4 with the left edge of C4 at x = 0 and the key tops at y = 0.
    pub fn c4_octave() -> Self {
        let mut keys = Vec::new();
        let mut white_index = 0;
        for note in 60u8..72 {
            if clavis::midi::is_black(note) {
                let x = white_index as f32 * WHITE_KEY_WIDTH - BLACK_KEY_WIDTH / 2.0;
                keys.push((
                    KeyHit {
                        note,
                        register: Register::Black,
                        top_y: 0.0,
                        height: BLACK_KEY_HEIGHT,
                    },
                    x,
                    x + BLACK_KEY_WIDTH,
                ));
            } else {
                let x = white_index as f32 * WHITE_KEY_WIDTH;
                keys.push((
                    KeyHit {
                        note,
                        register: Register::White,
                        top_y: 0.0,
                        height: WHITE_KEY_HEIGHT,
                    },
                    x,
                    x + WHITE_KEY_WIDTH,
                ));
                white_index += 1;
            }
        }
        Self { keys }
    }
}

impl KeyGeometry for TestKeyboard {
    fn hit_test(&self, x: f32, y: f32) -> SmallVec<[KeyHit; 2]> {
        self.keys
            .iter()
            .filter(|(key, left, right)| {
                x >= *left && x < *right && y >= key.top_y && y < key.top_y + key.height
            })
            .map(|(key, _, _)| *key)
            .collect()
    }
}

/// A note for [`write_midi`]: `(note, start_ms, duration_ms, velocity)`.
pub type MidiNote = (u8, u32, u32, u8);

/// Write a single-track SMF at 120 BPM into `dir`.
pub fn write_midi(dir: &Path, name: &str, notes: &[MidiNote]) -> PathBuf {
    // (tick, is_on, note, velocity); offs sort before ons at the same tick
    let mut timeline: Vec<(u32, bool, u8, u8)> = notes
        .iter()
        .flat_map(|&(note, start, duration, velocity)| {
            [(start, true, note, velocity), (start + duration, false, note, 0)]
        })
        .collect();
    timeline.sort_by_key(|&(tick, is_on, _, _)| (tick, is_on));

    let mut track = vec![TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(500_000))),
    }];
    let mut last_tick = 0;
    for (tick, is_on, note, velocity) in timeline {
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(note),
                vel: u7::new(velocity),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(note),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message,
            },
        });
        last_tick = tick;
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(TEST_TICKS_PER_BEAT)),
        },
        tracks: vec![track],
    };

    let path = dir.join(name);
    smf.save(&path).expect("Failed to write MIDI fixture");
    path
}
