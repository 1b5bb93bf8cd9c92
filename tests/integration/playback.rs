//! File playback: scheduling, lookahead, completion and stop.

use crate::helpers::*;
use approx::assert_relative_eq;
use clavis::prelude::*;
use clavis::voice::testing::AudioCall;
use clavis::PedalState;

#[test]
fn test_play_without_song() {
    let (mut engine, _audio, _clock) = test_engine();
    assert!(matches!(engine.play(), Err(Error::NoSong)));
    assert!(!engine.is_playing());
    assert_eq!(engine.tick(), clavis::AdvanceReport::default());
}

#[test]
fn test_two_note_example() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();

    let report = engine.tick();
    assert_eq!(report.fired, 0..1);
    assert_eq!(audio.played(), vec![SampleId(36)]);

    clock.advance(200);
    let upcoming: Vec<_> = engine.upcoming_within(2000).collect();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].index, 1);
    assert_eq!(upcoming[0].event.register, Register::Black);
    assert_eq!(upcoming[0].event.key_index, 1);
    assert_eq!(upcoming[0].time_to_impact_ms, 800);

    clock.advance(800);
    let report = engine.tick();
    assert_eq!(report.fired, 1..2);
    assert_eq!(report.released, 1);
    assert_eq!(audio.played(), vec![SampleId(36), SampleId(39)]);
    assert!(engine.is_playing());
}

#[test]
fn test_completion_stops_transport_once() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();

    clock.advance(1000);
    assert!(!engine.tick().completed);

    clock.advance(300);
    let report = engine.tick();
    assert!(report.completed);
    assert!(!engine.is_playing());
    assert!(audio.sounding().is_empty());

    clock.advance(1000);
    assert_eq!(engine.tick(), clavis::AdvanceReport::default());
    assert_eq!(engine.upcoming().count(), 0);
}

#[test]
fn test_long_frame_fires_everything_in_order() {
    let (mut engine, audio, clock) = test_engine();
    let layout = KeyboardLayout::default();
    let events = (0..8u8)
        .map(|i| NoteEvent::on_layout(&layout, 60 + i, i as u64 * 50, 40, 80).unwrap())
        .collect();
    engine.load_sequence(NoteSequence::new(events).unwrap());
    engine.play().unwrap();

    clock.advance(5_000);
    let report = engine.tick();

    assert_eq!(report.fired, 0..8);
    assert_eq!(report.released, 8);
    assert!(report.completed);
    let played: Vec<u8> = audio.played().iter().map(|s| s.note()).collect();
    assert_eq!(played, (60..68).collect::<Vec<u8>>());
    assert!(audio.sounding().is_empty());
}

#[test]
fn test_upcoming_tracks_clock() {
    let (mut engine, _audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();

    // Before the first tick both notes are pending
    let ttis: Vec<i64> = engine.upcoming().map(|n| n.time_to_impact_ms).collect();
    assert_eq!(ttis, vec![0, 1000]);

    engine.tick();
    clock.advance(500);
    let note = engine.upcoming().next().unwrap();
    assert_eq!(note.time_to_impact_ms, 500);
    let horizon = engine.config().lookahead_horizon_ms;
    assert_relative_eq!(note.fall_progress(horizon), 1.0 - 500.0 / 3000.0);

    // Outside a short horizon
    assert_eq!(engine.upcoming_within(100).count(), 0);
}

#[test]
fn test_upcoming_empty_while_stopped() {
    let (mut engine, _audio, _clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    assert_eq!(engine.upcoming().count(), 0);
}

#[test]
fn test_stop_silences_and_rewinds() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();
    engine.tick();

    engine.handle_input(InputEvent::PedalDown).unwrap();
    engine.handle_input(InputEvent::KeyDown('a')).unwrap();
    engine.handle_input(InputEvent::KeyUp('a')).unwrap();
    engine.handle_input(InputEvent::KeyDown('s')).unwrap();
    assert_eq!(audio.sounding().len(), 3);

    engine.stop();
    assert!(audio.sounding().is_empty());
    assert!(!engine.is_playing());
    assert_eq!(engine.pedal(), PedalState::Up);
    assert_eq!(engine.held_notes().count(), 0);
    assert_eq!(engine.sustained_notes().count(), 0);

    // Nothing fires while stopped
    clock.advance(2000);
    assert!(engine.tick().fired.is_empty());

    // Playing again starts from the first note
    engine.play().unwrap();
    assert_eq!(engine.tick().fired, 0..1);
}

#[test]
fn test_play_while_playing_restarts() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();
    clock.advance(1000);
    engine.tick();
    assert_eq!(audio.sounding().len(), 1);

    engine.play().unwrap();
    assert!(audio.sounding().is_empty());
    assert_eq!(engine.tick().fired, 0..1);
    assert_eq!(audio.played().last(), Some(&SampleId(36)));
}

#[test]
fn test_file_notes_ignore_pedal() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.handle_input(InputEvent::PedalDown).unwrap();
    engine.play().unwrap();

    engine.tick();
    clock.advance(600);
    engine.tick();

    assert!(audio.sounding().is_empty());
    assert_eq!(engine.sustained_notes().count(), 0);
}

#[test]
fn test_live_and_file_notes_coexist() {
    let (mut engine, audio, clock) = test_engine();
    let layout = KeyboardLayout::default();
    engine.load_sequence(
        NoteSequence::new(vec![NoteEvent::on_layout(&layout, 60, 0, 200, 80).unwrap()]).unwrap(),
    );
    engine.play().unwrap();

    engine.handle_input(InputEvent::KeyDown('a')).unwrap(); // also C4
    engine.tick();
    assert_eq!(audio.sounding().len(), 2);

    // The file note ends; the key is still down
    clock.advance(200);
    assert!(engine.tick().completed);
    assert_eq!(audio.sounding(), vec![0]);
    assert_eq!(engine.held_notes().collect::<Vec<_>>(), vec![60]);
}

#[test]
fn test_refused_file_note_is_skipped() {
    let (mut engine, audio, clock) = test_engine();
    audio.fail_on(36);
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();

    clock.advance(1000);
    let report = engine.tick();
    assert_eq!(report.fired, 0..2);
    assert_eq!(audio.played(), vec![SampleId(39)]);
}

#[test]
fn test_loading_resets_session() {
    let (mut engine, audio, clock) = test_engine();
    engine.load_sequence(two_note_sequence());
    engine.play().unwrap();
    engine.tick();
    engine.handle_input(InputEvent::KeyDown('a')).unwrap();

    clock.advance(100);
    engine.load_sequence(two_note_sequence());
    assert!(!engine.is_playing());
    assert!(audio.sounding().is_empty());
    assert!(audio
        .calls()
        .iter()
        .all(|c| !matches!(c, AudioCall::Leaked { .. })));
}

#[test]
fn test_empty_song_completes_on_first_tick() {
    let (mut engine, _audio, _clock) = test_engine();
    engine.load_sequence(NoteSequence::default());
    engine.play().unwrap();
    assert!(engine.tick().completed);
    assert!(!engine.is_playing());
}
