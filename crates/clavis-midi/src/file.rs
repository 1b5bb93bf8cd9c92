//! MIDI File loading
//!
//! Parses a Standard MIDI File with `midly` and flattens every track into one
//! [`NoteSequence`] at the file's first tempo. Note-on/note-off pairs become
//! single events with a duration; everything else (controllers, meta, sysex) is
//! ignored.

use crate::error::{Error, Result};
use crate::event::{NoteEvent, NoteSequence};
use crate::keyboard::KeyboardLayout;
use crate::utils::tempo_to_bpm;
use midly::{MetaMessage, MidiMessage, Smf, Timing, Track, TrackEventKind};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// 120 BPM
const DEFAULT_US_PER_QUARTER: u32 = 500_000;

/// A parsed MIDI file ready for playback
#[derive(Debug, Clone)]
pub struct ParsedMidiFile {
    pub sequence: NoteSequence,

    pub ticks_per_beat: u16,

    /// From the first tempo event, or 120 if none
    pub tempo_bpm: f64,

    /// Notes that fell outside the keyboard layout
    pub dropped_notes: usize,
}

/// A note-on waiting for its note-off, in ticks.
#[derive(Debug, Clone, Copy)]
struct RawNote {
    start_tick: u64,
    end_tick: Option<u64>,
    note: u8,
    velocity: u8,
}

impl ParsedMidiFile {
    /// Load and parse a MIDI file from disk
    pub fn load(path: impl AsRef<Path>, layout: &KeyboardLayout) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data, layout)
    }

    /// Parse MIDI file from bytes
    pub fn parse(data: &[u8], layout: &KeyboardLayout) -> Result<Self> {
        let smf = Smf::parse(data)?;

        let ticks_per_beat = match smf.header.timing {
            Timing::Metrical(tpb) => tpb.as_int(),
            Timing::Timecode(_, _) => {
                return Err(Error::MidiUnsupportedTiming);
            }
        };
        if ticks_per_beat == 0 {
            return Err(Error::MidiFileParse("zero ticks per beat".into()));
        }

        debug!(
            "Parsing MIDI file: {} tracks, {} ticks per beat",
            smf.tracks.len(),
            ticks_per_beat
        );

        let us_per_quarter = smf
            .tracks
            .iter()
            .find_map(Self::extract_tempo)
            .unwrap_or(DEFAULT_US_PER_QUARTER);

        let mut raw = Vec::new();
        for track in smf.tracks.iter() {
            raw.extend(Self::parse_track(track));
        }

        let to_ms = |tick: u64| -> u64 {
            (tick as u128 * us_per_quarter as u128 / (ticks_per_beat as u128 * 1000)) as u64
        };

        let mut events = Vec::with_capacity(raw.len());
        let mut dropped_notes = 0;
        for note in raw {
            let start_time_ms = to_ms(note.start_tick);
            let end_time_ms = to_ms(note.end_tick.unwrap_or(note.start_tick));
            let duration_ms = end_time_ms.saturating_sub(start_time_ms).max(1);

            match NoteEvent::on_layout(
                layout,
                note.note,
                start_time_ms,
                duration_ms,
                note.velocity,
            ) {
                Some(event) => events.push(event),
                None => dropped_notes += 1,
            }
        }

        if dropped_notes > 0 {
            debug!(
                "Dropped {} notes outside keyboard range {}..={}",
                dropped_notes, layout.lowest, layout.highest
            );
        }

        let sequence = NoteSequence::new(events)?;
        let tempo_bpm = tempo_to_bpm(us_per_quarter);

        debug!(
            "Parsed {} notes, tempo {:.1} BPM, duration {} ms",
            sequence.len(),
            tempo_bpm,
            sequence.duration_ms()
        );

        Ok(Self {
            sequence,
            ticks_per_beat,
            tempo_bpm,
            dropped_notes,
        })
    }

    /// Pair note-ons with note-offs in one track.
    ///
    /// Overlapping notes of the same key close first-in first-out. Notes still
    /// open at the end of the track end there.
    fn parse_track(track: &Track) -> Vec<RawNote> {
        let mut notes: Vec<RawNote> = Vec::new();
        let mut open: HashMap<(u8, u8), SmallVec<[usize; 2]>> = HashMap::new();
        let mut current_tick = 0u64;

        for event in track.iter() {
            current_tick += event.delta.as_int() as u64;

            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let channel = channel.as_int();

            match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    open.entry((channel, key.as_int()))
                        .or_default()
                        .push(notes.len());
                    notes.push(RawNote {
                        start_tick: current_tick,
                        end_tick: None,
                        note: key.as_int(),
                        velocity: vel.as_int(),
                    });
                }
                // Note: velocity 0 is treated as Note Off
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    if let Some(pending) = open.get_mut(&(channel, key.as_int())) {
                        if !pending.is_empty() {
                            let index = pending.remove(0);
                            notes[index].end_tick = Some(current_tick);
                        }
                    }
                }
                _ => {}
            }
        }

        for note in notes.iter_mut().filter(|n| n.end_tick.is_none()) {
            note.end_tick = Some(current_tick);
        }

        notes
    }

    /// Microseconds per quarter note from the first tempo event of the track
    fn extract_tempo(track: &Track) -> Option<u32> {
        track.iter().find_map(|event| match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Some(tempo.as_int()),
            _ => None,
        })
    }
}
