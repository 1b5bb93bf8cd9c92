//! Recording audio backend for tests.
//!
//! Every `play` and `release` is appended to a shared log. Clones share the
//! log, so a test can keep one clone and hand the other to the engine.

use crate::backend::{AudioBackend, PlaybackHandle, SampleId};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Voices are numbered in play order starting at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play {
        voice: u64,
        sample: SampleId,
        velocity: u8,
    },
    Release {
        voice: u64,
        fade_ms: u32,
    },
    /// Handle dropped without being released
    Leaked { voice: u64 },
}

#[derive(Debug, Default)]
struct Log {
    calls: Vec<AudioCall>,
    next_voice: u64,
    missing: HashSet<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    log: Rc<RefCell<Log>>,
}

#[derive(Debug)]
pub struct RecordedHandle {
    voice: u64,
    released: bool,
    log: Rc<RefCell<Log>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `play` fail for this note.
    pub fn fail_on(&self, note: u8) {
        self.log.borrow_mut().missing.insert(note);
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.log.borrow().calls.clone()
    }

    /// Samples played, in order.
    pub fn played(&self) -> Vec<SampleId> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Play { sample, .. } => Some(*sample),
                _ => None,
            })
            .collect()
    }

    pub fn release_count(&self) -> usize {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, AudioCall::Release { .. }))
            .count()
    }

    pub fn leaked(&self) -> usize {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, AudioCall::Leaked { .. }))
            .count()
    }

    /// Voices played and not yet released or leaked.
    pub fn sounding(&self) -> Vec<u64> {
        let log = self.log.borrow();
        let ended: HashSet<u64> = log
            .calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Release { voice, .. } | AudioCall::Leaked { voice } => Some(*voice),
                _ => None,
            })
            .collect();
        log.calls
            .iter()
            .filter_map(|c| match c {
                AudioCall::Play { voice, .. } if !ended.contains(voice) => Some(*voice),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().calls.clear();
    }
}

impl AudioBackend for RecordingBackend {
    type Handle = RecordedHandle;

    fn play(&mut self, sample: SampleId, velocity: u8) -> Result<RecordedHandle> {
        let mut log = self.log.borrow_mut();
        if log.missing.contains(&sample.note()) {
            return Err(Error::MissingSample(sample));
        }
        let voice = log.next_voice;
        log.next_voice += 1;
        log.calls.push(AudioCall::Play {
            voice,
            sample,
            velocity,
        });
        Ok(RecordedHandle {
            voice,
            released: false,
            log: Rc::clone(&self.log),
        })
    }
}

impl PlaybackHandle for RecordedHandle {
    fn release(mut self, fade_ms: u32) {
        self.released = true;
        self.log.borrow_mut().calls.push(AudioCall::Release {
            voice: self.voice,
            fade_ms,
        });
    }
}

impl Drop for RecordedHandle {
    fn drop(&mut self) {
        if !self.released {
            if let Ok(mut log) = self.log.try_borrow_mut() {
                log.calls.push(AudioCall::Leaked { voice: self.voice });
            }
        }
    }
}
