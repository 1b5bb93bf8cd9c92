//! Input events and the key geometry seam used for pointer hit-testing.

use clavis_midi::Register;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One input from the window event loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(char),
    KeyUp(char),
    PedalDown,
    PedalUp,
    PointerDown { x: f32, y: f32 },
    PointerUp,
}

/// A key rectangle under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyHit {
    pub note: u8,
    pub register: Register,
    pub top_y: f32,
    pub height: f32,
}

/// Supplies key rectangles. Implemented by the renderer.
pub trait KeyGeometry {
    /// Every key whose rectangle contains `(x, y)`. A point on a black key
    /// usually also lies on the white key underneath, so expect up to two.
    fn hit_test(&self, x: f32, y: f32) -> SmallVec<[KeyHit; 2]>;
}

impl<G: KeyGeometry + ?Sized> KeyGeometry for &G {
    fn hit_test(&self, x: f32, y: f32) -> SmallVec<[KeyHit; 2]> {
        (**self).hit_test(x, y)
    }
}

impl<G: KeyGeometry + ?Sized> KeyGeometry for Box<G> {
    fn hit_test(&self, x: f32, y: f32) -> SmallVec<[KeyHit; 2]> {
        (**self).hit_test(x, y)
    }
}

/// Black keys are drawn on top, so they win overlaps.
pub fn pick_hit(hits: &[KeyHit]) -> Option<KeyHit> {
    hits.iter()
        .find(|h| h.register == Register::Black)
        .or_else(|| hits.first())
        .copied()
}
