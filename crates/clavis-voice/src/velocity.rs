//! Pointer position to note velocity.
//!
//! Clicking near the top of a key plays softly, near the bottom loudly.

pub const MAX_VELOCITY: u8 = 127;

#[derive(Debug, Clone, Copy, Default)]
pub struct VelocityMapper;

impl VelocityMapper {
    /// Map a click inside a key to a velocity in 0..=127.
    ///
    /// `key_height` must be positive; use [`checked_map`](Self::checked_map)
    /// when the geometry comes from an untrusted source. Clicks above or below
    /// the key clamp to its edges.
    pub fn map(click_y: f32, key_top_y: f32, key_height: f32) -> u8 {
        let relative = (click_y - key_top_y).clamp(0.0, key_height);
        let scaled = (relative / key_height * MAX_VELOCITY as f32).round();
        scaled.clamp(0.0, MAX_VELOCITY as f32) as u8
    }

    /// `None` for non-finite input or a non-positive key height.
    pub fn checked_map(click_y: f32, key_top_y: f32, key_height: f32) -> Option<u8> {
        if !key_height.is_finite() || key_height <= 0.0 {
            return None;
        }
        if !click_y.is_finite() || !key_top_y.is_finite() {
            return None;
        }
        Some(Self::map(click_y, key_top_y, key_height))
    }
}
