//! MIDI utility functions

/// Microseconds per quarter note to BPM.
#[inline]
pub fn tempo_to_bpm(us_per_quarter: u32) -> f64 {
    60_000_000.0 / us_per_quarter.max(1) as f64
}
