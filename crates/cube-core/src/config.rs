//! Runtime configuration for an [`Instrument`](crate::Instrument).
//!
//! Defaults mirror `constants.rs`; frontends override individual fields
//! (the immersive build switches the marker mode, tests shrink the cube).

use crate::constants::*;

/// How many markers may be alive at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerMode {
    /// Placing a marker destroys every other marker first.
    Single,
    /// Markers accumulate; each owns its own voice.
    Multi,
}

#[derive(Clone, Debug)]
pub struct InstrumentConfig {
    pub cube_edge: f32,
    pub pick_margin: f32,
    pub blocker_epsilon: f32,
    pub ui_cooldown_ms: f64,
    pub marker_mode: MarkerMode,
    pub marker_pick_edge: f32,
    pub handle_pick_radius: f32,
    pub release_tail_pad_sec: f64,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            cube_edge: CUBE_EDGE,
            pick_margin: PICK_MARGIN,
            blocker_epsilon: BLOCKER_EPSILON,
            ui_cooldown_ms: UI_CLICK_COOLDOWN_MS,
            marker_mode: MarkerMode::Single,
            marker_pick_edge: MARKER_PICK_EDGE,
            handle_pick_radius: HANDLE_PICK_RADIUS,
            release_tail_pad_sec: RELEASE_TAIL_PAD_SEC,
        }
    }
}

impl InstrumentConfig {
    #[inline]
    pub fn half_size(&self) -> f32 {
        self.cube_edge * 0.5
    }
}
