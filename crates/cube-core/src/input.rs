//! Input source identities and the per-event geometry frontends hand to the core.

use crate::constants::{CONTROLLER_ROTATE_GAIN, HAND_ROTATE_GAIN, MOUSE_ROTATE_GAIN};
use crate::geom::Ray;
use crate::resolve::ScreenView;
use glam::Vec3;

/// Identity of a physical pointer. Sessions are keyed on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceId {
    Mouse,
    /// Tracked controller, by handedness/slot index.
    Controller(u8),
    /// Tracked hand (pinch ray), by handedness/slot index.
    Hand(u8),
}

impl SourceId {
    #[inline]
    pub fn kind(self) -> PointerKind {
        match self {
            SourceId::Mouse => PointerKind::MouseRay,
            SourceId::Controller(_) => PointerKind::ControllerRay,
            SourceId::Hand(_) => PointerKind::HandRay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    MouseRay,
    ControllerRay,
    HandRay,
}

impl PointerKind {
    /// `(yaw, pitch)` radians per unit of anchor motion (pixels for the mouse,
    /// metres for tracked sources).
    pub fn rotate_gain(self) -> (f32, f32) {
        match self {
            PointerKind::MouseRay => (MOUSE_ROTATE_GAIN, MOUSE_ROTATE_GAIN),
            PointerKind::ControllerRay => (CONTROLLER_ROTATE_GAIN[0], CONTROLLER_ROTATE_GAIN[1]),
            PointerKind::HandRay => (HAND_ROTATE_GAIN[0], HAND_ROTATE_GAIN[1]),
        }
    }

    /// Depth scan for the 2D cursor, direct entry for tracked rays.
    #[inline]
    pub fn uses_depth_scan(self) -> bool {
        matches!(self, PointerKind::MouseRay)
    }

    /// Only the mouse drops a marker by pressing on empty space; tracked
    /// sources go through the "place marker" panel button.
    #[inline]
    pub fn places_on_empty(self) -> bool {
        matches!(self, PointerKind::MouseRay)
    }
}

/// Geometry of one pointer event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// World-space pointer ray.
    pub ray: Ray,
    /// Rotation anchor: canvas pixels (z = 0) for the mouse, the grip or
    /// pinch position in metres for tracked sources.
    pub anchor: Vec3,
    /// Present for screen-based pointers; required by the depth scan.
    pub view: Option<ScreenView>,
}

impl PointerSample {
    pub fn tracked(ray: Ray, anchor: Vec3) -> Self {
        Self {
            ray,
            anchor,
            view: None,
        }
    }

    pub fn screen(ray: Ray, pixel: [f32; 2], view: ScreenView) -> Self {
        Self {
            ray,
            anchor: Vec3::new(pixel[0], pixel[1], 0.0),
            view: Some(view),
        }
    }
}
