//! Pickable scene furniture around the cube: rotation handles, panel buttons
//! and blockers. Handles live in the cube's local frame and rotate with it;
//! buttons and blockers are fixed in world space.

use crate::geom::{ray_sphere, Quad, Ray};
use crate::volume::Volume;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandleId(pub u8);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationHandle {
    pub id: HandleId,
    /// Ball centre in local units.
    pub center: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiAction {
    PlaceMarker,
    Clear,
    ResetRotation,
    Snapshot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UiButton {
    pub action: UiAction,
    pub quad: Quad,
}

#[derive(Clone, Debug, Default)]
pub struct SceneLayout {
    pub handles: Vec<RotationHandle>,
    pub buttons: Vec<UiButton>,
    /// Extra occluders that are not buttons (HUD panes, the spectrograph plane).
    pub panels: Vec<Quad>,
}

const HANDLE_OFFSET: f32 = 0.6;
const BUTTON_WIDTH: f32 = 0.3;
const BUTTON_HEIGHT: f32 = 0.1;
const BUTTON_SPACING: f32 = 0.02;
const PANEL_ORIGIN: [f32; 3] = [-1.5, 1.5, -1.0];

impl SceneLayout {
    /// Four handle balls hanging below the bottom edge, one per side.
    pub fn with_handles(half: f32) -> Self {
        let reach = half + HANDLE_OFFSET;
        let centers = [
            Vec3::new(0.0, -half, reach),
            Vec3::new(0.0, -half, -reach),
            Vec3::new(-reach, -half, 0.0),
            Vec3::new(reach, -half, 0.0),
        ];
        Self {
            handles: centers
                .iter()
                .enumerate()
                .map(|(i, c)| RotationHandle {
                    id: HandleId(i as u8),
                    center: *c,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Handles plus the floating button column used in immersive sessions.
    /// The column faces `viewer`.
    pub fn immersive(half: f32, viewer: Vec3) -> Self {
        let mut layout = Self::with_handles(half);
        let origin = Vec3::from(PANEL_ORIGIN);
        let normal = (viewer - origin).normalize_or_zero();
        let normal = if normal == Vec3::ZERO { Vec3::Z } else { normal };
        let mut right = Vec3::Y.cross(normal).normalize_or_zero();
        if right == Vec3::ZERO {
            right = Vec3::X;
        }
        let up = normal.cross(right);
        let actions = [
            UiAction::PlaceMarker,
            UiAction::Snapshot,
            UiAction::Clear,
            UiAction::ResetRotation,
        ];
        layout.buttons = actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let center = origin - up * (i as f32 * (BUTTON_HEIGHT + BUTTON_SPACING));
                UiButton {
                    action: *action,
                    quad: Quad::new(center, normal, right, BUTTON_WIDTH, BUTTON_HEIGHT),
                }
            })
            .collect();
        layout
    }

    /// Everything that can occlude the cube for direct-entry rays.
    pub fn blockers(&self) -> Vec<Quad> {
        self.buttons
            .iter()
            .map(|b| b.quad)
            .chain(self.panels.iter().copied())
            .collect()
    }

    /// Closest button under the ray.
    pub fn pick_button(&self, ray: &Ray) -> Option<UiAction> {
        self.buttons
            .iter()
            .filter_map(|b| b.quad.intersect(ray).map(|t| (t, b.action)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, action)| action)
    }

    /// Closest handle under the ray, tested in the volume's local frame.
    pub fn pick_handle(&self, ray: &Ray, volume: &Volume, radius: f32) -> Option<HandleId> {
        let local = volume.ray_to_local(ray);
        self.handles
            .iter()
            .filter_map(|h| ray_sphere(local.origin, local.dir, h.center, radius).map(|t| (t, h.id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }

    /// World-space handle centres for the presentation layer.
    pub fn handle_positions(&self, volume: &Volume) -> Vec<(HandleId, Vec3)> {
        self.handles
            .iter()
            .map(|h| (h.id, volume.local_to_world(h.center)))
            .collect()
    }
}
