//! Turns a world-space pointer ray into a point inside the cube.
//!
//! Two strategies exist. Direct entry takes the first face the ray crosses;
//! tracked controllers and hands use it because they physically reach into
//! the volume. Depth scan derives depth from the vertical screen position and
//! intersects a camera-facing plane; the desktop mouse uses it so a 2D cursor
//! can still address all three axes.
//!
//! Both return a clamped local point, so callers never need to re-check bounds.

use crate::geom::{ray_aabb, ray_plane, Quad, Ray};
use crate::volume::Volume;
use glam::Vec3;

/// A point in the volume's local frame, each component within `[-half, half]`.
pub type LocalPoint = Vec3;

/// Camera information the depth scan needs alongside the ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenView {
    /// Unit view direction of the camera, in world space.
    pub forward: Vec3,
    /// Pointer height in normalized device coordinates, `-1` bottom to `1` top.
    pub ndc_y: f32,
}

/// Whether the depth scan first requires the ray to cross the pick box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DepthGate {
    /// Hover and placement: ignore rays that pass well clear of the cube.
    /// `margin` scales the cube edge to get the pick box edge.
    Bounds { margin: f32 },
    /// Active drags keep tracking even outside the pick box.
    Skip,
}

fn finish(volume: &Volume, local: Vec3) -> Option<LocalPoint> {
    local.is_finite().then(|| volume.clamp_local(local))
}

/// Direct ray-entry resolution. `blockers` are world-space panels that
/// occlude the cube; a blocker closer than the entry by more than `epsilon`
/// (world units) swallows the ray.
pub fn resolve_entry(
    ray: &Ray,
    volume: &Volume,
    blockers: &[Quad],
    epsilon: f32,
) -> Option<LocalPoint> {
    if ray.is_degenerate() {
        return None;
    }
    let local_ray = volume.ray_to_local(ray);
    let half = Vec3::splat(volume.half_size());
    let (t_near, _) = ray_aabb(local_ray.origin, local_ray.dir, -half, half)?;
    // Origin inside the cube: the origin itself is the entry.
    let t_local = t_near.max(0.0);
    let entry_world = t_local * volume.scale();

    let occluded = blockers
        .iter()
        .filter_map(|b| b.intersect(ray))
        .any(|t| t < entry_world - epsilon);
    if occluded {
        log::trace!("[input] entry occluded at t={entry_world:.3}");
        return None;
    }

    finish(volume, volume.world_to_local(ray.at(entry_world)))
}

/// Depth-scan resolution for a 2D pointer.
pub fn resolve_depth_scan(
    ray: &Ray,
    view: &ScreenView,
    volume: &Volume,
    gate: DepthGate,
) -> Option<LocalPoint> {
    if ray.is_degenerate() {
        return None;
    }
    let half = volume.half_size();
    if let DepthGate::Bounds { margin } = gate {
        let local_ray = volume.ray_to_local(ray);
        let pick = Vec3::splat(half * margin);
        ray_aabb(local_ray.origin, local_ray.dir, -pick, pick)?;
    }

    let forward = view.forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return None;
    }
    let depth_t = (view.ndc_y.clamp(-1.0, 1.0) + 1.0) * 0.5;
    let depth = (-half + depth_t * volume.edge()) * volume.scale();
    let plane_point = volume.translation() + forward * depth * 0.5;
    let t = ray_plane(ray.origin, ray.dir, -forward, plane_point)?;

    finish(volume, volume.world_to_local(ray.at(t)))
}
