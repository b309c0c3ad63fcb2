//! The cube's rigid transform. Every world/local conversion in the core goes
//! through the live `Volume` so nothing works from a stale frame.

use crate::constants::{DEFAULT_YAW, IMMERSIVE_SCALE, IMMERSIVE_TRANSLATION};
use crate::geom::Ray;
use glam::{EulerRot, Quat, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    half_size: f32,
    translation: Vec3,
    pitch: f32,
    yaw: f32,
    scale: f32,
}

impl Volume {
    pub fn new(half_size: f32) -> Self {
        Self {
            half_size,
            translation: Vec3::ZERO,
            pitch: 0.0,
            yaw: DEFAULT_YAW,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn half_size(&self) -> f32 {
        self.half_size
    }

    #[inline]
    pub fn edge(&self) -> f32 {
        self.half_size * 2.0
    }

    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// `(pitch, yaw)` in radians.
    #[inline]
    pub fn angles(&self) -> (f32, f32) {
        (self.pitch, self.yaw)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    pub fn set_placement(&mut self, translation: Vec3, scale: f32) {
        self.translation = translation;
        self.scale = if scale > 0.0 { scale } else { 1.0 };
    }

    /// Move the cube in front of the viewer for a headset session.
    pub fn enter_immersive(&mut self) {
        self.set_placement(Vec3::from(IMMERSIVE_TRANSLATION), IMMERSIVE_SCALE);
    }

    pub fn exit_immersive(&mut self) {
        self.set_placement(Vec3::ZERO, 1.0);
    }

    /// Incremental rotation about the vertical (yaw) and horizontal (pitch) axes.
    pub fn rotate_by(&mut self, d_yaw: f32, d_pitch: f32) {
        if d_yaw.is_finite() && d_pitch.is_finite() {
            self.yaw += d_yaw;
            self.pitch += d_pitch;
        }
    }

    pub fn set_angles(&mut self, pitch: f32, yaw: f32) {
        self.pitch = pitch;
        self.yaw = yaw;
    }

    pub fn reset_rotation(&mut self) {
        self.pitch = 0.0;
        self.yaw = DEFAULT_YAW;
    }

    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.translation + self.rotation() * (local * self.scale)
    }

    pub fn world_to_local(&self, world: Vec3) -> Vec3 {
        self.rotation().inverse() * (world - self.translation) / self.scale
    }

    /// Express a world ray in the local frame. Local distances equal world
    /// distances divided by `scale`.
    pub fn ray_to_local(&self, ray: &Ray) -> Ray {
        let inv = self.rotation().inverse();
        Ray {
            origin: inv * (ray.origin - self.translation) / self.scale,
            dir: (inv * ray.dir).normalize_or_zero(),
        }
    }

    #[inline]
    pub fn contains_local(&self, local: Vec3) -> bool {
        local.abs().max_element() <= self.half_size
    }

    #[inline]
    pub fn clamp_local(&self, local: Vec3) -> Vec3 {
        local.clamp(Vec3::splat(-self.half_size), Vec3::splat(self.half_size))
    }
}
