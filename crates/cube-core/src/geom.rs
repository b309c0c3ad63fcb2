//! Ray primitives shared by picking and the ray resolver.
//!
//! Every intersection routine expects a unit-length direction and returns the
//! distance along the ray, so hits from different primitives can be compared
//! directly.

use glam::Vec3;

const PARALLEL_EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `dir`. A zero direction yields a ray that hits nothing.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.dir == Vec3::ZERO || !self.origin.is_finite() || !self.dir.is_finite()
    }
}

/// Nearest non-negative hit distance against a sphere. A ray starting inside
/// the sphere reports its exit distance.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t = -b - root;
    if t >= 0.0 {
        return Some(t);
    }
    let t_far = -b + root;
    (t_far >= 0.0).then_some(t_far)
}

/// Slab test against an axis-aligned box. Returns `(t_near, t_far)`; `t_near`
/// is negative when the origin is inside the box.
pub fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, f32)> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        if d.abs() < PARALLEL_EPS {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }
    if t_far < 0.0 {
        return None;
    }
    Some((t_near, t_far))
}

/// Forward hit against an infinite plane; `None` when parallel or behind the origin.
#[inline]
pub fn ray_plane(origin: Vec3, dir: Vec3, normal: Vec3, point_on_plane: Vec3) -> Option<f32> {
    let denom = normal.dot(dir);
    if denom.abs() < PARALLEL_EPS {
        return None;
    }
    let t = (point_on_plane - origin).dot(normal) / denom;
    (t >= 0.0).then_some(t)
}

/// Double-sided world-space rectangle: UI buttons, HUD panels, the floating
/// spectrograph plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub center: Vec3,
    pub normal: Vec3,
    /// In-plane horizontal axis (unit length, perpendicular to `normal`).
    pub right: Vec3,
    pub half_width: f32,
    pub half_height: f32,
}

impl Quad {
    pub fn new(center: Vec3, normal: Vec3, right: Vec3, width: f32, height: f32) -> Self {
        Self {
            center,
            normal: normal.normalize_or_zero(),
            right: right.normalize_or_zero(),
            half_width: width * 0.5,
            half_height: height * 0.5,
        }
    }

    /// Quad facing the +Z axis (the default orientation of a plane mesh).
    pub fn facing_z(center: Vec3, width: f32, height: f32) -> Self {
        Self::new(center, Vec3::Z, Vec3::X, width, height)
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.normal.cross(self.right)
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let t = ray_plane(ray.origin, ray.dir, self.normal, self.center)?;
        let offset = ray.at(t) - self.center;
        let inside = offset.dot(self.right).abs() <= self.half_width
            && offset.dot(self.up()).abs() <= self.half_height;
        inside.then_some(t)
    }
}
