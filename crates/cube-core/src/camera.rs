//! Desktop camera and screen-to-ray conversion.
//!
//! Both frontends place a fixed perspective camera looking at the cube and
//! turn cursor pixels into [`PointerSample`]s through it.

use crate::geom::Ray;
use crate::input::PointerSample;
use crate::resolve::ScreenView;
use glam::{Mat4, Vec3, Vec4};

/// Right-handed perspective camera.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.5, 3.2, 3.5),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1000.0 / 800.0,
            fovy_radians: 75f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Keep the aspect in sync with the drawing surface.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    /// World ray through pixel `(sx, sy)` of a `width` x `height` surface
    /// (origin top-left), plus the view data the depth scan needs.
    pub fn screen_ray(&self, sx: f32, sy: f32, width: f32, height: f32) -> (Ray, ScreenView) {
        let w = width.max(1.0);
        let h = height.max(1.0);
        let ndc_x = (2.0 * sx / w) - 1.0;
        let ndc_y = 1.0 - (2.0 * sy / h);
        let inv = (self.projection_matrix() * self.view_matrix()).inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far: Vec3 = p_far.truncate() / p_far.w;
        let ray = Ray::new(self.eye, far - self.eye);
        let view = ScreenView {
            forward: self.forward(),
            ndc_y,
        };
        (ray, view)
    }

    /// Pixel position of a world point, `None` behind the camera.
    pub fn project(&self, world: Vec3, width: f32, height: f32) -> Option<[f32; 2]> {
        let clip = self.projection_matrix() * self.view_matrix() * world.extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some([(ndc.x + 1.0) * 0.5 * width, (1.0 - ndc.y) * 0.5 * height])
    }

    pub fn pointer_sample(&self, sx: f32, sy: f32, width: f32, height: f32) -> PointerSample {
        let (ray, view) = self.screen_ray(sx, sy, width, height);
        PointerSample::screen(ray, [sx, sy], view)
    }
}
