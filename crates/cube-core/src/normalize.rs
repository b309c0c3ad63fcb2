//! Local cube coordinates <-> unit timbre parameters.

use glam::Vec3;

/// Three unit-interval controls derived from a marker position.
///
/// `x` drives inharmonicity, `y` the spectral centroid and `z` noisiness.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimbreParams {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl TimbreParams {
    pub const CENTER: Self = Self {
        x: 0.5,
        y: 0.5,
        z: 0.5,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Bipolar view, each axis mapped to `[-1, 1]`.
    #[inline]
    pub fn bipolar(&self) -> [f32; 3] {
        [
            self.x * 2.0 - 1.0,
            self.y * 2.0 - 1.0,
            self.z * 2.0 - 1.0,
        ]
    }

    pub fn inharmonicity(&self) -> f32 {
        self.x
    }

    pub fn centroid(&self) -> f32 {
        self.y
    }

    pub fn noisiness(&self) -> f32 {
        self.z
    }
}

#[inline]
fn axis(c: f32, half: f32) -> f32 {
    if !c.is_finite() || half <= 0.0 {
        return 0.5;
    }
    ((c + half) / (2.0 * half)).clamp(0.0, 1.0)
}

/// Map a local point to parameters. Pure and total: out-of-range components
/// saturate, non-finite ones fall back to the centre.
pub fn normalize(point: Vec3, half: f32) -> TimbreParams {
    TimbreParams {
        x: axis(point.x, half),
        y: axis(point.y, half),
        z: axis(point.z, half),
    }
}

/// Inverse of [`normalize`] for in-range parameters.
pub fn denormalize(params: TimbreParams, half: f32) -> Vec3 {
    Vec3::new(
        params.x * 2.0 * half - half,
        params.y * 2.0 * half - half,
        params.z * 2.0 * half - half,
    )
}
