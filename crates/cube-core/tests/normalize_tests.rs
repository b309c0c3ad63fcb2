// Coordinate normalizer: clamping, centre mapping and the inverse.

use cube_core::{denormalize, normalize, TimbreParams};
use glam::Vec3;

const HALF: f32 = 2.0;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

#[test]
fn centre_maps_to_half() {
    let p = normalize(Vec3::ZERO, HALF);
    assert_eq!(p, TimbreParams::CENTER);
}

#[test]
fn faces_map_to_unit_bounds() {
    let lo = normalize(Vec3::splat(-HALF), HALF);
    let hi = normalize(Vec3::splat(HALF), HALF);
    assert_eq!(lo.as_array(), [0.0, 0.0, 0.0]);
    assert_eq!(hi.as_array(), [1.0, 1.0, 1.0]);
}

#[test]
fn out_of_range_components_saturate() {
    let p = normalize(Vec3::new(5.0, -9.0, 1.0), HALF);
    assert_eq!(p.x, 1.0);
    assert_eq!(p.y, 0.0);
    assert!(close(p.z, 0.75));
}

#[test]
fn non_finite_input_stays_in_range() {
    let p = normalize(Vec3::new(f32::NAN, f32::INFINITY, 0.0), HALF);
    for v in p.as_array() {
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn normalize_is_idempotent_through_denormalize() {
    let samples = [
        Vec3::new(0.3, -1.7, 1.99),
        Vec3::new(-4.0, 0.0, 12.0),
        Vec3::new(2.0, -2.0, 0.5),
    ];
    for s in samples {
        let once = normalize(s, HALF);
        let twice = normalize(denormalize(once, HALF), HALF);
        for (a, b) in once.as_array().iter().zip(twice.as_array()) {
            assert!(close(*a, b), "{s:?}: {a} vs {b}");
        }
    }
}

#[test]
fn denormalize_inverts_in_range_params() {
    let p = TimbreParams::new(0.99, 0.01, 0.25);
    let v = denormalize(p, HALF);
    assert!(close(v.x, 1.96));
    assert!(close(v.y, -1.96));
    assert!(close(v.z, -1.0));
}

#[test]
fn bipolar_view_is_centred() {
    assert_eq!(TimbreParams::CENTER.bipolar(), [0.0, 0.0, 0.0]);
    assert_eq!(TimbreParams::new(0.0, 1.0, 0.5).bipolar(), [-1.0, 1.0, 0.0]);
}
