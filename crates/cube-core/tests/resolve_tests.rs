// Ray resolver: direct entry, blockers and the depth scan.

use cube_core::{
    resolve_depth_scan, resolve_entry, DepthGate, Quad, Ray, ScreenView, Volume,
};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

const EPS: f32 = 0.002;

fn unrotated() -> Volume {
    let mut v = Volume::new(2.0);
    v.set_angles(0.0, 0.0);
    v
}

fn near(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < 1e-4
}

fn down_z(x: f32, y: f32) -> Ray {
    Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z)
}

#[test]
fn entry_lands_on_the_near_face() {
    let p = resolve_entry(&down_z(0.0, 0.0), &unrotated(), &[], EPS).unwrap();
    assert!(near(p, Vec3::new(0.0, 0.0, 2.0)), "{p:?}");
}

#[test]
fn entry_keeps_lateral_offset() {
    let p = resolve_entry(&down_z(1.5, -0.5), &unrotated(), &[], EPS).unwrap();
    assert!(near(p, Vec3::new(1.5, -0.5, 2.0)), "{p:?}");
}

#[test]
fn entry_misses_beside_the_cube() {
    assert!(resolve_entry(&down_z(5.0, 0.0), &unrotated(), &[], EPS).is_none());
}

#[test]
fn entry_ignores_cube_behind_the_origin() {
    let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
    assert!(resolve_entry(&away, &unrotated(), &[], EPS).is_none());
}

#[test]
fn origin_inside_resolves_to_itself() {
    let inside = Ray::new(Vec3::new(0.5, 0.25, 0.0), Vec3::NEG_Z);
    let p = resolve_entry(&inside, &unrotated(), &[], EPS).unwrap();
    assert!(near(p, Vec3::new(0.5, 0.25, 0.0)), "{p:?}");
}

#[test]
fn zero_direction_resolves_nothing() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    assert!(resolve_entry(&ray, &unrotated(), &[], EPS).is_none());
}

#[test]
fn closer_blocker_occludes_entry() {
    let panel = Quad::facing_z(Vec3::new(0.0, 0.0, 5.0), 2.0, 2.0);
    assert!(resolve_entry(&down_z(0.0, 0.0), &unrotated(), &[panel], EPS).is_none());
}

#[test]
fn blocker_within_epsilon_does_not_occlude() {
    let flush = Quad::facing_z(Vec3::new(0.0, 0.0, 2.001), 2.0, 2.0);
    assert!(resolve_entry(&down_z(0.0, 0.0), &unrotated(), &[flush], EPS).is_some());
}

#[test]
fn blocker_beside_the_ray_is_ignored() {
    let aside = Quad::facing_z(Vec3::new(3.0, 0.0, 5.0), 1.0, 1.0);
    assert!(resolve_entry(&down_z(0.0, 0.0), &unrotated(), &[aside], EPS).is_some());
}

#[test]
fn entry_follows_the_live_rotation() {
    let mut v = unrotated();
    v.set_angles(0.0, FRAC_PI_2);
    let ray = Ray::new(Vec3::new(10.0, 0.5, 0.0), Vec3::NEG_X);
    let p = resolve_entry(&ray, &v, &[], EPS).unwrap();
    assert!(near(p, Vec3::new(0.0, 0.5, 2.0)), "{p:?}");
}

#[test]
fn entry_respects_immersive_placement() {
    let mut v = unrotated();
    v.enter_immersive();
    let ray = Ray::new(Vec3::new(0.0, 1.2, 10.0), Vec3::NEG_Z);
    let p = resolve_entry(&ray, &v, &[], EPS).unwrap();
    assert!(near(p, Vec3::new(0.0, 0.0, 2.0)), "{p:?}");
    // Scaled cube: the old desktop face position is now empty space.
    let outside = Ray::new(Vec3::new(1.5, 1.2, 10.0), Vec3::NEG_Z);
    assert!(resolve_entry(&outside, &v, &[], EPS).is_none());
}

fn view(ndc_y: f32) -> ScreenView {
    ScreenView {
        forward: Vec3::NEG_Z,
        ndc_y,
    }
}

#[test]
fn depth_scan_maps_screen_height_to_depth() {
    let v = unrotated();
    let ray = down_z(0.0, 0.0);
    let gate = DepthGate::Bounds { margin: 1.5 };
    let top = resolve_depth_scan(&ray, &view(1.0), &v, gate).unwrap();
    let mid = resolve_depth_scan(&ray, &view(0.0), &v, gate).unwrap();
    let bottom = resolve_depth_scan(&ray, &view(-1.0), &v, gate).unwrap();
    assert!(near(top, Vec3::new(0.0, 0.0, -1.0)), "{top:?}");
    assert!(near(mid, Vec3::ZERO), "{mid:?}");
    assert!(near(bottom, Vec3::new(0.0, 0.0, 1.0)), "{bottom:?}");
}

#[test]
fn depth_scan_gate_rejects_far_rays_until_skipped() {
    let v = unrotated();
    let ray = down_z(10.0, 10.0);
    let gate = DepthGate::Bounds { margin: 1.5 };
    assert!(resolve_depth_scan(&ray, &view(0.0), &v, gate).is_none());
    let p = resolve_depth_scan(&ray, &view(0.0), &v, DepthGate::Skip).unwrap();
    assert!(near(p, Vec3::new(2.0, 2.0, 0.0)), "{p:?}");
}

#[test]
fn depth_scan_pick_box_is_wider_than_the_cube() {
    let v = unrotated();
    let ray = down_z(2.5, 0.0);
    let p = resolve_depth_scan(&ray, &view(0.0), &v, DepthGate::Bounds { margin: 1.5 }).unwrap();
    assert!(near(p, Vec3::new(2.0, 0.0, 0.0)), "{p:?}");
}

#[test]
fn depth_scan_parallel_ray_misses() {
    let v = unrotated();
    let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
    assert!(resolve_depth_scan(&ray, &view(0.0), &v, DepthGate::Skip).is_none());
}
