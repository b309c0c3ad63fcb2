// Screen-to-world rays from the desktop camera.

use cube_core::Camera;
use glam::Vec3;

#[test]
fn centre_pixel_looks_at_the_target() {
    let cam = Camera::default();
    let (ray, view) = cam.screen_ray(500.0, 400.0, 1000.0, 800.0);
    assert_eq!(ray.origin, cam.eye);
    assert!((ray.dir - cam.forward()).length() < 1e-3);
    assert!(view.ndc_y.abs() < 1e-6);
}

#[test]
fn top_of_the_screen_has_positive_ndc() {
    let cam = Camera::default();
    let (_, top) = cam.screen_ray(500.0, 0.0, 1000.0, 800.0);
    let (_, bottom) = cam.screen_ray(500.0, 800.0, 1000.0, 800.0);
    assert!((top.ndc_y - 1.0).abs() < 1e-6);
    assert!((bottom.ndc_y + 1.0).abs() < 1e-6);
}

#[test]
fn pointer_sample_anchors_on_pixels() {
    let mut cam = Camera::default();
    cam.set_viewport(640.0, 480.0);
    let s = cam.pointer_sample(10.0, 20.0, 640.0, 480.0);
    assert_eq!(s.anchor, Vec3::new(10.0, 20.0, 0.0));
    assert!(s.view.is_some());
    assert!((s.ray.dir.length() - 1.0).abs() < 1e-4);
}

#[test]
fn projecting_the_target_lands_mid_screen() {
    let cam = Camera::default();
    let [x, y] = cam.project(cam.target, 1000.0, 800.0).unwrap();
    assert!((x - 500.0).abs() < 1e-2);
    assert!((y - 400.0).abs() < 1e-2);
    assert!(cam.project(cam.eye * 2.0, 1000.0, 800.0).is_none());
}

#[test]
fn projection_inverts_screen_ray() {
    let cam = Camera::default();
    let (ray, _) = cam.screen_ray(200.0, 650.0, 1000.0, 800.0);
    let [x, y] = cam.project(ray.at(5.0), 1000.0, 800.0).unwrap();
    assert!((x - 200.0).abs() < 0.1);
    assert!((y - 650.0).abs() < 0.1);
}
