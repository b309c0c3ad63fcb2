// Marker lifecycle: single/multi mode, destroy semantics, picking.

use cube_core::synth::{Param, SimGraph, VoiceBank};
use cube_core::{MarkerMode, MarkerSet, Ray};
use glam::Vec3;

const HALF: f32 = 2.0;

fn bank() -> VoiceBank<SimGraph> {
    VoiceBank::new(SimGraph::new())
}

#[test]
fn placing_twice_leaves_one_marker_and_one_live_voice() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let first = markers.place(Vec3::ZERO, &mut voices);
    let second = markers.place(Vec3::new(1.0, 0.0, 0.0), &mut voices);

    assert_ne!(first, second);
    assert_eq!(markers.len(), 1);
    assert!(!markers.contains(first));
    assert_eq!(voices.live_count(), 1);
    // The replaced voice is still releasing until its tail passes.
    assert_eq!(voices.allocated_count(), 2);
}

#[test]
fn multi_mode_keeps_every_marker() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Multi, HALF);
    markers.place(Vec3::ZERO, &mut voices);
    markers.place(Vec3::ONE, &mut voices);
    assert_eq!(markers.len(), 2);
    assert_eq!(voices.live_count(), 2);
}

#[test]
fn ids_are_never_reused() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let a = markers.place(Vec3::ZERO, &mut voices);
    markers.destroy(a, &mut voices);
    let b = markers.place(Vec3::ZERO, &mut voices);
    assert!(b > a);
}

#[test]
fn placement_is_clamped_and_normalized() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let id = markers.place(Vec3::new(9.0, -9.0, 0.0), &mut voices);
    let m = markers.get(id).unwrap();
    assert_eq!(m.position, Vec3::new(2.0, -2.0, 0.0));
    assert_eq!(m.params.as_array(), [1.0, 0.0, 0.5]);
    assert!(m.visible);
}

#[test]
fn destroy_twice_is_a_no_op() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let id = markers.place(Vec3::ZERO, &mut voices);
    let voice = markers.get(id).unwrap().voice.unwrap();

    assert!(markers.destroy(id, &mut voices));
    assert!(markers.is_empty());
    assert!(voices.is_releasing(voice));
    assert!(!markers.destroy(id, &mut voices));
}

#[test]
fn reposition_updates_position_params_and_voice() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let id = markers.place(Vec3::ZERO, &mut voices);
    let voice = markers.get(id).unwrap().voice.unwrap();

    let params = markers
        .reposition(id, Vec3::new(0.0, 2.0, 0.0), &mut voices)
        .unwrap();
    assert_eq!(params.y, 1.0);
    let lowpass = voices.nodes(voice).unwrap().lowpass;
    let target = voices.graph().target(lowpass, Param::Frequency).unwrap();
    assert!((target - 14000.0).abs() < 1e-2);
}

#[test]
fn reposition_of_a_destroyed_marker_is_ignored() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Single, HALF);
    let id = markers.place(Vec3::ZERO, &mut voices);
    markers.destroy(id, &mut voices);
    assert!(markers.reposition(id, Vec3::ONE, &mut voices).is_none());
}

#[test]
fn clear_all_releases_every_voice() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Multi, HALF);
    for x in [-1.0, 0.0, 1.0] {
        markers.place(Vec3::new(x, 0.0, 0.0), &mut voices);
    }
    let gone = markers.clear_all(&mut voices);
    assert_eq!(gone.len(), 3);
    assert_eq!(voices.live_count(), 0);
    voices.graph_mut().advance(10.0);
    assert_eq!(voices.tick(), 3);
}

#[test]
fn pick_finds_the_nearest_visible_marker() {
    let mut voices = bank();
    let mut markers = MarkerSet::new(MarkerMode::Multi, HALF);
    let back = markers.place(Vec3::new(0.0, 0.0, -1.0), &mut voices);
    let front = markers.place(Vec3::new(0.0, 0.0, 1.0), &mut voices);
    let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);

    assert_eq!(markers.pick(&ray, 0.225), Some(front));
    markers.set_visible(front, false);
    assert_eq!(markers.pick(&ray, 0.225), Some(back));

    let miss = Ray::new(Vec3::new(1.0, 0.0, 10.0), Vec3::NEG_Z);
    assert_eq!(markers.pick(&miss, 0.225), None);
}
