// End-to-end behaviour of the instrument: arbitration, drags, rotation,
// UI actions and the audio they produce.

use cube_core::geom::Quad;
use cube_core::scene::UiButton;
use cube_core::synth::{Param, SimGraph, BASE_FREQUENCY};
use cube_core::{
    Instrument, InstrumentConfig, KeyModifiers, PointerSample, PressOutcome, Ray, Readout,
    SceneEvent, SceneLayout, ScreenView, SourceId, TimbreParams, UiAction,
};
use glam::Vec3;

fn instrument() -> Instrument<SimGraph> {
    Instrument::new(SimGraph::new(), InstrumentConfig::default())
}

fn unrotated() -> Instrument<SimGraph> {
    let mut inst = instrument();
    inst.volume_mut().set_angles(0.0, 0.0);
    inst
}

fn mouse_at(x: f32, y: f32, pixel: [f32; 2]) -> PointerSample {
    PointerSample::screen(
        Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z),
        pixel,
        ScreenView {
            forward: Vec3::NEG_Z,
            ndc_y: 0.0,
        },
    )
}

fn tracked_at(x: f32, y: f32) -> PointerSample {
    PointerSample::tracked(
        Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z),
        Vec3::new(x, y, 10.0),
    )
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

fn marker_params(inst: &Instrument<SimGraph>) -> TimbreParams {
    match inst.readout() {
        Readout::Marker(p) => p,
        Readout::NoMarker => panic!("no marker"),
    }
}

#[test]
fn centre_marker_plays_neutral_g4() {
    let mut inst = instrument();
    let id = inst.place_marker(Vec3::ZERO);
    assert_eq!(inst.readout(), Readout::Marker(TimbreParams::CENTER));

    let voice = inst.markers().get(id).unwrap().voice.unwrap();
    let nodes = *inst.voices().nodes(voice).unwrap();
    let g = inst.voices().graph();
    assert!(close(g.value(nodes.lowpass, Param::Frequency).unwrap(), 4000.0));
    assert!(close(
        g.value(nodes.harmonic_osc, Param::Frequency).unwrap(),
        BASE_FREQUENCY
    ));
    assert!(close(g.value(nodes.inharmonic_gain, Param::Gain).unwrap(), 0.0));
}

#[test]
fn corner_marker_reaches_the_extremes() {
    let mut inst = instrument();
    let id = inst.place_marker(Vec3::splat(-2.0));
    assert_eq!(marker_params(&inst).as_array(), [0.0, 0.0, 0.0]);

    let voice = inst.markers().get(id).unwrap().voice.unwrap();
    let nodes = *inst.voices().nodes(voice).unwrap();
    let g = inst.voices().graph();
    assert!(close(g.value(nodes.lowpass, Param::Frequency).unwrap(), 600.0));
    assert!(close(g.value(nodes.inharmonic_gain, Param::Gain).unwrap(), 0.4));
    assert!(close(g.value(nodes.noise_gain, Param::Gain).unwrap(), 0.001));
}

#[test]
fn mouse_press_on_empty_space_places_and_drags() {
    let mut inst = instrument();
    let outcome = inst.pointer_down(SourceId::Mouse, &mouse_at(0.0, 0.0, [500.0, 400.0]), 0.0);
    let PressOutcome::Placed(id) = outcome else {
        panic!("expected placement, got {outcome:?}");
    };
    assert_eq!(inst.markers().len(), 1);
    assert_eq!(inst.voices().live_count(), 1);

    inst.pointer_move(SourceId::Mouse, &mouse_at(1.0, 0.0, [520.0, 400.0]), 16.0);
    assert!(marker_params(&inst).x > 0.5);
    inst.pointer_up(SourceId::Mouse, &mouse_at(1.0, 0.0, [520.0, 400.0]), 32.0);

    assert!(inst.markers().contains(id));
    assert!(inst.sessions().is_idle(SourceId::Mouse));
    let events = inst.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, SceneEvent::MarkerPlaced { id: placed, .. } if *placed == id)));
    assert!(events
        .iter()
        .any(|e| matches!(e, SceneEvent::MarkerMoved { .. })));
}

#[test]
fn mouse_press_far_from_the_cube_does_nothing() {
    let mut inst = instrument();
    let outcome = inst.pointer_down(SourceId::Mouse, &mouse_at(20.0, 20.0, [0.0, 0.0]), 0.0);
    assert_eq!(outcome, PressOutcome::Idle);
    assert!(inst.markers().is_empty());
}

#[test]
fn tracked_press_on_empty_space_stays_idle() {
    let mut inst = unrotated();
    let outcome = inst.pointer_down(SourceId::Controller(0), &tracked_at(0.0, 0.0), 0.0);
    assert_eq!(outcome, PressOutcome::Idle);
    assert!(inst.markers().is_empty());
}

#[test]
fn tracked_drag_released_outside_destroys_the_marker() {
    let mut inst = unrotated();
    let id = inst.place_marker(Vec3::new(0.0, 0.0, 2.0));
    let voice = inst.markers().get(id).unwrap().voice.unwrap();
    let src = SourceId::Controller(1);

    assert_eq!(
        inst.pointer_down(src, &tracked_at(0.0, 0.0), 0.0),
        PressOutcome::Dragging(id)
    );
    inst.pointer_move(src, &tracked_at(1.0, 0.5), 10.0);
    let m = inst.markers().get(id).unwrap();
    assert!((m.position - Vec3::new(1.0, 0.5, 2.0)).abs().max_element() < 1e-4);

    inst.pointer_move(src, &tracked_at(10.0, 0.0), 20.0);
    assert!(!inst.markers().get(id).unwrap().visible);
    inst.drain_events();

    inst.pointer_up(src, &tracked_at(10.0, 0.0), 30.0);
    assert!(!inst.markers().contains(id));
    assert!(inst.voices().is_releasing(voice));
    assert_eq!(inst.readout(), Readout::NoMarker);
    let events = inst.drain_events();
    assert!(events.contains(&SceneEvent::MarkerRemoved { id }));
    assert!(events.contains(&SceneEvent::ReadoutChanged(Readout::NoMarker)));
}

#[test]
fn tracked_drag_that_returns_inside_keeps_the_marker() {
    let mut inst = unrotated();
    let id = inst.place_marker(Vec3::new(0.0, 0.0, 2.0));
    let src = SourceId::Hand(0);
    inst.pointer_down(src, &tracked_at(0.0, 0.0), 0.0);
    inst.pointer_move(src, &tracked_at(10.0, 0.0), 10.0);
    inst.pointer_move(src, &tracked_at(-1.0, 0.0), 20.0);
    inst.pointer_up(src, &tracked_at(-1.0, 0.0), 30.0);

    let m = inst.markers().get(id).unwrap();
    assert!(m.visible);
    assert!(close(m.position.x, -1.0));
}

#[test]
fn handle_drag_rotates_the_volume() {
    let mut inst = unrotated();
    // Front handle hangs at local (0, -2, 2.6).
    let press = mouse_at(0.0, -2.0, [500.0, 700.0]);
    let outcome = inst.pointer_down(SourceId::Mouse, &press, 0.0);
    assert!(matches!(outcome, PressOutcome::Rotating(_)));

    inst.pointer_move(SourceId::Mouse, &mouse_at(0.0, -2.0, [600.0, 720.0]), 16.0);
    let (pitch, yaw) = inst.volume().angles();
    assert!(close(yaw, 0.5));
    assert!(close(pitch, 0.1));
    assert!(inst.markers().is_empty());

    inst.reset_rotation();
    let (pitch, yaw) = inst.volume().angles();
    assert_eq!(pitch, 0.0);
    assert!(close(yaw, std::f32::consts::PI / 12.0));
}

#[test]
fn sessions_are_isolated_per_source() {
    let mut inst = unrotated();
    let id = inst.place_marker(Vec3::new(0.0, 0.0, 2.0));
    let ctrl = SourceId::Controller(0);

    inst.pointer_down(SourceId::Mouse, &mouse_at(0.0, -2.0, [500.0, 700.0]), 0.0);
    inst.pointer_down(ctrl, &tracked_at(0.0, 0.0), 0.0);
    assert_eq!(inst.sessions().len(), 2);

    inst.pointer_up(SourceId::Mouse, &mouse_at(0.0, -2.0, [500.0, 700.0]), 10.0);
    assert!(inst.sessions().is_idle(SourceId::Mouse));
    assert!(!inst.sessions().is_idle(ctrl));

    inst.pointer_move(ctrl, &tracked_at(0.5, 0.5), 20.0);
    let m = inst.markers().get(id).unwrap();
    assert!(close(m.position.x, 0.5));
}

#[test]
fn rotation_survives_another_source_releasing() {
    let mut inst = unrotated();
    let press = mouse_at(0.0, -2.0, [500.0, 700.0]);
    assert!(matches!(
        inst.pointer_down(SourceId::Mouse, &press, 0.0),
        PressOutcome::Rotating(_)
    ));

    inst.pointer_up(SourceId::Hand(0), &tracked_at(0.0, 0.0), 5.0);
    assert!(!inst.sessions().is_idle(SourceId::Mouse));

    inst.pointer_move(SourceId::Mouse, &mouse_at(0.0, -2.0, [600.0, 700.0]), 16.0);
    let (pitch, yaw) = inst.volume().angles();
    assert!(close(yaw, 0.5));
    assert!(close(pitch, 0.0));
}

#[test]
fn clearing_drops_drag_sessions_on_removed_markers() {
    let mut inst = unrotated();
    inst.place_marker(Vec3::new(0.0, 0.0, 2.0));
    let ctrl = SourceId::Controller(0);
    inst.pointer_down(ctrl, &tracked_at(0.0, 0.0), 0.0);
    inst.clear();
    assert!(inst.sessions().is_idle(ctrl));
    assert!(inst.markers().is_empty());
}

fn with_button(action: UiAction) -> Instrument<SimGraph> {
    let mut inst = unrotated();
    inst.set_layout(SceneLayout {
        buttons: vec![UiButton {
            action,
            quad: Quad::facing_z(Vec3::new(0.0, 0.0, 5.0), 1.0, 1.0),
        }],
        ..SceneLayout::with_handles(2.0)
    });
    inst
}

#[test]
fn ui_cooldown_is_shared_across_sources() {
    let mut inst = with_button(UiAction::Snapshot);
    let hit = tracked_at(0.0, 0.0);
    assert_eq!(
        inst.pointer_down(SourceId::Controller(0), &hit, 0.0),
        PressOutcome::Ui(UiAction::Snapshot)
    );
    assert_eq!(
        inst.pointer_down(SourceId::Controller(1), &hit, 100.0),
        PressOutcome::UiCoolingDown
    );
    assert_eq!(
        inst.pointer_down(SourceId::Hand(0), &hit, 499.0),
        PressOutcome::UiCoolingDown
    );
    assert_eq!(
        inst.pointer_down(SourceId::Hand(0), &hit, 600.0),
        PressOutcome::Ui(UiAction::Snapshot)
    );
    assert_eq!(
        inst.pointer_down(SourceId::Controller(0), &hit, 900.0),
        PressOutcome::UiCoolingDown
    );
    let snapshots = inst
        .drain_events()
        .into_iter()
        .filter(|e| *e == SceneEvent::SnapshotRequested)
        .count();
    assert_eq!(snapshots, 2);
    assert!(inst.sessions().is_empty());
}

#[test]
fn place_button_puts_a_marker_at_the_centre() {
    let mut inst = with_button(UiAction::PlaceMarker);
    inst.pointer_down(SourceId::Controller(0), &tracked_at(0.0, 0.0), 0.0);
    assert_eq!(inst.readout(), Readout::Marker(TimbreParams::CENTER));
}

#[test]
fn panels_block_tracked_rays() {
    let inst = with_button(UiAction::Clear);
    assert!(inst
        .resolve_pointer(SourceId::Controller(0), &tracked_at(0.0, 0.0))
        .is_none());
    assert!(inst
        .resolve_pointer(SourceId::Controller(0), &tracked_at(1.5, 0.0))
        .is_some());
}

#[test]
fn stale_updates_after_clear_are_dropped() {
    let mut inst = instrument();
    let id = inst.place_marker(Vec3::ZERO);
    let voice = inst.markers().get(id).unwrap().voice.unwrap();
    inst.clear();

    inst.voices_mut().graph_mut().clear_ramps();
    inst.voices_mut().update(voice, &TimbreParams::new(1.0, 1.0, 1.0));
    assert!(inst.voices().graph().ramps().is_empty());

    inst.voices_mut().graph_mut().advance(2.0);
    inst.tick();
    assert_eq!(inst.voices().allocated_count(), 0);
}

#[test]
fn keyboard_and_wheel_move_the_marker() {
    let mut inst = instrument();
    inst.place_marker(Vec3::ZERO);

    assert!(inst.handle_key("ArrowRight", KeyModifiers::default()));
    assert!(close(marker_params(&inst).x, 0.53));

    let shift = KeyModifiers {
        shift: true,
        ..Default::default()
    };
    assert!(inst.handle_key("ArrowUp", shift));
    assert!(close(marker_params(&inst).y, 0.6));

    inst.scroll_depth(-100.0);
    assert!(close(marker_params(&inst).z, 0.55));

    assert!(inst.handle_key("3", KeyModifiers::default()));
    let p = marker_params(&inst);
    assert!(close(p.x, 0.01) && close(p.y, 0.99) && close(p.z, 0.99));

    assert!(!inst.handle_key("z", KeyModifiers::default()));
}

#[test]
fn keyboard_without_a_marker_does_nothing() {
    let mut inst = instrument();
    assert!(!inst.handle_key("ArrowLeft", KeyModifiers::default()));
    assert!(inst.scroll_depth(1.0).is_none());
}

#[test]
fn idle_mouse_publishes_hover_previews() {
    let mut inst = instrument();
    inst.pointer_move(SourceId::Mouse, &mouse_at(0.0, 0.0, [500.0, 400.0]), 0.0);
    inst.pointer_move(SourceId::Mouse, &mouse_at(20.0, 20.0, [0.0, 0.0]), 16.0);
    let hovers: Vec<_> = inst
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            SceneEvent::Hover { source, point } => Some((source, point)),
            _ => None,
        })
        .collect();
    assert_eq!(hovers.len(), 2);
    assert!(hovers[0].1.is_some());
    assert!(hovers[1].1.is_none());
}

#[test]
fn readout_text_shows_two_decimals_or_dashes() {
    let none = Readout::NoMarker.descriptor_text();
    assert!(none.iter().all(|t| t == "--"));
    assert_eq!(Readout::NoMarker.descriptors(), None);

    let marker = Readout::Marker(TimbreParams::new(0.126, 0.5, 1.0));
    assert_eq!(marker.descriptor_text(), ["0.50", "1.00", "0.13"].map(String::from));
    assert_eq!(marker.descriptors(), Some([0.5, 1.0, 0.126]));
    assert_eq!(Readout::LABELS, ["centroid", "noisiness", "inharm"]);
}

#[test]
fn immersive_placement_moves_and_restores_the_volume() {
    let mut inst = instrument();
    inst.volume_mut().enter_immersive();
    assert_eq!(inst.volume().translation(), Vec3::new(0.0, 1.2, -2.5));
    assert!(close(inst.volume().scale(), 0.6));
    inst.volume_mut().exit_immersive();
    assert_eq!(inst.volume().translation(), Vec3::ZERO);
    assert_eq!(inst.volume().scale(), 1.0);
}
