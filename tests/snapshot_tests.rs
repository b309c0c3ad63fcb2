// Host-side tests for the snapshot document.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod snapshot {
    include!("../src/snapshot.rs");
}

use cube_core::synth::SimGraph;
use cube_core::{Instrument, InstrumentConfig, Readout};
use glam::Vec3;
use serde_json::{json, Value};
use snapshot::*;

fn parsed(snap: &Snapshot) -> Value {
    serde_json::from_str(&snap.to_json().unwrap()).unwrap()
}

#[test]
fn filename_uses_whole_milliseconds() {
    assert_eq!(snapshot_filename(1234.6), "timbre-snapshot-1235.json");
    assert_eq!(snapshot_filename(-5.0), "timbre-snapshot-0.json");
}

#[test]
fn empty_instrument_reports_null_descriptors() {
    let snap = Snapshot::capture(0.0, 0.5, &Readout::NoMarker, std::iter::empty());
    assert_eq!(
        parsed(&snap),
        json!({
            "rotation": { "pitch": 0.0, "yaw": 0.5 },
            "descriptors": null,
            "markers": []
        })
    );
}

#[test]
fn placed_marker_appears_with_its_params() {
    let mut inst = Instrument::new(SimGraph::new(), InstrumentConfig::default());
    inst.place_marker(Vec3::ZERO);
    let (pitch, yaw) = inst.volume().angles();
    let snap = Snapshot::capture(pitch, yaw, &inst.readout(), inst.markers().iter());
    let v = parsed(&snap);

    assert_eq!(v["descriptors"]["centroid"], json!(0.5));
    assert_eq!(v["markers"].as_array().map(Vec::len), Some(1));
    assert_eq!(v["markers"][0]["params"], json!([0.5, 0.5, 0.5]));
    assert_eq!(v["markers"][0]["visible"], json!(true));
}

#[test]
fn descriptors_keep_full_precision() {
    // The on-screen readout rounds to two decimals; the document must not.
    let readout = Readout::Marker(cube_core::TimbreParams::new(0.126, 0.5, 1.0));
    let snap = Snapshot::capture(0.0, 0.0, &readout, std::iter::empty());
    let d = snap.descriptors.unwrap();
    assert_eq!(d.inharm, 0.126);
    assert_eq!(d.centroid, 0.5);
    assert_eq!(d.noisiness, 1.0);

    let inharm = parsed(&snap)["descriptors"]["inharm"].as_f64().unwrap();
    assert!((inharm - 0.126).abs() < 1e-6);
}
