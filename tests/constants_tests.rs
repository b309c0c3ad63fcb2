// Host-side tests for the browser constants.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}

use constants::*;

#[test]
#[allow(clippy::assertions_on_constants)]
fn output_stage_levels_are_sane() {
    assert!(MASTER_GAIN > 0.0 && MASTER_GAIN <= 1.0);
    assert!(REVERB_WET > 0.0 && REVERB_WET <= 1.0);
    assert!(NOISE_COLOR_FADE_SEC > 0.0 && NOISE_COLOR_FADE_SEC < 0.5);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn noise_loop_and_reverb_tail_are_long_enough() {
    // A loop under a second is audible as a pattern.
    assert!(NOISE_BUFFER_SEC >= 1.0);
    assert!(IR_TAIL_FACTOR > 1.0);
    assert_ne!(NOISE_SEED_WHITE, NOISE_SEED_PINK);
}

#[test]
fn dom_ids_are_distinct() {
    let ids = [
        CANVAS_ID,
        OVERLAY_ID,
        OVERLAY_OK_ID,
        READOUT_CENTROID_ID,
        READOUT_NOISINESS_ID,
        READOUT_INHARM_ID,
        BUTTON_PLACE_ID,
        BUTTON_CLEAR_ID,
        BUTTON_RESET_ID,
        BUTTON_SNAPSHOT_ID,
    ];
    for (i, a) in ids.iter().enumerate() {
        assert!(!a.is_empty());
        assert!(!a.contains(' '), "{a} is not a valid id");
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn readout_ids_follow_the_descriptor_order() {
    for (id, label) in READOUT_IDS.iter().zip(cube_core::Readout::LABELS) {
        assert_eq!(*id, format!("readout-{label}"));
    }
}
