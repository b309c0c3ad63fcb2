// Browser-side tuning and DOM wiring constants.
//
// Interaction and voice tuning shared with the desktop build lives in
// `cube_core::constants`; this file only holds what the WebAudio graph and
// the page need.

// Output stage
pub const MASTER_GAIN: f32 = 0.6;
pub const REVERB_WET: f32 = 1.0;

// Looping noise buffers (seconds). Long enough that the loop point is inaudible.
pub const NOISE_BUFFER_SEC: f32 = 2.0;
pub const NOISE_SEED_WHITE: u64 = 0x5EED_0001;
pub const NOISE_SEED_PINK: u64 = 0x5EED_0002;
pub const NOISE_COLOR_FADE_SEC: f64 = 0.05;

// Procedural reverb impulse response
pub const IR_TAIL_FACTOR: f32 = 1.5; // buffer length as a multiple of the decay time
pub const IR_SEED: u32 = 0x1234_ABCD;


// DOM element ids
pub const CANVAS_ID: &str = "app-canvas";
pub const OVERLAY_ID: &str = "start-overlay";
pub const OVERLAY_OK_ID: &str = "overlay-ok";
pub const READOUT_CENTROID_ID: &str = "readout-centroid";
pub const READOUT_NOISINESS_ID: &str = "readout-noisiness";
pub const READOUT_INHARM_ID: &str = "readout-inharm";
// Same order as the core readout labels.
pub const READOUT_IDS: [&str; 3] = [READOUT_CENTROID_ID, READOUT_NOISINESS_ID, READOUT_INHARM_ID];
pub const BUTTON_PLACE_ID: &str = "btn-place";
pub const BUTTON_CLEAR_ID: &str = "btn-clear";
pub const BUTTON_RESET_ID: &str = "btn-reset";
pub const BUTTON_SNAPSHOT_ID: &str = "btn-snapshot";
