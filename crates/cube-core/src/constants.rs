// Shared interaction/audio tuning constants used by both web and native frontends.

// Volume layout
pub const CUBE_EDGE: f32 = 4.0; // edge length of the interaction volume (local units)
pub const PICK_MARGIN: f32 = 1.5; // coarse "is the pointer over the cube" box, as a multiple of the edge
pub const DEFAULT_YAW: f32 = std::f32::consts::PI / 12.0; // resting rotation about the vertical axis

// Immersive session placement of the volume
pub const IMMERSIVE_TRANSLATION: [f32; 3] = [0.0, 1.2, -2.5];
pub const IMMERSIVE_SCALE: f32 = 0.6;

// Picking
pub const BLOCKER_EPSILON: f32 = 0.002; // world units; avoids z-fighting false negatives
pub const MARKER_PICK_EDGE: f32 = 0.225; // marker box edge in local units
pub const HANDLE_PICK_RADIUS: f32 = 0.15; // rotation handle sphere radius in local units

// Arbitration
pub const UI_CLICK_COOLDOWN_MS: f64 = 500.0;

// Rotation integrator gains (radians per unit of anchor motion)
pub const MOUSE_ROTATE_GAIN: f32 = 0.005; // per pixel
pub const CONTROLLER_ROTATE_GAIN: [f32; 2] = [3.0, -3.0]; // [yaw, pitch] per metre
pub const HAND_ROTATE_GAIN: [f32; 2] = [3.0, 3.0];

// Keyboard and wheel steps, as fractions of the cube edge
pub const NUDGE_FINE: f32 = 0.03;
pub const NUDGE_COARSE: f32 = 0.1;
pub const WHEEL_STEP: f32 = 0.05;
pub const PRESET_CORNER: f32 = 0.98; // corner presets sit just inside the walls

// Voice timing
pub const RELEASE_TAIL_PAD_SEC: f64 = 0.3; // added to the envelope release before teardown
pub const GAIN_RAMP_SEC: f64 = 0.06;
pub const FILTER_RAMP_SEC: f64 = 0.04;
pub const MOD_RAMP_SEC: f64 = 0.08;
pub const SEND_RAMP_SEC: f64 = 0.08;

// Voice routing
pub const VOICE_OUTPUT_GAIN: f32 = 0.6;
pub const REVERB_DECAY_SEC: f32 = 2.8;
pub const REVERB_PRE_DELAY_SEC: f32 = 0.03;
