//! Response curves from timbre parameters to synthesis targets.
//!
//! All curves work on the bipolar form `u = 2p - 1`, so the centre of the
//! cube (`u = 0`) is the plain clarinet-like tone and opposite faces push the
//! sound in opposite perceptual directions.

use super::graph::{Adsr, NoiseColor};
use crate::normalize::TimbreParams;

/// G4, the voice's fundamental.
pub const BASE_FREQUENCY: f32 = 391.995;

pub const NEUTRAL_CUTOFF: f32 = 4000.0;
const MIN_CUTOFF: f32 = 600.0;
const MAX_CUTOFF: f32 = 14000.0;

const NEUTRAL_NOISE_BAND: f32 = 2000.0;
const MIN_NOISE_BAND: f32 = 400.0;
const MAX_NOISE_BAND: f32 = 8000.0;

/// Above this noisiness the breath noise switches from pink to white.
const WHITE_NOISE_ABOVE: f32 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceTargets {
    pub harmonic_gain: f32,
    pub inharmonic_gain: f32,
    /// Frequency ratio of the inharmonic partial set against the fundamental.
    pub inharmonic_ratio: f32,
    pub vibrato_depth_cents: f32,
    pub vibrato_rate_hz: f32,
    pub cutoff_hz: f32,
    pub cutoff_q: f32,
    pub shelf_db: f32,
    pub noise_center_hz: f32,
    pub noise_level: f32,
    pub noise_q: f32,
    pub noise_color: NoiseColor,
    pub envelope: Adsr,
    pub reverb_send: f32,
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Split a bipolar value: up toward `high`, down toward `low`, `neutral` at 0.
#[inline]
fn bipolar_lerp(neutral: f32, low: f32, high: f32, u: f32) -> f32 {
    if u >= 0.0 {
        lerp(neutral, high, u)
    } else {
        lerp(neutral, low, -u)
    }
}

pub fn targets(params: &TimbreParams) -> VoiceTargets {
    let p = TimbreParams::new(
        params.x.clamp(0.0, 1.0),
        params.y.clamp(0.0, 1.0),
        params.z.clamp(0.0, 1.0),
    );
    let [ua, ub, uc] = p.bipolar();

    VoiceTargets {
        harmonic_gain: lerp(0.85, 0.5, ua.abs()),
        inharmonic_gain: 0.4 * ua.abs(),
        inharmonic_ratio: 1.0 + 0.01 * ua,
        vibrato_depth_cents: 2.0 + 10.0 * ua.abs(),
        vibrato_rate_hz: 5.0 + 1.5 * ua,

        cutoff_hz: bipolar_lerp(NEUTRAL_CUTOFF, MIN_CUTOFF, MAX_CUTOFF, ub),
        cutoff_q: (1.0 + 0.8 * ub).max(0.2),
        shelf_db: 10.0 * ub,
        noise_center_hz: bipolar_lerp(NEUTRAL_NOISE_BAND, MIN_NOISE_BAND, MAX_NOISE_BAND, ub),

        noise_level: (0.08 + 0.5 * uc).clamp(0.001, 0.6),
        noise_q: (1.2 - 0.9 * uc.abs()).clamp(0.3, 2.0),
        noise_color: if p.z > WHITE_NOISE_ABOVE {
            NoiseColor::White
        } else {
            NoiseColor::Pink
        },
        envelope: Adsr {
            attack: 0.15 + 0.1 * uc,
            decay: 0.2,
            sustain: 0.85 - 0.1 * uc.max(0.0),
            release: 1.2 + 0.4 * uc,
        },

        reverb_send: 0.15 + 0.1 * ub.max(0.0) + 0.15 * uc.max(0.0),
    }
}
