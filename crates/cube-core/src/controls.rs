//! Keyboard and wheel bindings for fine marker positioning.

use crate::constants::{NUDGE_COARSE, NUDGE_FINE, PRESET_CORNER, WHEEL_STEP};
use crate::normalize::TimbreParams;
use glam::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KeyCommand {
    /// Offset in fractions of the cube edge.
    Nudge(Vec3),
    /// Absolute target in parameter space.
    Preset(TimbreParams),
}

#[inline]
fn corner(sign: f32) -> f32 {
    // ±PRESET_CORNER of the half size, expressed as a parameter.
    0.5 + sign * PRESET_CORNER * 0.5
}

/// Corner presets on 1-8 (front face first, then back), centre on 0.
#[inline]
pub fn preset_for_digit(key: &str) -> Option<TimbreParams> {
    let (x, y, z) = match key {
        "1" => (-1.0, -1.0, 1.0),
        "2" => (1.0, -1.0, 1.0),
        "3" => (-1.0, 1.0, 1.0),
        "4" => (1.0, 1.0, 1.0),
        "5" => (-1.0, -1.0, -1.0),
        "6" => (1.0, -1.0, -1.0),
        "7" => (-1.0, 1.0, -1.0),
        "8" => (1.0, 1.0, -1.0),
        "0" => return Some(TimbreParams::CENTER),
        _ => return None,
    };
    Some(TimbreParams::new(corner(x), corner(y), corner(z)))
}

/// Unit direction for a movement key. Arrows move in the screen plane
/// unless Ctrl/Meta is held, which turns up/down into depth.
#[inline]
pub fn nudge_direction(key: &str, mods: KeyModifiers) -> Option<Vec3> {
    let depth = mods.ctrl || mods.meta;
    match key {
        "ArrowLeft" | "a" | "A" => Some(Vec3::NEG_X),
        "ArrowRight" | "d" | "D" => Some(Vec3::X),
        "ArrowUp" if depth => Some(Vec3::Z),
        "ArrowDown" if depth => Some(Vec3::NEG_Z),
        "ArrowUp" | "q" | "Q" => Some(Vec3::Y),
        "ArrowDown" | "e" | "E" => Some(Vec3::NEG_Y),
        "w" | "W" => Some(Vec3::Z),
        "s" | "S" => Some(Vec3::NEG_Z),
        _ => None,
    }
}

pub fn command_for_key(key: &str, mods: KeyModifiers) -> Option<KeyCommand> {
    if let Some(p) = preset_for_digit(key) {
        return Some(KeyCommand::Preset(p));
    }
    let step = if mods.shift { NUDGE_COARSE } else { NUDGE_FINE };
    nudge_direction(key, mods).map(|dir| KeyCommand::Nudge(dir * step))
}

/// Depth step for one wheel notch, in fractions of the edge. Scrolling up
/// (negative delta) moves the marker forward.
#[inline]
pub fn wheel_depth_step(delta_y: f64) -> f32 {
    if delta_y > 0.0 {
        -WHEEL_STEP
    } else if delta_y < 0.0 {
        WHEEL_STEP
    } else {
        0.0
    }
}
