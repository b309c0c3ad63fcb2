//! Backend-neutral audio graph interface.
//!
//! Voices are described as a handful of nodes wired together; a backend
//! (WebAudio in the browser, the software DSP graph on desktop, `SimGraph` in
//! tests) owns the real objects and the clock that ramps run against.

use smallvec::SmallVec;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Automatable signal parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    Frequency,
    /// Oscillator pitch offset in cents.
    Detune,
    /// Linear gain, or decibels on a shelf filter.
    Gain,
    Q,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RampShape {
    Linear,
    /// Multiplicative; only valid for strictly positive targets.
    Exponential,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    pub shape: RampShape,
    pub seconds: f64,
}

impl Ramp {
    pub const fn linear(seconds: f64) -> Self {
        Self {
            shape: RampShape::Linear,
            seconds,
        }
    }

    pub const fn exponential(seconds: f64) -> Self {
        Self {
            shape: RampShape::Exponential,
            seconds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Bandpass,
    HighShelf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseColor {
    White,
    Pink,
}

/// Envelope shape in seconds (sustain is a level). Read on the next trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.15,
            decay: 0.2,
            sustain: 0.85,
            release: 1.2,
        }
    }
}

/// Harmonic amplitudes, index 0 is the fundamental.
pub type Partials = SmallVec<[f32; 12]>;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeSpec {
    Oscillator { frequency: f32, partials: Partials },
    Gain { gain: f32 },
    Filter {
        kind: FilterKind,
        frequency: f32,
        q: f32,
        gain_db: f32,
    },
    Noise { color: NoiseColor },
    /// Gain stage driven by an ADSR contour, silent until triggered.
    Envelope(Adsr),
}

impl NodeSpec {
    pub fn sine(frequency: f32) -> Self {
        NodeSpec::Oscillator {
            frequency,
            partials: Partials::from_slice(&[1.0]),
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, NodeSpec::Oscillator { .. } | NodeSpec::Noise { .. })
    }
}

/// Destination of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    Node(NodeId),
    /// Modulate a parameter: the source signal is added to its value.
    Param(NodeId, Param),
    /// Dry output bus.
    Master,
    /// Shared reverb bus input.
    Reverb,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {node:?} has no {param:?} parameter")]
    UnsupportedParam { node: NodeId, param: Param },
    #[error("exponential ramp needs a positive target, got {0}")]
    NonPositiveRamp(f32),
    #[error("cannot connect {from:?} to {to:?}")]
    InvalidConnection { from: NodeId, to: Port },
    #[error("audio backend: {0}")]
    Backend(String),
}

pub trait AudioGraph {
    /// Current time on the backend's audio clock, in seconds.
    fn now(&self) -> f64;

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError>;

    fn connect(&mut self, from: NodeId, to: Port) -> Result<(), GraphError>;

    /// Smoothly move `param` to `target`, starting now.
    fn ramp(&mut self, node: NodeId, param: Param, target: f32, ramp: Ramp) -> Result<(), GraphError>;

    fn set_noise_color(&mut self, node: NodeId, color: NoiseColor) -> Result<(), GraphError>;

    fn set_envelope(&mut self, node: NodeId, adsr: Adsr) -> Result<(), GraphError>;

    fn trigger_attack(&mut self, node: NodeId) -> Result<(), GraphError>;

    fn trigger_release(&mut self, node: NodeId) -> Result<(), GraphError>;

    /// Start a source node (oscillator or noise). Other nodes ignore it.
    fn start(&mut self, node: NodeId) -> Result<(), GraphError>;

    /// Stop and free a node. Unknown ids are an error; callers dispose once.
    fn dispose(&mut self, node: NodeId) -> Result<(), GraphError>;
}

/// Shared guard for backends: exponential ramps cannot reach or cross zero.
pub fn check_ramp(target: f32, ramp: Ramp) -> Result<(), GraphError> {
    if ramp.shape == RampShape::Exponential && !(target > 0.0) {
        return Err(GraphError::NonPositiveRamp(target));
    }
    Ok(())
}
