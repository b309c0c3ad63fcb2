//! In-memory `AudioGraph` with a virtual clock.
//!
//! Produces no sound. It records the graph structure and evaluates parameter
//! automation so tests (and headless runs) can inspect what a real backend
//! would be doing at any instant.

use super::graph::{
    check_ramp, Adsr, AudioGraph, GraphError, NodeId, NodeSpec, NoiseColor, Param, Port, Ramp,
    RampShape,
};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq)]
struct ParamTrack {
    from: f32,
    to: f32,
    start: f64,
    end: f64,
    shape: RampShape,
}

impl ParamTrack {
    fn hold(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            end: 0.0,
            shape: RampShape::Linear,
        }
    }

    fn value_at(&self, t: f64) -> f32 {
        if t >= self.end || self.end <= self.start {
            return self.to;
        }
        if t <= self.start {
            return self.from;
        }
        let frac = ((t - self.start) / (self.end - self.start)) as f32;
        match self.shape {
            RampShape::Exponential if self.from > 0.0 && self.to > 0.0 => {
                self.from * (self.to / self.from).powf(frac)
            }
            _ => self.from + (self.to - self.from) * frac,
        }
    }
}

/// Where an envelope node is in its contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeStage {
    Idle,
    Attack { at: f64 },
    Release { at: f64 },
}

#[derive(Clone, Debug)]
struct SimNode {
    spec: NodeSpec,
    params: BTreeMap<ParamKey, ParamTrack>,
    started: bool,
    noise_color: Option<NoiseColor>,
    adsr: Option<Adsr>,
    stage: EnvelopeStage,
}

// `Param` is not `Ord`; key the map on a stable index instead.
type ParamKey = u8;

fn key(p: Param) -> ParamKey {
    match p {
        Param::Frequency => 0,
        Param::Detune => 1,
        Param::Gain => 2,
        Param::Q => 3,
    }
}

impl SimNode {
    fn new(spec: NodeSpec) -> Self {
        let mut params = BTreeMap::new();
        let mut noise_color = None;
        let mut adsr = None;
        match &spec {
            NodeSpec::Oscillator { frequency, .. } => {
                params.insert(key(Param::Frequency), ParamTrack::hold(*frequency));
                params.insert(key(Param::Detune), ParamTrack::hold(0.0));
            }
            NodeSpec::Gain { gain } => {
                params.insert(key(Param::Gain), ParamTrack::hold(*gain));
            }
            NodeSpec::Filter {
                frequency,
                q,
                gain_db,
                ..
            } => {
                params.insert(key(Param::Frequency), ParamTrack::hold(*frequency));
                params.insert(key(Param::Q), ParamTrack::hold(*q));
                params.insert(key(Param::Gain), ParamTrack::hold(*gain_db));
            }
            NodeSpec::Noise { color } => noise_color = Some(*color),
            NodeSpec::Envelope(shape) => adsr = Some(*shape),
        }
        Self {
            spec,
            params,
            started: false,
            noise_color,
            adsr,
            stage: EnvelopeStage::Idle,
        }
    }
}

/// A ramp request as it reached the graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RampRecord {
    pub node: NodeId,
    pub param: Param,
    pub target: f32,
    pub ramp: Ramp,
    pub at: f64,
}

#[derive(Debug, Default)]
pub struct SimGraph {
    now: f64,
    next_id: u32,
    nodes: BTreeMap<NodeId, SimNode>,
    connections: Vec<(NodeId, Port)>,
    ramps: Vec<RampRecord>,
    disposed: usize,
}

impl SimGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the virtual clock forward.
    pub fn advance(&mut self, seconds: f64) {
        if seconds > 0.0 {
            self.now += seconds;
        }
    }

    fn node(&self, id: NodeId) -> Result<&SimNode, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SimNode, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))
    }

    /// Parameter value at the current virtual time.
    pub fn value(&self, node: NodeId, param: Param) -> Option<f32> {
        let track = self.nodes.get(&node)?.params.get(&key(param))?;
        Some(track.value_at(self.now))
    }

    /// Where the parameter is heading once every pending ramp completes.
    pub fn target(&self, node: NodeId, param: Param) -> Option<f32> {
        Some(self.nodes.get(&node)?.params.get(&key(param))?.to)
    }

    pub fn spec(&self, node: NodeId) -> Option<&NodeSpec> {
        self.nodes.get(&node).map(|n| &n.spec)
    }

    pub fn is_started(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.started)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn envelope_stage(&self, node: NodeId) -> Option<EnvelopeStage> {
        self.nodes.get(&node).map(|n| n.stage)
    }

    pub fn envelope(&self, node: NodeId) -> Option<Adsr> {
        self.nodes.get(&node)?.adsr
    }

    pub fn noise_color(&self, node: NodeId) -> Option<NoiseColor> {
        self.nodes.get(&node)?.noise_color
    }

    pub fn outputs(&self, node: NodeId) -> Vec<Port> {
        self.connections
            .iter()
            .filter(|(from, _)| *from == node)
            .map(|(_, to)| *to)
            .collect()
    }

    pub fn ramps(&self) -> &[RampRecord] {
        &self.ramps
    }

    pub fn clear_ramps(&mut self) {
        self.ramps.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn disposed_count(&self) -> usize {
        self.disposed
    }
}

impl AudioGraph for SimGraph {
    fn now(&self) -> f64 {
        self.now
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SimNode::new(spec));
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: Port) -> Result<(), GraphError> {
        self.node(from)?;
        match to {
            Port::Node(target) => {
                self.node(target)?;
            }
            Port::Param(target, param) => {
                if !self.node(target)?.params.contains_key(&key(param)) {
                    return Err(GraphError::UnsupportedParam {
                        node: target,
                        param,
                    });
                }
            }
            Port::Master | Port::Reverb => {}
        }
        self.connections.push((from, to));
        Ok(())
    }

    fn ramp(&mut self, node: NodeId, param: Param, target: f32, ramp: Ramp) -> Result<(), GraphError> {
        check_ramp(target, ramp)?;
        let now = self.now;
        let track = self
            .node_mut(node)?
            .params
            .get_mut(&key(param))
            .ok_or(GraphError::UnsupportedParam { node, param })?;
        *track = ParamTrack {
            from: track.value_at(now),
            to: target,
            start: now,
            end: now + ramp.seconds.max(0.0),
            shape: ramp.shape,
        };
        self.ramps.push(RampRecord {
            node,
            param,
            target,
            ramp,
            at: now,
        });
        Ok(())
    }

    fn set_noise_color(&mut self, node: NodeId, color: NoiseColor) -> Result<(), GraphError> {
        let n = self.node_mut(node)?;
        match n.noise_color {
            Some(_) => {
                n.noise_color = Some(color);
                Ok(())
            }
            None => Err(GraphError::Backend(format!("{node:?} is not a noise source"))),
        }
    }

    fn set_envelope(&mut self, node: NodeId, adsr: Adsr) -> Result<(), GraphError> {
        let n = self.node_mut(node)?;
        match n.adsr {
            Some(_) => {
                n.adsr = Some(adsr);
                Ok(())
            }
            None => Err(GraphError::Backend(format!("{node:?} is not an envelope"))),
        }
    }

    fn trigger_attack(&mut self, node: NodeId) -> Result<(), GraphError> {
        let now = self.now;
        self.node_mut(node)?.stage = EnvelopeStage::Attack { at: now };
        Ok(())
    }

    fn trigger_release(&mut self, node: NodeId) -> Result<(), GraphError> {
        let now = self.now;
        self.node_mut(node)?.stage = EnvelopeStage::Release { at: now };
        Ok(())
    }

    fn start(&mut self, node: NodeId) -> Result<(), GraphError> {
        let n = self.node_mut(node)?;
        if n.spec.is_source() {
            n.started = true;
        }
        Ok(())
    }

    fn dispose(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.nodes
            .remove(&node)
            .ok_or(GraphError::UnknownNode(node))?;
        self.connections.retain(|(from, to)| {
            *from != node && !matches!(to, Port::Node(n) | Port::Param(n, _) if *n == node)
        });
        self.disposed += 1;
        Ok(())
    }
}
