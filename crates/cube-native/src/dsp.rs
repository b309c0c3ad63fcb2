//! Software audio graph for the desktop build.
//!
//! Nodes render one sample at a time in creation order, so a connection must
//! point at a node created after its source. The voice layout already builds
//! sources before the stages they feed. Dry and reverb buses are summed at
//! the end; the reverb is a pre-delayed Schroeder network.

use cube_core::constants::{REVERB_DECAY_SEC, REVERB_PRE_DELAY_SEC};
use cube_core::synth::{
    check_ramp, Adsr, AudioGraph, FilterKind, GraphError, NodeId, NodeSpec, NoiseColor, Param,
    Partials, PinkFilter, Port, Ramp, RampShape,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::f32::consts::{PI, TAU};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const MASTER_GAIN: f32 = 0.6;
const NOISE_COLOR_FADE_SEC: f64 = 0.05;
const NOISE_SEED: u64 = 0x5EED_0001;

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];
const ALLPASS_FEEDBACK: f32 = 0.5;
const COMB_DAMP: f32 = 0.3;
const REVERB_WET: f32 = 0.25;

/// A parameter value that can glide to a target over a number of samples.
#[derive(Clone, Copy, Debug)]
struct Automation {
    current: f32,
    from: f32,
    target: f32,
    shape: RampShape,
    elapsed: u32,
    len: u32,
}

impl Automation {
    fn new(value: f32) -> Self {
        Self {
            current: value,
            from: value,
            target: value,
            shape: RampShape::Linear,
            elapsed: 0,
            len: 0,
        }
    }

    fn ramp_to(&mut self, target: f32, ramp: Ramp, sample_rate: f32) {
        self.from = self.current;
        self.target = target;
        self.shape = ramp.shape;
        self.elapsed = 0;
        self.len = (ramp.seconds.max(0.0) * sample_rate as f64).round() as u32;
        if self.len == 0 {
            self.current = target;
        }
    }

    #[inline]
    fn next(&mut self) -> f32 {
        if self.elapsed < self.len {
            self.elapsed += 1;
            let t = self.elapsed as f32 / self.len as f32;
            self.current = match self.shape {
                RampShape::Exponential if self.from > 0.0 => {
                    self.from * (self.target / self.from).powf(t)
                }
                _ => self.from + (self.target - self.from) * t,
            };
        }
        self.current
    }
}

/// Zavalishin/Simper state-variable filter. One core serves lowpass,
/// bandpass (unity peak) and high shelf.
#[derive(Clone, Copy, Debug, Default)]
struct Svf {
    ic1eq: f32,
    ic2eq: f32,
}

impl Svf {
    #[inline]
    fn process(&mut self, kind: FilterKind, x: f32, cutoff: f32, q: f32, gain_db: f32, sr: f32) -> f32 {
        let cutoff = cutoff.clamp(10.0, sr * 0.49);
        let k = 1.0 / q.max(0.05);
        let a = 10f32.powf(gain_db / 40.0);
        let mut g = (PI * cutoff / sr).tan();
        if kind == FilterKind::HighShelf {
            g *= a.sqrt();
        }
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = x - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        match kind {
            FilterKind::Lowpass => v2,
            FilterKind::Bandpass => k * v1,
            FilterKind::HighShelf => a * a * x + k * (1.0 - a) * a * v1 + (1.0 - a * a) * v2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear ADSR contour.
#[derive(Clone, Copy, Debug)]
struct Envelope {
    adsr: Adsr,
    stage: Stage,
    level: f32,
    step: f32,
}

impl Envelope {
    fn new(adsr: Adsr) -> Self {
        Self {
            adsr,
            stage: Stage::Idle,
            level: 0.0,
            step: 0.0,
        }
    }

    fn samples(seconds: f32, sr: f32) -> f32 {
        (seconds * sr).max(1.0)
    }

    fn attack(&mut self, sr: f32) {
        self.stage = Stage::Attack;
        self.step = (1.0 - self.level) / Self::samples(self.adsr.attack, sr);
    }

    fn release(&mut self, sr: f32) {
        self.stage = Stage::Release;
        self.step = self.level / Self::samples(self.adsr.release, sr);
    }

    #[inline]
    fn next(&mut self, sr: f32) -> f32 {
        match self.stage {
            Stage::Idle | Stage::Sustain => {}
            Stage::Attack => {
                self.level += self.step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                    self.step = (1.0 - self.adsr.sustain) / Self::samples(self.adsr.decay, sr);
                }
            }
            Stage::Decay => {
                self.level -= self.step;
                if self.level <= self.adsr.sustain {
                    self.level = self.adsr.sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Release => {
                self.level -= self.step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }
        self.level
    }
}

enum Kind {
    Osc {
        phase: f32,
        frequency: Automation,
        detune: Automation,
        partials: Partials,
        norm: f32,
    },
    Gain(Automation),
    Filter {
        kind: FilterKind,
        svf: Svf,
        frequency: Automation,
        q: Automation,
        gain_db: Automation,
    },
    Noise {
        pink: PinkFilter,
        /// 0 is white, 1 is pink.
        mix: Automation,
        gain: Automation,
    },
    Envelope(Envelope),
}

struct Node {
    kind: Kind,
    started: bool,
    outputs: SmallVec<[Port; 4]>,
    input: f32,
    /// Summed modulation per parameter: frequency, detune, gain, q.
    mods: [f32; 4],
}

#[inline]
fn mod_slot(param: Param) -> usize {
    match param {
        Param::Frequency => 0,
        Param::Detune => 1,
        Param::Gain => 2,
        Param::Q => 3,
    }
}

impl Node {
    fn automation(&mut self, param: Param) -> Option<&mut Automation> {
        match (&mut self.kind, param) {
            (Kind::Osc { frequency, .. }, Param::Frequency) => Some(frequency),
            (Kind::Osc { detune, .. }, Param::Detune) => Some(detune),
            (Kind::Gain(g), Param::Gain) => Some(g),
            (Kind::Filter { frequency, .. }, Param::Frequency) => Some(frequency),
            (Kind::Filter { q, .. }, Param::Q) => Some(q),
            (Kind::Filter { gain_db, .. }, Param::Gain) => Some(gain_db),
            (Kind::Noise { gain, .. }, Param::Gain) => Some(gain),
            _ => None,
        }
    }

    fn accepts_input(&self) -> bool {
        !matches!(self.kind, Kind::Osc { .. } | Kind::Noise { .. })
    }

    #[inline]
    fn render(&mut self, sr: f32, rng: &mut StdRng) -> f32 {
        let x = self.input;
        let [m_freq, m_detune, m_gain, m_q] = self.mods;
        self.input = 0.0;
        self.mods = [0.0; 4];
        match &mut self.kind {
            Kind::Osc {
                phase,
                frequency,
                detune,
                partials,
                norm,
            } => {
                let cents = detune.next() + m_detune;
                let hz = (frequency.next() + m_freq) * 2f32.powf(cents / 1200.0);
                if !self.started {
                    return 0.0;
                }
                let out = partials
                    .iter()
                    .enumerate()
                    .map(|(k, a)| a * (TAU * (k + 1) as f32 * *phase).sin())
                    .sum::<f32>()
                    * *norm;
                *phase = (*phase + hz / sr).rem_euclid(1.0);
                out
            }
            Kind::Gain(g) => x * (g.next() + m_gain),
            Kind::Filter {
                kind,
                svf,
                frequency,
                q,
                gain_db,
            } => svf.process(
                *kind,
                x,
                frequency.next() + m_freq,
                q.next() + m_q,
                gain_db.next() + m_gain,
                sr,
            ),
            Kind::Noise { pink, mix, gain } => {
                let white = rng.gen_range(-1.0_f32..=1.0);
                let p = pink.process(white);
                let m = mix.next();
                let g = gain.next() + m_gain;
                if !self.started {
                    return 0.0;
                }
                (white * (1.0 - m) + p * m) * g
            }
            Kind::Envelope(env) => x * env.next(sr),
        }
    }
}

struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    filter_state: f32,
}

impl Comb {
    fn new(len: usize, feedback: f32) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
            feedback,
            filter_state: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.pos];
        self.filter_state = output * (1.0 - COMB_DAMP) + self.filter_state * COMB_DAMP;
        self.buffer[self.pos] = input + self.filter_state * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }
}

struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        let output = -ALLPASS_FEEDBACK * input + delayed;
        self.buffer[self.pos] = input + ALLPASS_FEEDBACK * output;
        self.pos = (self.pos + 1) % self.buffer.len();
        output
    }
}

/// Pre-delay into four parallel combs and two series allpasses.
struct Reverb {
    pre_delay: Vec<f32>,
    pre_pos: usize,
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl Reverb {
    fn new(sample_rate: f32) -> Self {
        let samples = |ms: f32| (ms * sample_rate / 1000.0) as usize;
        // Comb gain for a -60 dB decay over REVERB_DECAY_SEC.
        let feedback = |ms: f32| 10f32.powf(-3.0 * ms / 1000.0 / REVERB_DECAY_SEC).min(0.98);
        Self {
            pre_delay: vec![0.0; ((REVERB_PRE_DELAY_SEC * sample_rate) as usize).max(1)],
            pre_pos: 0,
            combs: COMB_DELAYS_MS
                .iter()
                .map(|&ms| Comb::new(samples(ms), feedback(ms)))
                .collect(),
            allpasses: ALLPASS_DELAYS_MS.iter().map(|&ms| Allpass::new(samples(ms))).collect(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.pre_delay[self.pre_pos];
        self.pre_delay[self.pre_pos] = input;
        self.pre_pos = (self.pre_pos + 1) % self.pre_delay.len();
        let wet = self.combs.iter_mut().map(|c| c.process(delayed)).sum::<f32>() * 0.25;
        self.allpasses.iter_mut().fold(wet, |acc, ap| ap.process(acc))
    }
}

pub struct DspGraph {
    sample_rate: f32,
    clock: u64,
    /// Id of `nodes[0]`. Freed slots at the front are dropped, ids are never reused.
    base: u32,
    nodes: Vec<Option<Node>>,
    reverb: Reverb,
    rng: StdRng,
}

impl DspGraph {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            clock: 0,
            base: 0,
            nodes: Vec::new(),
            reverb: Reverb::new(sample_rate),
            rng: StdRng::seed_from_u64(NOISE_SEED),
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<usize> {
        id.0.checked_sub(self.base).map(|i| i as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        let slot = self.slot(id).ok_or(GraphError::UnknownNode(id))?;
        self.nodes
            .get_mut(slot)
            .and_then(Option::as_mut)
            .ok_or(GraphError::UnknownNode(id))
    }

    fn envelope_mut(&mut self, id: NodeId) -> Result<&mut Envelope, GraphError> {
        match &mut self.node_mut(id)?.kind {
            Kind::Envelope(env) => Ok(env),
            _ => Err(GraphError::UnsupportedParam {
                node: id,
                param: Param::Gain,
            }),
        }
    }

    /// Render one mono sample and advance the clock.
    pub fn next_sample(&mut self) -> f32 {
        let sr = self.sample_rate;
        let (mut dry, mut send) = (0.0_f32, 0.0_f32);
        for i in 0..self.nodes.len() {
            let Some(node) = self.nodes[i].as_mut() else {
                continue;
            };
            let out = node.render(sr, &mut self.rng);
            let outputs = node.outputs.clone();
            for port in outputs {
                match port {
                    Port::Master => dry += out,
                    Port::Reverb => send += out,
                    Port::Node(dst) => {
                        if let Ok(n) = self.node_mut(dst) {
                            n.input += out;
                        }
                    }
                    Port::Param(dst, param) => {
                        if let Ok(n) = self.node_mut(dst) {
                            n.mods[mod_slot(param)] += out;
                        }
                    }
                }
            }
        }
        self.clock += 1;
        (dry + self.reverb.process(send) * REVERB_WET) * MASTER_GAIN
    }

    /// Move the clock without rendering, for runs with no output device.
    pub fn advance_clock(&mut self, seconds: f64) {
        self.clock += (seconds.max(0.0) * self.sample_rate as f64) as u64;
    }

    /// Fill interleaved frames, the same sample on every channel.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let s = self.next_sample().clamp(-1.0, 1.0);
            frame.fill(s);
        }
    }
}

impl AudioGraph for DspGraph {
    fn now(&self) -> f64 {
        self.clock as f64 / self.sample_rate as f64
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        let kind = match spec {
            NodeSpec::Oscillator { frequency, partials } => {
                let total: f32 = partials.iter().map(|a| a.abs()).sum();
                Kind::Osc {
                    phase: 0.0,
                    frequency: Automation::new(frequency),
                    detune: Automation::new(0.0),
                    norm: if total > 0.0 { 1.0 / total } else { 0.0 },
                    partials,
                }
            }
            NodeSpec::Gain { gain } => Kind::Gain(Automation::new(gain)),
            NodeSpec::Filter {
                kind,
                frequency,
                q,
                gain_db,
            } => Kind::Filter {
                kind,
                svf: Svf::default(),
                frequency: Automation::new(frequency),
                q: Automation::new(q),
                gain_db: Automation::new(gain_db),
            },
            NodeSpec::Noise { color } => Kind::Noise {
                pink: PinkFilter::new(),
                mix: Automation::new(if color == NoiseColor::Pink { 1.0 } else { 0.0 }),
                gain: Automation::new(1.0),
            },
            NodeSpec::Envelope(adsr) => Kind::Envelope(Envelope::new(adsr)),
        };
        let id = NodeId(self.base + self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            kind,
            started: false,
            outputs: SmallVec::new(),
            input: 0.0,
            mods: [0.0; 4],
        }));
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: Port) -> Result<(), GraphError> {
        match to {
            Port::Node(dst) | Port::Param(dst, _) => {
                if dst.0 <= from.0 {
                    return Err(GraphError::InvalidConnection { from, to });
                }
                let target = self.node_mut(dst)?;
                match to {
                    Port::Param(_, param) if target.automation(param).is_none() => {
                        return Err(GraphError::UnsupportedParam { node: dst, param });
                    }
                    Port::Node(_) if !target.accepts_input() => {
                        return Err(GraphError::InvalidConnection { from, to });
                    }
                    _ => {}
                }
            }
            Port::Master | Port::Reverb => {}
        }
        self.node_mut(from)?.outputs.push(to);
        Ok(())
    }

    fn ramp(&mut self, node: NodeId, param: Param, target: f32, ramp: Ramp) -> Result<(), GraphError> {
        check_ramp(target, ramp)?;
        let sr = self.sample_rate;
        self.node_mut(node)?
            .automation(param)
            .ok_or(GraphError::UnsupportedParam { node, param })?
            .ramp_to(target, ramp, sr);
        Ok(())
    }

    fn set_noise_color(&mut self, node: NodeId, color: NoiseColor) -> Result<(), GraphError> {
        let sr = self.sample_rate;
        match &mut self.node_mut(node)?.kind {
            Kind::Noise { mix, .. } => {
                let target = if color == NoiseColor::Pink { 1.0 } else { 0.0 };
                if mix.target != target {
                    mix.ramp_to(target, Ramp::linear(NOISE_COLOR_FADE_SEC), sr);
                }
                Ok(())
            }
            _ => Err(GraphError::UnsupportedParam {
                node,
                param: Param::Gain,
            }),
        }
    }

    fn set_envelope(&mut self, node: NodeId, adsr: Adsr) -> Result<(), GraphError> {
        self.envelope_mut(node)?.adsr = adsr;
        Ok(())
    }

    fn trigger_attack(&mut self, node: NodeId) -> Result<(), GraphError> {
        let sr = self.sample_rate;
        self.envelope_mut(node)?.attack(sr);
        Ok(())
    }

    fn trigger_release(&mut self, node: NodeId) -> Result<(), GraphError> {
        let sr = self.sample_rate;
        self.envelope_mut(node)?.release(sr);
        Ok(())
    }

    fn start(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.node_mut(node)?.started = true;
        Ok(())
    }

    fn dispose(&mut self, node: NodeId) -> Result<(), GraphError> {
        let slot = self.slot(node).ok_or(GraphError::UnknownNode(node))?;
        if self.nodes.get_mut(slot).and_then(Option::take).is_none() {
            return Err(GraphError::UnknownNode(node));
        }
        for n in self.nodes.iter_mut().flatten() {
            n.outputs
                .retain(|p| !matches!(p, Port::Node(d) | Port::Param(d, _) if *d == node));
        }
        let lead = self.nodes.iter().take_while(|n| n.is_none()).count();
        self.nodes.drain(..lead);
        self.base += lead as u32;
        Ok(())
    }
}

/// The graph shared between the event loop and the audio callback.
#[derive(Clone)]
pub struct SharedDsp(Arc<Mutex<DspGraph>>);

impl SharedDsp {
    pub fn new(graph: DspGraph) -> Self {
        Self(Arc::new(Mutex::new(graph)))
    }

    /// A panic on the other side leaves the graph usable; keep going.
    pub fn lock(&self) -> MutexGuard<'_, DspGraph> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioGraph for SharedDsp {
    fn now(&self) -> f64 {
        self.lock().now()
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        self.lock().create(spec)
    }

    fn connect(&mut self, from: NodeId, to: Port) -> Result<(), GraphError> {
        self.lock().connect(from, to)
    }

    fn ramp(&mut self, node: NodeId, param: Param, target: f32, ramp: Ramp) -> Result<(), GraphError> {
        self.lock().ramp(node, param, target, ramp)
    }

    fn set_noise_color(&mut self, node: NodeId, color: NoiseColor) -> Result<(), GraphError> {
        self.lock().set_noise_color(node, color)
    }

    fn set_envelope(&mut self, node: NodeId, adsr: Adsr) -> Result<(), GraphError> {
        self.lock().set_envelope(node, adsr)
    }

    fn trigger_attack(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.lock().trigger_attack(node)
    }

    fn trigger_release(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.lock().trigger_release(node)
    }

    fn start(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.lock().start(node)
    }

    fn dispose(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.lock().dispose(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::synth::VoiceBank;
    use cube_core::TimbreParams;

    const SR: f32 = 8000.0;

    fn run(g: &mut DspGraph, seconds: f32) -> Vec<f32> {
        (0..(seconds * SR) as usize).map(|_| g.next_sample()).collect()
    }

    fn peak(v: &[f32]) -> f32 {
        v.iter().fold(0.0, |m, s| m.max(s.abs()))
    }

    #[test]
    fn clock_follows_rendered_samples() {
        let mut g = DspGraph::new(SR);
        run(&mut g, 0.5);
        assert!((g.now() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ramps_land_on_target() {
        let mut g = DspGraph::new(SR);
        let gain = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        g.ramp(gain, Param::Gain, 0.25, Ramp::exponential(0.1)).unwrap();
        run(&mut g, 0.2);
        let a = g.node_mut(gain).unwrap().automation(Param::Gain).unwrap().current;
        assert!((a - 0.25).abs() < 1e-5);
        assert_eq!(
            g.ramp(gain, Param::Gain, 0.0, Ramp::exponential(0.1)),
            Err(GraphError::NonPositiveRamp(0.0))
        );
        assert!(matches!(
            g.ramp(gain, Param::Q, 1.0, Ramp::linear(0.1)),
            Err(GraphError::UnsupportedParam { .. })
        ));
    }

    #[test]
    fn connections_only_run_forward() {
        let mut g = DspGraph::new(SR);
        let a = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        let b = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        assert!(g.connect(a, Port::Node(b)).is_ok());
        assert!(matches!(
            g.connect(b, Port::Node(a)),
            Err(GraphError::InvalidConnection { .. })
        ));
        let osc = g.create(NodeSpec::sine(100.0)).unwrap();
        assert!(matches!(
            g.connect(a, Port::Node(osc)),
            Err(GraphError::InvalidConnection { .. })
        ));
    }

    #[test]
    fn envelope_gates_an_oscillator() {
        let mut g = DspGraph::new(SR);
        let osc = g.create(NodeSpec::sine(220.0)).unwrap();
        let env = g
            .create(NodeSpec::Envelope(Adsr {
                attack: 0.01,
                decay: 0.01,
                sustain: 0.5,
                release: 0.05,
            }))
            .unwrap();
        g.connect(osc, Port::Node(env)).unwrap();
        g.connect(env, Port::Master).unwrap();
        g.start(osc).unwrap();

        assert_eq!(peak(&run(&mut g, 0.05)), 0.0);
        g.trigger_attack(env).unwrap();
        run(&mut g, 0.05);
        let held = peak(&run(&mut g, 0.2));
        assert!((held - 0.5 * MASTER_GAIN).abs() < 0.05, "held {held}");
        g.trigger_release(env).unwrap();
        run(&mut g, 0.1);
        assert!(peak(&run(&mut g, 0.05)) < 1e-6);
    }

    #[test]
    fn dispose_frees_and_forgets() {
        let mut g = DspGraph::new(SR);
        let a = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        let b = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        g.connect(a, Port::Node(b)).unwrap();
        g.dispose(a).unwrap();
        assert_eq!(g.dispose(a), Err(GraphError::UnknownNode(a)));
        assert_eq!(g.live_nodes(), 1);
        // Fresh ids keep counting up after the front is compacted.
        let c = g.create(NodeSpec::Gain { gain: 1.0 }).unwrap();
        assert!(c.0 > b.0);
        g.dispose(b).unwrap();
        assert!(g.ramp(c, Param::Gain, 0.5, Ramp::linear(0.0)).is_ok());
    }

    #[test]
    fn a_full_voice_sounds_and_tears_down() {
        let shared = SharedDsp::new(DspGraph::new(SR));
        let mut bank = VoiceBank::new(shared.clone());
        let id = bank.create(&TimbreParams::CENTER).unwrap();
        bank.attack(id);
        let out: Vec<f32> = {
            let mut g = shared.lock();
            run(&mut g, 0.5)
        };
        assert!(peak(&out) > 0.01);
        assert!(out.iter().all(|s| s.is_finite()));

        bank.release(id);
        {
            let mut g = shared.lock();
            run(&mut g, 3.0);
        }
        assert_eq!(bank.tick(), 1);
        assert_eq!(shared.lock().live_nodes(), 0);
    }
}
