//! Voice topology and lifecycle.
//!
//! A voice is a fixed clarinet-like patch: four additive oscillators (the
//! main odd-harmonic stack, two slightly detuned doubles and an inharmonic
//! set) plus band-passed breath noise, summed into a lowpass, a high shelf
//! and an amplitude envelope. A sine LFO modulates the oscillators' detune
//! for vibrato. The output feeds the master bus directly and the reverb bus
//! through a send.
//!
//! Release is two-phase: the envelope release starts at once, the nodes are
//! freed by [`VoiceBank::tick`] once the release tail has elapsed on the
//! graph clock. A releasing voice ignores further updates.

use super::graph::{
    Adsr, AudioGraph, FilterKind, GraphError, NodeId, NodeSpec, Param, Partials, Port, Ramp,
};
use super::mapping::{targets, VoiceTargets, BASE_FREQUENCY};
use crate::constants::{
    FILTER_RAMP_SEC, GAIN_RAMP_SEC, MOD_RAMP_SEC, RELEASE_TAIL_PAD_SEC, SEND_RAMP_SEC,
    VOICE_OUTPUT_GAIN,
};
use crate::normalize::TimbreParams;
use fnv::FnvHashMap;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u32);

const HARMONIC_PARTIALS: [f32; 9] = [1.0, 0.0, 0.5, 0.0, 0.25, 0.0, 0.12, 0.0, 0.06];
const SECOND_PARTIALS: [f32; 7] = [0.8, 0.0, 0.4, 0.0, 0.2, 0.0, 0.1];
const THIRD_PARTIALS: [f32; 5] = [0.6, 0.0, 0.3, 0.0, 0.15];
const INHARMONIC_PARTIALS: [f32; 5] = [0.4, 0.0, 0.2, 0.0, 0.1];

// Chorus doubles, roughly three cents either side.
const SECOND_DETUNE: f32 = 1.002;
const THIRD_DETUNE: f32 = 0.998;
const SECOND_LEVEL: f32 = 0.2;
const THIRD_LEVEL: f32 = 0.15;

/// Node handles of one voice. Field order is creation order, which is also
/// the order signal flows through the patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceNodes {
    pub lfo: NodeId,
    pub vibrato_depth: NodeId,
    pub harmonic_osc: NodeId,
    pub second_osc: NodeId,
    pub third_osc: NodeId,
    pub inharmonic_osc: NodeId,
    pub noise: NodeId,
    pub harmonic_gain: NodeId,
    pub second_gain: NodeId,
    pub third_gain: NodeId,
    pub inharmonic_gain: NodeId,
    pub noise_filter: NodeId,
    pub noise_gain: NodeId,
    pub lowpass: NodeId,
    pub shelf: NodeId,
    pub envelope: NodeId,
    pub output: NodeId,
    pub send: NodeId,
}

impl VoiceNodes {
    pub fn all(&self) -> [NodeId; 18] {
        [
            self.lfo,
            self.vibrato_depth,
            self.harmonic_osc,
            self.second_osc,
            self.third_osc,
            self.inharmonic_osc,
            self.noise,
            self.harmonic_gain,
            self.second_gain,
            self.third_gain,
            self.inharmonic_gain,
            self.noise_filter,
            self.noise_gain,
            self.lowpass,
            self.shelf,
            self.envelope,
            self.output,
            self.send,
        ]
    }

    fn oscillators(&self) -> [NodeId; 4] {
        [
            self.harmonic_osc,
            self.second_osc,
            self.third_osc,
            self.inharmonic_osc,
        ]
    }
}

#[derive(Debug)]
struct Voice {
    nodes: VoiceNodes,
    envelope: Adsr,
    disposing: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingTeardown {
    due: f64,
    voice: VoiceId,
}

pub struct VoiceBank<G: AudioGraph> {
    graph: G,
    voices: FnvHashMap<VoiceId, Voice>,
    pending: Vec<PendingTeardown>,
    next_id: u32,
    release_pad: f64,
}

fn osc(frequency: f32, partials: &[f32]) -> NodeSpec {
    NodeSpec::Oscillator {
        frequency,
        partials: Partials::from_slice(partials),
    }
}

impl<G: AudioGraph> VoiceBank<G> {
    pub fn new(graph: G) -> Self {
        Self::with_release_pad(graph, RELEASE_TAIL_PAD_SEC)
    }

    pub fn with_release_pad(graph: G, release_pad: f64) -> Self {
        Self {
            graph,
            voices: FnvHashMap::default(),
            pending: Vec::new(),
            next_id: 0,
            release_pad,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// Build and start a voice whose nodes begin at the values for `params`.
    /// The envelope stays closed until [`attack`](Self::attack).
    pub fn create(&mut self, params: &TimbreParams) -> Result<VoiceId, GraphError> {
        let t = targets(params);
        let mut created: SmallVec<[NodeId; 18]> = SmallVec::new();
        match self.build(&t, &mut created) {
            Ok(nodes) => {
                let id = VoiceId(self.next_id);
                self.next_id += 1;
                self.voices.insert(
                    id,
                    Voice {
                        nodes,
                        envelope: t.envelope,
                        disposing: false,
                    },
                );
                log::debug!("[voice] created {id:?}");
                Ok(id)
            }
            Err(e) => {
                for node in created {
                    if let Err(err) = self.graph.dispose(node) {
                        log::warn!("[voice] cleanup after failed build: {err}");
                    }
                }
                Err(e)
            }
        }
    }

    fn build(
        &mut self,
        t: &VoiceTargets,
        created: &mut SmallVec<[NodeId; 18]>,
    ) -> Result<VoiceNodes, GraphError> {
        let g = &mut self.graph;
        let mut make = |spec: NodeSpec| -> Result<NodeId, GraphError> {
            let id = g.create(spec)?;
            created.push(id);
            Ok(id)
        };

        let lfo = make(NodeSpec::sine(t.vibrato_rate_hz))?;
        let vibrato_depth = make(NodeSpec::Gain {
            gain: t.vibrato_depth_cents,
        })?;
        let harmonic_osc = make(osc(BASE_FREQUENCY, &HARMONIC_PARTIALS))?;
        let second_osc = make(osc(BASE_FREQUENCY * SECOND_DETUNE, &SECOND_PARTIALS))?;
        let third_osc = make(osc(BASE_FREQUENCY * THIRD_DETUNE, &THIRD_PARTIALS))?;
        let inharmonic_osc = make(osc(
            BASE_FREQUENCY * t.inharmonic_ratio,
            &INHARMONIC_PARTIALS,
        ))?;
        let noise = make(NodeSpec::Noise {
            color: t.noise_color,
        })?;
        let harmonic_gain = make(NodeSpec::Gain {
            gain: t.harmonic_gain,
        })?;
        let second_gain = make(NodeSpec::Gain { gain: SECOND_LEVEL })?;
        let third_gain = make(NodeSpec::Gain { gain: THIRD_LEVEL })?;
        let inharmonic_gain = make(NodeSpec::Gain {
            gain: t.inharmonic_gain,
        })?;
        let noise_filter = make(NodeSpec::Filter {
            kind: FilterKind::Bandpass,
            frequency: t.noise_center_hz,
            q: t.noise_q,
            gain_db: 0.0,
        })?;
        let noise_gain = make(NodeSpec::Gain {
            gain: t.noise_level,
        })?;
        let lowpass = make(NodeSpec::Filter {
            kind: FilterKind::Lowpass,
            frequency: t.cutoff_hz,
            q: t.cutoff_q,
            gain_db: 0.0,
        })?;
        let shelf = make(NodeSpec::Filter {
            kind: FilterKind::HighShelf,
            frequency: 2500.0,
            q: 0.707,
            gain_db: t.shelf_db,
        })?;
        let envelope = make(NodeSpec::Envelope(t.envelope))?;
        let output = make(NodeSpec::Gain {
            gain: VOICE_OUTPUT_GAIN,
        })?;
        let send = make(NodeSpec::Gain {
            gain: t.reverb_send,
        })?;

        let nodes = VoiceNodes {
            lfo,
            vibrato_depth,
            harmonic_osc,
            second_osc,
            third_osc,
            inharmonic_osc,
            noise,
            harmonic_gain,
            second_gain,
            third_gain,
            inharmonic_gain,
            noise_filter,
            noise_gain,
            lowpass,
            shelf,
            envelope,
            output,
            send,
        };

        g.connect(lfo, Port::Node(vibrato_depth))?;
        for o in nodes.oscillators() {
            g.connect(vibrato_depth, Port::Param(o, Param::Detune))?;
        }
        g.connect(harmonic_osc, Port::Node(harmonic_gain))?;
        g.connect(second_osc, Port::Node(second_gain))?;
        g.connect(third_osc, Port::Node(third_gain))?;
        g.connect(inharmonic_osc, Port::Node(inharmonic_gain))?;
        g.connect(noise, Port::Node(noise_filter))?;
        g.connect(noise_filter, Port::Node(noise_gain))?;
        for stage in [harmonic_gain, second_gain, third_gain, inharmonic_gain, noise_gain] {
            g.connect(stage, Port::Node(lowpass))?;
        }
        g.connect(lowpass, Port::Node(shelf))?;
        g.connect(shelf, Port::Node(envelope))?;
        g.connect(envelope, Port::Node(output))?;
        g.connect(output, Port::Master)?;
        g.connect(output, Port::Node(send))?;
        g.connect(send, Port::Reverb)?;

        for source in [lfo, harmonic_osc, second_osc, third_osc, inharmonic_osc, noise] {
            g.start(source)?;
        }
        Ok(nodes)
    }

    /// Retarget a live voice. Unknown or releasing voices are ignored.
    pub fn update(&mut self, id: VoiceId, params: &TimbreParams) {
        let Some(voice) = self.voices.get_mut(&id) else {
            log::trace!("[voice] update for unknown {id:?} dropped");
            return;
        };
        if voice.disposing {
            log::trace!("[voice] update for releasing {id:?} dropped");
            return;
        }
        let t = targets(params);
        voice.envelope = t.envelope;
        let n = voice.nodes;
        let g = &mut self.graph;

        let gain = Ramp::linear(GAIN_RAMP_SEC);
        let filter = Ramp::exponential(FILTER_RAMP_SEC);
        let filter_lin = Ramp::linear(FILTER_RAMP_SEC);
        let modulation = Ramp::linear(MOD_RAMP_SEC);
        let pitch = Ramp::exponential(MOD_RAMP_SEC);

        let results = [
            g.ramp(n.harmonic_gain, Param::Gain, t.harmonic_gain, gain),
            g.ramp(n.inharmonic_gain, Param::Gain, t.inharmonic_gain, gain),
            g.ramp(
                n.inharmonic_osc,
                Param::Frequency,
                BASE_FREQUENCY * t.inharmonic_ratio,
                pitch,
            ),
            g.ramp(n.vibrato_depth, Param::Gain, t.vibrato_depth_cents, modulation),
            g.ramp(n.lfo, Param::Frequency, t.vibrato_rate_hz, pitch),
            g.ramp(n.lowpass, Param::Frequency, t.cutoff_hz, filter),
            g.ramp(n.lowpass, Param::Q, t.cutoff_q, filter_lin),
            g.ramp(n.shelf, Param::Gain, t.shelf_db, filter_lin),
            g.ramp(n.noise_filter, Param::Frequency, t.noise_center_hz, filter),
            g.ramp(n.noise_filter, Param::Q, t.noise_q, filter_lin),
            g.ramp(n.noise_gain, Param::Gain, t.noise_level, gain),
            g.ramp(n.send, Param::Gain, t.reverb_send, Ramp::linear(SEND_RAMP_SEC)),
            g.set_noise_color(n.noise, t.noise_color),
            g.set_envelope(n.envelope, t.envelope),
        ];
        for err in results.into_iter().filter_map(Result::err) {
            log::warn!("[voice] retarget {id:?}: {err}");
        }
    }

    pub fn attack(&mut self, id: VoiceId) {
        let Some(voice) = self.voices.get(&id) else {
            return;
        };
        if voice.disposing {
            return;
        }
        if let Err(e) = self.graph.trigger_attack(voice.nodes.envelope) {
            log::warn!("[voice] attack {id:?}: {e}");
        }
    }

    /// Start the envelope release and schedule teardown once the tail has
    /// passed. Calling it again, or on an unknown voice, does nothing.
    pub fn release(&mut self, id: VoiceId) {
        let Some(voice) = self.voices.get_mut(&id) else {
            return;
        };
        if voice.disposing {
            return;
        }
        voice.disposing = true;
        if let Err(e) = self.graph.trigger_release(voice.nodes.envelope) {
            log::warn!("[voice] release {id:?}: {e}");
        }
        let due = self.graph.now() + voice.envelope.release as f64 + self.release_pad;
        log::debug!("[voice] releasing {id:?}, teardown at {due:.3}s");
        self.pending.push(PendingTeardown { due, voice: id });
    }

    /// Free every voice whose release tail has elapsed. Returns how many went.
    pub fn tick(&mut self) -> usize {
        let now = self.graph.now();
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;
        for p in &due {
            if let Some(voice) = self.voices.remove(&p.voice) {
                for node in voice.nodes.all() {
                    if let Err(e) = self.graph.dispose(node) {
                        log::warn!("[voice] dispose {:?}/{node:?}: {e}", p.voice);
                    }
                }
                log::debug!("[voice] freed {:?}", p.voice);
            }
        }
        due.len()
    }

    pub fn nodes(&self, id: VoiceId) -> Option<&VoiceNodes> {
        self.voices.get(&id).map(|v| &v.nodes)
    }

    pub fn is_live(&self, id: VoiceId) -> bool {
        self.voices.get(&id).is_some_and(|v| !v.disposing)
    }

    pub fn is_releasing(&self, id: VoiceId) -> bool {
        self.voices.get(&id).is_some_and(|v| v.disposing)
    }

    /// Voices that are sounding and accept updates.
    pub fn live_count(&self) -> usize {
        self.voices.values().filter(|v| !v.disposing).count()
    }

    /// Voices still holding graph nodes, releasing ones included.
    pub fn allocated_count(&self) -> usize {
        self.voices.len()
    }
}
