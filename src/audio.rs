//! WebAudio backend for the voice graph.
//!
//! Every voice node maps onto one or a few native nodes; a shared master gain
//! and a pre-delayed convolution reverb sit at the end of the context.

use crate::constants::{
    IR_SEED, IR_TAIL_FACTOR, MASTER_GAIN, NOISE_BUFFER_SEC, NOISE_COLOR_FADE_SEC, NOISE_SEED_PINK,
    NOISE_SEED_WHITE, REVERB_WET,
};
use cube_core::constants::{REVERB_DECAY_SEC, REVERB_PRE_DELAY_SEC};
use cube_core::synth::{
    check_ramp, impulse_response, noise_buffer, Adsr, AudioGraph, FilterKind, GraphError,
    NodeId, NodeSpec, NoiseColor, Param, Partials, Port, Ramp, RampShape,
};
use fnv::FnvHashMap;
use wasm_bindgen::JsValue;
use web_sys as web;

#[inline]
fn js_err(e: JsValue) -> GraphError {
    GraphError::Backend(format!("{e:?}"))
}

fn create_gain(audio_ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode, GraphError> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {label} GainNode error: {e:?}");
            Err(js_err(e))
        }
    }
}

fn create_buffer(audio_ctx: &web::AudioContext, channels: &mut [Vec<f32>]) -> Result<web::AudioBuffer, GraphError> {
    let len = channels.first().map_or(0, Vec::len) as u32;
    let buf = audio_ctx
        .create_buffer(channels.len() as u32, len.max(1), audio_ctx.sample_rate())
        .map_err(js_err)?;
    for (ch, data) in channels.iter_mut().enumerate() {
        #[allow(deprecated)]
        buf.copy_to_channel(data, ch as i32).map_err(js_err)?;
    }
    Ok(buf)
}

/// Colour crossfade: both loops run, only the gains move.
struct NoiseNode {
    white: web::AudioBufferSourceNode,
    pink: web::AudioBufferSourceNode,
    white_gain: web::GainNode,
    pink_gain: web::GainNode,
    out: web::GainNode,
}

enum WebNode {
    Osc(web::OscillatorNode),
    Gain(web::GainNode),
    Filter(web::BiquadFilterNode),
    Noise(NoiseNode),
    Envelope { gain: web::GainNode, adsr: Adsr },
}

impl WebNode {
    fn output(&self) -> &web::AudioNode {
        match self {
            WebNode::Osc(n) => n.as_ref(),
            WebNode::Gain(n) => n.as_ref(),
            WebNode::Filter(n) => n.as_ref(),
            WebNode::Noise(n) => n.out.as_ref(),
            WebNode::Envelope { gain, .. } => gain.as_ref(),
        }
    }

    /// Sources have no audio input.
    fn input(&self) -> Option<&web::AudioNode> {
        match self {
            WebNode::Osc(_) | WebNode::Noise(_) => None,
            other => Some(other.output()),
        }
    }

    fn param(&self, param: Param) -> Option<web::AudioParam> {
        match (self, param) {
            (WebNode::Osc(n), Param::Frequency) => Some(n.frequency()),
            (WebNode::Osc(n), Param::Detune) => Some(n.detune()),
            (WebNode::Gain(n), Param::Gain) => Some(n.gain()),
            (WebNode::Filter(n), Param::Frequency) => Some(n.frequency()),
            (WebNode::Filter(n), Param::Q) => Some(n.q()),
            (WebNode::Filter(n), Param::Gain) => Some(n.gain()),
            (WebNode::Noise(n), Param::Gain) => Some(n.out.gain()),
            _ => None,
        }
    }
}

pub struct WebAudioGraph {
    ctx: web::AudioContext,
    master: web::GainNode,
    reverb_in: web::GainNode,
    white_buffer: web::AudioBuffer,
    pink_buffer: web::AudioBuffer,
    nodes: FnvHashMap<NodeId, WebNode>,
    next_id: u32,
}

impl WebAudioGraph {
    /// Build the output stage: master to destination, and the reverb send
    /// through a short pre-delay into the convolver, back into master.
    pub fn new(ctx: web::AudioContext) -> Result<Self, GraphError> {
        let master = create_gain(&ctx, MASTER_GAIN, "master")?;
        master
            .connect_with_audio_node(&ctx.destination())
            .map_err(js_err)?;

        let reverb_in = create_gain(&ctx, REVERB_WET, "reverb in")?;
        let pre_delay = ctx.create_delay_with_max_delay_time(1.0).map_err(js_err)?;
        pre_delay.delay_time().set_value(REVERB_PRE_DELAY_SEC);
        let convolver = web::ConvolverNode::new(&ctx).map_err(|e| {
            log::error!("[audio] ConvolverNode error: {e:?}");
            js_err(e)
        })?;
        convolver.set_normalize(true);
        let [l, r] = impulse_response(ctx.sample_rate(), REVERB_DECAY_SEC, IR_TAIL_FACTOR, IR_SEED);
        let ir = create_buffer(&ctx, &mut [l, r])?;
        convolver.set_buffer(Some(&ir));
        reverb_in.connect_with_audio_node(&pre_delay).map_err(js_err)?;
        pre_delay.connect_with_audio_node(&convolver).map_err(js_err)?;
        convolver.connect_with_audio_node(&master).map_err(js_err)?;

        let len = (ctx.sample_rate() * NOISE_BUFFER_SEC) as usize;
        let white_buffer = create_buffer(&ctx, &mut [noise_buffer(NoiseColor::White, len, NOISE_SEED_WHITE)])?;
        let pink_buffer = create_buffer(&ctx, &mut [noise_buffer(NoiseColor::Pink, len, NOISE_SEED_PINK)])?;

        log::info!(
            "[audio] output stage ready at {} Hz, reverb decay {REVERB_DECAY_SEC}s",
            ctx.sample_rate()
        );
        Ok(Self {
            ctx,
            master,
            reverb_in,
            white_buffer,
            pink_buffer,
            nodes: FnvHashMap::default(),
            next_id: 0,
        })
    }

    pub fn context(&self) -> &web::AudioContext {
        &self.ctx
    }

    fn node(&self, id: NodeId) -> Result<&WebNode, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    fn oscillator(&self, frequency: f32, partials: &Partials) -> Result<web::OscillatorNode, GraphError> {
        let osc = web::OscillatorNode::new(&self.ctx).map_err(js_err)?;
        osc.frequency().set_value(frequency);
        if partials.len() == 1 && partials[0] == 1.0 {
            osc.set_type(web::OscillatorType::Sine);
        } else {
            // Sine terms only; index 0 of the wave is DC.
            let mut real = vec![0.0_f32; partials.len() + 1];
            let mut imag = real.clone();
            imag[1..].copy_from_slice(partials);
            #[allow(deprecated)]
            let wave = self
                .ctx
                .create_periodic_wave(&mut real, &mut imag)
                .map_err(js_err)?;
            osc.set_periodic_wave(&wave);
        }
        Ok(osc)
    }

    fn noise(&self, color: NoiseColor) -> Result<NoiseNode, GraphError> {
        let source = |buffer: &web::AudioBuffer| -> Result<web::AudioBufferSourceNode, GraphError> {
            let src = self.ctx.create_buffer_source().map_err(js_err)?;
            src.set_buffer(Some(buffer));
            src.set_loop(true);
            Ok(src)
        };
        let (w, p) = match color {
            NoiseColor::White => (1.0, 0.0),
            NoiseColor::Pink => (0.0, 1.0),
        };
        let node = NoiseNode {
            white: source(&self.white_buffer)?,
            pink: source(&self.pink_buffer)?,
            white_gain: create_gain(&self.ctx, w, "noise white")?,
            pink_gain: create_gain(&self.ctx, p, "noise pink")?,
            out: create_gain(&self.ctx, 1.0, "noise out")?,
        };
        node.white.connect_with_audio_node(&node.white_gain).map_err(js_err)?;
        node.pink.connect_with_audio_node(&node.pink_gain).map_err(js_err)?;
        node.white_gain.connect_with_audio_node(&node.out).map_err(js_err)?;
        node.pink_gain.connect_with_audio_node(&node.out).map_err(js_err)?;
        Ok(node)
    }

    /// Hold the current value, then ramp from it.
    fn schedule(&self, param: &web::AudioParam, target: f32, ramp: Ramp) -> Result<(), GraphError> {
        let now = self.ctx.current_time();
        let end = now + ramp.seconds.max(0.0);
        param.cancel_scheduled_values(now).map_err(js_err)?;
        param.set_value_at_time(param.value(), now).map_err(js_err)?;
        match ramp.shape {
            RampShape::Linear => param.linear_ramp_to_value_at_time(target, end),
            RampShape::Exponential => param.exponential_ramp_to_value_at_time(target, end),
        }
        .map_err(js_err)?;
        Ok(())
    }
}

impl AudioGraph for WebAudioGraph {
    fn now(&self) -> f64 {
        self.ctx.current_time()
    }

    fn create(&mut self, spec: NodeSpec) -> Result<NodeId, GraphError> {
        let node = match spec {
            NodeSpec::Oscillator { frequency, partials } => WebNode::Osc(self.oscillator(frequency, &partials)?),
            NodeSpec::Gain { gain } => WebNode::Gain(create_gain(&self.ctx, gain, "voice")?),
            NodeSpec::Filter {
                kind,
                frequency,
                q,
                gain_db,
            } => {
                let f = web::BiquadFilterNode::new(&self.ctx).map_err(|e| {
                    log::error!("[audio] BiquadFilterNode error: {e:?}");
                    js_err(e)
                })?;
                f.set_type(match kind {
                    FilterKind::Lowpass => web::BiquadFilterType::Lowpass,
                    FilterKind::Bandpass => web::BiquadFilterType::Bandpass,
                    FilterKind::HighShelf => web::BiquadFilterType::Highshelf,
                });
                f.frequency().set_value(frequency);
                f.q().set_value(q);
                f.gain().set_value(gain_db);
                WebNode::Filter(f)
            }
            NodeSpec::Noise { color } => WebNode::Noise(self.noise(color)?),
            NodeSpec::Envelope(adsr) => WebNode::Envelope {
                gain: create_gain(&self.ctx, 0.0, "envelope")?,
                adsr,
            },
        };
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        Ok(id)
    }

    fn connect(&mut self, from: NodeId, to: Port) -> Result<(), GraphError> {
        let src = self.node(from)?.output();
        match to {
            Port::Master => src.connect_with_audio_node(&self.master).map(drop),
            Port::Reverb => src.connect_with_audio_node(&self.reverb_in).map(drop),
            Port::Node(dst) => {
                let input = self
                    .node(dst)?
                    .input()
                    .ok_or(GraphError::InvalidConnection { from, to })?;
                src.connect_with_audio_node(input).map(drop)
            }
            Port::Param(dst, param) => {
                let target = self
                    .node(dst)?
                    .param(param)
                    .ok_or(GraphError::UnsupportedParam { node: dst, param })?;
                src.connect_with_audio_param(&target)
            }
        }
        .map_err(js_err)
    }

    fn ramp(&mut self, node: NodeId, param: Param, target: f32, ramp: Ramp) -> Result<(), GraphError> {
        check_ramp(target, ramp)?;
        let p = self
            .node(node)?
            .param(param)
            .ok_or(GraphError::UnsupportedParam { node, param })?;
        self.schedule(&p, target, ramp)
    }

    fn set_noise_color(&mut self, node: NodeId, color: NoiseColor) -> Result<(), GraphError> {
        let WebNode::Noise(n) = self.node(node)? else {
            return Err(GraphError::UnsupportedParam {
                node,
                param: Param::Gain,
            });
        };
        let (w, p) = match color {
            NoiseColor::White => (1.0, 0.0),
            NoiseColor::Pink => (0.0, 1.0),
        };
        let fade = Ramp::linear(NOISE_COLOR_FADE_SEC);
        self.schedule(&n.white_gain.gain(), w, fade)?;
        self.schedule(&n.pink_gain.gain(), p, fade)
    }

    fn set_envelope(&mut self, node: NodeId, adsr: Adsr) -> Result<(), GraphError> {
        match self.nodes.get_mut(&node) {
            Some(WebNode::Envelope { adsr: slot, .. }) => {
                *slot = adsr;
                Ok(())
            }
            Some(_) => Err(GraphError::UnsupportedParam {
                node,
                param: Param::Gain,
            }),
            None => Err(GraphError::UnknownNode(node)),
        }
    }

    fn trigger_attack(&mut self, node: NodeId) -> Result<(), GraphError> {
        let WebNode::Envelope { gain, adsr } = self.node(node)? else {
            return Err(GraphError::UnsupportedParam {
                node,
                param: Param::Gain,
            });
        };
        let g = gain.gain();
        let now = self.ctx.current_time();
        let peak = now + adsr.attack.max(0.001) as f64;
        g.cancel_scheduled_values(now).map_err(js_err)?;
        g.set_value_at_time(g.value(), now).map_err(js_err)?;
        g.linear_ramp_to_value_at_time(1.0, peak).map_err(js_err)?;
        g.linear_ramp_to_value_at_time(adsr.sustain, peak + adsr.decay.max(0.001) as f64)
            .map_err(js_err)?;
        Ok(())
    }

    fn trigger_release(&mut self, node: NodeId) -> Result<(), GraphError> {
        let WebNode::Envelope { gain, adsr } = self.node(node)? else {
            return Err(GraphError::UnsupportedParam {
                node,
                param: Param::Gain,
            });
        };
        self.schedule(&gain.gain(), 0.0, Ramp::linear(adsr.release.max(0.001) as f64))
    }

    #[allow(deprecated)]
    fn start(&mut self, node: NodeId) -> Result<(), GraphError> {
        match self.node(node)? {
            WebNode::Osc(osc) => osc.start().map_err(js_err),
            WebNode::Noise(n) => {
                n.white.start().map_err(js_err)?;
                n.pink.start().map_err(js_err)
            }
            _ => Ok(()),
        }
    }

    #[allow(deprecated)]
    fn dispose(&mut self, node: NodeId) -> Result<(), GraphError> {
        let n = self.nodes.remove(&node).ok_or(GraphError::UnknownNode(node))?;
        // Stopping a source that never started throws; nothing to undo then.
        match &n {
            WebNode::Osc(osc) => {
                _ = osc.stop();
            }
            WebNode::Noise(noise) => {
                _ = noise.white.stop();
                _ = noise.pink.stop();
                _ = noise.white_gain.disconnect();
                _ = noise.pink_gain.disconnect();
            }
            _ => {}
        }
        n.output().disconnect().map_err(js_err)
    }
}
