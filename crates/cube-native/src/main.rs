mod dsp;

use std::time::{Duration, Instant};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cube_core::{
    ActivationError, AudioGate, Camera, Instrument, InstrumentConfig, KeyModifiers, PointerSample,
    Readout, SceneEvent, SourceId, UiAction,
};
use dsp::{DspGraph, SharedDsp};
use futures_util::future::{self, FutureExt, LocalBoxFuture};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

const FALLBACK_SAMPLE_RATE: f32 = 48_000.0;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type StartAudio = Box<dyn FnMut() -> LocalBoxFuture<'static, Result<(), ActivationError>>>;

struct App {
    window: Window,
    instrument: Instrument<SharedDsp>,
    camera: Camera,
    gate: AudioGate<StartAudio>,
    started_at: Instant,
    cursor: [f32; 2],
    size: [f32; 2],
    mods: KeyModifiers,
}

impl App {
    fn now_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }

    fn sample(&self) -> PointerSample {
        let [w, h] = self.size;
        self.camera.pointer_sample(self.cursor[0], self.cursor[1], w, h)
    }

    /// The stream is built paused; the first sound-producing gesture plays it.
    fn audio_ready(&mut self) -> bool {
        if self.gate.is_started() {
            return true;
        }
        match pollster::block_on(self.gate.ensure_started()) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[audio] {e}; running silent");
                false
            }
        }
    }

    fn resized(&mut self, width: u32, height: u32) {
        self.size = [width.max(1) as f32, height.max(1) as f32];
        self.camera.set_viewport(self.size[0], self.size[1]);
    }

    fn mouse_button(&mut self, state: ElementState) {
        let sample = self.sample();
        let now = self.now_ms();
        match state {
            ElementState::Pressed => {
                // Silent fallback still lets the geometry work.
                self.audio_ready();
                let outcome = self.instrument.pointer_down(SourceId::Mouse, &sample, now);
                log::debug!("[input] mouse press -> {outcome:?}");
            }
            ElementState::Released => self.instrument.pointer_up(SourceId::Mouse, &sample, now),
        }
    }

    fn key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }
        let name = match &event.logical_key {
            Key::Character(c) => c.to_string(),
            Key::Named(named) => match named {
                NamedKey::ArrowLeft => "ArrowLeft".into(),
                NamedKey::ArrowRight => "ArrowRight".into(),
                NamedKey::ArrowUp => "ArrowUp".into(),
                NamedKey::ArrowDown => "ArrowDown".into(),
                NamedKey::Space => {
                    self.audio_ready();
                    self.instrument.apply_action(UiAction::PlaceMarker);
                    return;
                }
                NamedKey::Backspace | NamedKey::Delete => {
                    self.instrument.apply_action(UiAction::Clear);
                    return;
                }
                NamedKey::Home => {
                    self.instrument.apply_action(UiAction::ResetRotation);
                    return;
                }
                NamedKey::F2 => {
                    self.instrument.apply_action(UiAction::Snapshot);
                    return;
                }
                _ => return,
            },
            _ => return,
        };
        if self.instrument.handle_key(&name, self.mods) {
            log::debug!("[input] key {name}");
        }
    }

    fn frame(&mut self, elapsed: Duration) {
        advance(&mut self.instrument, self.gate.is_started(), elapsed);
        for ev in self.instrument.drain_events() {
            match ev {
                SceneEvent::ReadoutChanged(readout) => self.show_readout(&readout),
                SceneEvent::SnapshotRequested => {
                    let (pitch, yaw) = self.instrument.volume().angles();
                    for m in self.instrument.markers().iter() {
                        log::info!(
                            "[ui] snapshot pitch={pitch:.3} yaw={yaw:.3} {:?} params=({:.3},{:.3},{:.3})",
                            m.id,
                            m.params.x,
                            m.params.y,
                            m.params.z
                        );
                    }
                }
                other => log::trace!("[marker] {other:?}"),
            }
        }
    }

    fn show_readout(&self, readout: &Readout) {
        let text = Readout::LABELS
            .iter()
            .zip(readout.descriptor_text())
            .map(|(label, value)| format!("{label} {value}"))
            .collect::<Vec<_>>()
            .join("  ");
        self.window.set_title(&format!("Timbre cube  |  {text}"));
    }
}

/// Per-frame upkeep that must run with or without input. While no stream is
/// pulling samples the graph clock is stepped here so release tails expire.
fn advance(instrument: &mut Instrument<SharedDsp>, audio_running: bool, elapsed: Duration) {
    if !audio_running {
        instrument
            .voices()
            .graph()
            .lock()
            .advance_clock(elapsed.as_secs_f64());
    }
    instrument.tick();
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    graph: SharedDsp,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            scratch.resize(data.len(), 0.0);
            graph.lock().render(&mut scratch, channels);
            for (dst, s) in data.iter_mut().zip(&scratch) {
                *dst = T::from_sample(*s);
            }
        },
        |err| log::error!("[audio] stream error: {err}"),
        None,
    )
}

/// Open the default output and build a stream feeding from a fresh graph.
fn open_audio() -> anyhow::Result<(cpal::Stream, SharedDsp)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let supported = device.default_output_config()?;
    let sample_rate = supported.sample_rate().0 as f32;
    log::info!(
        "[audio] {} @ {} Hz, {} ch, {:?}",
        device.name().unwrap_or_default(),
        sample_rate,
        supported.channels(),
        supported.sample_format()
    );
    let graph = SharedDsp::new(DspGraph::new(sample_rate));
    let config: cpal::StreamConfig = supported.config();
    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, graph.clone())?,
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, graph.clone())?,
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, graph.clone())?,
        other => anyhow::bail!("unsupported sample format {other:?}"),
    };
    // Some hosts start streams on creation; stay quiet until the first gesture.
    _ = stream.pause();
    Ok((stream, graph))
}

/// Gate start: play the stream, or report that there is nothing to play on.
fn audio_starter(stream: Option<cpal::Stream>) -> StartAudio {
    Box::new(move || {
        let result = match &stream {
            Some(s) => s.play().map_err(|e| ActivationError::Refused(e.to_string())),
            None => Err(ActivationError::NoDevice),
        };
        future::ready(result).boxed_local()
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let (stream, graph) = match open_audio() {
        Ok((stream, graph)) => (Some(stream), graph),
        Err(e) => {
            log::warn!("[audio] {e:#}; continuing without sound");
            (None, SharedDsp::new(DspGraph::new(FALLBACK_SAMPLE_RATE)))
        }
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Timbre cube")
        .with_inner_size(LogicalSize::new(1000.0, 800.0))
        .build(&event_loop)?;
    let size = window.inner_size();

    let mut app = App {
        window,
        instrument: Instrument::new(graph, InstrumentConfig::default()),
        camera: Camera::default(),
        gate: AudioGate::new(audio_starter(stream)),
        started_at: Instant::now(),
        cursor: [0.0, 0.0],
        size: [1.0, 1.0],
        mods: KeyModifiers::default(),
    };
    app.resized(size.width, size.height);
    app.show_readout(&Readout::NoMarker);
    let mut last_frame = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => app.resized(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                app.cursor = [position.x as f32, position.y as f32];
                let sample = app.sample();
                let now = app.now_ms();
                app.instrument.pointer_move(SourceId::Mouse, &sample, now);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => app.mouse_button(state),
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scroll-up as positive; the instrument wants DOM sign.
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y as f64,
                    MouseScrollDelta::PixelDelta(p) => -p.y,
                };
                app.instrument.scroll_depth(dy);
            }
            WindowEvent::ModifiersChanged(m) => {
                let state = m.state();
                app.mods = KeyModifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    meta: state.super_key(),
                };
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.logical_key == Key::Named(NamedKey::Escape) {
                    elwt.exit();
                } else {
                    app.key(&event);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let elapsed = now - last_frame;
            last_frame = now;
            app.frame(elapsed);
            // Keep ticking while idle so voice teardown is not tied to input.
            elwt.set_control_flow(ControlFlow::WaitUntil(now + FRAME_INTERVAL));
        }
        _ => {}
    })?;
    Ok(())
}
