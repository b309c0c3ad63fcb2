//! The instrument façade frontends drive.
//!
//! Owns the volume transform, scene layout, markers, voices and pointer
//! sessions. Frontends feed it pointer/keyboard events and a per-frame
//! [`tick`](Instrument::tick), and read back [`SceneEvent`]s to update
//! whatever they render.

use crate::config::{InstrumentConfig, MarkerMode};
use crate::controls::{command_for_key, wheel_depth_step, KeyCommand, KeyModifiers};
use crate::input::{PointerSample, SourceId};
use crate::markers::{MarkerId, MarkerSet};
use crate::normalize::{denormalize, TimbreParams};
use crate::resolve::{resolve_depth_scan, resolve_entry, DepthGate, LocalPoint};
use crate::scene::{HandleId, SceneLayout, UiAction};
use crate::session::{ClickCooldown, Session, SessionRegistry};
use crate::synth::{AudioGraph, VoiceBank};
use crate::volume::Volume;
use fnv::FnvHashMap;
use glam::Vec3;

/// Descriptor readout for the active marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Readout {
    Marker(TimbreParams),
    NoMarker,
}

impl Readout {
    /// Display order of [`descriptors`](Self::descriptors).
    pub const LABELS: [&'static str; 3] = ["centroid", "noisiness", "inharm"];

    /// Centroid, noisiness and inharmonicity of the active marker.
    pub fn descriptors(&self) -> Option<[f32; 3]> {
        match self {
            Readout::Marker(p) => Some([p.centroid(), p.noisiness(), p.inharmonicity()]),
            Readout::NoMarker => None,
        }
    }

    /// Two decimals per descriptor, or `--` without a marker.
    pub fn descriptor_text(&self) -> [String; 3] {
        match self.descriptors() {
            Some(values) => values.map(|v| format!("{v:.2}")),
            None => std::array::from_fn(|_| "--".to_string()),
        }
    }
}

/// Visual-state notifications for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    MarkerPlaced { id: MarkerId, position: Vec3 },
    MarkerMoved { id: MarkerId, position: Vec3 },
    MarkerVisibility { id: MarkerId, visible: bool },
    MarkerRemoved { id: MarkerId },
    /// Crosshair preview for an idle source; `None` clears it.
    Hover {
        source: SourceId,
        point: Option<LocalPoint>,
    },
    VolumeRotated { pitch: f32, yaw: f32 },
    ReadoutChanged(Readout),
    SnapshotRequested,
}

/// What a press turned into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PressOutcome {
    Ui(UiAction),
    /// A button was hit inside the cooldown window.
    UiCoolingDown,
    Rotating(HandleId),
    Dragging(MarkerId),
    Placed(MarkerId),
    Idle,
}

pub struct Instrument<G: AudioGraph> {
    config: InstrumentConfig,
    volume: Volume,
    layout: SceneLayout,
    markers: MarkerSet,
    voices: VoiceBank<G>,
    sessions: SessionRegistry,
    cooldown: ClickCooldown,
    hover: FnvHashMap<SourceId, Option<LocalPoint>>,
    events: Vec<SceneEvent>,
    readout: Readout,
}

impl<G: AudioGraph> Instrument<G> {
    pub fn new(graph: G, config: InstrumentConfig) -> Self {
        let half = config.half_size();
        Self {
            volume: Volume::new(half),
            layout: SceneLayout::with_handles(half),
            markers: MarkerSet::new(config.marker_mode, half),
            voices: VoiceBank::with_release_pad(graph, config.release_tail_pad_sec),
            sessions: SessionRegistry::new(),
            cooldown: ClickCooldown::new(config.ui_cooldown_ms),
            hover: FnvHashMap::default(),
            events: Vec::new(),
            readout: Readout::NoMarker,
            config,
        }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn volume_mut(&mut self) -> &mut Volume {
        &mut self.volume
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: SceneLayout) {
        self.layout = layout;
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn voices(&self) -> &VoiceBank<G> {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut VoiceBank<G> {
        &mut self.voices
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Resolve a pointer for hover or placement with its kind's strategy.
    pub fn resolve_pointer(&self, source: SourceId, sample: &PointerSample) -> Option<LocalPoint> {
        self.resolve(source, sample, DepthGate::Bounds {
            margin: self.config.pick_margin,
        })
    }

    fn resolve(&self, source: SourceId, sample: &PointerSample, gate: DepthGate) -> Option<LocalPoint> {
        match (source.kind().uses_depth_scan(), sample.view) {
            (true, Some(view)) => resolve_depth_scan(&sample.ray, &view, &self.volume, gate),
            _ => resolve_entry(
                &sample.ray,
                &self.volume,
                &self.layout.blockers(),
                self.config.blocker_epsilon,
            ),
        }
    }

    pub fn pointer_down(&mut self, source: SourceId, sample: &PointerSample, now_ms: f64) -> PressOutcome {
        if let Some(action) = self.layout.pick_button(&sample.ray) {
            if !self.cooldown.try_accept(now_ms) {
                log::debug!("[input] {source:?} {action:?} ignored, cooling down");
                return PressOutcome::UiCoolingDown;
            }
            self.apply_action(action);
            return PressOutcome::Ui(action);
        }

        if let Some(handle) =
            self.layout
                .pick_handle(&sample.ray, &self.volume, self.config.handle_pick_radius)
        {
            self.sessions.begin(
                source,
                Session::RotatingHandle {
                    handle,
                    last_anchor: sample.anchor,
                },
            );
            self.set_hover(source, None);
            return PressOutcome::Rotating(handle);
        }

        let local_ray = self.volume.ray_to_local(&sample.ray);
        if let Some(marker) = self.markers.pick(&local_ray, self.config.marker_pick_edge) {
            self.begin_drag(source, marker);
            return PressOutcome::Dragging(marker);
        }

        if source.kind().places_on_empty() {
            if let Some(point) = self.resolve_pointer(source, sample) {
                let marker = self.place_marker(point);
                self.begin_drag(source, marker);
                return PressOutcome::Placed(marker);
            }
        }
        PressOutcome::Idle
    }

    fn begin_drag(&mut self, source: SourceId, marker: MarkerId) {
        self.sessions.begin(
            source,
            Session::DraggingMarker {
                marker,
                last_hit: true,
            },
        );
        self.set_hover(source, None);
    }

    pub fn pointer_move(&mut self, source: SourceId, sample: &PointerSample, _now_ms: f64) {
        match self.sessions.get(source).copied() {
            Some(Session::RotatingHandle { handle, last_anchor }) => {
                let delta = sample.anchor - last_anchor;
                let (gain_yaw, gain_pitch) = source.kind().rotate_gain();
                self.volume.rotate_by(delta.x * gain_yaw, delta.y * gain_pitch);
                self.sessions.begin(
                    source,
                    Session::RotatingHandle {
                        handle,
                        last_anchor: sample.anchor,
                    },
                );
                let (pitch, yaw) = self.volume.angles();
                self.events.push(SceneEvent::VolumeRotated { pitch, yaw });
            }
            Some(Session::DraggingMarker { marker, .. }) => {
                if !self.markers.contains(marker) {
                    self.sessions.end(source);
                    return;
                }
                let hit = self.resolve(source, sample, DepthGate::Skip);
                match hit {
                    Some(point) => {
                        let was_visible = self.markers.get(marker).is_some_and(|m| m.visible);
                        self.move_marker(marker, point);
                        if !was_visible {
                            self.events.push(SceneEvent::MarkerVisibility {
                                id: marker,
                                visible: true,
                            });
                        }
                    }
                    None => {
                        if self.markers.get(marker).is_some_and(|m| m.visible) {
                            self.markers.set_visible(marker, false);
                            self.events.push(SceneEvent::MarkerVisibility {
                                id: marker,
                                visible: false,
                            });
                        }
                    }
                }
                if let Some(Session::DraggingMarker { last_hit, .. }) = self.sessions.get_mut(source) {
                    *last_hit = hit.is_some();
                }
            }
            None => {
                let point = self.resolve_pointer(source, sample);
                self.set_hover(source, point);
            }
        }
    }

    pub fn pointer_up(&mut self, source: SourceId, _sample: &PointerSample, _now_ms: f64) {
        match self.sessions.end(source) {
            Some(Session::DraggingMarker {
                marker,
                last_hit: false,
            }) => {
                log::debug!("[input] {source:?} released {marker:?} outside the volume");
                self.destroy_marker(marker);
            }
            Some(_) | None => {}
        }
    }

    fn set_hover(&mut self, source: SourceId, point: Option<LocalPoint>) {
        let prev = self.hover.insert(source, point).flatten();
        if prev != point {
            self.events.push(SceneEvent::Hover { source, point });
        }
    }

    fn move_marker(&mut self, id: MarkerId, point: LocalPoint) -> bool {
        if self.markers.reposition(id, point, &mut self.voices).is_none() {
            return false;
        }
        if let Some(m) = self.markers.get(id) {
            self.events.push(SceneEvent::MarkerMoved {
                id,
                position: m.position,
            });
        }
        self.refresh_readout();
        true
    }

    fn destroy_marker(&mut self, id: MarkerId) {
        if self.markers.destroy(id, &mut self.voices) {
            self.sessions.forget_marker(id);
            self.events.push(SceneEvent::MarkerRemoved { id });
            self.refresh_readout();
        }
    }

    /// Place a marker at a local point. In single mode the previous marker goes first.
    pub fn place_marker(&mut self, point: LocalPoint) -> MarkerId {
        if self.markers.mode() == MarkerMode::Single {
            for id in self.markers.clear_all(&mut self.voices) {
                self.sessions.forget_marker(id);
                self.events.push(SceneEvent::MarkerRemoved { id });
            }
        }
        let id = self.markers.place(point, &mut self.voices);
        if let Some(m) = self.markers.get(id) {
            self.events.push(SceneEvent::MarkerPlaced {
                id,
                position: m.position,
            });
        }
        self.refresh_readout();
        id
    }

    pub fn clear(&mut self) {
        for id in self.markers.clear_all(&mut self.voices) {
            self.sessions.forget_marker(id);
            self.events.push(SceneEvent::MarkerRemoved { id });
        }
        self.refresh_readout();
    }

    pub fn reset_rotation(&mut self) {
        self.volume.reset_rotation();
        let (pitch, yaw) = self.volume.angles();
        self.events.push(SceneEvent::VolumeRotated { pitch, yaw });
    }

    pub fn apply_action(&mut self, action: UiAction) {
        log::info!("[input] ui action {action:?}");
        match action {
            UiAction::PlaceMarker => {
                self.place_marker(Vec3::ZERO);
            }
            UiAction::Clear => self.clear(),
            UiAction::ResetRotation => self.reset_rotation(),
            UiAction::Snapshot => self.events.push(SceneEvent::SnapshotRequested),
        }
    }

    /// Offset the active marker by `delta`, in fractions of the cube edge.
    pub fn nudge(&mut self, delta: Vec3) -> Option<MarkerId> {
        let m = self.markers.latest()?;
        let (id, target) = (m.id, m.position + delta * self.volume.edge());
        self.move_marker(id, target).then_some(id)
    }

    /// Move the active marker to a parameter-space preset.
    pub fn jump_to_preset(&mut self, params: TimbreParams) -> Option<MarkerId> {
        let id = self.markers.latest()?.id;
        let point = denormalize(params, self.volume.half_size());
        self.move_marker(id, point).then_some(id)
    }

    /// One wheel notch along the depth axis.
    pub fn scroll_depth(&mut self, delta_y: f64) -> Option<MarkerId> {
        let step = wheel_depth_step(delta_y);
        if step == 0.0 {
            return None;
        }
        self.nudge(Vec3::Z * step)
    }

    /// Apply a keyboard binding. Returns true when the key did something.
    pub fn handle_key(&mut self, key: &str, mods: KeyModifiers) -> bool {
        let moved = match command_for_key(key, mods) {
            Some(KeyCommand::Nudge(delta)) => self.nudge(delta),
            Some(KeyCommand::Preset(params)) => self.jump_to_preset(params),
            None => return false,
        };
        moved.is_some()
    }

    /// Per-frame housekeeping: frees voices whose release tail has passed.
    pub fn tick(&mut self) {
        let freed = self.voices.tick();
        if freed > 0 {
            log::trace!("[voice] tick freed {freed}");
        }
    }

    fn refresh_readout(&mut self) {
        let next = self
            .markers
            .latest()
            .map_or(Readout::NoMarker, |m| Readout::Marker(m.params));
        if next != self.readout {
            self.readout = next;
            self.events.push(SceneEvent::ReadoutChanged(next));
        }
    }
}
