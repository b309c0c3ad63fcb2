//! Marker lifecycle. Each marker owns exactly one voice; dropping the marker
//! releases the voice.

use crate::config::MarkerMode;
use crate::geom::{ray_aabb, Ray};
use crate::normalize::{normalize, TimbreParams};
use crate::synth::{AudioGraph, VoiceBank, VoiceId};
use glam::Vec3;

/// Never reused within a `MarkerSet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    /// Local position, clamped to the cube.
    pub position: Vec3,
    pub params: TimbreParams,
    /// `None` only when the audio backend refused to build the voice.
    pub voice: Option<VoiceId>,
    pub visible: bool,
}

#[derive(Debug)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    next_id: u64,
    mode: MarkerMode,
    half: f32,
}

impl MarkerSet {
    pub fn new(mode: MarkerMode, half: f32) -> Self {
        Self {
            markers: Vec::new(),
            next_id: 0,
            mode,
            half,
        }
    }

    pub fn mode(&self) -> MarkerMode {
        self.mode
    }

    fn clamp(&self, p: Vec3) -> Vec3 {
        p.clamp(Vec3::splat(-self.half), Vec3::splat(self.half))
    }

    /// Create a marker and its voice at `point`. In single mode every other
    /// marker is destroyed first.
    pub fn place<G: AudioGraph>(&mut self, point: Vec3, voices: &mut VoiceBank<G>) -> MarkerId {
        if self.mode == MarkerMode::Single {
            self.clear_all(voices);
        }
        let position = self.clamp(point);
        let params = normalize(position, self.half);
        let voice = match voices.create(&params) {
            Ok(v) => {
                voices.attack(v);
                Some(v)
            }
            Err(e) => {
                log::warn!("[marker] voice unavailable: {e}");
                None
            }
        };
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push(Marker {
            id,
            position,
            params,
            voice,
            visible: true,
        });
        log::debug!("[marker] placed {id:?} at {position:?}");
        id
    }

    /// Move a marker: position, then params, then voice. Returns the new
    /// params, or `None` if the marker is gone.
    pub fn reposition<G: AudioGraph>(
        &mut self,
        id: MarkerId,
        point: Vec3,
        voices: &mut VoiceBank<G>,
    ) -> Option<TimbreParams> {
        let position = self.clamp(point);
        let half = self.half;
        let Some(marker) = self.markers.iter_mut().find(|m| m.id == id) else {
            log::trace!("[marker] reposition of stale {id:?} ignored");
            return None;
        };
        marker.position = position;
        marker.params = normalize(position, half);
        marker.visible = true;
        if let Some(v) = marker.voice {
            voices.update(v, &marker.params);
        }
        Some(marker.params)
    }

    pub fn set_visible(&mut self, id: MarkerId, visible: bool) -> bool {
        match self.markers.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Remove the marker, then release its voice. A second call is a no-op.
    pub fn destroy<G: AudioGraph>(&mut self, id: MarkerId, voices: &mut VoiceBank<G>) -> bool {
        let Some(idx) = self.markers.iter().position(|m| m.id == id) else {
            return false;
        };
        let marker = self.markers.remove(idx);
        if let Some(v) = marker.voice {
            voices.release(v);
        }
        log::debug!("[marker] destroyed {id:?}");
        true
    }

    /// Destroy every marker. Returns the ids removed.
    pub fn clear_all<G: AudioGraph>(&mut self, voices: &mut VoiceBank<G>) -> Vec<MarkerId> {
        let gone: Vec<Marker> = std::mem::take(&mut self.markers);
        for m in &gone {
            if let Some(v) = m.voice {
                voices.release(v);
            }
        }
        gone.into_iter().map(|m| m.id).collect()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Most recently placed marker still alive.
    pub fn latest(&self) -> Option<&Marker> {
        self.markers.last()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Nearest visible marker whose pick box (edge `pick_edge`) the local-frame ray crosses.
    pub fn pick(&self, local_ray: &Ray, pick_edge: f32) -> Option<MarkerId> {
        let h = Vec3::splat(pick_edge * 0.5);
        self.markers
            .iter()
            .filter(|m| m.visible)
            .filter_map(|m| {
                ray_aabb(local_ray.origin, local_ray.dir, m.position - h, m.position + h)
                    .map(|(t, _)| (t.max(0.0), m.id))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }
}
