// JSON snapshot of the instrument state, saved when the snapshot button fires.

use cube_core::{Marker, Readout};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Descriptors {
    pub centroid: f32,
    pub noisiness: f32,
    pub inharm: f32,
}

impl Descriptors {
    fn from_readout(readout: &Readout) -> Option<Self> {
        readout
            .descriptors()
            .map(|[centroid, noisiness, inharm]| Self {
                centroid,
                noisiness,
                inharm,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSnapshot {
    pub id: u64,
    pub params: [f32; 3],
    pub visible: bool,
}

/// Rotation, active descriptors (`null` without a marker) and every marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub rotation: Rotation,
    pub descriptors: Option<Descriptors>,
    pub markers: Vec<MarkerSnapshot>,
}

impl Snapshot {
    pub fn capture<'a>(
        pitch: f32,
        yaw: f32,
        readout: &Readout,
        markers: impl IntoIterator<Item = &'a Marker>,
    ) -> Self {
        Self {
            rotation: Rotation { pitch, yaw },
            descriptors: Descriptors::from_readout(readout),
            markers: markers
                .into_iter()
                .map(|m| MarkerSnapshot {
                    id: m.id.0,
                    params: m.params.as_array(),
                    visible: m.visible,
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub fn snapshot_filename(now_ms: f64) -> String {
    format!("timbre-snapshot-{}.json", now_ms.max(0.0).round() as u64)
}
