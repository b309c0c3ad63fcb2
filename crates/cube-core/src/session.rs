//! Per-source drag and rotation sessions plus the shared UI click cooldown.

use crate::input::SourceId;
use crate::markers::MarkerId;
use crate::scene::HandleId;
use fnv::FnvHashMap;
use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Session {
    RotatingHandle {
        handle: HandleId,
        last_anchor: Vec3,
    },
    DraggingMarker {
        marker: MarkerId,
        /// False once the most recent move resolved outside the volume.
        last_hit: bool,
    },
}

impl Session {
    #[inline]
    pub fn marker(&self) -> Option<MarkerId> {
        match self {
            Session::DraggingMarker { marker, .. } => Some(*marker),
            Session::RotatingHandle { .. } => None,
        }
    }
}

/// At most one live session per source. A source with no entry is idle.
#[derive(Default, Debug)]
pub struct SessionRegistry {
    sessions: FnvHashMap<SourceId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, source: SourceId) -> Option<&Session> {
        self.sessions.get(&source)
    }

    #[inline]
    pub fn get_mut(&mut self, source: SourceId) -> Option<&mut Session> {
        self.sessions.get_mut(&source)
    }

    #[inline]
    pub fn is_idle(&self, source: SourceId) -> bool {
        !self.sessions.contains_key(&source)
    }

    /// Start a session, replacing whatever the source had.
    pub fn begin(&mut self, source: SourceId, session: Session) {
        if let Some(prev) = self.sessions.insert(source, session) {
            log::debug!("[input] {source:?} replaced stale session {prev:?}");
        }
    }

    pub fn end(&mut self, source: SourceId) -> Option<Session> {
        self.sessions.remove(&source)
    }

    /// Drop every drag session that targets `marker`.
    pub fn forget_marker(&mut self, marker: MarkerId) {
        self.sessions.retain(|_, s| s.marker() != Some(marker));
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Rate limiter for panel buttons, shared by every source. The window starts
/// at the last accepted activation.
#[derive(Clone, Debug)]
pub struct ClickCooldown {
    window_ms: f64,
    last_accepted: Option<f64>,
}

impl ClickCooldown {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_accepted: None,
        }
    }

    /// Returns true and restarts the window if an activation at `now_ms` is allowed.
    pub fn try_accept(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_accepted {
            if now_ms - last < self.window_ms {
                return false;
            }
        }
        self.last_accepted = Some(now_ms);
        true
    }
}
