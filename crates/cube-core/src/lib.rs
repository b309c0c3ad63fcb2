pub mod activation;
pub mod camera;
pub mod config;
pub mod constants;
pub mod controls;
pub mod geom;
pub mod input;
pub mod instrument;
pub mod markers;
pub mod normalize;
pub mod resolve;
pub mod scene;
pub mod session;
pub mod synth;
pub mod volume;

pub use activation::{ActivationError, AudioGate};
pub use camera::Camera;
pub use config::{InstrumentConfig, MarkerMode};
pub use controls::{KeyCommand, KeyModifiers};
pub use geom::{Quad, Ray};
pub use input::{PointerKind, PointerSample, SourceId};
pub use instrument::{Instrument, PressOutcome, Readout, SceneEvent};
pub use markers::{Marker, MarkerId, MarkerSet};
pub use normalize::{denormalize, normalize, TimbreParams};
pub use resolve::{resolve_depth_scan, resolve_entry, DepthGate, LocalPoint, ScreenView};
pub use scene::{HandleId, SceneLayout, UiAction};
pub use session::{ClickCooldown, Session, SessionRegistry};
pub use volume::Volume;
