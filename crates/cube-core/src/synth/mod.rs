//! Voice graph synthesis: the backend trait, the parameter curves, the voice
//! lifecycle and a simulated backend.

pub mod graph;
pub mod mapping;
pub mod noise;
pub mod sim;
pub mod voice;

pub use graph::*;
pub use mapping::{targets, VoiceTargets, BASE_FREQUENCY, NEUTRAL_CUTOFF};
pub use noise::{impulse_response, noise_buffer, PinkFilter};
pub use sim::{EnvelopeStage, RampRecord, SimGraph};
pub use voice::{VoiceBank, VoiceId, VoiceNodes};
