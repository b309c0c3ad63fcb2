//! One-shot audio engine activation.
//!
//! Browsers only let an audio context start from a user gesture, and the
//! start is asynchronous. Every sound-producing path awaits the same gate;
//! callers that arrive while a start is in flight share it instead of
//! issuing their own. A failed start is forgotten so the next gesture retries.

use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivationError {
    #[error("audio engine refused to start: {0}")]
    Refused(String),
    #[error("no audio output available")]
    NoDevice,
}

pub type ActivationFuture = Shared<LocalBoxFuture<'static, Result<(), ActivationError>>>;

pub struct AudioGate<F>
where
    F: FnMut() -> LocalBoxFuture<'static, Result<(), ActivationError>>,
{
    start: F,
    inflight: Option<ActivationFuture>,
    attempts: u32,
}

impl<F> AudioGate<F>
where
    F: FnMut() -> LocalBoxFuture<'static, Result<(), ActivationError>>,
{
    pub fn new(start: F) -> Self {
        Self {
            start,
            inflight: None,
            attempts: 0,
        }
    }

    /// Future that resolves once the engine runs. Reuses the in-flight or
    /// completed attempt unless that attempt failed.
    pub fn ensure_started(&mut self) -> ActivationFuture {
        if let Some(fut) = &self.inflight {
            match fut.peek() {
                Some(Err(e)) => {
                    log::warn!("[audio] previous start failed ({e}), retrying");
                }
                _ => return fut.clone(),
            }
        }
        self.attempts += 1;
        log::info!("[audio] starting engine (attempt {})", self.attempts);
        let fut = (self.start)().shared();
        self.inflight = Some(fut.clone());
        fut
    }

    /// True once an attempt has completed successfully.
    pub fn is_started(&self) -> bool {
        matches!(self.inflight.as_ref().and_then(|f| f.peek()), Some(Ok(())))
    }

    /// Number of distinct start attempts issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
