//! DOM event wiring. Handlers share the instrument through `Rc<RefCell<_>>`
//! and leak their closures for the page lifetime.

mod keyboard;
mod pointer;
mod wheel;

pub use keyboard::wire_global_keydown;
pub use pointer::wire_input_handlers;
pub use wheel::wire_wheel;

use crate::audio::WebAudioGraph;
use cube_core::{ActivationError, AudioGate, Camera, Instrument};
use futures_util::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub type WebInstrument = Instrument<WebAudioGraph>;
pub type StartAudio = Box<dyn FnMut() -> LocalBoxFuture<'static, Result<(), ActivationError>>>;

#[derive(Clone)]
pub struct InputWiring {
    pub canvas: web::HtmlCanvasElement,
    pub instrument: Rc<RefCell<WebInstrument>>,
    pub camera: Rc<RefCell<Camera>>,
    pub gate: Rc<RefCell<AudioGate<StartAudio>>>,
}

impl InputWiring {
    /// Run a sound-producing action once the audio context is running. The
    /// first gesture starts it; later ones run immediately.
    pub fn with_audio(&self, action: impl FnOnce(&mut WebInstrument) + 'static) {
        if self.gate.borrow().is_started() {
            action(&mut self.instrument.borrow_mut());
            return;
        }
        // Must be issued inside the gesture handler for the browser to allow it.
        let started = self.gate.borrow_mut().ensure_started();
        let instrument = self.instrument.clone();
        spawn_local(async move {
            match started.await {
                Ok(()) => action(&mut instrument.borrow_mut()),
                Err(e) => log::warn!("[audio] {e}; gesture dropped"),
            }
        });
    }
}
