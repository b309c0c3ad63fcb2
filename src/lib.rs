#![cfg(target_arch = "wasm32")]
use crate::audio::WebAudioGraph;
use crate::constants::{
    BUTTON_CLEAR_ID, BUTTON_PLACE_ID, BUTTON_RESET_ID, BUTTON_SNAPSHOT_ID, CANVAS_ID, OVERLAY_OK_ID,
};
use crate::events::{InputWiring, StartAudio};
use cube_core::{ActivationError, AudioGate, Camera, Instrument, InstrumentConfig, Readout, UiAction};
use futures_util::FutureExt;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

mod audio;
mod constants;
mod dom;
mod events;
mod frame;
mod overlay;
mod render;
mod snapshot;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window
            .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

/// The gate's start closure. `resume()` is issued synchronously so it lands
/// inside the user gesture; only the wait is deferred.
fn audio_starter(audio_ctx: web::AudioContext) -> StartAudio {
    Box::new(move || {
        let running = audio_ctx.state() == web::AudioContextState::Running;
        let resumed = audio_ctx.resume();
        async move {
            if running {
                return Ok(());
            }
            let promise = resumed.map_err(|e| ActivationError::Refused(format!("{e:?}")))?;
            JsFuture::from(promise)
                .await
                .map_err(|e| ActivationError::Refused(format!("{e:?}")))?;
            log::info!("[audio] context running");
            Ok(())
        }
        .boxed_local()
    })
}

fn wire_ui_buttons(document: &web::Document, w: &InputWiring) {
    let wiring = w.clone();
    dom::add_click_listener(document, OVERLAY_OK_ID, move || {
        if let Some(doc) = dom::window_document() {
            overlay::hide(&doc);
        }
        wiring.with_audio(|_| {});
    });

    let buttons = [
        (BUTTON_PLACE_ID, UiAction::PlaceMarker),
        (BUTTON_CLEAR_ID, UiAction::Clear),
        (BUTTON_RESET_ID, UiAction::ResetRotation),
        (BUTTON_SNAPSHOT_ID, UiAction::Snapshot),
    ];
    for (id, action) in buttons {
        let wiring = w.clone();
        dom::add_click_listener(document, id, move || match action {
            UiAction::PlaceMarker => wiring.with_audio(move |inst| inst.apply_action(action)),
            _ => wiring.instrument.borrow_mut().apply_action(action),
        });
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("timbre cube starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    static STARTED: AtomicBool = AtomicBool::new(false);
    if STARTED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{CANVAS_ID}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    wire_canvas_resize(&canvas);

    // The context starts suspended; the first gesture resumes it through the gate.
    let audio_ctx = web::AudioContext::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let graph = WebAudioGraph::new(audio_ctx.clone())?;
    let config = InstrumentConfig::default();
    log::info!("[audio] marker mode {:?}, edge {}", config.marker_mode, config.cube_edge);
    let instrument = Rc::new(RefCell::new(Instrument::new(graph, config)));
    let camera = Rc::new(RefCell::new(Camera::default()));
    let gate = Rc::new(RefCell::new(AudioGate::new(audio_starter(audio_ctx))));

    let wiring = InputWiring {
        canvas: canvas.clone(),
        instrument: instrument.clone(),
        camera: camera.clone(),
        gate,
    };
    wire_ui_buttons(&document, &wiring);
    events::wire_global_keydown(wiring.clone());
    events::wire_wheel(wiring.clone());
    events::wire_input_handlers(wiring);

    overlay::update_readouts(&document, &Readout::NoMarker);
    let painter = match render::Painter::new(&canvas) {
        Ok(p) => Some(p),
        Err(e) => {
            log::warn!("[ui] drawing disabled: {e}");
            None
        }
    };

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        instrument,
        camera,
        canvas,
        document,
        painter,
        hover: None,
        dragging: false,
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
