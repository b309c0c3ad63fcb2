use super::InputWiring;
use crate::dom;
use cube_core::{PointerSample, SourceId};
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn wire_input_handlers(w: InputWiring) {
    wire_pointermove(&w);
    wire_pointerdown(&w);
    wire_pointerup(&w);
}

fn sample_for(w: &InputWiring, ev: &web::PointerEvent) -> PointerSample {
    let [sx, sy] = dom::pointer_canvas_px(ev, &w.canvas);
    let [width, height] = dom::canvas_size(&w.canvas);
    let mut cam = w.camera.borrow_mut();
    cam.set_viewport(width, height);
    cam.pointer_sample(sx, sy, width, height)
}

fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if !w.canvas.is_connected() {
            return;
        }
        let sample = sample_for(&w, &ev);
        w.instrument
            .borrow_mut()
            .pointer_move(SourceId::Mouse, &sample, instant::now());
    }) as Box<dyn FnMut(_)>);

    // Window-level so drags keep tracking past the canvas edge.
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_pointerdown(w: &InputWiring) {
    let w = w.clone();
    let canvas_for_listener = w.canvas.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        if ev.button() != 0 {
            return;
        }
        let sample = sample_for(&w, &ev);
        let now = instant::now();
        w.with_audio(move |inst| {
            let outcome = inst.pointer_down(SourceId::Mouse, &sample, now);
            log::debug!("[input] mouse press -> {outcome:?}");
        });
        _ = w.canvas.set_pointer_capture(ev.pointer_id());
        ev.prevent_default();
    }) as Box<dyn FnMut(_)>);
    _ = canvas_for_listener
        .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_pointerup(w: &InputWiring) {
    let w = w.clone();

    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let sample = sample_for(&w, &ev);
        let now = instant::now();
        // Queued behind a press that is still waiting on audio start.
        w.with_audio(move |inst| inst.pointer_up(SourceId::Mouse, &sample, now));
        _ = w.canvas.release_pointer_capture(ev.pointer_id());
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        _ = wnd.add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
