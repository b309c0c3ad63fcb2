use super::InputWiring;
use cube_core::KeyModifiers;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
fn modifiers(ev: &web::KeyboardEvent) -> KeyModifiers {
    KeyModifiers {
        shift: ev.shift_key(),
        ctrl: ev.ctrl_key(),
        meta: ev.meta_key(),
    }
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, w: &InputWiring) {
    // Leave typing in form fields alone.
    let typing = ev
        .target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"));
    if typing {
        return;
    }
    let key = ev.key();
    let handled = w.instrument.borrow_mut().handle_key(&key, modifiers(ev));
    if handled {
        log::debug!("[input] key {key}");
        ev.prevent_default();
    }
}

pub fn wire_global_keydown(w: InputWiring) {
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &w);
    }) as Box<dyn FnMut(_)>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
