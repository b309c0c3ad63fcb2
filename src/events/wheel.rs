use super::InputWiring;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Wheel notches push the active marker along depth. The page does not
/// scroll while the pointer is over the canvas.
pub fn wire_wheel(w: InputWiring) {
    let canvas = w.canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        ev.prevent_default();
        if let Some(id) = w.instrument.borrow_mut().scroll_depth(ev.delta_y()) {
            log::trace!("[input] wheel moved {id:?}");
        }
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    closure.forget();
}
