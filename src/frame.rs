use crate::dom;
use crate::events::WebInstrument;
use crate::overlay;
use crate::render::Painter;
use crate::snapshot;
use cube_core::{Camera, LocalPoint, SceneEvent, SourceId};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub struct FrameContext {
    pub instrument: Rc<RefCell<WebInstrument>>,
    pub camera: Rc<RefCell<Camera>>,
    pub canvas: web::HtmlCanvasElement,
    pub document: web::Document,
    pub painter: Option<Painter>,
    pub hover: Option<LocalPoint>,
    pub dragging: bool,
}

impl FrameContext {
    pub fn frame(&mut self) {
        let events = {
            let mut inst = self.instrument.borrow_mut();
            inst.tick();
            inst.drain_events()
        };
        for ev in events {
            self.apply(ev);
        }

        let dragging = !self.instrument.borrow().sessions().is_idle(SourceId::Mouse);
        if dragging != self.dragging {
            self.dragging = dragging;
            self.refresh_cursor();
        }

        if let Some(painter) = &self.painter {
            let size = dom::canvas_size(&self.canvas);
            let mut cam = self.camera.borrow_mut();
            cam.set_viewport(size[0], size[1]);
            painter.draw(&self.instrument.borrow(), &cam, self.hover, size);
        }
    }

    fn apply(&mut self, ev: SceneEvent) {
        match ev {
            SceneEvent::ReadoutChanged(readout) => overlay::update_readouts(&self.document, &readout),
            SceneEvent::Hover {
                source: SourceId::Mouse,
                point,
            } => {
                self.hover = point;
                self.refresh_cursor();
            }
            SceneEvent::SnapshotRequested => self.save_snapshot(),
            SceneEvent::MarkerPlaced { id, position } => {
                log::info!(
                    "[marker] {id:?} placed at ({:.2},{:.2},{:.2})",
                    position.x,
                    position.y,
                    position.z
                );
            }
            other => log::trace!("[marker] {other:?}"),
        }
    }

    fn refresh_cursor(&self) {
        let cursor = if self.dragging {
            "grabbing"
        } else if self.hover.is_some() {
            "crosshair"
        } else {
            "default"
        };
        dom::set_cursor(&self.canvas, cursor);
    }

    fn save_snapshot(&self) {
        let snap = {
            let inst = self.instrument.borrow();
            let (pitch, yaw) = inst.volume().angles();
            snapshot::Snapshot::capture(pitch, yaw, &inst.readout(), inst.markers().iter())
        };
        let json = match snap.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::warn!("[ui] snapshot encode failed: {e}");
                return;
            }
        };
        let name = snapshot::snapshot_filename(instant::now());
        if let Err(e) = download_text(&self.document, &name, &json) {
            log::warn!("[ui] snapshot download failed: {e:?}");
        }
        log::info!("[ui] snapshot {name}: {json}");
    }
}

fn download_text(document: &web::Document, name: &str, text: &str) -> Result<(), wasm_bindgen::JsValue> {
    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(text));
    let opts = web::BlobPropertyBag::new();
    opts.set_type("application/json");
    let blob = web::Blob::new_with_str_sequence_and_options(&parts, &opts)?;
    let url = web::Url::create_object_url_with_blob(&blob)?;
    let a = document
        .create_element("a")?
        .dyn_into::<web::HtmlAnchorElement>()
        .map_err(wasm_bindgen::JsValue::from)?;
    a.set_href(&url);
    a.set_download(name);
    a.click();
    web::Url::revoke_object_url(&url)
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        if let (Some(w), Some(cb)) = (web::window(), tick_clone.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
