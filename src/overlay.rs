use crate::constants::{OVERLAY_ID, READOUT_IDS};
use crate::dom;
use cube_core::Readout;
use web_sys as web;

/// Dismiss the start overlay once audio has been requested.
pub fn hide(document: &web::Document) {
    if let Some(el) = document.get_element_by_id(OVERLAY_ID) {
        _ = el.class_list().add_1("hidden");
        _ = el.set_attribute("style", "display:none");
    }
}

/// Write the three descriptor values of the active marker, `--` when none.
pub fn update_readouts(document: &web::Document, readout: &Readout) {
    for (id, text) in READOUT_IDS.iter().zip(readout.descriptor_text()) {
        dom::set_text(document, id, &text);
    }
}
