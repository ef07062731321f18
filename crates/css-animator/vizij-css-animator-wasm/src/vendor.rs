//! One-time detection of the engine's animation vendor prefix.

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use vizij_css_animator_core::VendorPrefix;

const PROBES: [(&str, VendorPrefix); 5] = [
    ("animationName", VendorPrefix::None),
    ("webkitAnimationName", VendorPrefix::Webkit),
    ("MozAnimationName", VendorPrefix::Moz),
    ("msAnimationName", VendorPrefix::Ms),
    ("OAnimationName", VendorPrefix::O),
];

/// Probe a detached element's style object for the first supported
/// `animationName` spelling. Falls back to unprefixed.
pub fn detect_prefix(document: &Document) -> VendorPrefix {
    let Some(style) = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        .map(|el| el.style())
    else {
        return VendorPrefix::None;
    };
    PROBES
        .iter()
        .find(|(key, _)| Reflect::has(&style, &JsValue::from_str(key)).unwrap_or(false))
        .map(|(_, prefix)| *prefix)
        .unwrap_or_default()
}
