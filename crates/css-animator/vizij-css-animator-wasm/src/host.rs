//! `Host` over the browser DOM.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CssKeyframesRule, CssStyleSheet, CustomEvent, CustomEventInit, Document, Element, Window};

use vizij_css_animator_core::{
    AnimationEvent, AnimationHandler, Host, HostError, ListenerId, TimerId,
};

struct Listener {
    target: Element,
    event: String,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

struct PendingTimer {
    handle: i32,
    // kept alive until the timer fires or is cleared
    _closure: Closure<dyn FnMut()>,
}

/// Closures may be released from inside their own invocation (a handler
/// disposing its subscription); freeing them is deferred to a later task.
fn release_later<T: 'static>(value: T) {
    spawn_local(async move {
        drop(value);
    });
}

pub struct DomHost {
    window: Window,
    document: Document,
    listeners: RefCell<HashMap<u64, Listener>>,
    timers: Rc<RefCell<HashMap<u64, PendingTimer>>>,
    next_listener: Cell<u64>,
    next_timer: Cell<u64>,
}

impl DomHost {
    pub fn new() -> Result<Self, JsError> {
        let window = web_sys::window().ok_or_else(|| JsError::new("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("window has no document"))?;
        Ok(Self {
            window,
            document,
            listeners: RefCell::new(HashMap::new()),
            timers: Rc::new(RefCell::new(HashMap::new())),
            next_listener: Cell::new(0),
            next_timer: Cell::new(0),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Host for DomHost {
    type Element = Element;

    fn is_element(&self, _node: &Element) -> bool {
        // non-elements are rejected when converting from JS
        true
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn add_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().add_1(class) {
            debug!("classList.add('{class}') failed: {err:?}");
        }
    }

    fn remove_class(&self, element: &Element, class: &str) {
        if let Err(err) = element.class_list().remove_1(class) {
            debug!("classList.remove('{class}') failed: {err:?}");
        }
    }

    fn parent_element(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) {
        if let Err(err) = element.set_attribute(name, value) {
            debug!("setAttribute('{name}') failed: {err:?}");
        }
    }

    fn computed_style(&self, element: &Element, property: &str) -> String {
        self.window
            .get_computed_style(element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn style_sheet_count(&self) -> usize {
        self.document.style_sheets().length() as usize
    }

    fn keyframes_names(&self, sheet: usize) -> Result<Vec<String>, HostError> {
        let Some(sheet_ref) = self
            .document
            .style_sheets()
            .item(sheet as u32)
            .and_then(|s| s.dyn_into::<CssStyleSheet>().ok())
        else {
            return Ok(Vec::new());
        };
        // cross-origin sheets throw a SecurityError here
        let rules = sheet_ref
            .css_rules()
            .map_err(|_| HostError::StylesheetAccessDenied { sheet })?;
        Ok((0..rules.length())
            .filter_map(|i| rules.item(i))
            .filter_map(|rule| rule.dyn_ref::<CssKeyframesRule>().map(|k| k.name()))
            .collect())
    }

    fn add_animation_listener(
        &self,
        element: &Element,
        event_name: &str,
        handler: AnimationHandler<Element>,
    ) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);

        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let name = event
                .dyn_ref::<web_sys::AnimationEvent>()
                .map(|e| e.animation_name())
                .unwrap_or_default();
            let seen = AnimationEvent::new(target, name);
            handler(&seen);
            if seen.propagation_stopped() {
                event.stop_propagation();
            }
        });
        if let Err(err) =
            element.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref())
        {
            debug!("addEventListener('{event_name}') failed: {err:?}");
        }
        self.listeners.borrow_mut().insert(
            id,
            Listener {
                target: element.clone(),
                event: event_name.to_string(),
                closure,
            },
        );
        ListenerId(id)
    }

    fn remove_animation_listener(&self, id: ListenerId) {
        let Some(listener) = self.listeners.borrow_mut().remove(&id.0) else {
            return;
        };
        let _ = listener.target.remove_event_listener_with_callback(
            &listener.event,
            listener.closure.as_ref().unchecked_ref(),
        );
        release_later(listener);
    }

    fn dispatch_custom_event(&self, name: &str, detail: Option<&Element>) {
        let init = CustomEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let detail = detail.map_or(JsValue::NULL, |el| el.clone().into());
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(name, &init) {
            Ok(event) => {
                let _ = self.document.dispatch_event(&event);
            }
            Err(err) => debug!("CustomEvent('{name}') failed: {err:?}"),
        }
    }

    fn set_timeout(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        let id = self.next_timer.get();
        self.next_timer.set(id + 1);

        let timers = self.timers.clone();
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(fired) = timers.borrow_mut().remove(&id) {
                release_later(fired);
            }
            if let Some(callback) = callback.take() {
                callback();
            }
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms.max(0.0).round() as i32,
            ) {
            Ok(handle) => {
                self.timers.borrow_mut().insert(
                    id,
                    PendingTimer {
                        handle,
                        _closure: closure,
                    },
                );
            }
            Err(err) => debug!("setTimeout failed: {err:?}"),
        }
        TimerId(id)
    }

    fn clear_timeout(&self, id: TimerId) {
        let Some(timer) = self.timers.borrow_mut().remove(&id.0) else {
            return;
        };
        self.window.clear_timeout_with_handle(timer.handle);
        release_later(timer);
    }
}
