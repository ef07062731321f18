//! Host capability: everything the animator needs from a document.
//!
//! The core never touches a browser API directly. A `Host` exposes class-list
//! mutation, parent lookup, attributes, computed style, stylesheet keyframes,
//! animation event listeners, custom-event dispatch and timers. The wasm crate
//! implements it over `web-sys`; tests use an in-memory document.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::HostError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Callback invoked for native animation events.
pub type AnimationHandler<E> = Rc<dyn Fn(&AnimationEvent<E>)>;

/// A native `animationstart` / `animationend` event as seen by a listener.
#[derive(Debug)]
pub struct AnimationEvent<E> {
    target: E,
    animation_name: String,
    propagation_stopped: Cell<bool>,
}

impl<E> AnimationEvent<E> {
    pub fn new(target: E, animation_name: impl Into<String>) -> Self {
        Self {
            target,
            animation_name: animation_name.into(),
            propagation_stopped: Cell::new(false),
        }
    }

    /// The element the animation ran on (not the element listening).
    pub fn target(&self) -> &E {
        &self.target
    }

    pub fn animation_name(&self) -> &str {
        &self.animation_name
    }

    /// Keep the event from reaching listeners on ancestors.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Document access required by the animator.
///
/// All methods take `&self`; implementations use interior mutability. Handlers
/// and timer callbacks must be invoked without any internal borrow held, since
/// they re-enter the host.
pub trait Host: 'static {
    type Element: Clone + PartialEq + fmt::Debug + 'static;

    /// Whether `node` is an element (as opposed to a text node or comment).
    fn is_element(&self, node: &Self::Element) -> bool;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&self, element: &Self::Element, class: &str);
    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Parent element, if the parent is an element.
    fn parent_element(&self, element: &Self::Element) -> Option<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str);

    /// Computed value of a CSS property, or an empty string when the engine
    /// does not know the property.
    fn computed_style(&self, element: &Self::Element, property: &str) -> String;

    fn style_sheet_count(&self) -> usize;

    /// Names of the `@keyframes` rules of one stylesheet.
    fn keyframes_names(&self, sheet: usize) -> Result<Vec<String>, HostError>;

    fn add_animation_listener(
        &self,
        element: &Self::Element,
        event_name: &str,
        handler: AnimationHandler<Self::Element>,
    ) -> ListenerId;
    fn remove_animation_listener(&self, id: ListenerId);

    /// Dispatch a bubbling, cancelable custom event on the document with
    /// `detail` set to the element (or null).
    fn dispatch_custom_event(&self, name: &str, detail: Option<&Self::Element>);

    fn set_timeout(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
}
