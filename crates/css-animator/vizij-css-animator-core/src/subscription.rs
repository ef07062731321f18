//! Scoped listener and timer handles.
//!
//! Both release their host resource on `dispose`/`cancel` and again on drop;
//! releasing twice is a no-op.

use std::rc::Rc;

use crate::host::{AnimationHandler, Host, ListenerId, TimerId};

/// A handler attached under one or more event-name aliases.
pub struct Subscription<H: Host> {
    host: Rc<H>,
    listeners: Vec<ListenerId>,
}

impl<H: Host> Subscription<H> {
    pub fn listen(
        host: &Rc<H>,
        element: &H::Element,
        event_names: &[String],
        handler: AnimationHandler<H::Element>,
    ) -> Self {
        let listeners = event_names
            .iter()
            .map(|name| host.add_animation_listener(element, name, handler.clone()))
            .collect();
        Self {
            host: host.clone(),
            listeners,
        }
    }

    pub fn dispose(&mut self) {
        for id in self.listeners.drain(..) {
            self.host.remove_animation_listener(id);
        }
    }
}

impl<H: Host> Drop for Subscription<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A pending host timer.
pub struct Timer<H: Host> {
    host: Rc<H>,
    id: Option<TimerId>,
}

impl<H: Host> Timer<H> {
    pub fn schedule(host: &Rc<H>, delay_ms: f64, callback: Box<dyn FnOnce()>) -> Self {
        let id = host.set_timeout(delay_ms, callback);
        Self {
            host: host.clone(),
            id: Some(id),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(id) = self.id.take() {
            self.host.clear_timeout(id);
        }
    }
}

impl<H: Host> Drop for Timer<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
