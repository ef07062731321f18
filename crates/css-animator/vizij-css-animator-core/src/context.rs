//! State shared by every operation started from one animator.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::AnimatorConfig;
use crate::detector::{OpCell, Operation};
use crate::events::{LifecycleEvent, Phase};
use crate::host::Host;
use crate::ids::{IdAllocator, OpId};
use crate::resolver::StyleResolver;

/// Registry entry for an operation that has not settled.
struct InFlight<H: Host> {
    id: OpId,
    element: H::Element,
    /// `None` for enter/leave.
    class_name: Option<String>,
    phase: Phase,
    op: Weak<RefCell<Operation<H>>>,
}

pub(crate) struct Context<H: Host> {
    pub host: Rc<H>,
    pub resolver: Rc<dyn StyleResolver>,
    pub config: RefCell<AnimatorConfig>,
    /// Operations between their start event and their verdict.
    animating: Cell<usize>,
    ids: RefCell<IdAllocator>,
    in_flight: RefCell<Vec<InFlight<H>>>,
}

impl<H: Host> Context<H> {
    pub fn new(host: Rc<H>, resolver: Rc<dyn StyleResolver>, config: AnimatorConfig) -> Self {
        Self {
            host,
            resolver,
            config: RefCell::new(config),
            animating: Cell::new(0),
            ids: RefCell::new(IdAllocator::new()),
            in_flight: RefCell::new(Vec::new()),
        }
    }

    pub fn next_id(&self) -> OpId {
        self.ids.borrow_mut().alloc_op()
    }

    pub fn emit(&self, event: LifecycleEvent, detail: Option<&H::Element>, suppress: bool) {
        if !suppress {
            self.host.dispatch_custom_event(&event.dom_name(), detail);
        }
    }

    pub fn register(
        &self,
        id: OpId,
        element: &H::Element,
        class_name: Option<&str>,
        phase: Phase,
        op: &OpCell<H>,
    ) {
        self.in_flight.borrow_mut().push(InFlight {
            id,
            element: element.clone(),
            class_name: class_name.map(str::to_string),
            phase,
            op: Rc::downgrade(op),
        });
    }

    pub fn unregister(&self, id: OpId) {
        self.in_flight.borrow_mut().retain(|entry| entry.id != id);
    }

    /// Unsettled operations in any of `phases` for `class_name` on `element`.
    pub fn in_flight_matching(
        &self,
        element: &H::Element,
        class_name: Option<&str>,
        phases: &[Phase],
    ) -> Vec<OpCell<H>> {
        self.in_flight
            .borrow()
            .iter()
            .filter(|e| {
                phases.contains(&e.phase)
                    && e.class_name.as_deref() == class_name
                    && &e.element == element
            })
            .filter_map(|e| e.op.upgrade())
            .collect()
    }

    pub fn animation_started(&self) {
        self.animating.set(self.animating.get() + 1);
    }

    pub fn animation_finished(&self) {
        self.animating.set(self.animating.get().saturating_sub(1));
    }

    pub fn animating(&self) -> usize {
        self.animating.get()
    }
}
