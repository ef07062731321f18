//! Drives a [`CssAnimator`] over a [`FakeDocument`] on a single-threaded
//! executor, interleaving spawned futures with the document's clock.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;

use vizij_css_animator_core::{AnimatorConfig, CssAnimator, VendorResolver};

use crate::dom::FakeDocument;

/// Slot filled with a spawned future's output once it completes.
pub struct Outcome<T> {
    value: Rc<RefCell<Option<T>>>,
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        self.value.borrow().is_some()
    }
}

impl<T: Clone> Outcome<T> {
    pub fn get(&self) -> Option<T> {
        self.value.borrow().clone()
    }
}

pub struct Harness {
    pub doc: Rc<FakeDocument>,
    pub animator: CssAnimator<FakeDocument>,
    pool: LocalPool,
}

impl Harness {
    pub fn new(doc: Rc<FakeDocument>) -> Self {
        Self::with_config(doc, AnimatorConfig::default())
    }

    pub fn with_config(doc: Rc<FakeDocument>, config: AnimatorConfig) -> Self {
        crate::init_logging();
        let animator = CssAnimator::new(doc.clone(), Rc::new(VendorResolver::default()), config);
        Self {
            doc,
            animator,
            pool: LocalPool::new(),
        }
    }

    /// Poll `fut` on the harness executor; its output lands in the returned
    /// [`Outcome`].
    pub fn spawn<T, F>(&mut self, fut: F) -> Outcome<T>
    where
        T: 'static,
        F: Future<Output = T> + 'static,
    {
        let value = Rc::new(RefCell::new(None));
        let slot = value.clone();
        self.pool
            .spawner()
            .spawn_local(async move {
                let out = fut.await;
                *slot.borrow_mut() = Some(out);
            })
            .expect("local pool accepts tasks");
        self.pool.run_until_stalled();
        Outcome { value }
    }

    /// Run every spawned future as far as it can go without the clock moving.
    pub fn settle(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Move the clock forward by `ms`, running due timers and animation
    /// events in order and letting futures react after each one.
    pub fn advance(&mut self, ms: f64) {
        let until = self.doc.now() + ms;
        loop {
            self.pool.run_until_stalled();
            if !self.doc.run_next_due(until) {
                break;
            }
        }
        self.pool.run_until_stalled();
        self.doc.set_now(until);
    }
}
