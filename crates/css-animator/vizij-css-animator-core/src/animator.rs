//! Public operations: enter, leave, add/remove class, animate, run_sequence.

use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use log::debug;

use crate::canceller;
use crate::completion::Completion;
use crate::config::AnimatorConfig;
use crate::context::Context;
use crate::detector;
use crate::error::{AnimatorError, Result};
use crate::events::{LifecycleEvent, Phase, Step};
use crate::host::Host;
use crate::lifecycle::{add_suffix, Direction, Lifecycle};
use crate::resolver::{StyleResolver, VendorResolver};

/// One step of [`CssAnimator::run_sequence`].
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceStep<E> {
    pub element: E,
    pub class_name: String,
}

impl<E> SequenceStep<E> {
    pub fn new(element: E, class_name: impl Into<String>) -> Self {
        Self {
            element,
            class_name: class_name.into(),
        }
    }
}

/// Animator driving CSS animations by toggling classes on a [`Host`].
///
/// Cloning is cheap and clones share configuration, the animating counter and
/// the in-flight registry.
pub struct CssAnimator<H: Host> {
    ctx: Rc<Context<H>>,
}

impl<H: Host> Clone for CssAnimator<H> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
        }
    }
}

impl<H: Host> CssAnimator<H> {
    pub fn new(host: Rc<H>, resolver: Rc<dyn StyleResolver>, config: AnimatorConfig) -> Self {
        Self {
            ctx: Rc::new(Context::new(host, resolver, config)),
        }
    }

    /// Unprefixed resolver and default configuration.
    pub fn with_host(host: Rc<H>) -> Self {
        Self::new(
            host,
            Rc::new(VendorResolver::default()),
            AnimatorConfig::default(),
        )
    }

    pub fn host(&self) -> &Rc<H> {
        &self.ctx.host
    }

    pub fn config(&self) -> AnimatorConfig {
        self.ctx.config.borrow().clone()
    }

    /// Replace the configuration; operations already running keep the
    /// classes they were started with.
    pub fn set_config(&self, config: AnimatorConfig) {
        *self.ctx.config.borrow_mut() = config;
    }

    /// True while at least one operation has observed its start event and not
    /// yet settled.
    pub fn is_animating(&self) -> bool {
        self.ctx.animating() > 0
    }

    pub fn animating_count(&self) -> usize {
        self.ctx.animating()
    }

    fn check_element(&self, element: &H::Element, phase: Phase) -> Result<()> {
        if self.ctx.host.is_element(element) {
            Ok(())
        } else {
            Err(AnimatorError::InvalidElement {
                operation: phase.name(),
            })
        }
    }

    fn transition(&self, element: &H::Element, direction: Direction) -> Completion {
        let phase = direction.phase();
        if let Err(err) = self.check_element(element, phase) {
            return Completion::ready(phase, Err(err));
        }
        canceller::settle_conflicting(&self.ctx, element, None, phase);
        let lifecycle = Lifecycle::transition(direction, &self.ctx.config.borrow());
        detector::start(&self.ctx, element.clone(), lifecycle)
    }

    /// Run `au-enter` / `au-enter-active` on `element`.
    ///
    /// An unsettled enter or leave of the same element is settled first.
    pub fn enter(&self, element: &H::Element) -> Completion {
        self.transition(element, Direction::Enter)
    }

    /// Run `au-leave` / `au-leave-active` on `element`.
    pub fn leave(&self, element: &H::Element) -> Completion {
        self.transition(element, Direction::Leave)
    }

    /// Add `class_name` through the transitional `<class>-add` class.
    ///
    /// A pending add or remove of the same class is settled first.
    pub fn add_class(
        &self,
        element: &H::Element,
        class_name: &str,
        suppress_events: bool,
    ) -> Completion {
        if let Err(err) = self.check_element(element, Phase::AddClass) {
            return Completion::ready(Phase::AddClass, Err(err));
        }
        canceller::settle_conflicting(&self.ctx, element, Some(class_name), Phase::AddClass);
        detector::start(
            &self.ctx,
            element.clone(),
            Lifecycle::add_class(class_name, suppress_events),
        )
    }

    /// Remove `class_name` through the transitional `<class>-remove` class.
    ///
    /// Resolves `false` at once, without side effects, when the class is
    /// neither present nor pending an add.
    pub fn remove_class(
        &self,
        element: &H::Element,
        class_name: &str,
        suppress_events: bool,
    ) -> Completion {
        if let Err(err) = self.check_element(element, Phase::RemoveClass) {
            return Completion::ready(Phase::RemoveClass, Err(err));
        }
        let host = &*self.ctx.host;
        if !host.has_class(element, class_name) && !host.has_class(element, &add_suffix(class_name))
        {
            debug!("removeClass '{class_name}': already removed from {element:?}");
            return Completion::ready(Phase::RemoveClass, Ok(false));
        }
        canceller::settle_conflicting(&self.ctx, element, Some(class_name), Phase::RemoveClass);
        detector::start(
            &self.ctx,
            element.clone(),
            Lifecycle::remove_class(class_name, suppress_events),
        )
    }

    /// Flash `class_name`: add it, then remove it, both animated.
    ///
    /// Resolves `true` only if both halves animated. The inner operations emit
    /// no events of their own; `animate` events are emitted around the pair.
    pub fn animate(
        &self,
        element: &H::Element,
        class_name: &str,
    ) -> LocalBoxFuture<'static, Result<bool>> {
        if let Err(err) = self.check_element(element, Phase::Animate) {
            return future::ready(Err(err)).boxed_local();
        }
        self.animate_checked(element.clone(), class_name.to_string())
    }

    fn animate_checked(
        &self,
        element: H::Element,
        class_name: String,
    ) -> LocalBoxFuture<'static, Result<bool>> {
        self.emit(Phase::Animate, Step::Begin, &element);
        let added = self.add_class(&element, &class_name, true);
        let this = self.clone();
        async move {
            let added = added.await?;
            this.emit(Phase::Animate, Step::Active, &element);
            let removed = this.remove_class(&element, &class_name, true).await?;
            let animated = added && removed;
            let step = if animated { Step::Done } else { Step::Timeout };
            this.emit(Phase::Animate, step, &element);
            Ok(animated)
        }
        .boxed_local()
    }

    /// [`animate`](Self::animate) every element independently and in parallel.
    pub fn animate_many(
        &self,
        elements: &[H::Element],
        class_name: &str,
    ) -> LocalBoxFuture<'static, Result<Vec<bool>>> {
        if let Some(err) = elements
            .iter()
            .find_map(|el| self.check_element(el, Phase::Animate).err())
        {
            return future::ready(Err(err)).boxed_local();
        }
        let flashes: Vec<_> = elements
            .iter()
            .map(|el| self.animate_checked(el.clone(), class_name.to_string()))
            .collect();
        future::join_all(flashes)
            .map(|results| results.into_iter().collect::<Result<Vec<bool>>>())
            .boxed_local()
    }

    /// Animate each step strictly after the previous one settled.
    ///
    /// Resolves `true` iff every step animated.
    pub fn run_sequence(
        &self,
        steps: Vec<SequenceStep<H::Element>>,
    ) -> LocalBoxFuture<'static, Result<bool>> {
        if let Some(err) = steps
            .iter()
            .find_map(|s| self.check_element(&s.element, Phase::Animate).err())
        {
            return future::ready(Err(err)).boxed_local();
        }
        self.ctx.emit(LifecycleEvent::SequenceBegin, None, false);
        let this = self.clone();
        async move {
            let mut all = true;
            for step in steps {
                all &= this.animate_checked(step.element, step.class_name).await?;
            }
            this.ctx.emit(LifecycleEvent::SequenceDone, None, false);
            Ok(all)
        }
        .boxed_local()
    }

    fn emit(&self, phase: Phase, step: Step, element: &H::Element) {
        self.ctx
            .emit(LifecycleEvent::Phase(phase, step), Some(element), false);
    }
}
