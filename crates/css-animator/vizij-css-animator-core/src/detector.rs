//! Completion detection for one class mutation on one element.
//!
//! An operation moves through
//! `Idle → Preparing → AwaitingStart → Active → Settling → Resolved`.
//! It resolves exactly once, through one of three paths:
//!
//! - a start event followed by an end event targeting the element (`true`),
//! - no new keyframe-backed animation name after activation, no start event
//!   before the fallback timer fires, or no end event within the animation's
//!   duration plus grace after it started (`false`),
//! - pre-emption by a conflicting operation on the same element (`false`).
//!
//! Every path disposes both listeners, cancels pending timers, releases the
//! stagger slot and leaves the in-flight registry before resolving.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use log::{debug, trace};

use crate::completion::Completion;
use crate::context::Context;
use crate::events::{LifecycleEvent, Step};
use crate::host::{AnimationEvent, AnimationHandler, Host};
use crate::ids::OpId;
use crate::keyframes::{animation_names, has_new_animation};
use crate::lifecycle::{apply_all, Lifecycle};
use crate::resolver::{parse_iteration_count, parse_time_ms, resolve_style, AnimationEventKind};
use crate::stagger::{self, StaggerSlot};
use crate::subscription::{Subscription, Timer};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum OpState {
    Idle,
    /// Prepare classes applied; activation may be waiting on a stagger delay.
    Preparing,
    AwaitingStart,
    Active,
    Settling,
    Resolved(bool),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    Completed,
    NoAnimation,
    Preempted,
}

pub(crate) struct Operation<H: Host> {
    id: OpId,
    element: H::Element,
    lifecycle: Lifecycle,
    state: OpState,
    prev_names: Vec<String>,
    start: Option<Subscription<H>>,
    end: Option<Subscription<H>>,
    activation: Option<Timer<H>>,
    /// Start timeout while awaiting the start event, end guard once active.
    fallback: Option<Timer<H>>,
    slot: Option<StaggerSlot<H::Element>>,
    /// Whether this operation incremented the animating counter.
    counted: bool,
    resolve: Option<oneshot::Sender<bool>>,
}

pub(crate) type OpCell<H> = Rc<RefCell<Operation<H>>>;

/// Begin `lifecycle` on `element`. Class mutations up to activation happen
/// before this returns (activation itself may be staggered).
pub(crate) fn start<H: Host>(
    ctx: &Rc<Context<H>>,
    element: H::Element,
    lifecycle: Lifecycle,
) -> Completion {
    let (tx, rx) = oneshot::channel();
    let id = ctx.next_id();
    let phase = lifecycle.phase;
    let suppress = lifecycle.suppress_events;
    let stagger = lifecycle.stagger;
    let class_name = lifecycle.class_name.clone();
    let prepare = lifecycle.prepare.clone();
    debug!("{id}: {} begin on {:?}", phase.name(), element);

    let op: OpCell<H> = Rc::new(RefCell::new(Operation {
        id,
        element: element.clone(),
        lifecycle,
        state: OpState::Idle,
        prev_names: Vec::new(),
        start: None,
        end: None,
        activation: None,
        fallback: None,
        slot: None,
        counted: false,
        resolve: Some(tx),
    }));
    ctx.register(id, &element, class_name.as_deref(), phase, &op);

    ctx.emit(LifecycleEvent::Phase(phase, Step::Begin), Some(&element), suppress);

    apply_all(&*ctx.host, &element, &prepare);
    let prev_names = animation_names(&*ctx.host, &*ctx.resolver, &element);

    let on_start_handler: AnimationHandler<H::Element> = {
        let ctx = ctx.clone();
        let op = op.clone();
        Rc::new(move |event: &AnimationEvent<H::Element>| on_start(&ctx, &op, event))
    };
    let on_end_handler: AnimationHandler<H::Element> = {
        let ctx = ctx.clone();
        let op = op.clone();
        Rc::new(move |event: &AnimationEvent<H::Element>| on_end(&ctx, &op, event))
    };
    let start_sub = Subscription::listen(
        &ctx.host,
        &element,
        &ctx.resolver.event_names(AnimationEventKind::Start),
        on_start_handler,
    );
    let end_sub = Subscription::listen(
        &ctx.host,
        &element,
        &ctx.resolver.event_names(AnimationEventKind::End),
        on_end_handler,
    );

    {
        let mut o = op.borrow_mut();
        o.state = OpState::Preparing;
        o.prev_names = prev_names;
        o.start = Some(start_sub);
        o.end = Some(end_sub);
    }

    let slot = stagger.and_then(|dir| stagger::claim(&*ctx.host, &*ctx.resolver, &element, dir));
    match slot {
        Some(slot) => {
            let delay_ms = slot.delay_ms;
            op.borrow_mut().slot = Some(slot);
            ctx.emit(LifecycleEvent::StaggerNext, Some(&element), suppress);
            if delay_ms > 0.0 {
                let timer = {
                    let host = ctx.host.clone();
                    let ctx = ctx.clone();
                    let op = op.clone();
                    Timer::schedule(&host, delay_ms, Box::new(move || activate(&ctx, &op)))
                };
                let mut o = op.borrow_mut();
                if o.state == OpState::Preparing {
                    o.activation = Some(timer);
                }
            } else {
                activate(ctx, &op);
            }
        }
        None => activate(ctx, &op),
    }

    Completion::pending(phase, rx)
}

/// Apply the activating mutation and decide whether an animation is coming.
fn activate<H: Host>(ctx: &Rc<Context<H>>, op: &OpCell<H>) {
    let (element, changes, already_started) = {
        let mut o = op.borrow_mut();
        let _fired = o.activation.take();
        let already_started = match o.state {
            OpState::Preparing => {
                o.state = OpState::AwaitingStart;
                false
            }
            // an animation bound to the prepare classes already started
            OpState::Active => true,
            _ => return,
        };
        (o.element.clone(), o.lifecycle.activate.clone(), already_started)
    };

    apply_all(&*ctx.host, &element, &changes);
    if already_started {
        return;
    }

    let (verify, grace_ms) = {
        let cfg = ctx.config.borrow();
        (cfg.verify_keyframes_exist, cfg.timeout_grace_ms)
    };
    let names = animation_names(&*ctx.host, &*ctx.resolver, &element);
    let plausible = {
        let o = op.borrow();
        has_new_animation(&*ctx.host, verify, &names, &o.prev_names)
    };
    if !plausible {
        settle(ctx, op, Verdict::NoAnimation);
        return;
    }

    let delay_ms = parse_time_ms(&resolve_style(
        &*ctx.host,
        &*ctx.resolver,
        &element,
        "animation-delay",
    ));
    let wait_ms = delay_ms + f64::from(grace_ms);
    let timer = {
        let host = ctx.host.clone();
        let ctx = ctx.clone();
        let op = op.clone();
        Timer::schedule(
            &host,
            wait_ms,
            Box::new(move || {
                let waiting = op.borrow().state == OpState::AwaitingStart;
                if waiting {
                    settle(&ctx, &op, Verdict::NoAnimation);
                }
            }),
        )
    };
    let mut o = op.borrow_mut();
    if o.state == OpState::AwaitingStart {
        trace!("{}: waiting up to {wait_ms}ms for animation start", o.id);
        o.fallback = Some(timer);
    }
}

fn on_start<H: Host>(ctx: &Rc<Context<H>>, op: &OpCell<H>, event: &AnimationEvent<H::Element>) {
    let (id, element, phase, suppress) = {
        let mut o = op.borrow_mut();
        if event.target() != &o.element {
            trace!("{}: ignoring animationstart from {:?}", o.id, event.target());
            return;
        }
        event.stop_propagation();
        if !matches!(o.state, OpState::Preparing | OpState::AwaitingStart) {
            return;
        }
        o.state = OpState::Active;
        o.counted = true;
        if let Some(mut sub) = o.start.take() {
            sub.dispose();
        }
        if let Some(mut timer) = o.fallback.take() {
            timer.cancel();
        }
        (
            o.id,
            o.element.clone(),
            o.lifecycle.phase,
            o.lifecycle.suppress_events,
        )
    };
    ctx.animation_started();
    debug!("{id}: animation '{}' started", event.animation_name());
    arm_end_guard(ctx, op, &element);
    ctx.emit(LifecycleEvent::Phase(phase, Step::Active), Some(&element), suppress);
}

/// Bound the wait for the end event once the animation runs, so an animation
/// removed from outside still settles. Infinite animations are not bounded.
fn arm_end_guard<H: Host>(ctx: &Rc<Context<H>>, op: &OpCell<H>, element: &H::Element) {
    let duration_ms = parse_time_ms(&resolve_style(
        &*ctx.host,
        &*ctx.resolver,
        element,
        "animation-duration",
    ));
    let Some(iterations) = parse_iteration_count(&resolve_style(
        &*ctx.host,
        &*ctx.resolver,
        element,
        "animation-iteration-count",
    )) else {
        return;
    };
    let grace_ms = f64::from(ctx.config.borrow().timeout_grace_ms);
    let wait_ms = duration_ms * iterations + grace_ms;
    let timer = {
        let host = ctx.host.clone();
        let ctx = ctx.clone();
        let op = op.clone();
        Timer::schedule(
            &host,
            wait_ms,
            Box::new(move || {
                let running = op.borrow().state == OpState::Active;
                if running {
                    settle(&ctx, &op, Verdict::NoAnimation);
                }
            }),
        )
    };
    let mut o = op.borrow_mut();
    if o.state == OpState::Active {
        trace!("{}: expecting animationend within {wait_ms}ms", o.id);
        o.fallback = Some(timer);
    }
}

fn on_end<H: Host>(ctx: &Rc<Context<H>>, op: &OpCell<H>, event: &AnimationEvent<H::Element>) {
    {
        let o = op.borrow();
        if event.target() != &o.element {
            trace!("{}: ignoring animationend from {:?}", o.id, event.target());
            return;
        }
        if o.state != OpState::Active {
            trace!("{}: stale animationend ignored in {:?}", o.id, o.state);
            return;
        }
    }
    event.stop_propagation();
    settle(ctx, op, Verdict::Completed);
}

/// Move the operation to its terminal state and resolve it. No-op once the
/// operation is settling or resolved.
pub(crate) fn settle<H: Host>(ctx: &Rc<Context<H>>, op: &OpCell<H>, verdict: Verdict) {
    let completed = verdict == Verdict::Completed;
    let (id, element, changes, done_class, slot, counted, resolve, phase, suppress) = {
        let mut o = op.borrow_mut();
        match o.state {
            OpState::Settling => return,
            OpState::Resolved(animated) => {
                trace!("{}: already resolved ({animated}), {verdict:?} ignored", o.id);
                return;
            }
            _ => {}
        }
        o.state = OpState::Settling;
        if let Some(mut sub) = o.start.take() {
            sub.dispose();
        }
        if let Some(mut sub) = o.end.take() {
            sub.dispose();
        }
        if let Some(mut timer) = o.activation.take() {
            timer.cancel();
        }
        if let Some(mut timer) = o.fallback.take() {
            timer.cancel();
        }
        let changes = if completed {
            o.lifecycle.finish.clone()
        } else {
            o.lifecycle.revert.clone()
        };
        let done_class = if completed {
            o.lifecycle.done_class.clone()
        } else {
            None
        };
        (
            o.id,
            o.element.clone(),
            changes,
            done_class,
            o.slot.take(),
            std::mem::take(&mut o.counted),
            o.resolve.take(),
            o.lifecycle.phase,
            o.lifecycle.suppress_events,
        )
    };

    apply_all(&*ctx.host, &element, &changes);
    if let Some(class) = done_class {
        ctx.host.add_class(&element, &class);
    }
    if let Some(slot) = slot {
        slot.release(&*ctx.host);
    }
    if counted {
        ctx.animation_finished();
    }
    ctx.unregister(id);
    op.borrow_mut().state = OpState::Resolved(completed);
    debug!("{id}: {} settled: {verdict:?}", phase.name());

    match verdict {
        Verdict::Completed => {
            ctx.emit(LifecycleEvent::Phase(phase, Step::Done), Some(&element), suppress)
        }
        Verdict::NoAnimation => {
            ctx.emit(LifecycleEvent::Phase(phase, Step::Timeout), Some(&element), suppress)
        }
        Verdict::Preempted => {}
    }
    if let Some(tx) = resolve {
        // the caller may have dropped its Completion
        let _ = tx.send(completed);
    }
}
