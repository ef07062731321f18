//! At most one unsettled operation per element and class.
//!
//! Before a new add or remove of a class begins, any unsettled add or remove
//! of the same class on the same element is settled on the spot. Enter and
//! leave are exclusive per element in the same way. A settled operation has
//! its listeners and timers released and its terminal classes applied, and
//! it resolves `false` without emitting events. For add/remove the
//! class-level terminal state is then enforced as well, covering
//! transitional classes applied by someone else.

use std::rc::Rc;

use log::debug;

use crate::context::Context;
use crate::detector::{self, Verdict};
use crate::events::Phase;
use crate::host::Host;
use crate::lifecycle::{add_suffix, remove_suffix};

const CLASS_PHASES: [Phase; 2] = [Phase::AddClass, Phase::RemoveClass];
const TRANSITION_PHASES: [Phase; 2] = [Phase::Enter, Phase::Leave];

/// Settle whatever `incoming` would race with on `element`.
///
/// `class_name` is `None` for enter/leave.
pub(crate) fn settle_conflicting<H: Host>(
    ctx: &Rc<Context<H>>,
    element: &H::Element,
    class_name: Option<&str>,
    incoming: Phase,
) {
    let phases: &[Phase] = match incoming {
        Phase::AddClass | Phase::RemoveClass => &CLASS_PHASES,
        Phase::Enter | Phase::Leave => &TRANSITION_PHASES,
        Phase::Animate => return,
    };

    for op in ctx.in_flight_matching(element, class_name, phases) {
        debug!(
            "{} of {:?} pre-empts a pending operation on {element:?}",
            incoming.name(),
            class_name.unwrap_or("(transition)"),
        );
        detector::settle(ctx, &op, Verdict::Preempted);
    }

    let Some(class_name) = class_name else {
        return;
    };
    let host = &*ctx.host;
    match incoming {
        Phase::AddClass => {
            let pending = remove_suffix(class_name);
            if host.has_class(element, &pending) {
                host.remove_class(element, &pending);
                host.remove_class(element, class_name);
            }
        }
        Phase::RemoveClass => {
            let pending = add_suffix(class_name);
            if host.has_class(element, &pending) {
                host.remove_class(element, &pending);
                host.add_class(element, class_name);
            }
        }
        _ => {}
    }
}
