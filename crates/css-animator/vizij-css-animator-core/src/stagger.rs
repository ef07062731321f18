//! Per-sibling activation delay for enter/leave under an opted-in parent.
//!
//! A parent opts in with `au-stagger` (both directions) or
//! `au-stagger-enter` / `au-stagger-leave`. Its `data-animator-pending<dir>`
//! attribute counts the operations currently holding a slot; a new operation
//! takes the current count as its slot index and waits
//! `index * parent animation-delay` before activating.

use log::debug;

use crate::host::Host;
use crate::lifecycle::Direction;
use crate::resolver::{parse_time_ms, resolve_style, StyleResolver};

pub const STAGGER_CLASS: &str = "au-stagger";

pub fn stagger_class(direction: Direction) -> String {
    format!("{STAGGER_CLASS}-{}", direction.name())
}

pub fn pending_attribute(direction: Direction) -> String {
    format!("data-animator-pending{}", direction.name())
}

/// A claimed slot; must be released on the operation's terminal transition.
#[derive(Debug)]
pub struct StaggerSlot<E> {
    parent: E,
    attribute: String,
    pub delay_ms: f64,
}

fn read_counter<H: Host>(host: &H, element: &H::Element, attribute: &str) -> u32 {
    host.attribute(element, attribute)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(0)
}

/// Claim the next slot under `element`'s parent, if the parent opts in.
pub fn claim<H: Host>(
    host: &H,
    resolver: &dyn StyleResolver,
    element: &H::Element,
    direction: Direction,
) -> Option<StaggerSlot<H::Element>> {
    let parent = host
        .parent_element(element)
        .filter(|p| host.is_element(p))?;
    if !host.has_class(&parent, STAGGER_CLASS) && !host.has_class(&parent, &stagger_class(direction))
    {
        return None;
    }

    let attribute = pending_attribute(direction);
    let index = read_counter(host, &parent, &attribute);
    host.set_attribute(&parent, &attribute, &(index + 1).to_string());

    let step = parse_time_ms(&resolve_style(host, resolver, &parent, "animation-delay"));
    let delay_ms = step * f64::from(index);
    debug!(
        "stagger {}: slot {index} of {:?}, delay {delay_ms}ms",
        direction.name(),
        parent
    );
    Some(StaggerSlot {
        parent,
        attribute,
        delay_ms,
    })
}

impl<E> StaggerSlot<E> {
    pub fn release<H: Host<Element = E>>(self, host: &H) {
        let pending = read_counter(host, &self.parent, &self.attribute);
        host.set_attribute(
            &self.parent,
            &self.attribute,
            &pending.saturating_sub(1).to_string(),
        );
    }
}
