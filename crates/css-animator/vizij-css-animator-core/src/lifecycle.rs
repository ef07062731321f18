//! Declarative description of one animated class mutation.
//!
//! Each public operation is expressed as a [`Lifecycle`]: which classes change
//! while preparing, which change kicks off the animation, and which changes
//! leave the element in its terminal state after a real animation (`finish`)
//! or without one (`revert`).

use crate::config::AnimatorConfig;
use crate::events::Phase;
use crate::host::Host;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassChange {
    Add(String),
    Remove(String),
}

impl ClassChange {
    pub fn apply<H: Host>(&self, host: &H, element: &H::Element) {
        match self {
            Self::Add(class) => host.add_class(element, class),
            Self::Remove(class) => host.remove_class(element, class),
        }
    }
}

pub fn apply_all<H: Host>(host: &H, element: &H::Element, changes: &[ClassChange]) {
    for change in changes {
        change.apply(host, element);
    }
}

/// Stagger direction of an enter/leave.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Enter,
    Leave,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Self::Enter => Phase::Enter,
            Self::Leave => Phase::Leave,
        }
    }
}

pub fn add_suffix(class_name: &str) -> String {
    format!("{class_name}-add")
}

pub fn remove_suffix(class_name: &str) -> String {
    format!("{class_name}-remove")
}

#[derive(Clone, Debug)]
pub struct Lifecycle {
    pub phase: Phase,
    /// Base class for add/remove operations.
    pub class_name: Option<String>,
    /// Applied before the animation names are sampled.
    pub prepare: Vec<ClassChange>,
    /// The mutation expected to start a CSS animation.
    pub activate: Vec<ClassChange>,
    /// Terminal state after a completed animation.
    pub finish: Vec<ClassChange>,
    /// Terminal state when no animation ran or the operation was pre-empted.
    pub revert: Vec<ClassChange>,
    pub stagger: Option<Direction>,
    /// Marker added after `finish`.
    pub done_class: Option<String>,
    pub suppress_events: bool,
}

impl Lifecycle {
    /// `au-enter` / `au-enter-active` (or leave) with optional done markers.
    pub fn transition(direction: Direction, config: &AnimatorConfig) -> Self {
        let class = format!("au-{}", direction.name());
        let active = format!("{class}-active");

        let mut prepare = Vec::new();
        let mut done_class = None;
        if config.use_animation_done_classes {
            prepare.extend(
                config
                    .done_classes()
                    .iter()
                    .map(|c| ClassChange::Remove(c.to_string())),
            );
            done_class = Some(match direction {
                Direction::Enter => config.animation_entered_class.clone(),
                Direction::Leave => config.animation_left_class.clone(),
            })
            .filter(|c| !c.is_empty());
        }
        prepare.push(ClassChange::Add(class.clone()));

        let cleanup = vec![
            ClassChange::Remove(active.clone()),
            ClassChange::Remove(class),
        ];
        Self {
            phase: direction.phase(),
            class_name: None,
            prepare,
            activate: vec![ClassChange::Add(active)],
            finish: cleanup.clone(),
            revert: cleanup,
            stagger: Some(direction),
            done_class,
            suppress_events: false,
        }
    }

    pub fn add_class(class_name: &str, suppress_events: bool) -> Self {
        let transitional = add_suffix(class_name);
        Self {
            phase: Phase::AddClass,
            class_name: Some(class_name.to_string()),
            prepare: Vec::new(),
            activate: vec![ClassChange::Add(transitional.clone())],
            finish: vec![
                ClassChange::Add(class_name.to_string()),
                ClassChange::Remove(transitional.clone()),
            ],
            revert: vec![
                ClassChange::Remove(transitional),
                ClassChange::Add(class_name.to_string()),
            ],
            stagger: None,
            done_class: None,
            suppress_events,
        }
    }

    pub fn remove_class(class_name: &str, suppress_events: bool) -> Self {
        let transitional = remove_suffix(class_name);
        Self {
            phase: Phase::RemoveClass,
            class_name: Some(class_name.to_string()),
            prepare: vec![ClassChange::Remove(class_name.to_string())],
            activate: vec![ClassChange::Add(transitional.clone())],
            finish: vec![
                ClassChange::Remove(class_name.to_string()),
                ClassChange::Remove(transitional.clone()),
            ],
            revert: vec![
                ClassChange::Remove(transitional),
                ClassChange::Remove(class_name.to_string()),
            ],
            stagger: None,
            done_class: None,
            suppress_events,
        }
    }
}
