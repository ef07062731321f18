//! Lifecycle events emitted on the document.

use serde::{Deserialize, Serialize};

/// The operation an event belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Enter,
    Leave,
    AddClass,
    RemoveClass,
    Animate,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Enter,
        Phase::Leave,
        Phase::AddClass,
        Phase::RemoveClass,
        Phase::Animate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::AddClass => "addClass",
            Self::RemoveClass => "removeClass",
            Self::Animate => "animate",
        }
    }

    fn dom_segment(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
            Self::AddClass => "add-class",
            Self::RemoveClass => "remove-class",
            Self::Animate => "animate",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Begin,
    Active,
    Done,
    Timeout,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Begin, Step::Active, Step::Done, Step::Timeout];

    fn name(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Active => "active",
            Self::Done => "done",
            Self::Timeout => "timeout",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Phase(Phase, Step),
    StaggerNext,
    SequenceBegin,
    SequenceDone,
}

impl LifecycleEvent {
    /// DOM event type, e.g. `animation:add-class:done`.
    pub fn dom_name(self) -> String {
        match self {
            Self::Phase(phase, step) => {
                format!("animation:{}:{}", phase.dom_segment(), step.name())
            }
            Self::StaggerNext => "animation:stagger:next".to_string(),
            Self::SequenceBegin => "animation:sequence:begin".to_string(),
            Self::SequenceDone => "animation:sequence:done".to_string(),
        }
    }

    /// Every event the animator can emit.
    pub fn all() -> impl Iterator<Item = LifecycleEvent> {
        Phase::ALL
            .into_iter()
            .flat_map(|p| Step::ALL.into_iter().map(move |s| LifecycleEvent::Phase(p, s)))
            .chain([
                LifecycleEvent::StaggerNext,
                LifecycleEvent::SequenceBegin,
                LifecycleEvent::SequenceDone,
            ])
    }

    pub fn from_dom_name(name: &str) -> Option<Self> {
        Self::all().find(|e| e.dom_name() == name)
    }
}
