//! Future returned by the single-element operations.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::{AnimatorError, Result};
use crate::events::Phase;

/// Resolves to `Ok(true)` when a CSS animation ran to completion and
/// `Ok(false)` when none ran or the operation was pre-empted.
///
/// The operation itself starts when the animator method is called; polling
/// only observes the verdict. Dropping a `Completion` does not cancel the
/// operation.
#[must_use = "the verdict is only observable by awaiting the completion"]
pub struct Completion {
    phase: Phase,
    state: State,
}

enum State {
    Ready(Option<Result<bool>>),
    Waiting(oneshot::Receiver<bool>),
}

impl Completion {
    pub(crate) fn ready(phase: Phase, result: Result<bool>) -> Self {
        Self {
            phase,
            state: State::Ready(Some(result)),
        }
    }

    pub(crate) fn pending(phase: Phase, receiver: oneshot::Receiver<bool>) -> Self {
        Self {
            phase,
            state: State::Waiting(receiver),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

impl Future for Completion {
    type Output = Result<bool>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let operation = this.phase.name();
        match &mut this.state {
            State::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(AnimatorError::Interrupted { operation })))
            }
            State::Waiting(receiver) => Pin::new(receiver)
                .poll(cx)
                .map(|verdict| verdict.map_err(|_| AnimatorError::Interrupted { operation })),
        }
    }
}
