//! Error types for the CSS animator.

use thiserror::Error;

/// Errors surfaced by animator operations.
///
/// Operations that find no animation to run are not errors; they resolve to
/// `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnimatorError {
    /// The value handed to an operation is not an element.
    #[error("{operation} requires an Element")]
    InvalidElement { operation: &'static str },

    /// Configuration could not be parsed.
    #[error("config error: {reason}")]
    Config { reason: String },

    /// The completion channel closed before the operation reached a verdict.
    #[error("{operation} was dropped before it settled")]
    Interrupted { operation: &'static str },
}

/// Failures reported by a [`Host`](crate::Host) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostError {
    /// Reading the rules of a stylesheet was refused (cross-origin sheet).
    #[error("stylesheet {sheet} cannot be read")]
    StylesheetAccessDenied { sheet: usize },
}

/// Animator result type
pub type Result<T> = core::result::Result<T, AnimatorError>;
