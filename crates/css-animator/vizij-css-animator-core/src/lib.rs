//! Vizij CSS Animator Core (host-agnostic)
//!
//! Drives CSS animations by toggling classes and reports, per operation,
//! whether an animation actually ran. The document is reached only through
//! the [`Host`] trait, so the same state machine runs in the browser (see
//! `vizij-css-animator-wasm`) and against in-memory documents in tests.

pub mod animator;
mod canceller;
pub mod completion;
pub mod config;
mod context;
mod detector;
pub mod error;
pub mod events;
pub mod host;
pub mod ids;
pub mod keyframes;
pub mod lifecycle;
pub mod resolver;
pub mod stagger;
pub mod subscription;

// Re-exports for consumers (hosts)
pub use animator::{CssAnimator, SequenceStep};
pub use completion::Completion;
pub use config::AnimatorConfig;
pub use error::{AnimatorError, HostError, Result};
pub use events::{LifecycleEvent, Phase, Step};
pub use host::{AnimationEvent, AnimationHandler, Host, ListenerId, TimerId};
pub use ids::OpId;
pub use lifecycle::Direction;
pub use resolver::{AnimationEventKind, StyleResolver, VendorPrefix, VendorResolver};
