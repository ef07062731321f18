//! Animator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AnimatorError, Result};

/// Runtime options shared by every operation started from one animator.
///
/// Missing fields fall back to their defaults when deserializing, so a partial
/// JSON object such as `{ "verify_keyframes_exist": false }` is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Apply a persistent marker class after a successful enter/leave.
    pub use_animation_done_classes: bool,
    /// Marker applied after a successful enter.
    pub animation_entered_class: String,
    /// Marker applied after a successful leave.
    pub animation_left_class: String,
    /// Require a matching `@keyframes` rule before trusting a changed `animation-name`.
    pub verify_keyframes_exist: bool,
    /// Added to the element's `animation-delay` to bound the wait for a start event.
    pub timeout_grace_ms: u32,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            use_animation_done_classes: false,
            animation_entered_class: "au-entered".to_string(),
            animation_left_class: "au-left".to_string(),
            verify_keyframes_exist: true,
            timeout_grace_ms: 50,
        }
    }
}

impl AnimatorConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| AnimatorError::Config {
            reason: e.to_string(),
        })
    }

    /// Both done-marker classes; enter and leave clear them before starting.
    pub fn done_classes(&self) -> [&str; 2] {
        [&self.animation_entered_class, &self.animation_left_class]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AnimatorConfig::default();
        assert!(!cfg.use_animation_done_classes);
        assert!(cfg.verify_keyframes_exist);
        assert_eq!(cfg.done_classes(), ["au-entered", "au-left"]);
        assert_eq!(cfg.timeout_grace_ms, 50);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg =
            AnimatorConfig::from_json(r#"{ "verify_keyframes_exist": false, "timeout_grace_ms": 120 }"#)
                .unwrap();
        assert!(!cfg.verify_keyframes_exist);
        assert_eq!(cfg.timeout_grace_ms, 120);
        assert_eq!(cfg.animation_left_class, "au-left");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = AnimatorConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, AnimatorError::Config { .. }));
    }
}
