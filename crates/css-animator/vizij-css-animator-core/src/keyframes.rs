//! Animation-name inspection and `@keyframes` verification.

use log::trace;

use crate::host::Host;
use crate::resolver::{resolve_style, StyleResolver};

/// Split a computed `animation-name` value, dropping `none` entries.
pub fn parse_animation_names(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "none")
        .map(str::to_string)
        .collect()
}

pub fn animation_names<H: Host>(
    host: &H,
    resolver: &dyn StyleResolver,
    element: &H::Element,
) -> Vec<String> {
    parse_animation_names(&resolve_style(host, resolver, element, "animation-name"))
}

/// Names present in `current` that were not in `previous`.
pub fn new_animation_names<'a>(current: &'a [String], previous: &[String]) -> Vec<&'a str> {
    current
        .iter()
        .filter(|name| !previous.contains(name))
        .map(String::as_str)
        .collect()
}

/// Whether any readable stylesheet defines a keyframes rule for one of `names`.
///
/// Unreadable sheets count as not containing the rule. Sheets are rescanned on
/// every call so rules added at runtime are seen.
pub fn keyframes_exist<H: Host>(host: &H, names: &[&str]) -> bool {
    for sheet in 0..host.style_sheet_count() {
        match host.keyframes_names(sheet) {
            Ok(rules) => {
                if rules.iter().any(|rule| names.contains(&rule.as_str())) {
                    return true;
                }
            }
            Err(err) => trace!("keyframes lookup skipped: {err}"),
        }
    }
    false
}

/// True when the class change introduced an animation worth waiting for.
pub fn has_new_animation<H: Host>(
    host: &H,
    verify_keyframes: bool,
    current: &[String],
    previous: &[String],
) -> bool {
    let added = new_animation_names(current, previous);
    if added.is_empty() {
        return false;
    }
    !verify_keyframes || keyframes_exist(host, &added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn none_is_an_empty_set() {
        assert!(parse_animation_names("none").is_empty());
        assert!(parse_animation_names("").is_empty());
        assert_eq!(parse_animation_names("fade, none, spin"), names(&["fade", "spin"]));
    }

    #[test]
    fn only_names_absent_before_are_new() {
        let prev = names(&["fade"]);
        let cur = names(&["fade", "spin"]);
        assert_eq!(new_animation_names(&cur, &prev), vec!["spin"]);
        assert!(new_animation_names(&prev, &cur).is_empty());
    }
}
