use std::collections::BTreeSet;

use vizij_css_animator_core::Host;
use vizij_test_fixtures::{FakeDocument, Harness, NodeId};

fn harness() -> Harness {
    Harness::new(FakeDocument::from_fixtures(&["animation"]).expect("animation fixture loads"))
}

/// Replay the recorded class mutations and check that `-add` and `-remove`
/// of `class` never coexist on `node`.
fn assert_suffixes_exclusive(h: &Harness, node: NodeId, initial: &[&str], class: &str) {
    let add = format!("{class}-add");
    let remove = format!("{class}-remove");
    let mut live: BTreeSet<String> = initial.iter().map(|c| c.to_string()).collect();
    for m in h.doc.mutations().into_iter().filter(|m| m.node == node) {
        if m.added {
            live.insert(m.class.clone());
        } else {
            live.remove(&m.class);
        }
        assert!(
            !(live.contains(&add) && live.contains(&remove)),
            "{add} and {remove} both present at {}ms",
            m.at_ms
        );
    }
}

#[test]
fn remove_during_add_pre_empts_the_add() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let added = h.spawn(h.animator.add_class(&el, "highlight", false));
    let removed = h.spawn(h.animator.remove_class(&el, "highlight", false));

    // The add settled on the spot without events of its own
    assert_eq!(added.get(), Some(Ok(false)));
    assert!(h.doc.events_named("animation:add-class:done").is_empty());
    assert!(h.doc.events_named("animation:add-class:timeout").is_empty());
    assert!(!h.doc.has(el, "highlight-add"));
    assert!(h.doc.has(el, "highlight-remove"));

    h.advance(200.0);
    assert_eq!(removed.get(), Some(Ok(true)));
    assert_eq!(h.doc.classes(el), vec!["animated-item".to_string()]);
    assert_eq!(h.doc.finished_animations(el), vec!["fade-out".to_string()]);
    assert_suffixes_exclusive(&h, el, &["animated-item"], "highlight");
    assert_eq!(h.doc.listener_count(), 0);
    assert_eq!(h.doc.pending_timers(), 0);
    assert!(!h.animator.is_animating());
}

#[test]
fn add_during_remove_force_completes_the_remove() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item", "highlight"]);

    let removed = h.spawn(h.animator.remove_class(&el, "highlight", false));
    assert!(h.doc.has(el, "highlight-remove"));
    let added = h.spawn(h.animator.add_class(&el, "highlight", false));

    assert_eq!(removed.get(), Some(Ok(false)));
    assert!(!h.doc.has(el, "highlight-remove"));
    assert!(h.doc.has(el, "highlight-add"));

    h.advance(200.0);
    assert_eq!(added.get(), Some(Ok(true)));
    assert_eq!(
        h.doc.classes(el),
        vec!["animated-item".to_string(), "highlight".to_string()]
    );
    assert_eq!(h.doc.finished_animations(el), vec!["flash".to_string()]);
    assert_suffixes_exclusive(&h, el, &["animated-item", "highlight"], "highlight");
    assert!(h.doc.events_named("animation:remove-class:done").is_empty());
    assert!(h.doc.events_named("animation:remove-class:timeout").is_empty());
}

#[test]
fn pre_empting_a_running_animation_releases_the_counter() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let added = h.spawn(h.animator.add_class(&el, "highlight", false));
    h.advance(100.0);
    assert!(h.animator.is_animating());

    let removed = h.spawn(h.animator.remove_class(&el, "highlight", false));
    assert_eq!(added.get(), Some(Ok(false)));
    h.advance(0.0);
    // only the remove is running now
    assert_eq!(h.animator.animating_count(), 1);

    h.advance(200.0);
    assert_eq!(removed.get(), Some(Ok(true)));
    assert!(!h.animator.is_animating());
    assert_eq!(h.doc.finished_animations(el), vec!["fade-out".to_string()]);
}

#[test]
fn foreign_transitional_class_is_settled_before_adding() {
    let mut h = harness();
    // left behind by someone else's remove
    let el = h
        .doc
        .create_element(None, &["plain", "highlight", "highlight-remove"]);

    let added = h.spawn(h.animator.add_class(&el, "highlight", false));
    assert_eq!(added.get(), Some(Ok(false)));
    assert!(!h.doc.has(el, "highlight-remove"));
    assert!(!h.doc.has(el, "highlight-add"));
    assert!(h.doc.has(el, "highlight"));
}

#[test]
fn remove_proceeds_when_only_the_add_suffix_is_present() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["plain", "highlight-add"]);

    let removed = h.spawn(h.animator.remove_class(&el, "highlight", false));
    assert_eq!(removed.get(), Some(Ok(false)));
    assert_eq!(h.doc.classes(el), vec!["plain".to_string()]);
    assert_eq!(h.doc.events_named("animation:remove-class:begin").len(), 1);
}

#[test]
fn operations_on_other_classes_do_not_interfere() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let highlight = h.spawn(h.animator.add_class(&el, "highlight", false));
    let other = h.spawn(h.animator.remove_class(&el, "other", false));
    assert_eq!(other.get(), Some(Ok(false)));

    h.advance(200.0);
    assert_eq!(highlight.get(), Some(Ok(true)));
}

#[test]
fn repeated_add_settles_the_running_add() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let first = h.spawn(h.animator.add_class(&el, "highlight", false));
    h.advance(50.0);
    assert!(h.animator.is_animating());

    let second = h.spawn(h.animator.add_class(&el, "highlight", false));
    assert_eq!(first.get(), Some(Ok(false)));
    assert!(h.doc.has(el, "highlight-add"));

    h.advance(5000.0);
    assert_eq!(second.get(), Some(Ok(true)));
    assert_eq!(
        h.doc.classes(el),
        vec!["animated-item".to_string(), "highlight".to_string()]
    );
    assert_eq!(h.doc.event_time("animation:add-class:done", el), Some(250.0));
    assert!(h.doc.events_named("animation:add-class:timeout").is_empty());
    assert!(!h.animator.is_animating());
    assert_eq!(h.doc.listener_count(), 0);
    assert_eq!(h.doc.pending_timers(), 0);
}

#[test]
fn repeated_enter_settles_the_running_enter() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let first = h.spawn(h.animator.enter(&el));
    h.advance(50.0);
    let second = h.spawn(h.animator.enter(&el));
    assert_eq!(first.get(), Some(Ok(false)));

    h.advance(0.0);
    assert_eq!(h.animator.animating_count(), 1);

    h.advance(5000.0);
    assert_eq!(second.get(), Some(Ok(true)));
    assert_eq!(h.doc.classes(el), vec!["animated-item".to_string()]);
    assert_eq!(h.doc.events_named("animation:enter:done").len(), 1);
    assert_eq!(h.doc.event_time("animation:enter:done", el), Some(350.0));
    assert!(h.doc.events_named("animation:enter:timeout").is_empty());
    assert_eq!(h.doc.finished_animations(el), vec!["fade-in".to_string()]);
    assert!(!h.animator.is_animating());
    assert_eq!(h.doc.listener_count(), 0);
    assert_eq!(h.doc.pending_timers(), 0);
}

#[test]
fn enter_during_leave_settles_the_leave() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let leaving = h.spawn(h.animator.leave(&el));
    h.advance(100.0);
    let entering = h.spawn(h.animator.enter(&el));
    assert_eq!(leaving.get(), Some(Ok(false)));
    assert!(!h.doc.has(el, "au-leave"));
    assert!(!h.doc.has(el, "au-leave-active"));

    h.advance(300.0);
    assert_eq!(entering.get(), Some(Ok(true)));
    assert_eq!(h.doc.classes(el), vec!["animated-item".to_string()]);
    assert!(!h.animator.is_animating());
    assert_eq!(h.doc.listener_count(), 0);
}

#[test]
fn animation_removed_from_outside_settles_after_its_duration() {
    let mut h = harness();
    let el = h.doc.create_element(None, &["animated-item"]);

    let added = h.spawn(h.animator.add_class(&el, "highlight", false));
    h.advance(50.0);
    assert!(h.animator.is_animating());

    // someone else strips the transitional class mid-animation
    h.doc.remove_class(&el, "highlight-add");
    h.advance(199.0);
    assert!(!added.is_ready());

    // start at 0 + 200ms duration + 50ms grace
    h.advance(1.0);
    assert_eq!(added.get(), Some(Ok(false)));
    assert_eq!(h.doc.event_time("animation:add-class:timeout", el), Some(250.0));
    assert!(h.doc.has(el, "highlight"));
    assert!(!h.animator.is_animating());
    assert_eq!(h.doc.listener_count(), 0);
    assert_eq!(h.doc.pending_timers(), 0);
}
