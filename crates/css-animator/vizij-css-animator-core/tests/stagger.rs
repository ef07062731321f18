use vizij_css_animator_core::stagger::pending_attribute;
use vizij_css_animator_core::Direction;
use vizij_test_fixtures::{FakeDocument, Harness};

fn harness() -> Harness {
    Harness::new(FakeDocument::from_fixtures(&["animation"]).expect("animation fixture loads"))
}

#[test]
fn siblings_activate_one_parent_delay_apart() {
    let mut h = harness();
    let parent = h.doc.create_element(None, &["au-stagger"]);
    let kids: Vec<_> = (0..3)
        .map(|_| h.doc.create_element(Some(parent), &["animated-item"]))
        .collect();

    let outs: Vec<_> = kids
        .iter()
        .map(|kid| {
            let fut = h.animator.enter(kid);
            h.spawn(fut)
        })
        .collect();
    assert_eq!(
        h.doc.attr(parent, &pending_attribute(Direction::Enter)),
        Some("3".to_string())
    );
    assert_eq!(h.doc.events_named("animation:stagger:next").len(), 3);
    // prepare classes go on immediately, activation waits for the slot
    assert!(kids.iter().all(|k| h.doc.has(*k, "au-enter")));
    assert!(!h.doc.has(kids[2], "au-enter-active"));

    h.advance(500.0);
    for out in &outs {
        assert_eq!(out.get(), Some(Ok(true)));
    }
    let activated: Vec<f64> = kids
        .iter()
        .map(|k| h.doc.class_added_at(*k, "au-enter-active")[0])
        .collect();
    assert_eq!(activated, vec![0.0, 100.0, 200.0]);
    assert!((activated[2] - activated[0] - 200.0).abs() < 1.0);

    assert_eq!(
        h.doc.attr(parent, &pending_attribute(Direction::Enter)),
        Some("0".to_string())
    );
    assert_eq!(h.doc.listener_count(), 0);
    assert_eq!(h.doc.pending_timers(), 0);
}

#[test]
fn counter_is_released_on_timeout_paths() {
    let mut h = harness();
    let parent = h.doc.create_element(None, &["au-stagger"]);
    let kids: Vec<_> = (0..3)
        .map(|_| {
            let kid = h.doc.create_element(Some(parent), &["animated-item"]);
            h.doc.suppress_playback(kid);
            kid
        })
        .collect();
    let attribute = pending_attribute(Direction::Leave);

    let outs: Vec<_> = kids
        .iter()
        .map(|kid| {
            let fut = h.animator.leave(kid);
            h.spawn(fut)
        })
        .collect();
    assert_eq!(h.doc.attr(parent, &attribute), Some("3".to_string()));

    // first sibling: activated at 0, gave up at 0 + grace
    h.advance(60.0);
    assert_eq!(outs[0].get(), Some(Ok(false)));
    assert_eq!(h.doc.attr(parent, &attribute), Some("2".to_string()));

    // last sibling: activated at 200, gave up at 250
    h.advance(190.0);
    for out in &outs {
        assert_eq!(out.get(), Some(Ok(false)));
    }
    assert_eq!(h.doc.attr(parent, &attribute), Some("0".to_string()));
    assert_eq!(h.doc.event_time("animation:leave:timeout", kids[2]), Some(250.0));
}

#[test]
fn immediate_settlement_frees_the_slot_for_the_next_sibling() {
    let mut h = harness();
    let parent = h.doc.create_element(None, &["au-stagger"]);
    let a = h.doc.create_element(Some(parent), &["plain"]);
    let b = h.doc.create_element(Some(parent), &["plain"]);

    let first = h.spawn(h.animator.enter(&a));
    let second = h.spawn(h.animator.enter(&b));

    // nothing animated, so each slot is returned before the next is claimed
    assert_eq!(first.get(), Some(Ok(false)));
    assert_eq!(second.get(), Some(Ok(false)));
    assert_eq!(h.doc.class_added_at(b, "au-enter-active"), vec![0.0]);
    assert_eq!(
        h.doc.attr(parent, &pending_attribute(Direction::Enter)),
        Some("0".to_string())
    );
}

#[test]
fn direction_specific_marker_only_staggers_that_direction() {
    let mut h = harness();
    let parent = h.doc.create_element(None, &["au-stagger-leave"]);
    let a = h.doc.create_element(Some(parent), &["animated-item"]);
    let b = h.doc.create_element(Some(parent), &["animated-item"]);

    let entering: Vec<_> = [a, b]
        .iter()
        .map(|kid| {
            let fut = h.animator.enter(kid);
            h.spawn(fut)
        })
        .collect();
    assert!(h.doc.events_named("animation:stagger:next").is_empty());
    assert_eq!(h.doc.attr(parent, &pending_attribute(Direction::Enter)), None);
    assert_eq!(h.doc.class_added_at(b, "au-enter-active"), vec![0.0]);

    h.advance(300.0);
    assert!(entering.iter().all(|o| o.get() == Some(Ok(true))));

    let leaving: Vec<_> = [a, b]
        .iter()
        .map(|kid| {
            let fut = h.animator.leave(kid);
            h.spawn(fut)
        })
        .collect();
    assert_eq!(h.doc.events_named("animation:stagger:next").len(), 2);

    h.advance(400.0);
    assert!(leaving.iter().all(|o| o.get() == Some(Ok(true))));
    assert_eq!(h.doc.class_added_at(b, "au-leave-active"), vec![400.0]);
    assert_eq!(
        h.doc.attr(parent, &pending_attribute(Direction::Leave)),
        Some("0".to_string())
    );
}

#[test]
fn class_operations_are_never_staggered() {
    let mut h = harness();
    let parent = h.doc.create_element(None, &["au-stagger"]);
    let a = h.doc.create_element(Some(parent), &["animated-item"]);
    let b = h.doc.create_element(Some(parent), &["animated-item"]);

    let _first = h.spawn(h.animator.add_class(&a, "highlight", false));
    let _second = h.spawn(h.animator.add_class(&b, "highlight", false));
    assert_eq!(h.doc.class_added_at(b, "highlight-add"), vec![0.0]);
    assert!(h.doc.events_named("animation:stagger:next").is_empty());
}
