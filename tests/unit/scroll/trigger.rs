use super::*;
use crate::foundation::core::Rect;
use crate::foundation::subscription::{ListenerKind, Subscriptions};
use crate::target::tree::SceneTree;

const VH: f64 = 1000.0;

/// Trigger element whose top sits at y = 2000 in document space.
fn scene() -> SceneTree {
    let mut tree = SceneTree::new();
    tree.insert("section", &[], Rect::new(0.0, 2000.0, 1200.0, 2600.0));
    tree
}

fn registry(policy: TogglePolicy) -> (ScrollTriggerRegistry<u32>, BindingId, Subscriptions) {
    let mut subs = Subscriptions::new();
    let mut reg = ScrollTriggerRegistry::new();
    let binding = ScrollBinding::new(VisualTarget::selector("#section"), 0.8, policy).unwrap();
    let (id, fresh) = reg.attach(binding, 7, subs.acquire(ListenerKind::Scroll));
    assert!(fresh);
    (reg, id, subs)
}

fn at(y: f64) -> ScrollSample {
    ScrollSample {
        scroll_y: y,
        viewport_height: VH,
    }
}

#[test]
fn threshold_must_be_a_fraction() {
    let t = VisualTarget::selector("#x");
    assert!(ScrollBinding::new(t.clone(), 1.5, TogglePolicy::PlayOnce).is_err());
    assert!(ScrollBinding::new(t.clone(), -0.1, TogglePolicy::PlayOnce).is_err());
    assert!(ScrollBinding::new(t, f64::NAN, TogglePolicy::PlayOnce).is_err());
}

#[test]
fn attaching_arms_and_never_duplicates() {
    let (mut reg, id, mut subs) = registry(TogglePolicy::PlayOnce);
    assert_eq!(reg.state(id), Some(TriggerState::Armed));
    let binding = ScrollBinding::new(VisualTarget::selector("#section"), 0.5, TogglePolicy::PlayOnce)
        .unwrap();
    let (again, fresh) = reg.attach(binding, 7, subs.acquire(ListenerKind::Scroll));
    assert_eq!(again, id);
    assert!(!fresh);
    assert_eq!(reg.len(), 1);
}

#[test]
fn play_once_ignores_later_crossings() {
    let tree = scene();
    let (mut reg, _id, _subs) = registry(TogglePolicy::PlayOnce);
    // Line is at 800px; the section top crosses it at scroll_y = 1200.
    assert!(reg.evaluate(at(0.0), &tree).is_empty());
    assert_eq!(reg.evaluate(at(1300.0), &tree), vec![(7, TriggerAction::Play)]);
    assert!(reg.evaluate(at(100.0), &tree).is_empty());
    assert!(reg.evaluate(at(1300.0), &tree).is_empty());
    assert_eq!(reg.state_of(7), Some(TriggerState::Playing));
}

#[test]
fn reverse_on_leave_plays_forward_then_backward() {
    let tree = scene();
    let (mut reg, _id, _subs) = registry(TogglePolicy::PlayReverseOnLeave);
    reg.evaluate(at(0.0), &tree);
    assert_eq!(reg.evaluate(at(1250.0), &tree), vec![(7, TriggerAction::Play)]);
    // Further downward scrolling does not restart or stack.
    assert!(reg.evaluate(at(1400.0), &tree).is_empty());
    assert_eq!(
        reg.evaluate(at(1100.0), &tree),
        vec![(7, TriggerAction::Run(Direction::Backward))]
    );
    assert_eq!(reg.state_of(7), Some(TriggerState::Reversed));
    assert_eq!(
        reg.evaluate(at(1300.0), &tree),
        vec![(7, TriggerAction::Run(Direction::Forward))]
    );
    assert_eq!(reg.state_of(7), Some(TriggerState::Playing));
}

#[test]
fn replay_each_entry_rearms_after_leaving_viewport() {
    let tree = scene();
    let (mut reg, _id, _subs) = registry(TogglePolicy::ReplayEachEntry);
    reg.evaluate(at(0.0), &tree);
    assert_eq!(reg.evaluate(at(1300.0), &tree), vec![(7, TriggerAction::Play)]);
    // Scroll far past: section bottom (2600) is above the viewport.
    assert!(reg.evaluate(at(2700.0), &tree).is_empty());
    assert_eq!(reg.state_of(7), Some(TriggerState::Armed));
    // Back up above the line, then down again: plays from the start.
    assert!(reg.evaluate(at(500.0), &tree).is_empty());
    assert_eq!(reg.evaluate(at(1300.0), &tree), vec![(7, TriggerAction::Play)]);
}

#[test]
fn already_past_on_first_evaluation_plays() {
    let tree = scene();
    let (mut reg, _id, _subs) = registry(TogglePolicy::PlayOnce);
    assert_eq!(reg.evaluate(at(1500.0), &tree), vec![(7, TriggerAction::Play)]);
}

#[test]
fn missing_trigger_keeps_state() {
    let mut tree = scene();
    let (mut reg, _id, _subs) = registry(TogglePolicy::PlayOnce);
    let section = tree.by_name("section").unwrap();
    tree.unmount(section);
    assert!(reg.evaluate(at(1500.0), &tree).is_empty());
    assert_eq!(reg.state_of(7), Some(TriggerState::Armed));
    tree.remount(section);
    assert_eq!(reg.evaluate(at(1600.0), &tree), vec![(7, TriggerAction::Play)]);
}

#[test]
fn detach_all_returns_every_listener() {
    let (mut reg, _id, mut subs) = registry(TogglePolicy::PlayOnce);
    let binding = ScrollBinding::new(VisualTarget::selector("#other"), 0.5, TogglePolicy::PlayOnce)
        .unwrap();
    reg.attach(binding, 8, subs.acquire(ListenerKind::Scroll));
    assert_eq!(subs.active(ListenerKind::Scroll), 2);
    for token in reg.detach_all() {
        assert!(subs.release(token));
    }
    assert!(reg.is_empty());
    assert_eq!(subs.active(ListenerKind::Scroll), 0);
}
