use super::*;

#[test]
fn counts_by_kind() {
    let mut subs = Subscriptions::new();
    let a = subs.acquire(ListenerKind::Scroll);
    let _b = subs.acquire(ListenerKind::Scroll);
    let _c = subs.acquire(ListenerKind::Resize);
    assert_eq!(subs.active(ListenerKind::Scroll), 2);
    assert_eq!(subs.active(ListenerKind::Resize), 1);
    assert_eq!(subs.active(ListenerKind::Tick), 0);
    assert!(subs.release(a));
    assert_eq!(subs.active(ListenerKind::Scroll), 1);
    assert_eq!(subs.total_active(), 2);
}

#[test]
fn second_release_is_a_noop() {
    let mut subs = Subscriptions::new();
    let id = subs.acquire(ListenerKind::Tick);
    assert!(subs.release(id));
    assert!(!subs.release(id));
    assert_eq!(subs.released(), 1);
    assert!(!subs.is_active(id));
}
