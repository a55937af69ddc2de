use super::*;

fn resolver(debounce_secs: f64, width: f64) -> (ViewportModeResolver, Subscriptions) {
    let mut subs = Subscriptions::new();
    let cfg = ViewportConfig {
        breakpoint_px: 768.0,
        debounce_secs,
    };
    let r = ViewportModeResolver::new(cfg, width, &mut subs).unwrap();
    (r, subs)
}

#[test]
fn initial_measurement_is_synchronous() {
    let (r, subs) = resolver(0.0, 375.0);
    assert_eq!(r.mode(), ViewportMode::Compact);
    assert_eq!(subs.active(ListenerKind::Resize), 1);
    let (r, _) = resolver(0.0, 768.0);
    assert_eq!(r.mode(), ViewportMode::Wide);
}

#[test]
fn resize_reports_only_mode_flips() {
    let (mut r, _subs) = resolver(0.0, 1280.0);
    assert_eq!(r.on_resize(1000.0, 0.1), None);
    assert_eq!(r.width(), 1000.0);
    assert_eq!(r.on_resize(500.0, 0.2), Some(ViewportMode::Compact));
    assert_eq!(r.on_resize(400.0, 0.3), None);
    assert_eq!(r.on_resize(900.0, 0.4), Some(ViewportMode::Wide));
}

#[test]
fn storms_of_garbage_never_fail() {
    let (mut r, _subs) = resolver(0.0, 1280.0);
    for i in 0..1000 {
        let w = if i % 3 == 0 { f64::NAN } else { -5.0 };
        assert_eq!(r.on_resize(w, i as f64), None);
    }
    assert_eq!(r.mode(), ViewportMode::Wide);
}

#[test]
fn debounce_commits_after_quiet_period() {
    let (mut r, _subs) = resolver(0.25, 1280.0);
    assert_eq!(r.on_resize(500.0, 1.0), None);
    assert_eq!(r.on_resize(600.0, 1.1), None);
    assert_eq!(r.settle(1.2), None);
    assert_eq!(r.mode(), ViewportMode::Wide);
    assert_eq!(r.settle(1.5), Some(ViewportMode::Compact));
    assert_eq!(r.width(), 600.0);
    assert_eq!(r.settle(2.0), None);
}

#[test]
fn release_is_idempotent_and_stops_listening() {
    let (mut r, mut subs) = resolver(0.0, 1280.0);
    assert!(r.release(&mut subs));
    assert!(!r.release(&mut subs));
    assert_eq!(subs.active(ListenerKind::Resize), 0);
    assert_eq!(r.on_resize(300.0, 1.0), None);
    assert_eq!(r.mode(), ViewportMode::Wide);
}

#[test]
fn bad_configuration_is_rejected() {
    let mut subs = Subscriptions::new();
    let cfg = ViewportConfig {
        breakpoint_px: 0.0,
        debounce_secs: 0.0,
    };
    assert!(ViewportModeResolver::new(cfg, 100.0, &mut subs).is_err());
    assert!(ViewportModeResolver::new(ViewportConfig::default(), f64::NAN, &mut subs).is_err());
    assert_eq!(subs.total_active(), 0);
}
