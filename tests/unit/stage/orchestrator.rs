use super::*;
use crate::animation::keyframe::Keyframe;
use crate::animation::timeline::{Repeat, TimelineState};
use crate::foundation::core::Rect;
use crate::scroll::trigger::TogglePolicy;
use crate::target::tree::SceneTree;

fn scene() -> SceneTree {
    let mut tree = SceneTree::new();
    tree.insert("hero", &[], Rect::new(0.0, 0.0, 100.0, 100.0));
    tree.insert("track", &["marquee"], Rect::new(0.0, 900.0, 400.0, 960.0));
    tree
}

fn slide(prop: Property, to: f64, duration: f64) -> TimelineSpec {
    TimelineSpec::new(
        Keyframe::new().with(prop.clone(), 0.0),
        Keyframe::new().with(prop, to),
        duration,
    )
    .unwrap()
}

fn stage(width: f64) -> Orchestrator {
    Orchestrator::new(ViewportConfig::default(), width, 800.0, 7).unwrap()
}

fn hero() -> VisualTarget {
    VisualTarget::selector("#hero")
}

fn responsive_hero(o: &mut Orchestrator, tree: &SceneTree) -> ScopeHandle {
    o.open_responsive(
        hero(),
        |b: &mut ScopeBuilder<'_>| {
            if b.mode() == ViewportMode::Wide {
                b.timeline(hero(), slide(Property::X, 100.0, 2.0).repeat(Repeat::Infinite))?;
            } else {
                b.timeline(hero(), slide(Property::Y, 50.0, 1.0))?;
            }
            Ok(())
        },
        tree,
    )
    .unwrap()
}

#[test]
fn construction_measures_and_listens() {
    let o = stage(1200.0);
    assert_eq!(o.mode(), ViewportMode::Wide);
    assert_eq!(o.subscriptions().active(ListenerKind::Resize), 1);
    assert!(stage(500.0).mode().is_compact());
    assert!(Orchestrator::new(ViewportConfig::default(), 1200.0, 0.0, 0).is_err());
}

#[test]
fn mode_flip_replaces_responsive_scope() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let h = responsive_hero(&mut o, &tree);
    let wide_id = o.scope(h).unwrap().id();
    let wide_tl = o.scope(h).unwrap().timelines().next().unwrap().0;
    let wide_handle = TimelineHandle {
        scope: wide_id,
        timeline: wide_tl,
    };

    o.tick(0.0, &mut tree);
    o.tick(0.5, &mut tree);
    let el = tree.by_name("hero").unwrap();
    assert_eq!(tree.number(el, &Property::X), Some(25.0));
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);

    o.on_resize(500.0, 800.0, &mut tree);
    assert_eq!(o.mode(), ViewportMode::Compact);
    let scope = o.scope(h).unwrap();
    assert_ne!(scope.id(), wide_id);
    assert_eq!(scope.mode(), ViewportMode::Compact);
    assert!(o.timeline(wide_handle).is_none());
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);

    o.tick(1.0, &mut tree);
    assert_eq!(tree.number(el, &Property::X), Some(25.0));
    assert_eq!(tree.number(el, &Property::Y), Some(25.0));
}

#[test]
fn debounced_resize_settles_on_tick() {
    let mut tree = scene();
    let config = ViewportConfig {
        debounce_secs: 0.2,
        ..ViewportConfig::default()
    };
    let mut o = Orchestrator::new(config, 1200.0, 800.0, 0).unwrap();
    o.tick(1.0, &mut tree);
    o.on_resize(500.0, 800.0, &mut tree);
    assert_eq!(o.mode(), ViewportMode::Wide);
    o.tick(1.1, &mut tree);
    assert_eq!(o.mode(), ViewportMode::Wide);
    o.tick(1.3, &mut tree);
    assert_eq!(o.mode(), ViewportMode::Compact);
}

#[test]
fn dispose_is_idempotent_and_stale_handles_are_inert() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let h = o.open(hero());
    let th = o
        .register_timeline(h, hero(), slide(Property::X, 100.0, 1.0), None, &tree)
        .unwrap()
        .unwrap();
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);

    assert!(o.dispose(h));
    assert!(!o.dispose(h));
    assert_eq!(o.subscriptions().total_active(), 1);

    o.halt(th);
    o.run(th, Direction::Forward, &tree);
    o.reset(th, &mut tree);
    assert!(o.timeline(th).is_none());
    let again = o.register_timeline(h, hero(), slide(Property::X, 1.0, 1.0), None, &tree);
    assert!(matches!(again, Ok(None)));

    let before = tree.total_writes();
    o.tick(0.5, &mut tree);
    assert_eq!(tree.total_writes(), before);
}

#[test]
fn timeline_controls_reach_live_timelines() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let h = o.open(hero());
    let th = o
        .register_timeline(h, hero(), slide(Property::X, 100.0, 1.0), None, &tree)
        .unwrap()
        .unwrap();
    o.tick(0.0, &mut tree);
    o.tick(0.5, &mut tree);
    o.halt(th);
    assert_eq!(o.timeline(th).unwrap().state(), TimelineState::Paused);
    o.run(th, Direction::Backward, &tree);
    o.tick(0.75, &mut tree);
    let el = tree.by_name("hero").unwrap();
    assert_eq!(tree.number(el, &Property::X), Some(25.0));
    o.reset(th, &mut tree);
    assert_eq!(tree.number(el, &Property::X), Some(0.0));
    assert_eq!(o.timeline(th).unwrap().state(), TimelineState::Idle);
}

#[test]
fn binding_already_past_its_line_plays_at_registration() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let h = o.open(hero());
    let binding = ScrollBinding::new(hero(), 0.8, TogglePolicy::PlayOnce).unwrap();
    let th = o
        .register_timeline(h, hero(), slide(Property::Opacity, 1.0, 1.0), Some(binding), &tree)
        .unwrap()
        .unwrap();
    assert!(o.timeline(th).unwrap().is_running());
    assert_eq!(o.subscriptions().active(ListenerKind::Scroll), 1);
    o.tick(0.0, &mut tree);
    o.tick(1.0, &mut tree);
    let el = tree.by_name("hero").unwrap();
    assert_eq!(tree.number(el, &Property::Opacity), Some(1.0));
}

#[test]
fn marquee_translates_measures_and_switches_speed() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let speeds = MarqueeSpeeds {
        speed: 100.0,
        compact_speed: Some(50.0),
    };
    let id = o
        .add_marquee(VisualTarget::selector(".marquee"), None, speeds, &tree)
        .unwrap();
    assert_eq!(o.marquee(id).unwrap().content_width(), 400.0);

    o.tick(0.0, &mut tree);
    o.tick(1.0, &mut tree);
    let track = tree.by_name("track").unwrap();
    assert_eq!(tree.number(track, &Property::X), Some(-100.0));
    o.tick(3.0, &mut tree);
    assert_eq!(tree.number(track, &Property::X), Some(-100.0));

    tree.set_rect(track, Rect::new(0.0, 900.0, 300.0, 960.0));
    o.on_resize(500.0, 800.0, &mut tree);
    let m = o.marquee(id).unwrap();
    assert_eq!(m.content_width(), 300.0);
    assert_eq!(m.speed(), 50.0);
    assert!(m.offset() < m.period());

    o.marquee_mut(id).unwrap().pause();
    let before = tree.number(track, &Property::X);
    o.tick(4.0, &mut tree);
    assert_eq!(tree.number(track, &Property::X), before);

    assert!(o.remove_marquee(id));
    assert!(!o.remove_marquee(id));
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
}

#[test]
fn carousel_pause_releases_its_listener() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let id = o
        .start_carousel(vec!["a".into(), "b".into(), "c".into()], 5.0)
        .unwrap();
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);
    o.tick(0.0, &mut tree);
    o.tick(5.0, &mut tree);
    assert_eq!(o.carousel(id).unwrap().current(), "b");

    o.pause_carousel(id);
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
    o.tick(20.0, &mut tree);
    assert_eq!(o.carousel(id).unwrap().index(), 1);

    o.resume_carousel(id);
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);
    assert!(o.select(id, 0));
    assert!(!o.select(id, 9));
    assert!(o.stop_carousel(id));
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
}

#[test]
fn burst_holds_a_listener_only_while_emitting() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let id = o
        .add_burst(BurstConfig {
            duration_secs: 3.0,
            tick_interval_secs: 0.25,
            base_intensity: 100.0,
            fire_once: false,
        })
        .unwrap();
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);

    o.tick(0.0, &mut tree);
    assert_eq!(o.fire(id), Some(FireOutcome::Started));
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);
    o.tick(1.0, &mut tree);
    let first = o.take_emissions();
    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|(b, _)| *b == id));
    assert!(o.take_emissions().is_empty());

    o.tick(3.0, &mut tree);
    assert_eq!(o.take_emissions().len(), 7);
    assert!(!o.burst(id).unwrap().is_active());
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
}

#[test]
fn burst_releases_its_listener_once_the_budget_is_spent() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    let id = o
        .add_burst(BurstConfig {
            duration_secs: 1.0,
            tick_interval_secs: 0.3,
            base_intensity: 10.0,
            fire_once: false,
        })
        .unwrap();
    o.tick(0.0, &mut tree);
    o.fire(id);
    o.tick(1.1, &mut tree);
    assert_eq!(o.take_emissions().len(), 4);
    assert!(!o.burst(id).unwrap().is_active());
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
    assert_eq!(o.fire(id), Some(FireOutcome::Started));
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 1);
}

#[test]
fn failed_responsive_build_is_a_scope_error() {
    let tree = scene();
    let mut o = stage(1200.0);
    let err = o
        .open_responsive(
            hero(),
            |b: &mut ScopeBuilder<'_>| {
                let binding = ScrollBinding::new(hero(), 0.8, TogglePolicy::PlayOnce)?;
                b.scroll_timeline(hero(), slide(Property::Y, 10.0, 1.0), binding)?;
                Err(MotionError::config("no layout for this page"))
            },
            &tree,
        )
        .unwrap_err();
    assert!(matches!(err, MotionError::Scope(_)));
    assert!(err.to_string().contains("no layout for this page"));
    assert_eq!(o.subscriptions().active(ListenerKind::Scroll), 0);
    assert_eq!(o.subscriptions().active(ListenerKind::Tick), 0);
}

#[test]
fn shutdown_releases_everything() {
    let mut tree = scene();
    let mut o = stage(1200.0);
    responsive_hero(&mut o, &tree);
    let h = o.open(hero());
    let binding = ScrollBinding::new(hero(), 0.5, TogglePolicy::PlayReverseOnLeave).unwrap();
    o.register_timeline(h, hero(), slide(Property::Y, 10.0, 1.0), Some(binding), &tree)
        .unwrap();
    o.add_marquee(VisualTarget::selector("#track"), Some(400.0), MarqueeSpeeds::uniform(30.0), &tree)
        .unwrap();
    o.start_carousel(vec!["a".into()], 1.0).unwrap();
    let b = o
        .add_burst(BurstConfig {
            duration_secs: 1.0,
            tick_interval_secs: 0.5,
            base_intensity: 10.0,
            fire_once: true,
        })
        .unwrap();
    o.tick(0.0, &mut tree);
    o.fire(b);
    assert!(o.subscriptions().total_active() > 0);

    o.shutdown();
    assert_eq!(o.subscriptions().total_active(), 0);
    let before = tree.total_writes();
    o.tick(1.0, &mut tree);
    o.on_resize(300.0, 800.0, &mut tree);
    assert_eq!(tree.total_writes(), before);
    assert_eq!(o.mode(), ViewportMode::Wide);
}
