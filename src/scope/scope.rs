use std::collections::BTreeMap;

use crate::{
    animation::timeline::{TickOutcome, Timeline, TimelineSpec},
    foundation::core::ViewportMode,
    foundation::error::MotionResult,
    foundation::subscription::{ListenerKind, SubscriptionId, Subscriptions},
    scroll::trigger::{ScrollBinding, ScrollSample, ScrollTriggerRegistry, TriggerAction, TriggerState},
    target::tree::{RenderTree, VisualTarget},
};

/// Identity of one scope instance. A responsive rebuild produces a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub(crate) u64);

/// Identity of one timeline within its scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimelineId(pub(crate) u64);

/// Handle returned by timeline registration.
///
/// Handles carry the scope instance they came from, so a handle from a disposed scope never
/// reaches a timeline of its replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimelineHandle {
    pub scope: ScopeId,
    pub timeline: TimelineId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeState {
    Active,
    Disposed,
}

#[derive(Debug)]
struct Entry {
    timeline: Timeline,
    tick: SubscriptionId,
}

/// Lifecycle container owning every timeline and scroll binding registered under one root.
///
/// Every operation on a disposed scope is a silent no-op.
#[derive(Debug)]
pub struct AnimationScope {
    id: ScopeId,
    root: VisualTarget,
    mode: ViewportMode,
    seed: u64,
    state: ScopeState,
    entries: BTreeMap<TimelineId, Entry>,
    triggers: ScrollTriggerRegistry<TimelineId>,
    next_timeline: u64,
}

impl AnimationScope {
    /// Open a scope bound to `root`, built under viewport `mode`.
    pub fn open(id: ScopeId, root: VisualTarget, mode: ViewportMode, seed: u64) -> Self {
        tracing::debug!(scope = id.0, ?root, ?mode, "scope opened");
        Self {
            id,
            root,
            mode,
            seed,
            state: ScopeState::Active,
            entries: BTreeMap::new(),
            triggers: ScrollTriggerRegistry::new(),
            next_timeline: 0,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn root(&self) -> &VisualTarget {
        &self.root
    }

    /// Viewport mode this scope was built under.
    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScopeState::Active
    }

    /// Register a timeline on `target`.
    ///
    /// Without a binding the timeline starts playing immediately; with one it waits for its
    /// trigger. Invalid specs or bindings fail here. On a disposed scope this returns
    /// `Ok(None)` and registers nothing.
    pub fn register_timeline<R: RenderTree + ?Sized>(
        &mut self,
        target: VisualTarget,
        spec: TimelineSpec,
        binding: Option<ScrollBinding>,
        subs: &mut Subscriptions,
        tree: &R,
    ) -> MotionResult<Option<TimelineHandle>> {
        if !self.is_active() {
            tracing::debug!(scope = self.id.0, "register on disposed scope ignored");
            return Ok(None);
        }
        if let Some(b) = &binding {
            b.validate()?;
        }
        let id = TimelineId(self.next_timeline);
        let seed = self.seed ^ self.id.0.rotate_left(32);
        let mut timeline = Timeline::new(id.0, seed, spec, target)?;
        self.next_timeline += 1;

        match binding {
            Some(binding) => {
                // Timeline ids are never reused within a scope, so the key is always fresh.
                let listener = subs.acquire(ListenerKind::Scroll);
                self.triggers.attach(binding, id, listener);
            }
            None => timeline.play(tree),
        }
        let tick = subs.acquire(ListenerKind::Tick);
        self.entries.insert(id, Entry { timeline, tick });
        Ok(Some(TimelineHandle {
            scope: self.id,
            timeline: id,
        }))
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.entries.get(&id).map(|e| &e.timeline)
    }

    /// Mutable access for halt/run/reset. `None` once disposed.
    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        if !self.is_active() {
            return None;
        }
        self.entries.get_mut(&id).map(|e| &mut e.timeline)
    }

    pub fn timelines(&self) -> impl Iterator<Item = (TimelineId, &Timeline)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, &e.timeline))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Trigger state for a scroll-bound timeline.
    pub fn trigger_state(&self, id: TimelineId) -> Option<TriggerState> {
        self.triggers.state_of(id)
    }

    /// Advance every running timeline by `dt` seconds.
    pub fn tick<R: RenderTree + ?Sized>(&mut self, dt: f64, tree: &mut R) {
        if !self.is_active() {
            return;
        }
        for (id, entry) in &mut self.entries {
            if entry.timeline.tick(dt, tree) == TickOutcome::Settled {
                tracing::trace!(scope = self.id.0, timeline = id.0, "timeline settled");
            }
        }
    }

    /// Evaluate scroll bindings and start or turn around their timelines.
    pub fn on_scroll<R: RenderTree + ?Sized>(&mut self, sample: ScrollSample, tree: &R) {
        if !self.is_active() {
            return;
        }
        for (id, action) in self.triggers.evaluate(sample, tree) {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            match action {
                TriggerAction::Play => entry.timeline.play(tree),
                TriggerAction::Run(dir) => entry.timeline.run(dir, tree),
            }
        }
    }

    /// Cancel every timeline where it stands and release every listener.
    ///
    /// Returns `false` if the scope was already disposed.
    pub fn dispose(&mut self, subs: &mut Subscriptions) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = ScopeState::Disposed;
        for entry in self.entries.values_mut() {
            entry.timeline.cancel();
            subs.release(entry.tick);
        }
        for listener in self.triggers.detach_all() {
            subs.release(listener);
        }
        tracing::debug!(scope = self.id.0, timelines = self.entries.len(), "scope disposed");
        true
    }
}

/// Registration surface handed to scope builders.
pub struct ScopeBuilder<'a> {
    scope: &'a mut AnimationScope,
    subs: &'a mut Subscriptions,
    tree: &'a dyn RenderTree,
}

impl<'a> ScopeBuilder<'a> {
    pub(crate) fn new(
        scope: &'a mut AnimationScope,
        subs: &'a mut Subscriptions,
        tree: &'a dyn RenderTree,
    ) -> Self {
        Self { scope, subs, tree }
    }

    /// Viewport mode the scope is being built for.
    pub fn mode(&self) -> ViewportMode {
        self.scope.mode()
    }

    pub fn root(&self) -> &VisualTarget {
        self.scope.root()
    }

    /// Register an autoplaying timeline.
    pub fn timeline(
        &mut self,
        target: VisualTarget,
        spec: TimelineSpec,
    ) -> MotionResult<Option<TimelineHandle>> {
        self.scope
            .register_timeline(target, spec, None, self.subs, self.tree)
    }

    /// Register a timeline that waits for its scroll trigger.
    pub fn scroll_timeline(
        &mut self,
        target: VisualTarget,
        spec: TimelineSpec,
        binding: ScrollBinding,
    ) -> MotionResult<Option<TimelineHandle>> {
        self.scope
            .register_timeline(target, spec, Some(binding), self.subs, self.tree)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scope/scope.rs"]
mod tests;
