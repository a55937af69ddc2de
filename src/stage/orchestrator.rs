use std::collections::BTreeMap;

use crate::{
    animation::timeline::{Timeline, TimelineSpec},
    foundation::core::{Direction, PropValue, Property, ViewportMode},
    foundation::error::{MotionError, MotionResult, require_positive},
    foundation::subscription::{ListenerKind, SubscriptionId, Subscriptions},
    motion::burst::{BurstConfig, BurstScheduler, Emission, FireOutcome},
    motion::carousel::CarouselScheduler,
    motion::marquee::MarqueeLoop,
    scope::scope::{AnimationScope, ScopeBuilder, ScopeId, TimelineHandle},
    scroll::trigger::{ScrollBinding, ScrollSample},
    target::tree::{RenderTree, VisualTarget},
    viewport::mode::{ViewportConfig, ViewportModeResolver},
};

/// Stable handle to a scope slot. Responsive slots keep their handle across rebuilds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarqueeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CarouselId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BurstId(u64);

/// Builder closure for a responsive scope; re-run under the new mode on every flip.
pub type ScopeBuildFn = Box<dyn FnMut(&mut ScopeBuilder<'_>) -> MotionResult<()>>;

struct ScopeSlot {
    scope: AnimationScope,
    builder: Option<ScopeBuildFn>,
}

/// Marquee speed, optionally different in compact layouts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarqueeSpeeds {
    /// Signed pixels per second.
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compact_speed: Option<f64>,
}

impl MarqueeSpeeds {
    pub fn uniform(speed: f64) -> Self {
        Self {
            speed,
            compact_speed: None,
        }
    }

    pub fn for_mode(&self, mode: ViewportMode) -> f64 {
        match mode {
            ViewportMode::Compact => self.compact_speed.unwrap_or(self.speed),
            ViewportMode::Wide => self.speed,
        }
    }
}

struct MarqueeSlot {
    target: VisualTarget,
    fixed_width: Option<f64>,
    speeds: MarqueeSpeeds,
    /// Built once the content width is known.
    marquee: Option<MarqueeLoop>,
    listener: SubscriptionId,
}

struct CarouselSlot {
    carousel: CarouselScheduler<String>,
    listener: Option<SubscriptionId>,
}

struct BurstSlot {
    burst: BurstScheduler,
    listener: Option<SubscriptionId>,
}

/// Shared clock and owner of every orchestration component on a page.
///
/// Per tick the viewport mode settles first (and responsive scopes are replaced), then scope
/// timelines, marquees, carousels and bursts advance in that order.
pub struct Orchestrator {
    seed: u64,
    subs: Subscriptions,
    viewport: ViewportModeResolver,
    scroll: ScrollSample,
    now: Option<f64>,
    next_id: u64,
    scopes: BTreeMap<ScopeHandle, ScopeSlot>,
    marquees: BTreeMap<MarqueeId, MarqueeSlot>,
    carousels: BTreeMap<CarouselId, CarouselSlot>,
    bursts: BTreeMap<BurstId, BurstSlot>,
    emissions: Vec<(BurstId, Emission)>,
}

impl Orchestrator {
    /// Measure the viewport once and start listening for resizes.
    pub fn new(
        viewport: ViewportConfig,
        initial_width: f64,
        viewport_height: f64,
        seed: u64,
    ) -> MotionResult<Self> {
        require_positive("viewport height", viewport_height)?;
        let mut subs = Subscriptions::new();
        let viewport = ViewportModeResolver::new(viewport, initial_width, &mut subs)?;
        Ok(Self {
            seed,
            subs,
            viewport,
            scroll: ScrollSample {
                scroll_y: 0.0,
                viewport_height,
            },
            now: None,
            next_id: 0,
            scopes: BTreeMap::new(),
            marquees: BTreeMap::new(),
            carousels: BTreeMap::new(),
            bursts: BTreeMap::new(),
            emissions: Vec::new(),
        })
    }

    pub fn mode(&self) -> ViewportMode {
        self.viewport.mode()
    }

    pub fn viewport(&self) -> &ViewportModeResolver {
        &self.viewport
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subs
    }

    /// Time of the last tick.
    pub fn now(&self) -> Option<f64> {
        self.now
    }

    pub fn scroll(&self) -> ScrollSample {
        self.scroll
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---------------------------------------------------------------------------------------
    // Scopes
    // ---------------------------------------------------------------------------------------

    /// Open a plain scope under the current mode.
    #[tracing::instrument(skip(self))]
    pub fn open(&mut self, root: VisualTarget) -> ScopeHandle {
        let handle = ScopeHandle(self.next_id());
        let scope = AnimationScope::open(ScopeId(self.next_id()), root, self.mode(), self.seed);
        self.scopes.insert(
            handle,
            ScopeSlot {
                scope,
                builder: None,
            },
        );
        handle
    }

    /// Open a scope whose timelines come from `build`, re-run from scratch on every mode flip.
    ///
    /// A builder error on first open fails the call with [`MotionError::Scope`] and leaves
    /// nothing behind.
    pub fn open_responsive<R, F>(
        &mut self,
        root: VisualTarget,
        build: F,
        tree: &R,
    ) -> MotionResult<ScopeHandle>
    where
        R: RenderTree,
        F: FnMut(&mut ScopeBuilder<'_>) -> MotionResult<()> + 'static,
    {
        let mut build: ScopeBuildFn = Box::new(build);
        let handle = ScopeHandle(self.next_id());
        let mut scope = AnimationScope::open(ScopeId(self.next_id()), root, self.mode(), self.seed);
        if let Err(e) = build(&mut ScopeBuilder::new(&mut scope, &mut self.subs, tree)) {
            scope.dispose(&mut self.subs);
            return Err(MotionError::scope(format!("build responsive scope: {e}")));
        }
        self.scopes.insert(
            handle,
            ScopeSlot {
                scope,
                builder: Some(build),
            },
        );
        self.evaluate_scroll_for(handle, tree);
        Ok(handle)
    }

    /// Register a timeline in a plain or responsive scope.
    ///
    /// Unknown or disposed scopes yield `Ok(None)`. Timelines added this way to a responsive
    /// scope do not survive a mode flip; register those from its builder instead.
    pub fn register_timeline<R: RenderTree>(
        &mut self,
        handle: ScopeHandle,
        target: VisualTarget,
        spec: TimelineSpec,
        binding: Option<ScrollBinding>,
        tree: &R,
    ) -> MotionResult<Option<TimelineHandle>> {
        let Some(slot) = self.scopes.get_mut(&handle) else {
            return Ok(None);
        };
        let bound = binding.is_some();
        let registered = slot
            .scope
            .register_timeline(target, spec, binding, &mut self.subs, tree)?;
        if bound {
            self.evaluate_scroll_for(handle, tree);
        }
        Ok(registered)
    }

    /// Dispose a scope. Returns `false` for unknown or already-disposed handles.
    #[tracing::instrument(skip(self))]
    pub fn dispose(&mut self, handle: ScopeHandle) -> bool {
        match self.scopes.remove(&handle) {
            Some(mut slot) => slot.scope.dispose(&mut self.subs),
            None => false,
        }
    }

    pub fn scope(&self, handle: ScopeHandle) -> Option<&AnimationScope> {
        self.scopes.get(&handle).map(|s| &s.scope)
    }

    fn scope_of_mut(&mut self, th: TimelineHandle) -> Option<&mut AnimationScope> {
        self.scopes
            .values_mut()
            .map(|s| &mut s.scope)
            .find(|s| s.id() == th.scope)
    }

    pub fn timeline(&self, th: TimelineHandle) -> Option<&Timeline> {
        self.scopes
            .values()
            .map(|s| &s.scope)
            .find(|s| s.id() == th.scope)
            .and_then(|s| s.timeline(th.timeline))
    }

    /// Stop a timeline where it stands.
    pub fn halt(&mut self, th: TimelineHandle) {
        if let Some(tl) = self.scope_of_mut(th).and_then(|s| s.timeline_mut(th.timeline)) {
            tl.halt();
        }
    }

    /// Run a timeline in `dir` from its current playhead.
    pub fn run<R: RenderTree>(&mut self, th: TimelineHandle, dir: Direction, tree: &R) {
        if let Some(tl) = self.scope_of_mut(th).and_then(|s| s.timeline_mut(th.timeline)) {
            tl.run(dir, tree);
        }
    }

    /// Restart a timeline from zero.
    pub fn replay<R: RenderTree>(&mut self, th: TimelineHandle, tree: &R) {
        if let Some(tl) = self.scope_of_mut(th).and_then(|s| s.timeline_mut(th.timeline)) {
            tl.play(tree);
        }
    }

    /// Rewind a timeline and write its from-keyframe.
    pub fn reset<R: RenderTree>(&mut self, th: TimelineHandle, tree: &mut R) {
        if let Some(tl) = self.scope_of_mut(th).and_then(|s| s.timeline_mut(th.timeline)) {
            tl.reset(tree);
        }
    }

    fn evaluate_scroll_for<R: RenderTree>(&mut self, handle: ScopeHandle, tree: &R) {
        let sample = self.scroll;
        if let Some(slot) = self.scopes.get_mut(&handle) {
            slot.scope.on_scroll(sample, tree);
        }
    }

    fn rebuild_responsive<R: RenderTree>(&mut self, mode: ViewportMode, tree: &R) {
        let sample = self.scroll;
        for (handle, slot) in self.scopes.iter_mut() {
            let Some(build) = slot.builder.as_mut() else {
                continue;
            };
            let root = slot.scope.root().clone();
            slot.scope.dispose(&mut self.subs);

            let id = ScopeId(self.next_id);
            self.next_id += 1;
            slot.scope = AnimationScope::open(id, root, mode, self.seed);
            if let Err(e) = build(&mut ScopeBuilder::new(&mut slot.scope, &mut self.subs, tree)) {
                tracing::warn!(scope = ?handle, error = %e, "responsive rebuild failed; scope left static");
                slot.scope.dispose(&mut self.subs);
                continue;
            }
            slot.scope.on_scroll(sample, tree);
        }
    }

    // ---------------------------------------------------------------------------------------
    // Host events
    // ---------------------------------------------------------------------------------------

    /// Advance everything to `now` (seconds, monotonic).
    #[tracing::instrument(level = "trace", skip(self, tree))]
    pub fn tick<R: RenderTree>(&mut self, now: f64, tree: &mut R) {
        let dt = match self.now {
            Some(prev) if now > prev => now - prev,
            _ => 0.0,
        };
        self.now = Some(self.now.map_or(now, |prev| prev.max(now)));

        if let Some(mode) = self.viewport.settle(now) {
            self.apply_mode(mode, &*tree);
        }

        for slot in self.scopes.values_mut() {
            slot.scope.tick(dt, tree);
        }
        self.tick_marquees(dt, tree);
        for slot in self.carousels.values_mut() {
            if let Some(index) = slot.carousel.tick(dt) {
                tracing::trace!(index, "carousel advanced");
            }
        }
        self.tick_bursts(now);
    }

    /// New scroll position; evaluates every scope's triggers.
    #[tracing::instrument(level = "debug", skip(self, tree))]
    pub fn on_scroll<R: RenderTree>(&mut self, scroll_y: f64, tree: &R) {
        if !scroll_y.is_finite() {
            return;
        }
        self.scroll.scroll_y = scroll_y;
        let sample = self.scroll;
        for slot in self.scopes.values_mut() {
            slot.scope.on_scroll(sample, tree);
        }
    }

    /// New viewport size. A mode flip replaces responsive scopes before triggers re-evaluate.
    #[tracing::instrument(level = "debug", skip(self, tree))]
    pub fn on_resize<R: RenderTree>(&mut self, width: f64, viewport_height: f64, tree: &mut R) {
        if viewport_height.is_finite() && viewport_height > 0.0 {
            self.scroll.viewport_height = viewport_height;
        }
        let now = self.now.unwrap_or(0.0);
        if let Some(mode) = self.viewport.on_resize(width, now) {
            self.apply_mode(mode, &*tree);
        }
        self.remeasure_marquees(&*tree);
        let sample = self.scroll;
        for slot in self.scopes.values_mut() {
            slot.scope.on_scroll(sample, &*tree);
        }
    }

    fn apply_mode<R: RenderTree>(&mut self, mode: ViewportMode, tree: &R) {
        self.rebuild_responsive(mode, tree);
        for slot in self.marquees.values_mut() {
            if let Some(m) = slot.marquee.as_mut() {
                if let Err(e) = m.set_speed(slot.speeds.for_mode(mode)) {
                    tracing::trace!(error = %e, "marquee speed change ignored");
                }
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Marquees
    // ---------------------------------------------------------------------------------------

    /// Add a marquee translating `target`. Without `content_width`, the target is measured.
    pub fn add_marquee<R: RenderTree>(
        &mut self,
        target: VisualTarget,
        content_width: Option<f64>,
        speeds: MarqueeSpeeds,
        tree: &R,
    ) -> MotionResult<MarqueeId> {
        // Validate every speed and width up front.
        MarqueeLoop::new(content_width.unwrap_or(1.0), speeds.speed)?;
        if let Some(s) = speeds.compact_speed {
            MarqueeLoop::new(1.0, s)?;
        }
        let mut slot = MarqueeSlot {
            target,
            fixed_width: content_width,
            speeds,
            marquee: None,
            listener: self.subs.acquire(ListenerKind::Tick),
        };
        Self::ensure_marquee(&mut slot, self.viewport.mode(), tree);
        let id = MarqueeId(self.next_id());
        self.marquees.insert(id, slot);
        Ok(id)
    }

    pub fn marquee(&self, id: MarqueeId) -> Option<&MarqueeLoop> {
        self.marquees.get(&id).and_then(|s| s.marquee.as_ref())
    }

    /// Mutable access for pause/resume on hover.
    pub fn marquee_mut(&mut self, id: MarqueeId) -> Option<&mut MarqueeLoop> {
        self.marquees.get_mut(&id).and_then(|s| s.marquee.as_mut())
    }

    pub fn remove_marquee(&mut self, id: MarqueeId) -> bool {
        match self.marquees.remove(&id) {
            Some(slot) => self.subs.release(slot.listener),
            None => false,
        }
    }

    fn ensure_marquee<R: RenderTree>(slot: &mut MarqueeSlot, mode: ViewportMode, tree: &R) {
        if slot.marquee.is_some() {
            return;
        }
        let width = slot
            .fixed_width
            .or_else(|| tree.first_rect(&slot.target).map(|r| r.width()));
        match width.map(|w| MarqueeLoop::new(w, slot.speeds.for_mode(mode))) {
            Some(Ok(m)) => slot.marquee = Some(m),
            Some(Err(e)) => tracing::trace!(error = %e, "marquee content not measurable yet"),
            None => tracing::trace!(marquee = ?slot.target, "marquee target missing"),
        }
    }

    fn tick_marquees<R: RenderTree>(&mut self, dt: f64, tree: &mut R) {
        let mode = self.viewport.mode();
        for slot in self.marquees.values_mut() {
            Self::ensure_marquee(slot, mode, &*tree);
            let Some(m) = slot.marquee.as_mut() else {
                continue;
            };
            let x = PropValue::Number(m.tick(dt));
            for el in tree.resolve(&slot.target) {
                tree.set_property(el, &Property::X, &x);
            }
        }
    }

    fn remeasure_marquees<R: RenderTree>(&mut self, tree: &R) {
        for slot in self.marquees.values_mut() {
            if slot.fixed_width.is_some() {
                continue;
            }
            let Some(width) = tree.first_rect(&slot.target).map(|r| r.width()) else {
                continue;
            };
            if let Some(m) = slot.marquee.as_mut() {
                if let Err(e) = m.set_content_width(width) {
                    tracing::trace!(error = %e, "marquee remeasure ignored");
                }
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Carousels
    // ---------------------------------------------------------------------------------------

    pub fn start_carousel(
        &mut self,
        items: Vec<String>,
        interval_secs: f64,
    ) -> MotionResult<CarouselId> {
        let carousel = CarouselScheduler::start(items, interval_secs)?;
        let id = CarouselId(self.next_id());
        let listener = Some(self.subs.acquire(ListenerKind::Tick));
        self.carousels
            .insert(id, CarouselSlot { carousel, listener });
        Ok(id)
    }

    pub fn carousel(&self, id: CarouselId) -> Option<&CarouselScheduler<String>> {
        self.carousels.get(&id).map(|s| &s.carousel)
    }

    /// External navigation; resets the interval.
    pub fn select(&mut self, id: CarouselId, index: usize) -> bool {
        self.carousels
            .get_mut(&id)
            .is_some_and(|s| s.carousel.select(index))
    }

    /// Cancel the carousel interval and release its tick listener.
    pub fn pause_carousel(&mut self, id: CarouselId) {
        if let Some(slot) = self.carousels.get_mut(&id) {
            slot.carousel.pause();
            if let Some(l) = slot.listener.take() {
                self.subs.release(l);
            }
        }
    }

    pub fn resume_carousel(&mut self, id: CarouselId) {
        if let Some(slot) = self.carousels.get_mut(&id) {
            slot.carousel.resume();
            if slot.listener.is_none() {
                slot.listener = Some(self.subs.acquire(ListenerKind::Tick));
            }
        }
    }

    pub fn stop_carousel(&mut self, id: CarouselId) -> bool {
        match self.carousels.remove(&id) {
            Some(slot) => {
                if let Some(l) = slot.listener {
                    self.subs.release(l);
                }
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------------------------
    // Bursts
    // ---------------------------------------------------------------------------------------

    pub fn add_burst(&mut self, config: BurstConfig) -> MotionResult<BurstId> {
        let burst = BurstScheduler::new(config)?;
        let id = BurstId(self.next_id());
        self.bursts.insert(
            id,
            BurstSlot {
                burst,
                listener: None,
            },
        );
        Ok(id)
    }

    pub fn burst(&self, id: BurstId) -> Option<&BurstScheduler> {
        self.bursts.get(&id).map(|s| &s.burst)
    }

    /// Fire at the time of the last tick. The session holds a tick listener until it ends.
    pub fn fire(&mut self, id: BurstId) -> Option<FireOutcome> {
        let now = self.now.unwrap_or(0.0);
        let slot = self.bursts.get_mut(&id)?;
        let outcome = slot.burst.fire(now);
        if outcome != FireOutcome::Suppressed && slot.listener.is_none() {
            slot.listener = Some(self.subs.acquire(ListenerKind::Tick));
        }
        Some(outcome)
    }

    pub fn reset_burst_guard(&mut self, id: BurstId) {
        if let Some(slot) = self.bursts.get_mut(&id) {
            slot.burst.reset_guard();
        }
    }

    /// Drain emissions produced since the last call.
    pub fn take_emissions(&mut self) -> Vec<(BurstId, Emission)> {
        std::mem::take(&mut self.emissions)
    }

    fn tick_bursts(&mut self, now: f64) {
        for (id, slot) in self.bursts.iter_mut() {
            if slot.listener.is_none() {
                continue;
            }
            self.emissions
                .extend(slot.burst.tick(now).into_iter().map(|e| (*id, e)));
            if !slot.burst.is_active() {
                if let Some(l) = slot.listener.take() {
                    self.subs.release(l);
                }
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------------------------

    /// Dispose every scope and release every listener, including the resize subscription.
    pub fn shutdown(&mut self) {
        let handles: Vec<_> = self.scopes.keys().copied().collect();
        for h in handles {
            self.dispose(h);
        }
        let marquees: Vec<_> = self.marquees.keys().copied().collect();
        for id in marquees {
            self.remove_marquee(id);
        }
        let carousels: Vec<_> = self.carousels.keys().copied().collect();
        for id in carousels {
            self.stop_carousel(id);
        }
        for slot in self.bursts.values_mut() {
            slot.burst.cancel();
            if let Some(l) = slot.listener.take() {
                self.subs.release(l);
            }
        }
        self.viewport.release(&mut self.subs);
        tracing::debug!(active = self.subs.total_active(), "orchestrator shut down");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/orchestrator.rs"]
mod tests;
