use crate::{
    animation::ease::Ease,
    animation::keyframe::{Keyframe, ResolvedPair, validate_pair},
    foundation::core::Direction,
    foundation::error::{MotionError, MotionResult, require_non_negative, require_positive},
    foundation::rng::Rng64,
    target::tree::{Elements, RenderTree, VisualTarget},
};

/// How many cycles a timeline runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Run this many full cycles (>= 1), then hold the final values.
    Count(u32),
    /// Never reach a terminal state; only cancellation stops it.
    Infinite,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Count(1)
    }
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

/// Declarative description of one from/to animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineSpec {
    /// Values at progress 0.
    pub from: Keyframe,
    /// Values at progress 1.
    pub to: Keyframe,
    /// Seconds per cycle (`> 0`).
    pub duration: f64,
    /// Seconds before the first element starts.
    #[serde(default, skip_serializing_if = "is_default")]
    pub delay: f64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub ease: Ease,
    #[serde(default, skip_serializing_if = "is_default")]
    pub repeat: Repeat,
    /// Alternate direction on every other cycle.
    #[serde(default, skip_serializing_if = "is_default")]
    pub yoyo: bool,
    /// Extra start offset per element index, added on top of `delay`.
    #[serde(default, skip_serializing_if = "is_default")]
    pub stagger: f64,
}

impl TimelineSpec {
    /// Build a validated single-cycle linear spec.
    pub fn new(from: Keyframe, to: Keyframe, duration: f64) -> MotionResult<Self> {
        let spec = Self {
            from,
            to,
            duration,
            delay: 0.0,
            ease: Ease::Linear,
            repeat: Repeat::default(),
            yoyo: false,
            stagger: 0.0,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = secs;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn stagger(mut self, secs: f64) -> Self {
        self.stagger = secs;
        self
    }

    /// Check every invariant; run again at registration since builders skip it.
    pub fn validate(&self) -> MotionResult<()> {
        require_positive("timeline duration", self.duration)?;
        require_non_negative("timeline delay", self.delay)?;
        require_non_negative("timeline stagger", self.stagger)?;
        if self.repeat == Repeat::Count(0) {
            return Err(MotionError::config("timeline repeat count must be >= 1"));
        }
        validate_pair(&self.from, &self.to)
    }

    /// Total length in seconds for `elements` staggered elements; `None` when infinite.
    pub fn total_secs(&self, elements: usize) -> Option<f64> {
        match self.repeat {
            Repeat::Infinite => None,
            Repeat::Count(n) => Some(
                self.delay
                    + self.stagger * elements.saturating_sub(1) as f64
                    + self.duration * f64::from(n),
            ),
        }
    }

    /// Eased progress for one element at `local` seconds past its own start.
    ///
    /// Returns `0` before the start. Finite repeats hold the value of the last cycle's end.
    pub fn progress_at(&self, local: f64) -> f64 {
        if local <= 0.0 {
            return 0.0;
        }
        let cycle = (local / self.duration).floor();
        let forward_on = |cycle: u64| !self.yoyo || cycle % 2 == 0;

        if let Repeat::Count(n) = self.repeat {
            if cycle >= f64::from(n) {
                let last = u64::from(n.saturating_sub(1));
                return if forward_on(last) { 1.0 } else { 0.0 };
            }
        }

        let raw = (local - cycle * self.duration) / self.duration;
        let t = if forward_on(cycle as u64) { raw } else { 1.0 - raw };
        self.ease.apply(t)
    }
}

/// Lifecycle of a running timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimelineState {
    /// Registered, never started (or explicitly reset).
    Idle,
    /// Moving in one direction. Only one direction exists at a time.
    Running(Direction),
    /// Halted mid-flight; values stay where the last tick left them.
    Paused,
    /// Reached the end of a finite run; holds the final values.
    Completed,
    /// Reversed all the way back to the from-keyframe.
    Rewound,
    /// Terminal; the owning scope was disposed.
    Cancelled,
}

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; nothing written.
    Quiet,
    /// No mounted elements; the tick was skipped.
    Skipped,
    /// Values written, still running.
    Advanced,
    /// Values written and the run ended this tick.
    Settled,
}

/// A running animation: one spec applied to the elements of one target.
#[derive(Clone, Debug)]
pub struct Timeline {
    id: u64,
    seed: u64,
    spec: TimelineSpec,
    target: VisualTarget,
    elements: Elements,
    pairs: Vec<ResolvedPair>,
    playhead: f64,
    state: TimelineState,
    run: u64,
}

impl Timeline {
    pub fn new(id: u64, seed: u64, spec: TimelineSpec, target: VisualTarget) -> MotionResult<Self> {
        spec.validate()?;
        Ok(Self {
            id,
            seed,
            spec,
            target,
            elements: Elements::new(),
            pairs: Vec::new(),
            playhead: 0.0,
            state: TimelineState::Idle,
            run: 0,
        })
    }

    pub fn spec(&self) -> &TimelineSpec {
        &self.spec
    }

    pub fn target(&self) -> &VisualTarget {
        &self.target
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// Seconds since the start of the current run.
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Number of restarts from zero so far.
    pub fn runs(&self) -> u64 {
        self.run
    }

    /// The direction currently running, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self.state {
            TimelineState::Running(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.direction().is_some()
    }

    /// Restart from zero going forward; random ranges are drawn again for this run.
    pub fn play<R: RenderTree + ?Sized>(&mut self, tree: &R) {
        if self.state == TimelineState::Cancelled {
            return;
        }
        self.run += 1;
        self.playhead = 0.0;
        self.resolve(tree);
        self.state = TimelineState::Running(Direction::Forward);
        tracing::debug!(timeline = self.id, run = self.run, "timeline play");
    }

    /// Run in `dir` from the current playhead, replacing any in-flight direction.
    ///
    /// Forward on a never-started timeline is a [`Timeline::play`].
    pub fn run<R: RenderTree + ?Sized>(&mut self, dir: Direction, tree: &R) {
        match (self.state, dir) {
            (TimelineState::Cancelled, _) => {}
            (TimelineState::Idle, Direction::Forward) if self.run == 0 => self.play(tree),
            (TimelineState::Idle | TimelineState::Rewound, Direction::Backward)
                if self.playhead <= 0.0 => {}
            (TimelineState::Completed, Direction::Forward) => {}
            (_, dir) => {
                self.state = TimelineState::Running(dir);
                tracing::debug!(timeline = self.id, ?dir, playhead = self.playhead, "timeline run");
            }
        }
    }

    /// Stop mid-flight, leaving elements at their last computed values.
    pub fn halt(&mut self) {
        if self.is_running() {
            self.state = TimelineState::Paused;
        }
    }

    /// Permanently stop. Values are left as they are.
    pub fn cancel(&mut self) {
        self.state = TimelineState::Cancelled;
    }

    /// Rewind to zero and write the from-keyframe values.
    pub fn reset<R: RenderTree + ?Sized>(&mut self, tree: &mut R) {
        if self.state == TimelineState::Cancelled {
            return;
        }
        if self.pairs.is_empty() {
            self.resolve(tree);
        }
        self.playhead = 0.0;
        self.state = TimelineState::Idle;
        self.write_with(tree, |_| 0.0);
    }

    /// Advance by `dt` seconds and write the interpolated values.
    pub fn tick<R: RenderTree + ?Sized>(&mut self, dt: f64, tree: &mut R) -> TickOutcome {
        let TimelineState::Running(dir) = self.state else {
            return TickOutcome::Quiet;
        };
        if self.pairs.is_empty() {
            self.resolve(tree);
            if self.pairs.is_empty() {
                tracing::trace!(timeline = self.id, "no mounted targets; tick skipped");
                return TickOutcome::Skipped;
            }
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut settled = false;
        match dir {
            Direction::Forward => {
                self.playhead += dt;
                if let Some(total) = self.spec.total_secs(self.elements.len()) {
                    if self.playhead >= total {
                        self.playhead = total;
                        self.state = TimelineState::Completed;
                        settled = true;
                    }
                }
            }
            Direction::Backward => {
                self.playhead -= dt;
                if self.playhead <= 0.0 {
                    self.playhead = 0.0;
                    self.state = TimelineState::Rewound;
                    settled = true;
                }
            }
        }

        let spec = &self.spec;
        let playhead = self.playhead;
        let written = self.write_with(tree, |i| {
            spec.progress_at(playhead - spec.delay - spec.stagger * i as f64)
        });
        if written == 0 {
            tracing::trace!(timeline = self.id, "targets vanished; tick skipped");
        }
        if settled {
            tracing::debug!(timeline = self.id, state = ?self.state, "timeline settled");
            TickOutcome::Settled
        } else {
            TickOutcome::Advanced
        }
    }

    fn resolve<R: RenderTree + ?Sized>(&mut self, tree: &R) {
        self.elements = tree.resolve(&self.target);
        self.pairs = self
            .elements
            .iter()
            .map(|el| {
                let mut rng = Rng64::from_parts(&[self.seed, self.id, el.0, self.run]);
                ResolvedPair::resolve(&self.spec.from, &self.spec.to, &mut rng)
            })
            .collect();
    }

    /// Write every element's values at the progress `t_of(index)`; returns elements written.
    fn write_with<R, F>(&self, tree: &mut R, t_of: F) -> usize
    where
        R: RenderTree + ?Sized,
        F: Fn(usize) -> f64,
    {
        let mut written = 0;
        for (i, (el, pair)) in self.elements.iter().zip(&self.pairs).enumerate() {
            let t = t_of(i);
            let mut alive = true;
            for (prop, value) in pair.sample(t) {
                if !tree.set_property(*el, prop, &value) {
                    alive = false;
                    break;
                }
            }
            if alive {
                written += 1;
            }
        }
        written
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
