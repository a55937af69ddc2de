use std::collections::BTreeMap;

use crate::{
    foundation::core::Direction,
    foundation::error::{MotionError, MotionResult},
    foundation::subscription::SubscriptionId,
    target::tree::{RenderTree, VisualTarget},
};

/// What a binding does once its timeline has played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TogglePolicy {
    /// Play the first time the threshold is crossed, then ignore everything.
    #[default]
    PlayOnce,
    /// Play forward on the way down, backward to the start on the way back up.
    PlayReverseOnLeave,
    /// Re-arm when the trigger leaves the viewport; every new entry plays from the start.
    ReplayEachEntry,
}

/// Binds a timeline to a trigger element crossing a line in the viewport.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollBinding {
    /// Element whose top edge is watched.
    pub trigger: VisualTarget,
    /// Viewport line as a fraction of viewport height from the top (`0.8` = 80% down).
    #[serde(default = "default_start")]
    pub start: f64,
    #[serde(default)]
    pub policy: TogglePolicy,
}

fn default_start() -> f64 {
    0.8
}

impl ScrollBinding {
    pub fn new(trigger: VisualTarget, start: f64, policy: TogglePolicy) -> MotionResult<Self> {
        let b = Self {
            trigger,
            start,
            policy,
        };
        b.validate()?;
        Ok(b)
    }

    pub fn validate(&self) -> MotionResult<()> {
        if !self.start.is_finite() || !(0.0..=1.0).contains(&self.start) {
            return Err(MotionError::config(format!(
                "scroll start threshold must be within [0, 1] (got {})",
                self.start
            )));
        }
        Ok(())
    }
}

/// Per-binding state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Created, not registered.
    Idle,
    /// Registered; the next downward crossing plays from the start.
    Armed,
    /// Timeline running (or finished) forward.
    Playing,
    /// Timeline running (or finished) backward.
    Reversed,
}

/// Instruction for the owner of the bound timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerAction {
    /// Restart from zero going forward.
    Play,
    /// Continue from the current playhead in the given direction.
    Run(Direction),
}

/// Which way the page moved since the previous evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
    /// Same position (resize, first evaluation).
    Still,
}

/// Scroll position and viewport size for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    pub scroll_y: f64,
    pub viewport_height: f64,
}

/// Opaque id of one attached binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(u64);

#[derive(Clone, Debug)]
struct Trigger<K> {
    binding: ScrollBinding,
    key: K,
    state: TriggerState,
    was_past: Option<bool>,
    listener: SubscriptionId,
}

/// Scroll bindings of one owner, keyed to the owner's timeline handles `K`.
#[derive(Clone, Debug)]
pub struct ScrollTriggerRegistry<K> {
    triggers: BTreeMap<BindingId, Trigger<K>>,
    next: u64,
    last_scroll_y: Option<f64>,
}

impl<K> Default for ScrollTriggerRegistry<K> {
    fn default() -> Self {
        Self {
            triggers: BTreeMap::new(),
            next: 0,
            last_scroll_y: None,
        }
    }
}

impl<K: Copy + PartialEq + std::fmt::Debug> ScrollTriggerRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `binding` to `key`, moving it from Idle to Armed.
    ///
    /// A key that already has a binding keeps it; the existing id is returned together with
    /// `false` so the caller can release the listener it acquired for the duplicate.
    /// `AnimationScope` keys by fresh timeline ids and never takes this path.
    pub fn attach(
        &mut self,
        binding: ScrollBinding,
        key: K,
        listener: SubscriptionId,
    ) -> (BindingId, bool) {
        if let Some((id, _)) = self.triggers.iter().find(|(_, t)| t.key == key) {
            return (*id, false);
        }
        let id = BindingId(self.next);
        self.next += 1;
        let mut trigger = Trigger {
            binding,
            key,
            state: TriggerState::Idle,
            was_past: None,
            listener,
        };
        trigger.state = TriggerState::Armed;
        tracing::debug!(key = ?trigger.key, binding = id.0, "scroll trigger armed");
        self.triggers.insert(id, trigger);
        (id, true)
    }

    /// Remove one binding, returning its listener token for release.
    pub fn detach(&mut self, id: BindingId) -> Option<SubscriptionId> {
        self.triggers.remove(&id).map(|t| t.listener)
    }

    /// Remove every binding, returning their listener tokens.
    pub fn detach_all(&mut self) -> Vec<SubscriptionId> {
        std::mem::take(&mut self.triggers)
            .into_values()
            .map(|t| t.listener)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn state(&self, id: BindingId) -> Option<TriggerState> {
        self.triggers.get(&id).map(|t| t.state)
    }

    /// State of the binding attached to `key`.
    pub fn state_of(&self, key: K) -> Option<TriggerState> {
        self.triggers
            .values()
            .find(|t| t.key == key)
            .map(|t| t.state)
    }

    /// Evaluate every binding against a new scroll position.
    ///
    /// Returns at most one action per binding. Triggers that resolve to no element are
    /// skipped and keep their state.
    pub fn evaluate<R: RenderTree + ?Sized>(
        &mut self,
        sample: ScrollSample,
        tree: &R,
    ) -> Vec<(K, TriggerAction)> {
        let dir = match self.last_scroll_y {
            Some(prev) if sample.scroll_y > prev => ScrollDirection::Down,
            Some(prev) if sample.scroll_y < prev => ScrollDirection::Up,
            _ => ScrollDirection::Still,
        };
        self.last_scroll_y = Some(sample.scroll_y);

        let mut actions = Vec::new();
        for trigger in self.triggers.values_mut() {
            let Some(rect) = tree.first_rect(&trigger.binding.trigger) else {
                tracing::trace!(key = ?trigger.key, "scroll trigger target missing");
                continue;
            };
            let top = rect.y0 - sample.scroll_y;
            let bottom = rect.y1 - sample.scroll_y;
            let line = trigger.binding.start * sample.viewport_height;
            let past = top <= line;
            let outside = top >= sample.viewport_height || bottom <= 0.0;

            let entered = past && trigger.was_past != Some(true) && dir != ScrollDirection::Up;
            let left = !past && trigger.was_past == Some(true) && dir != ScrollDirection::Down;
            trigger.was_past = Some(past);

            let policy = trigger.binding.policy;
            let (next, action) = match trigger.state {
                TriggerState::Armed if entered => (TriggerState::Playing, Some(TriggerAction::Play)),
                TriggerState::Reversed if entered => (
                    TriggerState::Playing,
                    Some(TriggerAction::Run(Direction::Forward)),
                ),
                TriggerState::Playing if left && policy == TogglePolicy::PlayReverseOnLeave => (
                    TriggerState::Reversed,
                    Some(TriggerAction::Run(Direction::Backward)),
                ),
                TriggerState::Playing if outside && policy == TogglePolicy::ReplayEachEntry => {
                    (TriggerState::Armed, None)
                }
                state => (state, None),
            };
            if next != trigger.state {
                tracing::debug!(key = ?trigger.key, from = ?trigger.state, to = ?next, ?dir, "scroll trigger transition");
                trigger.state = next;
            }
            if let Some(action) = action {
                actions.push((trigger.key, action));
            }
        }
        actions
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/trigger.rs"]
mod tests;
