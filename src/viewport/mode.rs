use crate::{
    foundation::core::ViewportMode,
    foundation::error::{MotionError, MotionResult, require_non_negative},
    foundation::subscription::{ListenerKind, SubscriptionId, Subscriptions},
};

/// Breakpoint and settle options for [`ViewportModeResolver`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewportConfig {
    /// Widths strictly below this are [`ViewportMode::Compact`].
    #[serde(default = "default_breakpoint")]
    pub breakpoint_px: f64,
    /// Quiet time a width change must survive before it is committed. `0` commits at once.
    #[serde(default)]
    pub debounce_secs: f64,
}

fn default_breakpoint() -> f64 {
    768.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint(),
            debounce_secs: 0.0,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> MotionResult<()> {
        if !self.breakpoint_px.is_finite() || self.breakpoint_px <= 0.0 {
            return Err(MotionError::config(format!(
                "viewport breakpoint must be > 0 (got {})",
                self.breakpoint_px
            )));
        }
        require_non_negative("viewport debounce", self.debounce_secs)?;
        Ok(())
    }

    pub fn mode_for(&self, width: f64) -> ViewportMode {
        if width < self.breakpoint_px {
            ViewportMode::Compact
        } else {
            ViewportMode::Wide
        }
    }
}

/// Tracks compact vs. wide from the measured viewport width.
///
/// The initial width is measured synchronously in [`ViewportModeResolver::new`], so the mode
/// is valid before any consumer reads it.
#[derive(Debug)]
pub struct ViewportModeResolver {
    config: ViewportConfig,
    width: f64,
    mode: ViewportMode,
    pending: Option<(f64, f64)>,
    listener: Option<SubscriptionId>,
}

impl ViewportModeResolver {
    pub fn new(
        config: ViewportConfig,
        initial_width: f64,
        subs: &mut Subscriptions,
    ) -> MotionResult<Self> {
        config.validate()?;
        if !initial_width.is_finite() || initial_width < 0.0 {
            return Err(MotionError::config(format!(
                "initial viewport width must be finite and >= 0 (got {initial_width})"
            )));
        }
        let mode = config.mode_for(initial_width);
        tracing::debug!(width = initial_width, ?mode, "viewport measured");
        Ok(Self {
            config,
            width: initial_width,
            mode,
            pending: None,
            listener: Some(subs.acquire(ListenerKind::Resize)),
        })
    }

    pub fn mode(&self) -> ViewportMode {
        self.mode
    }

    /// Last committed width.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// `true` while the resize listener is held.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Record a resize at time `now`.
    ///
    /// Returns the new mode when the change is committed by this call and the mode flipped.
    /// Garbage widths and calls after release are ignored.
    pub fn on_resize(&mut self, width: f64, now: f64) -> Option<ViewportMode> {
        if self.listener.is_none() || !width.is_finite() || width < 0.0 {
            return None;
        }
        if self.config.debounce_secs > 0.0 {
            self.pending = Some((width, now));
            return None;
        }
        self.commit(width)
    }

    /// Commit a pending width once the debounce window has passed.
    pub fn settle(&mut self, now: f64) -> Option<ViewportMode> {
        let (width, at) = self.pending?;
        if now - at < self.config.debounce_secs {
            return None;
        }
        self.pending = None;
        self.commit(width)
    }

    fn commit(&mut self, width: f64) -> Option<ViewportMode> {
        self.width = width;
        let mode = self.config.mode_for(width);
        if mode == self.mode {
            return None;
        }
        tracing::debug!(width, from = ?self.mode, to = ?mode, "viewport mode changed");
        self.mode = mode;
        Some(mode)
    }

    /// Drop the resize subscription. Returns `false` if it was already released.
    pub fn release(&mut self, subs: &mut Subscriptions) -> bool {
        match self.listener.take() {
            Some(id) => subs.release(id),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/viewport/mode.rs"]
mod tests;
