use crate::foundation::error::{MotionError, MotionResult, require_positive};

/// Options for a celebratory particle burst.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BurstConfig {
    /// Wall-clock budget of one session.
    pub duration_secs: f64,
    /// Spacing between emission ticks.
    pub tick_interval_secs: f64,
    /// Particles emitted by a tick at the very start of a session.
    pub base_intensity: f64,
    /// Allow only one session for the lifetime of the scheduler (until `reset_guard`).
    #[serde(default)]
    pub fire_once: bool,
}

impl BurstConfig {
    pub fn validate(&self) -> MotionResult<()> {
        require_positive("burst duration", self.duration_secs)?;
        require_positive("burst tick interval", self.tick_interval_secs)?;
        if !self.base_intensity.is_finite() || self.base_intensity < 0.0 {
            return Err(MotionError::config(format!(
                "burst base intensity must be finite and >= 0 (got {})",
                self.base_intensity
            )));
        }
        Ok(())
    }
}

/// One emission tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Emission {
    /// Scheduled time of this tick.
    pub at: f64,
    /// `(end - at) / duration`, in `(0, 1]`.
    pub remaining_fraction: f64,
    /// `base_intensity * remaining_fraction`, rounded.
    pub particles: u32,
}

/// A running, self-terminating burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstSession {
    start: f64,
    end: f64,
    ticks: u64,
}

impl BurstSession {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Emission ticks issued so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Result of [`BurstScheduler::fire`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    Started,
    /// A running session was replaced by a fresh one.
    Restarted,
    /// The fire-once guard has already tripped.
    Suppressed,
}

/// Issues decaying-intensity emissions over a fixed time budget.
#[derive(Clone, Debug)]
pub struct BurstScheduler {
    config: BurstConfig,
    session: Option<BurstSession>,
    has_fired: bool,
}

impl BurstScheduler {
    pub fn new(config: BurstConfig) -> MotionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            session: None,
            has_fired: false,
        })
    }

    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&BurstSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// Start a session at `now`; the first emission happens on the next `tick`.
    pub fn fire(&mut self, now: f64) -> FireOutcome {
        if self.config.fire_once && self.has_fired {
            tracing::debug!("burst suppressed by fire-once guard");
            return FireOutcome::Suppressed;
        }
        let outcome = if self.session.is_some() {
            FireOutcome::Restarted
        } else {
            FireOutcome::Started
        };
        self.has_fired = true;
        self.session = Some(BurstSession {
            start: now,
            end: now + self.config.duration_secs,
            ticks: 0,
        });
        tracing::debug!(now, ?outcome, duration = self.config.duration_secs, "burst fired");
        outcome
    }

    /// Re-arm the fire-once guard.
    pub fn reset_guard(&mut self) {
        self.has_fired = false;
    }

    /// Stop a running session early.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Emit every tick scheduled at or before `now`.
    ///
    /// The session ends itself once the remaining fraction at `now` reaches zero, whether or
    /// not an emission tick lands exactly on the end.
    pub fn tick(&mut self, now: f64) -> Vec<Emission> {
        let mut out = Vec::new();
        let Some(mut session) = self.session else {
            return out;
        };
        let duration = self.config.duration_secs;
        loop {
            let at = session.start + self.config.tick_interval_secs * session.ticks as f64;
            if at > now {
                break;
            }
            let remaining_fraction = ((session.end - at) / duration).max(0.0);
            if remaining_fraction <= 0.0 {
                tracing::debug!(at, "burst finished");
                self.session = None;
                return out;
            }
            out.push(Emission {
                at,
                remaining_fraction,
                particles: (self.config.base_intensity * remaining_fraction).round() as u32,
            });
            session.ticks += 1;
        }
        if now >= session.end {
            tracing::debug!(now, end = session.end, "burst finished");
            self.session = None;
        } else {
            self.session = Some(session);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/burst.rs"]
mod tests;
