use crate::foundation::error::{MotionError, MotionResult, require_positive};

/// Advances a bounded index on a fixed interval, independent of any timeline.
#[derive(Clone, Debug)]
pub struct CarouselScheduler<T> {
    items: Vec<T>,
    index: usize,
    interval: f64,
    elapsed: f64,
    running: bool,
}

impl<T> CarouselScheduler<T> {
    /// Start at index 0, advancing every `interval_secs`.
    pub fn start(items: Vec<T>, interval_secs: f64) -> MotionResult<Self> {
        if items.is_empty() {
            return Err(MotionError::config("carousel needs at least one item"));
        }
        require_positive("carousel interval", interval_secs)?;
        Ok(Self {
            items,
            index: 0,
            interval: interval_secs,
            elapsed: 0.0,
            running: true,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &T {
        &self.items[self.index]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Seconds accumulated toward the next automatic advance.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the interval clock; returns the new index if at least one step happened.
    pub fn tick(&mut self, dt: f64) -> Option<usize> {
        if !self.running || !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        self.elapsed += dt;
        let mut advanced = false;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.index = (self.index + 1) % self.items.len();
            advanced = true;
        }
        advanced.then_some(self.index)
    }

    /// Jump to `index` and restart the interval so an automatic advance cannot follow
    /// immediately. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            tracing::warn!(index, len = self.items.len(), "carousel selection out of range");
            return false;
        }
        self.index = index;
        self.elapsed = 0.0;
        true
    }

    /// Cancel the interval.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Restart the interval from zero.
    pub fn resume(&mut self) {
        self.running = true;
        self.elapsed = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/carousel.rs"]
mod tests;
