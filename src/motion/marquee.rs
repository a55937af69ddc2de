use crate::foundation::error::{MotionError, MotionResult, require_positive};

/// Continuously scrolling content, duplicated once so a shift of half its width is seamless.
///
/// The offset is derived from elapsed distance, so uneven frame times never cause a jump.
#[derive(Clone, Debug, PartialEq)]
pub struct MarqueeLoop {
    content_width: f64,
    speed: f64,
    offset: f64,
    paused: bool,
}

impl MarqueeLoop {
    /// `content_width` is the full width including the duplicate copy.
    pub fn new(content_width: f64, speed_px_per_sec: f64) -> MotionResult<Self> {
        require_positive("marquee content width", content_width)?;
        check_speed(speed_px_per_sec)?;
        Ok(Self {
            content_width,
            speed: speed_px_per_sec,
            offset: 0.0,
            paused: false,
        })
    }

    /// Wrap point: the duplication boundary.
    pub fn period(&self) -> f64 {
        self.content_width / 2.0
    }

    pub fn content_width(&self) -> f64 {
        self.content_width
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Current offset, always in `[0, content_width / 2)`.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Horizontal translation to apply to the content.
    pub fn translation(&self) -> f64 {
        -self.offset
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Freeze the offset (e.g. on hover).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue from the frozen offset.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn set_speed(&mut self, speed_px_per_sec: f64) -> MotionResult<()> {
        self.speed = check_speed(speed_px_per_sec)?;
        Ok(())
    }

    /// Re-measured content; the current offset is wrapped into the new period.
    pub fn set_content_width(&mut self, content_width: f64) -> MotionResult<()> {
        self.content_width = require_positive("marquee content width", content_width)?;
        self.offset = self.wrap(self.offset);
        Ok(())
    }

    /// Advance by `dt` seconds and return the translation to apply.
    pub fn tick(&mut self, dt: f64) -> f64 {
        if !self.paused && dt.is_finite() && dt > 0.0 {
            self.offset = self.wrap(self.offset + self.speed * dt);
        }
        self.translation()
    }

    fn wrap(&self, offset: f64) -> f64 {
        let period = self.period();
        let wrapped = offset.rem_euclid(period);
        // rem_euclid can round up to `period` for tiny negative inputs.
        if wrapped >= period || !wrapped.is_finite() {
            0.0
        } else {
            wrapped
        }
    }
}

fn check_speed(speed: f64) -> MotionResult<f64> {
    if !speed.is_finite() {
        return Err(MotionError::config(format!(
            "marquee speed must be finite (got {speed})"
        )));
    }
    Ok(speed)
}

#[cfg(test)]
#[path = "../../tests/unit/motion/marquee.rs"]
mod tests;
