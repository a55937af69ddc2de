/// Convenience result type used across motionscope.
pub type MotionResult<T> = Result<T, MotionError>;

/// Top-level error taxonomy used by orchestration APIs.
///
/// Only programmer errors surface here. Missing targets, late callbacks after disposal and
/// resize/scroll storms are absorbed by the component that sees them.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// Invalid option values (durations, intervals, widths, fractions, counts).
    #[error("configuration error: {0}")]
    Config(String),

    /// Errors while building or driving a timeline.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Errors raised while building a scope.
    #[error("scope error: {0}")]
    Scope(String),

    /// Errors when serializing or deserializing stage descriptions.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotionError {
    /// Build a [`MotionError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MotionError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`MotionError::Scope`] value.
    pub fn scope(msg: impl Into<String>) -> Self {
        Self::Scope(msg.into())
    }

    /// Build a [`MotionError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Reject non-finite or non-positive seconds values.
pub(crate) fn require_positive(what: &str, secs: f64) -> MotionResult<f64> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(MotionError::config(format!(
            "{what} must be a finite value > 0 (got {secs})"
        )));
    }
    Ok(secs)
}

/// Reject non-finite or negative seconds values.
pub(crate) fn require_non_negative(what: &str, secs: f64) -> MotionResult<f64> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(MotionError::config(format!(
            "{what} must be a finite value >= 0 (got {secs})"
        )));
    }
    Ok(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
