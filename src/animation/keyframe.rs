use std::collections::BTreeMap;

use crate::foundation::core::{Lerp, PropValue, Property};
use crate::foundation::error::{MotionError, MotionResult};
use crate::foundation::rng::Rng64;

/// One keyframe value as authored.
///
/// JSON forms: `12.5`, `"red"`, `{"random": [-15, 15]}`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    /// Fixed number.
    Number(f64),
    /// Fixed string, switched rather than interpolated.
    Text(String),
    /// Uniform random number in `[min, max)`, drawn once per element per run.
    Random {
        /// `[min, max]`.
        random: [f64; 2],
    },
}

impl KeyValue {
    pub fn random(min: f64, max: f64) -> Self {
        Self::Random { random: [min, max] }
    }

    fn resolve(&self, rng: &mut Rng64) -> PropValue {
        match self {
            Self::Number(v) => PropValue::Number(*v),
            Self::Text(s) => PropValue::Text(s.clone()),
            Self::Random { random: [min, max] } => PropValue::Number(rng.range(*min, *max)),
        }
    }

    fn validate(&self, prop: &Property) -> MotionResult<()> {
        let ok = match self {
            Self::Number(v) => v.is_finite(),
            Self::Text(_) => true,
            Self::Random { random: [min, max] } => min.is_finite() && max.is_finite(),
        };
        if !ok {
            return Err(MotionError::config(format!(
                "keyframe value for '{prop}' must be finite"
            )));
        }
        Ok(())
    }
}

impl From<f64> for KeyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for KeyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Mapping from property to authored value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Keyframe {
    pub values: BTreeMap<Property, KeyValue>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, prop: impl Into<Property>, value: impl Into<KeyValue>) -> Self {
        self.values.insert(prop.into(), value.into());
        self
    }

    /// Builder-style insert of a random range.
    pub fn with_random(mut self, prop: impl Into<Property>, min: f64, max: f64) -> Self {
        self.values.insert(prop.into(), KeyValue::random(min, max));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_random(&self) -> bool {
        self.values
            .values()
            .any(|v| matches!(v, KeyValue::Random { .. }))
    }
}

/// Concrete from/to values for one element for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPair {
    pub(crate) tracks: Vec<(Property, PropValue, PropValue)>,
}

impl ResolvedPair {
    /// Resolve every random range exactly once, from-keyframe first, in property order.
    pub fn resolve(from: &Keyframe, to: &Keyframe, rng: &mut Rng64) -> Self {
        let tracks = from
            .values
            .iter()
            .filter_map(|(prop, a)| {
                let b = to.values.get(prop)?;
                Some((prop.clone(), a.resolve(rng), b.resolve(rng)))
            })
            .collect();
        Self { tracks }
    }

    /// Values at eased progress `t` (0 = from, 1 = to).
    pub fn sample(&self, t: f64) -> impl Iterator<Item = (&Property, PropValue)> + '_ {
        self.tracks
            .iter()
            .map(move |(prop, a, b)| (prop, PropValue::lerp(a, b, t)))
    }

    pub fn value_at(&self, prop: &Property, t: f64) -> Option<PropValue> {
        self.tracks
            .iter()
            .find(|(p, _, _)| p == prop)
            .map(|(_, a, b)| PropValue::lerp(a, b, t))
    }
}

/// Check that `from` and `to` animate the same, non-empty set of properties.
pub fn validate_pair(from: &Keyframe, to: &Keyframe) -> MotionResult<()> {
    if from.is_empty() {
        return Err(MotionError::timeline("from-keyframe must set at least one property"));
    }
    for (prop, v) in from.values.iter().chain(to.values.iter()) {
        v.validate(prop)?;
    }
    let from_keys: Vec<_> = from.values.keys().collect();
    let to_keys: Vec<_> = to.values.keys().collect();
    if from_keys != to_keys {
        return Err(MotionError::timeline(format!(
            "from/to keyframes must animate the same properties (from: {from_keys:?}, to: {to_keys:?})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframe.rs"]
mod tests;
