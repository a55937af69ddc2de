use std::fmt;

pub use kurbo::{Point, Rect, Vec2};

/// Stable handle to one addressable visual element in the host render tree.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el#{}", self.0)
    }
}

/// Writable visual property of an element.
///
/// Serialized as a plain string (`"x"`, `"rotation"`, or any other name for custom
/// properties) so it can key JSON maps.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Property {
    /// Horizontal translation in pixels.
    X,
    /// Vertical translation in pixels.
    Y,
    /// Rotation in degrees.
    Rotation,
    /// Uniform scale factor.
    Scale,
    /// Horizontal scale factor.
    ScaleX,
    /// Vertical scale factor.
    ScaleY,
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Any other property the host understands (e.g. `"backgroundColor"`).
    Custom(String),
}

impl Property {
    /// Canonical name used in JSON and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::Opacity => "opacity",
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        match s.as_str() {
            "x" => Self::X,
            "y" => Self::Y,
            "rotation" | "rotate" => Self::Rotation,
            "scale" => Self::Scale,
            "scaleX" => Self::ScaleX,
            "scaleY" => Self::ScaleY,
            "opacity" => Self::Opacity,
            _ => Self::Custom(s),
        }
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<Property> for String {
    fn from(p: Property) -> Self {
        match p {
            Property::Custom(name) => name,
            other => other.name().to_owned(),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete property value written to the render tree.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    /// Numeric value, interpolated linearly.
    Number(f64),
    /// Opaque string value (colors, units), switched at the end of a segment.
    Text(String),
}

impl PropValue {
    /// Numeric payload, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

/// Interpolation contract for animated value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for PropValue {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Self::Number(a), Self::Number(b)) => Self::Number(<f64 as Lerp>::lerp(a, b, t)),
            // Non-numeric pairs hold the start value until the segment completes.
            _ => {
                if t >= 1.0 {
                    b.clone()
                } else {
                    a.clone()
                }
            }
        }
    }
}

/// Layout mode derived from the measured viewport width.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ViewportMode {
    /// Narrow layouts (phones, small tablets).
    Compact,
    /// Everything at or above the breakpoint.
    #[default]
    Wide,
}

impl ViewportMode {
    /// `true` for [`ViewportMode::Compact`].
    pub fn is_compact(self) -> bool {
        matches!(self, Self::Compact)
    }
}

/// Direction a timeline playhead is moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Toward the end of the timeline.
    Forward,
    /// Back toward the from-keyframe.
    Backward,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
