/// Easing curve applied to normalized progress.
///
/// The `power*` aliases accept the names hosts commonly use for the same curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    #[serde(alias = "none", alias = "linear")]
    Linear,
    #[serde(alias = "power1.in")]
    InQuad,
    #[serde(alias = "power1.out")]
    OutQuad,
    #[serde(alias = "power1.inOut")]
    InOutQuad,
    #[serde(alias = "power2.in")]
    InCubic,
    #[serde(alias = "power2.out")]
    OutCubic,
    #[serde(alias = "power2.inOut")]
    InOutCubic,
    #[serde(alias = "sine.in")]
    InSine,
    #[serde(alias = "sine.out")]
    OutSine,
    #[serde(alias = "sine.inOut")]
    InOutSine,
    #[serde(alias = "back.out")]
    OutBack,
}

impl Ease {
    pub const ALL: [Ease; 11] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::InSine,
        Ease::OutSine,
        Ease::InOutSine,
        Ease::OutBack,
    ];

    pub fn apply(self, t: f64) -> f64 {
        use std::f64::consts::FRAC_PI_2;

        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::InSine => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - (t * FRAC_PI_2).cos()
                }
            }
            Self::OutSine => (t * FRAC_PI_2).sin(),
            Self::InOutSine => {
                if t >= 1.0 {
                    1.0
                } else {
                    -((std::f64::consts::PI * t).cos() - 1.0) / 2.0
                }
            }
            Self::OutBack => {
                // Overshoots slightly past 1 before settling.
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
