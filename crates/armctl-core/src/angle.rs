//! Angle model: clamping and delta arithmetic for a single servo
//!
//! Every angle that enters the system (user input, explicit targets, device
//! reports) passes through [`Angle::clamp`], so an out-of-range value can never
//! be stored or transmitted.

use serde::{Deserialize, Serialize};

/// Lowest angle a servo accepts, in degrees.
pub const MIN_DEGREES: u8 = 0;

/// Highest angle a servo accepts, in degrees.
pub const MAX_DEGREES: u8 = 180;

/// Neutral midpoint used on power-on and reset.
pub const NEUTRAL_DEGREES: u8 = 90;

/// Integer servo angle in degrees, always within `[0, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Angle(u8);

impl Angle {
    pub const MIN: Angle = Angle(MIN_DEGREES);
    pub const MAX: Angle = Angle(MAX_DEGREES);
    pub const NEUTRAL: Angle = Angle(NEUTRAL_DEGREES);

    /// Round to the nearest whole degree and clamp into `[0, 180]`.
    ///
    /// Total: `NaN` maps to 0 and infinities saturate at the bounds.
    pub fn clamp(value: f64) -> Angle {
        if value.is_nan() {
            return Angle::MIN;
        }
        let rounded = value.round().clamp(MIN_DEGREES as f64, MAX_DEGREES as f64);
        Angle(rounded as u8)
    }

    /// `clamp(current + delta)`
    pub fn apply_delta(self, delta: f64) -> Angle {
        Angle::clamp(self.degrees() as f64 + delta)
    }

    /// Clamp an integer value (device reports, config values).
    pub fn from_degrees(value: i64) -> Angle {
        Angle(value.clamp(MIN_DEGREES as i64, MAX_DEGREES as i64) as u8)
    }

    pub fn degrees(self) -> u8 {
        self.0
    }

    /// Fraction of the full range, for gauges.
    pub fn ratio(self) -> f64 {
        self.0 as f64 / MAX_DEGREES as f64
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::NEUTRAL
    }
}

impl From<Angle> for u8 {
    fn from(angle: Angle) -> u8 {
        angle.0
    }
}

impl TryFrom<i64> for Angle {
    type Error = std::convert::Infallible;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(Angle::from_degrees(value))
    }
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}
