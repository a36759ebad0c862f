//! Harmony modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HarmonyError;

/// The relationship imposed among the colors on the wheel.
///
/// Every mode except [`Mode::Custom`] derives all non-root markers from the
/// root; `Custom` is a sentinel meaning markers hold externally supplied
/// hues verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Analogous,
    Complementary,
    Triad,
    Tetrad,
    Monochromatic,
    Shades,
    Custom,
}

impl Mode {
    /// Every mode, in display order.
    pub const ALL: [Mode; 7] = [
        Mode::Analogous,
        Mode::Complementary,
        Mode::Triad,
        Mode::Tetrad,
        Mode::Monochromatic,
        Mode::Shades,
        Mode::Custom,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Analogous => "Analogous",
            Mode::Complementary => "Complementary",
            Mode::Triad => "Triad",
            Mode::Tetrad => "Tetrad",
            Mode::Monochromatic => "Monochromatic",
            Mode::Shades => "Shades",
            Mode::Custom => "Custom",
        }
    }

    /// Hue period for the periodic modes: how many markers complete one
    /// cycle around the root before the offsets repeat.
    pub fn hue_period(self) -> Option<usize> {
        match self {
            Mode::Complementary => Some(2),
            Mode::Triad => Some(3),
            Mode::Tetrad => Some(4),
            _ => None,
        }
    }

    /// Saturation falloff per completed hue cycle for the periodic modes.
    pub fn saturation_step(self) -> f64 {
        match self {
            Mode::Complementary => 0.2,
            Mode::Triad => 0.3,
            Mode::Tetrad => 0.4,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HarmonyError::InvalidMode(s.to_string()))
    }
}
