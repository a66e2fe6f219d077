//! Status tiers derived from dimension scores.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("Status thresholds must be finite numbers (strength={strength}, fragile={fragile})")]
    NotFinite { strength: f64, fragile: f64 },

    #[error("Strength threshold {strength} must be greater than fragile threshold {fragile}")]
    Inverted { strength: f64, fragile: f64 },
}

/// Lower bounds (inclusive) for the top two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusThresholds {
    strength: f64,
    fragile: f64,
}

impl StatusThresholds {
    pub fn new(strength: f64, fragile: f64) -> Result<Self, ThresholdError> {
        if !strength.is_finite() || !fragile.is_finite() {
            return Err(ThresholdError::NotFinite { strength, fragile });
        }
        if strength <= fragile {
            return Err(ThresholdError::Inverted { strength, fragile });
        }
        Ok(StatusThresholds { strength, fragile })
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    pub fn fragile(&self) -> f64 {
        self.fragile
    }

    /// `score >= strength` is a Strength, `score >= fragile` is Fragile, anything
    /// lower is At risk.
    pub fn classify(&self, score: f64) -> StatusTier {
        if score >= self.strength {
            StatusTier::Strength
        } else if score >= self.fragile {
            StatusTier::Fragile
        } else {
            StatusTier::AtRisk
        }
    }
}

impl Default for StatusThresholds {
    fn default() -> Self {
        StatusThresholds {
            strength: 4.0,
            fragile: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusTier {
    AtRisk,
    Fragile,
    Strength,
}

impl StatusTier {
    pub fn label(&self) -> &'static str {
        match self {
            StatusTier::Strength => "Strength",
            StatusTier::Fragile => "Fragile",
            StatusTier::AtRisk => "At risk",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StatusTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
