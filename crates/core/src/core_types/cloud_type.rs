//! Cloud archetypes produced by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cloud type likely to form at a grid point.
///
/// The discriminants are the integer codes used in output files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CloudType {
    /// Code 0: vertical lift dominates horizontal wind
    #[default]
    Cumulus = 0,
    /// Code 1: horizontal wind dominates and is non-negligible
    StriatedStratus = 1,
    /// Code 2: weak wind and weak lift
    AmorphousStratus = 2,
}

impl CloudType {
    /// Integer code written to output files.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse an output-file code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Cumulus),
            1 => Some(Self::StriatedStratus),
            2 => Some(Self::AmorphousStratus),
            _ => None,
        }
    }

    /// Human-readable archetype name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Cumulus => "cumulus",
            Self::StriatedStratus => "striated stratus",
            Self::AmorphousStratus => "amorphous stratus",
        }
    }
}

impl fmt::Display for CloudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
