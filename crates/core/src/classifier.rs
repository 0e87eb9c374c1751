//! Local-neighbourhood cloud classification
//!
//! A point's cloud type is decided by comparing the local average wind with
//! the vertical lift at that point:
//!
//! ```text
//! avg       = mean of advection over the in-bounds 3x3 neighbourhood at time t
//! magnitude = |avg|
//! uplift    = convection[t][x][y]
//!
//! |uplift| > magnitude                         -> cumulus
//! magnitude > 0.2 and magnitude >= |uplift|    -> striated stratus
//! otherwise                                    -> amorphous stratus
//! ```
//!
//! Points on a grid edge have fewer neighbours (4 at a corner, 6 along an
//! edge, 9 inside) and the average divides by the actual count.

use crate::core_types::{CloudType, Wind};
use crate::grid::{FieldView, GridIndex};
use serde::{Deserialize, Serialize};

/// Classification constants
pub mod constants {
    /// Minimum local wind speed for striated stratus.
    pub const STRATUS_WIND_THRESHOLD: f64 = 0.2;
}

/// Average wind over a point's neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalWind {
    /// Mean advection over the in-bounds neighbours
    pub average: Wind,
    /// Number of neighbours that contributed (including the point itself)
    pub num_points: usize,
}

/// Pure per-point classifier. Reads advection and convection, never writes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classifier {
    /// Wind speed above which wind-dominated points become striated stratus
    pub stratus_threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            stratus_threshold: constants::STRATUS_WIND_THRESHOLD,
        }
    }
}

impl Classifier {
    #[must_use]
    pub fn new(stratus_threshold: f64) -> Self {
        Self { stratus_threshold }
    }

    /// Mean advection over the 3x3 spatial neighbourhood of `idx` at the same
    /// time step, restricted to in-bounds points.
    #[must_use]
    pub fn local_average(view: FieldView<'_>, idx: GridIndex) -> LocalWind {
        let dims = view.dims();
        let cx = idx.x as isize;
        let cy = idx.y as isize;

        let mut sum = Wind::zeros();
        let mut num_points = 0usize;
        for i in (cx - 1)..=(cx + 1) {
            for j in (cy - 1)..=(cy + 1) {
                if dims.in_bounds(i, j) {
                    sum += view.advection_at(GridIndex::new(idx.t, i as usize, j as usize));
                    num_points += 1;
                }
            }
        }

        LocalWind {
            average: sum / num_points as f64,
            num_points,
        }
    }

    /// Apply the threshold rule to a local wind speed and an uplift value.
    ///
    /// Rules are checked in order and the first match wins.
    #[must_use]
    pub fn classify_values(&self, magnitude: f64, uplift: f64) -> CloudType {
        let lift = uplift.abs();
        if lift > magnitude {
            CloudType::Cumulus
        } else if magnitude > self.stratus_threshold && magnitude >= lift {
            CloudType::StriatedStratus
        } else {
            CloudType::AmorphousStratus
        }
    }

    /// Classify one grid point.
    #[must_use]
    pub fn classify(&self, view: FieldView<'_>, idx: GridIndex) -> CloudType {
        let local = Self::local_average(view, idx);
        self.classify_values(local.average.norm(), view.convection_at(idx))
    }
}
