//! Grid dimensions and linear-index mapping
//!
//! Every field in a [`CloudGrid`](super::CloudGrid) is stored flat. A linear
//! index `pos` addresses the point `(t, x, y)` in row-major order with `t`
//! varying slowest and `y` fastest:
//!
//! ```text
//! t = pos / (dimx * dimy)
//! x = (pos % (dimx * dimy)) / dimy
//! y = pos % dimy
//! ```
//!
//! The parallel passes partition `[0, dim())` by this index, so the mapping
//! must round-trip exactly.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Extent of a grid: time steps by x points by y points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of time steps
    pub dimt: usize,
    /// Points along x
    pub dimx: usize,
    /// Points along y
    pub dimy: usize,
}

/// Coordinates of one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridIndex {
    pub t: usize,
    pub x: usize,
    pub y: usize,
}

impl GridIndex {
    #[must_use]
    pub fn new(t: usize, x: usize, y: usize) -> Self {
        Self { t, x, y }
    }
}

impl GridDims {
    /// Create dimensions, checking that the element count fits in `usize`.
    ///
    /// Zero-sized axes are accepted; an empty grid is rejected later, when an
    /// analysis tries to average over it.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidDimensions`] if `dimt * dimx * dimy`
    /// overflows.
    pub fn new(dimt: usize, dimx: usize, dimy: usize) -> Result<Self> {
        dimt.checked_mul(dimx)
            .and_then(|n| n.checked_mul(dimy))
            .ok_or_else(|| {
                CloudError::invalid_dimensions(format!(
                    "{dimt}x{dimx}x{dimy} exceeds addressable size"
                ))
            })?;
        Ok(Self { dimt, dimx, dimy })
    }

    /// Total number of points, `dimt * dimx * dimy`.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dimt * self.dimx * self.dimy
    }

    /// Number of points in one time step.
    #[inline]
    #[must_use]
    pub fn layer_size(&self) -> usize {
        self.dimx * self.dimy
    }

    /// Convert a linear index into grid coordinates.
    ///
    /// # Panics
    /// Panics if `pos >= dim()`.
    #[inline]
    #[must_use]
    pub fn locate(&self, pos: usize) -> GridIndex {
        assert!(
            pos < self.dim(),
            "linear index {pos} out of range for {} points",
            self.dim()
        );
        let layer = self.layer_size();
        GridIndex {
            t: pos / layer,
            x: (pos % layer) / self.dimy,
            y: pos % self.dimy,
        }
    }

    /// Convert grid coordinates back into a linear index.
    #[inline]
    #[must_use]
    pub fn flatten(&self, idx: GridIndex) -> usize {
        debug_assert!(idx.t < self.dimt && idx.x < self.dimx && idx.y < self.dimy);
        idx.t * self.layer_size() + idx.x * self.dimy + idx.y
    }

    /// Spatial bounds check. Time is never checked here: neighbour search
    /// stays inside one time step.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.dimx && (y as usize) < self.dimy
    }
}

impl std::fmt::Display for GridDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.dimt, self.dimx, self.dimy)
    }
}
