//! Dense time-evolving grid of wind, lift and cloud classification
//!
//! Holds the two input fields (advection and convection) and the output
//! classification field. Inputs are immutable once loaded; the output is
//! written once per point by an analysis pass.

use super::dims::{GridDims, GridIndex};
use crate::core_types::{CloudType, Wind};
use crate::error::{CloudError, Result};
use rand::Rng;

/// Read-only view of the input fields.
///
/// Shared freely between worker tasks while a pass runs; it never aliases the
/// classification field.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    dims: GridDims,
    advection: &'a [Wind],
    convection: &'a [f64],
}

impl<'a> FieldView<'a> {
    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Advection at grid coordinates
    #[inline]
    #[must_use]
    pub fn advection_at(&self, idx: GridIndex) -> Wind {
        self.advection[self.dims.flatten(idx)]
    }

    /// Convection (vertical lift) at grid coordinates
    #[inline]
    #[must_use]
    pub fn convection_at(&self, idx: GridIndex) -> f64 {
        self.convection[self.dims.flatten(idx)]
    }

    /// Whole advection field in linear-index order.
    #[must_use]
    pub fn advection_field(&self) -> &'a [Wind] {
        self.advection
    }
}

/// Cloud simulation grid.
///
/// All three fields are stored flat in linear-index order (see
/// [`GridDims::locate`]) and always have exactly `dims.dim()` entries.
#[derive(Debug, Clone)]
pub struct CloudGrid {
    dims: GridDims,
    advection: Vec<Wind>,
    convection: Vec<f64>,
    classification: Vec<CloudType>,
}

impl CloudGrid {
    /// Build a grid from loaded input fields.
    ///
    /// The classification field starts out as code 0 everywhere.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidDimensions`] if either field's length
    /// differs from `dims.dim()`.
    pub fn new(dims: GridDims, advection: Vec<Wind>, convection: Vec<f64>) -> Result<Self> {
        let dims = GridDims::new(dims.dimt, dims.dimx, dims.dimy)?;
        let expected = dims.dim();
        if advection.len() != expected {
            return Err(CloudError::invalid_dimensions(format!(
                "advection has {} points, {dims} grid needs {expected}",
                advection.len()
            )));
        }
        if convection.len() != expected {
            return Err(CloudError::invalid_dimensions(format!(
                "convection has {} points, {dims} grid needs {expected}",
                convection.len()
            )));
        }

        Ok(Self {
            dims,
            advection,
            convection,
            classification: vec![CloudType::default(); expected],
        })
    }

    /// Build a grid by evaluating `f` at every point in linear-index order.
    pub fn from_fn<F>(dims: GridDims, mut f: F) -> Self
    where
        F: FnMut(GridIndex) -> (Wind, f64),
    {
        let n = dims.dim();
        let mut advection = Vec::with_capacity(n);
        let mut convection = Vec::with_capacity(n);
        for pos in 0..n {
            let (wind, uplift) = f(dims.locate(pos));
            advection.push(wind);
            convection.push(uplift);
        }
        Self {
            dims,
            advection,
            convection,
            classification: vec![CloudType::default(); n],
        }
    }

    /// Grid with uniformly random inputs.
    ///
    /// Wind components and uplift are drawn from `[-1, 1)`, which exercises
    /// all three classification outcomes.
    pub fn random<R: Rng>(dims: GridDims, rng: &mut R) -> Self {
        Self::from_fn(dims, |_| {
            let u = rng.random_range(-1.0..1.0);
            let v = rng.random_range(-1.0..1.0);
            let w = rng.random_range(-1.0..1.0);
            (Wind::new(u, v), w)
        })
    }

    #[inline]
    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Total number of points.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dims.dim()
    }

    /// Read-only view of the input fields
    #[must_use]
    pub fn view(&self) -> FieldView<'_> {
        FieldView {
            dims: self.dims,
            advection: &self.advection,
            convection: &self.convection,
        }
    }

    /// Borrow the inputs for reading and the classification field for
    /// writing at the same time.
    pub fn split_fields(&mut self) -> (FieldView<'_>, &mut [CloudType]) {
        (
            FieldView {
                dims: self.dims,
                advection: &self.advection,
                convection: &self.convection,
            },
            &mut self.classification,
        )
    }

    #[must_use]
    pub fn advection(&self) -> &[Wind] {
        &self.advection
    }

    #[must_use]
    pub fn convection(&self) -> &[f64] {
        &self.convection
    }

    #[must_use]
    pub fn advection_at(&self, idx: GridIndex) -> Wind {
        self.advection[self.dims.flatten(idx)]
    }

    #[must_use]
    pub fn convection_at(&self, idx: GridIndex) -> f64 {
        self.convection[self.dims.flatten(idx)]
    }

    /// Classification field in linear-index order
    #[must_use]
    pub fn classification(&self) -> &[CloudType] {
        &self.classification
    }

    #[must_use]
    pub fn classification_at(&self, idx: GridIndex) -> CloudType {
        self.classification[self.dims.flatten(idx)]
    }

    /// Mutable classification field, for callers that classify without
    /// going through an analysis run.
    pub fn classification_mut(&mut self) -> &mut [CloudType] {
        &mut self.classification
    }

    /// Reset every classification code to 0.
    pub fn reset_classification(&mut self) {
        self.classification.fill(CloudType::default());
    }
}
