//! Vector type alias for horizontal wind.

use nalgebra::Vector2;

/// Horizontal wind vector `(u, v)`.
///
/// This is a simple alias for `nalgebra::Vector2<f64>`, used for advection
/// samples, partial sums produced by the parallel passes, and the prevailing
/// wind reported at the end of a run.
pub type Wind = Vector2<f64>;
