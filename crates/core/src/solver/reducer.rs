//! Parallel sum of the advection field
//!
//! Divide-and-conquer over linear indices: ranges shorter than the sequential
//! cutoff are summed in a plain loop, longer ranges are halved and the halves
//! run under `rayon::join`. The current thread keeps the right half while the
//! left half is offered to the pool for stealing.

use super::profiler::SplitObserver;
use crate::core_types::Wind;
use crate::grid::FieldView;

/// Recursive advection sum over a range of linear indices.
///
/// # Floating-point order
///
/// The result is the sum over the range for every cutoff, but the grouping of
/// the additions depends on where the range is split. Results for different
/// cutoffs agree to within rounding error, not bit for bit.
pub struct ParallelReducer<'a> {
    view: FieldView<'a>,
    cutoff: usize,
    observer: &'a dyn SplitObserver,
}

impl<'a> ParallelReducer<'a> {
    /// # Panics
    /// Panics if `cutoff` is zero.
    pub fn new(view: FieldView<'a>, cutoff: usize, observer: &'a dyn SplitObserver) -> Self {
        assert!(cutoff > 0, "sequential cutoff must be at least 1");
        Self {
            view,
            cutoff,
            observer,
        }
    }

    /// Sum advection over `[lo, hi)`.
    ///
    /// # Panics
    /// Panics if `lo > hi` or `hi` is past the end of the grid.
    pub fn reduce_range(&self, lo: usize, hi: usize) -> Wind {
        assert!(lo <= hi, "range underflow: lo {lo} > hi {hi}");
        let len = hi - lo;
        if len == 0 {
            return Wind::zeros();
        }

        // A single point cannot be split further, even with a cutoff of 1
        if len < self.cutoff || len == 1 {
            self.observer.on_leaf(len);
            return self.sum_sequential(lo, hi);
        }

        let mid = lo + len / 2;
        self.observer.on_split();
        let (right, left) = rayon::join(
            || self.reduce_range(mid, hi),
            || self.reduce_range(lo, mid),
        );
        left + right
    }

    /// Sum advection over the whole grid.
    pub fn reduce_all(&self) -> Wind {
        self.reduce_range(0, self.view.dims().dim())
    }

    fn sum_sequential(&self, lo: usize, hi: usize) -> Wind {
        let dims = self.view.dims();
        let mut sum = Wind::zeros();
        for pos in lo..hi {
            sum += self.view.advection_at(dims.locate(pos));
        }
        sum
    }
}
