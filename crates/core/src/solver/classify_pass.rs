//! Parallel classification pass with optional fused advection sum
//!
//! Uses the same halving strategy as [`ParallelReducer`](super::ParallelReducer).
//! The output slice is split with `split_at_mut` at every fork, so each task
//! owns exactly the cells of its own index range. Writes need no locks and
//! overlapping ranges cannot be expressed.

use super::profiler::SplitObserver;
use crate::classifier::Classifier;
use crate::core_types::{CloudType, Wind};
use crate::grid::FieldView;

/// Destination for one point's classification.
pub trait ClassificationCell: Send {
    /// Store the code computed for this cell.
    fn record(&mut self, cloud: CloudType);
}

impl ClassificationCell for CloudType {
    #[inline]
    fn record(&mut self, cloud: CloudType) {
        *self = cloud;
    }
}

/// Recursive classification over a range of linear indices.
///
/// With `fused` set, leaves also sum advection over their range and the pass
/// returns the total, so one traversal yields both the classification grid
/// and the prevailing-wind numerator. Without it the returned sum is zero.
pub struct ParallelClassifier<'a> {
    view: FieldView<'a>,
    classifier: Classifier,
    cutoff: usize,
    fused: bool,
    observer: &'a dyn SplitObserver,
}

impl<'a> ParallelClassifier<'a> {
    /// # Panics
    /// Panics if `cutoff` is zero.
    pub fn new(
        view: FieldView<'a>,
        classifier: Classifier,
        cutoff: usize,
        fused: bool,
        observer: &'a dyn SplitObserver,
    ) -> Self {
        assert!(cutoff > 0, "sequential cutoff must be at least 1");
        Self {
            view,
            classifier,
            cutoff,
            fused,
            observer,
        }
    }

    /// Classify every point in `[lo, hi)`, writing the code for index
    /// `lo + i` into `out[i]`.
    ///
    /// # Panics
    /// Panics if `lo > hi`, if `out.len() != hi - lo`, or if `hi` is past the
    /// end of the grid.
    pub fn classify_range<C: ClassificationCell>(
        &self,
        lo: usize,
        hi: usize,
        out: &mut [C],
    ) -> Wind {
        assert!(lo <= hi, "range underflow: lo {lo} > hi {hi}");
        let len = hi - lo;
        assert_eq!(
            out.len(),
            len,
            "output slice does not match range [{lo}, {hi})"
        );
        if len == 0 {
            return Wind::zeros();
        }

        if len < self.cutoff || len == 1 {
            self.observer.on_leaf(len);
            return self.classify_sequential(lo, out);
        }

        let mid = lo + len / 2;
        let (left_out, right_out) = out.split_at_mut(mid - lo);
        self.observer.on_split();
        let (right, left) = rayon::join(
            || self.classify_range(mid, hi, right_out),
            || self.classify_range(lo, mid, left_out),
        );
        left + right
    }

    /// Classify the whole grid.
    ///
    /// # Panics
    /// Panics if `out` does not hold one cell per grid point.
    pub fn classify_all<C: ClassificationCell>(&self, out: &mut [C]) -> Wind {
        self.classify_range(0, self.view.dims().dim(), out)
    }

    fn classify_sequential<C: ClassificationCell>(&self, lo: usize, out: &mut [C]) -> Wind {
        let dims = self.view.dims();
        let mut sum = Wind::zeros();
        for (offset, cell) in out.iter_mut().enumerate() {
            let idx = dims.locate(lo + offset);
            cell.record(self.classifier.classify(self.view, idx));
            if self.fused {
                sum += self.view.advection_at(idx);
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CloudGrid, GridDims};
    use crate::solver::profiler::{NoopObserver, SplitCounter};
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Cell that remembers how often it was written.
    #[derive(Debug, Clone, Default)]
    struct CountingCell {
        writes: u32,
        last: Option<CloudType>,
    }

    impl ClassificationCell for CountingCell {
        fn record(&mut self, cloud: CloudType) {
            self.writes += 1;
            self.last = Some(cloud);
        }
    }

    fn random_grid(t: usize, x: usize, y: usize, seed: u64) -> CloudGrid {
        let dims = GridDims::new(t, x, y).unwrap();
        CloudGrid::random(dims, &mut StdRng::seed_from_u64(seed))
    }

    fn sequential_codes(grid: &CloudGrid) -> Vec<CloudType> {
        let dims = grid.dims();
        let classifier = Classifier::default();
        (0..grid.dim())
            .map(|pos| classifier.classify(grid.view(), dims.locate(pos)))
            .collect()
    }

    #[test]
    fn test_every_index_written_exactly_once() {
        let grid = random_grid(3, 7, 9, 11);
        let expected = sequential_codes(&grid);

        for cutoff in [1, 2, 5, 16, 2000] {
            let mut cells = vec![CountingCell::default(); grid.dim()];
            let pass = ParallelClassifier::new(
                grid.view(),
                Classifier::default(),
                cutoff,
                false,
                &NoopObserver,
            );
            pass.classify_all(&mut cells);

            for (pos, cell) in cells.iter().enumerate() {
                assert_eq!(cell.writes, 1, "cutoff {cutoff}, index {pos}");
                assert_eq!(cell.last, Some(expected[pos]));
            }
        }
    }

    #[test]
    fn test_empty_range_performs_no_writes() {
        let grid = random_grid(1, 4, 4, 2);
        let counter = SplitCounter::new();
        let pass = ParallelClassifier::new(grid.view(), Classifier::default(), 1, true, &counter);
        let mut cells: Vec<CountingCell> = Vec::new();
        let sum = pass.classify_range(5, 5, &mut cells);
        assert_eq!(sum, Wind::zeros());
        assert_eq!(counter.leaves(), 0);
        assert_eq!(counter.splits(), 0);
    }

    #[test]
    fn test_sub_range_writes_offset_cells() {
        let grid = random_grid(2, 4, 5, 5);
        let expected = sequential_codes(&grid);
        let pass = ParallelClassifier::new(
            grid.view(),
            Classifier::default(),
            3,
            false,
            &NoopObserver,
        );

        let mut out = vec![CloudType::default(); 23];
        pass.classify_range(12, 35, &mut out);
        assert_eq!(out.as_slice(), &expected[12..35]);
    }

    #[test]
    fn test_fused_sum_matches_advection_total() {
        let grid = random_grid(2, 13, 11, 8);
        let total = grid
            .advection()
            .iter()
            .fold(Wind::zeros(), |acc, w| acc + w);

        let mut out = vec![CloudType::default(); grid.dim()];
        let pass = ParallelClassifier::new(
            grid.view(),
            Classifier::default(),
            7,
            true,
            &NoopObserver,
        );
        let sum = pass.classify_all(&mut out);
        assert_abs_diff_eq!(sum.x, total.x, epsilon = 1e-6);
        assert_abs_diff_eq!(sum.y, total.y, epsilon = 1e-6);
        assert_eq!(out, sequential_codes(&grid));
    }

    #[test]
    fn test_unfused_pass_returns_zero_sum() {
        let grid = random_grid(1, 5, 5, 4);
        let mut out = vec![CloudType::default(); grid.dim()];
        let pass = ParallelClassifier::new(
            grid.view(),
            Classifier::default(),
            4,
            false,
            &NoopObserver,
        );
        assert_eq!(pass.classify_all(&mut out), Wind::zeros());
    }

    #[test]
    fn test_split_count_for_cutoff_one() {
        let grid = random_grid(1, 4, 4, 6);
        let counter = SplitCounter::new();
        let mut out = vec![CloudType::default(); grid.dim()];
        let pass = ParallelClassifier::new(grid.view(), Classifier::default(), 1, true, &counter);
        pass.classify_all(&mut out);
        assert_eq!(counter.leaves(), 16);
        assert_eq!(counter.splits(), 15);
    }

    #[test]
    #[should_panic(expected = "range underflow")]
    fn test_reversed_range_panics() {
        let grid = random_grid(1, 2, 2, 0);
        let pass = ParallelClassifier::new(
            grid.view(),
            Classifier::default(),
            2,
            false,
            &NoopObserver,
        );
        let mut out: Vec<CloudType> = Vec::new();
        pass.classify_range(3, 1, &mut out);
    }

    #[test]
    #[should_panic(expected = "output slice does not match")]
    fn test_output_length_must_match_range() {
        let grid = random_grid(1, 2, 2, 0);
        let pass = ParallelClassifier::new(
            grid.view(),
            Classifier::default(),
            2,
            false,
            &NoopObserver,
        );
        let mut out = vec![CloudType::default(); 3];
        pass.classify_range(0, 4, &mut out);
    }
}
