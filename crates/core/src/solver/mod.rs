//! Parallel divide-and-conquer traversal engine
//!
//! Both passes walk the linear index space `[0, dim())` of a grid by
//! recursive halving. Below the sequential cutoff a range is processed in a
//! plain loop; above it the range is split in two, the right half runs on the
//! current thread and the left half is offered to the rayon pool, and the
//! partial advection sums are added after both halves finish.
//!
//! - [`ParallelReducer`] sums advection only.
//! - [`ParallelClassifier`] writes a classification code per index and, when
//!   fused, also returns the advection sum from the same traversal.
//!
//! # Example
//!
//! ```rust
//! use cloudscape_core::classifier::Classifier;
//! use cloudscape_core::grid::{CloudGrid, GridDims};
//! use cloudscape_core::solver::{NoopObserver, ParallelClassifier};
//! use cloudscape_core::Wind;
//!
//! let dims = GridDims::new(1, 2, 2).unwrap();
//! let mut grid = CloudGrid::from_fn(dims, |_| (Wind::new(1.0, 0.0), 0.0));
//! let (view, out) = grid.split_fields();
//! let pass = ParallelClassifier::new(view, Classifier::default(), 2, true, &NoopObserver);
//! let sum = pass.classify_all(out);
//! assert_eq!(sum, Wind::new(4.0, 0.0));
//! ```

pub mod classify_pass;
pub mod profiler;
pub mod reducer;

// Re-exports
pub use classify_pass::{ClassificationCell, ParallelClassifier};
pub use profiler::{NoopObserver, ProfilerScope, SplitCounter, SplitObserver};
pub use reducer::ParallelReducer;
