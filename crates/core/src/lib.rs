//! Cloud Classification Core Library
//!
//! Classifies every point of a time-evolving `dimt x dimx x dimy` grid into
//! one of three cloud archetypes and computes the grid-wide average wind
//! ("prevailing wind").
//!
//! Inputs per point are a horizontal wind vector (advection) and a vertical
//! lift scalar (convection). Each point's cloud type comes from the average
//! wind over its 3x3 spatial neighbourhood compared with its own lift.
//!
//! ## Parallel traversal
//!
//! Both the sum and the classification walk the flattened index space with a
//! recursive fork-join decomposition on rayon's work-stealing pool. The
//! classification pass hands each task an exclusive `&mut` sub-slice of the
//! output field, so the grid is written concurrently without locks.
//!
//! ```rust
//! use cloudscape_core::{AnalysisConfig, CloudAnalysis, CloudGrid, GridDims, Wind};
//!
//! let dims = GridDims::new(1, 2, 2).unwrap();
//! let mut grid = CloudGrid::from_fn(dims, |_| (Wind::new(1.0, 0.0), 0.0));
//! let analysis = CloudAnalysis::new(AnalysisConfig::default()).unwrap();
//! let report = analysis.run(&mut grid).unwrap();
//! assert_eq!(report.prevailing_wind, Wind::new(1.0, 0.0));
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;

// Grid storage, classification and the parallel engine
pub mod classifier;
pub mod grid;
pub mod solver;

// Run orchestration and batch I/O
pub mod analysis;
pub mod io;
pub mod validate;

// Re-export core types
pub use core_types::{CloudType, Wind};
pub use error::{CloudError, Result};

// Re-export grid and engine types
pub use classifier::{Classifier, LocalWind};
pub use grid::{CloudGrid, FieldView, GridDims, GridIndex};
pub use solver::{
    ClassificationCell, NoopObserver, ParallelClassifier, ParallelReducer, SplitCounter,
    SplitObserver,
};

// Re-export orchestration types
pub use analysis::{
    benchmark_cutoffs, AnalysisConfig, AnalysisReport, BenchmarkSample, CloudAnalysis,
};
pub use validate::{compare, ReferenceOutput, ValidationReport};
