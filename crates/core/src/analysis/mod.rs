//! Orchestration of a full classification + prevailing-wind run
//!
//! [`CloudAnalysis`] owns the run configuration and, optionally, a dedicated
//! worker pool. A run launches one top-level task over `[0, dim())`:
//! either a fused [`ParallelClassifier`] pass, or a [`ParallelReducer`] pass
//! followed by a plain classification pass. It then divides the advection sum
//! by the point count to get the prevailing wind.

pub mod benchmark;
pub mod config;

pub use benchmark::{benchmark_cutoffs, BenchmarkSample};
pub use config::{constants, AnalysisConfig};

use crate::classifier::Classifier;
use crate::core_types::Wind;
use crate::error::{CloudError, Result};
use crate::grid::CloudGrid;
use crate::solver::{
    ParallelClassifier, ParallelReducer, ProfilerScope, SplitCounter, SplitObserver,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of one analysis run.
///
/// The classification grid itself is left populated in the [`CloudGrid`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Grid-wide average advection
    pub prevailing_wind: Wind,
    /// Number of points classified
    pub points: usize,
    /// Wall-clock time of the traversal
    pub elapsed: Duration,
    /// Range splits performed, when counted
    pub splits: Option<u64>,
}

/// Runs analyses with a fixed configuration.
pub struct CloudAnalysis {
    config: AnalysisConfig,
    pool: Option<rayon::ThreadPool>,
}

impl CloudAnalysis {
    /// Validate `config` and build the worker pool it asks for.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidConfig`] for out-of-range parameters and
    /// [`CloudError::ThreadPool`] if the dedicated pool cannot be created.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let pool = match config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("cloudscape-worker-{i}"))
                    .build()
                    .map_err(|e| CloudError::ThreadPool(e.to_string()))?;
                debug!(threads, "built dedicated worker pool");
                Some(pool)
            }
            None => None,
        };

        Ok(Self { config, pool })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify every point of `grid` and compute the prevailing wind,
    /// counting range splits.
    ///
    /// # Errors
    /// Returns [`CloudError::EmptyGrid`] if the grid has no points.
    pub fn run(&self, grid: &mut CloudGrid) -> Result<AnalysisReport> {
        let counter = SplitCounter::new();
        let mut report = self.run_observed(grid, &counter)?;
        report.splits = Some(counter.splits());
        Ok(report)
    }

    /// Like [`run`](Self::run), reporting decomposition events to `observer`.
    ///
    /// # Errors
    /// Returns [`CloudError::EmptyGrid`] if the grid has no points.
    pub fn run_observed(
        &self,
        grid: &mut CloudGrid,
        observer: &dyn SplitObserver,
    ) -> Result<AnalysisReport> {
        let points = grid.dim();
        if points == 0 {
            return Err(CloudError::EmptyGrid);
        }

        let AnalysisConfig {
            cutoff,
            fused,
            stratus_threshold,
            ..
        } = self.config;
        info!(dims = %grid.dims(), cutoff, fused, "starting cloud analysis");

        let classifier = Classifier::new(stratus_threshold);
        let scope = ProfilerScope::new("cloud_analysis");
        let (view, out) = grid.split_fields();

        let sum = self.install(|| {
            if fused {
                ParallelClassifier::new(view, classifier, cutoff, true, observer).classify_all(out)
            } else {
                let sum = ParallelReducer::new(view, cutoff, observer).reduce_all();
                ParallelClassifier::new(view, classifier, cutoff, false, observer)
                    .classify_all(out);
                sum
            }
        });
        let elapsed = scope.elapsed();

        let prevailing_wind = sum / points as f64;
        info!(
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            wind_x = prevailing_wind.x,
            wind_y = prevailing_wind.y,
            "cloud analysis finished"
        );

        Ok(AnalysisReport {
            prevailing_wind,
            points,
            elapsed,
            splits: None,
        })
    }

    /// Single-threaded baseline: average the whole field, then classify each
    /// point in index order.
    ///
    /// # Errors
    /// Returns [`CloudError::EmptyGrid`] if the grid has no points.
    pub fn run_sequential(&self, grid: &mut CloudGrid) -> Result<AnalysisReport> {
        let points = grid.dim();
        if points == 0 {
            return Err(CloudError::EmptyGrid);
        }

        let classifier = Classifier::new(self.config.stratus_threshold);
        let scope = ProfilerScope::new("cloud_analysis_sequential");
        let (view, out) = grid.split_fields();
        let dims = view.dims();

        let sum = view
            .advection_field()
            .iter()
            .fold(Wind::zeros(), |acc, w| acc + w);
        for (pos, cell) in out.iter_mut().enumerate() {
            *cell = classifier.classify(view, dims.locate(pos));
        }
        let elapsed = scope.elapsed();

        Ok(AnalysisReport {
            prevailing_wind: sum / points as f64,
            points,
            elapsed,
            splits: Some(0),
        })
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::CloudType;
    use crate::grid::GridDims;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn random_grid(t: usize, x: usize, y: usize, seed: u64) -> CloudGrid {
        let dims = GridDims::new(t, x, y).unwrap();
        CloudGrid::random(dims, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_identical_winds_average_exactly() {
        let dims = GridDims::new(1, 2, 2).unwrap();
        for cutoff in [1, 2, 3, 2000] {
            for fused in [true, false] {
                let mut grid = CloudGrid::from_fn(dims, |idx| {
                    (Wind::new(1.0, 0.0), idx.y as f64 * 0.7)
                });
                let analysis = CloudAnalysis::new(AnalysisConfig {
                    cutoff,
                    fused,
                    ..Default::default()
                })
                .unwrap();
                let report = analysis.run(&mut grid).unwrap();
                assert_eq!(report.prevailing_wind, Wind::new(1.0, 0.0));
                assert_eq!(report.points, 4);
            }
        }
    }

    #[test]
    fn test_empty_grid_is_an_error() {
        let dims = GridDims::new(0, 3, 3).unwrap();
        let mut grid = CloudGrid::new(dims, Vec::new(), Vec::new()).unwrap();
        let analysis = CloudAnalysis::new(AnalysisConfig::default()).unwrap();
        assert!(matches!(analysis.run(&mut grid), Err(CloudError::EmptyGrid)));
        assert!(matches!(
            analysis.run_sequential(&mut grid),
            Err(CloudError::EmptyGrid)
        ));
    }

    #[test]
    fn test_parallel_matches_sequential_baseline() {
        let template = random_grid(3, 20, 15, 21);
        let analysis = CloudAnalysis::new(AnalysisConfig::default().with_cutoff(37)).unwrap();

        let mut sequential = template.clone();
        let baseline = analysis.run_sequential(&mut sequential).unwrap();

        for fused in [true, false] {
            let mut grid = template.clone();
            let analysis = CloudAnalysis::new(AnalysisConfig {
                cutoff: 37,
                fused,
                ..Default::default()
            })
            .unwrap();
            let report = analysis.run(&mut grid).unwrap();

            assert_abs_diff_eq!(
                report.prevailing_wind.x,
                baseline.prevailing_wind.x,
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                report.prevailing_wind.y,
                baseline.prevailing_wind.y,
                epsilon = 1e-9
            );
            assert_eq!(grid.classification(), sequential.classification());
        }
    }

    #[test]
    fn test_split_count_reported() {
        let mut grid = random_grid(1, 10, 10, 5);
        let analysis = CloudAnalysis::new(AnalysisConfig::default().with_cutoff(1)).unwrap();
        let report = analysis.run(&mut grid).unwrap();
        assert_eq!(report.splits, Some(99));

        let analysis = CloudAnalysis::new(AnalysisConfig::default()).unwrap();
        let report = analysis.run(&mut grid).unwrap();
        assert_eq!(report.splits, Some(0));
    }

    #[test]
    fn test_unfused_run_counts_both_passes() {
        let mut grid = random_grid(1, 4, 4, 5);
        let analysis = CloudAnalysis::new(AnalysisConfig {
            cutoff: 1,
            fused: false,
            ..Default::default()
        })
        .unwrap();
        let report = analysis.run(&mut grid).unwrap();
        assert_eq!(report.splits, Some(30));
    }

    #[test]
    fn test_dedicated_pool() {
        let mut grid = random_grid(2, 8, 8, 13);
        let analysis = CloudAnalysis::new(AnalysisConfig {
            cutoff: 4,
            threads: Some(2),
            ..Default::default()
        })
        .unwrap();
        let report = analysis.run(&mut grid).unwrap();
        assert!(report.prevailing_wind.x.is_finite());
    }

    #[test]
    fn test_threshold_flows_into_classifier() {
        // |(0.3, 0.4)| = 0.5, uplift 0.1
        let dims = GridDims::new(1, 3, 3).unwrap();
        let template = CloudGrid::from_fn(dims, |_| (Wind::new(0.3, 0.4), 0.1));

        let mut grid = template.clone();
        CloudAnalysis::new(AnalysisConfig::default())
            .unwrap()
            .run(&mut grid)
            .unwrap();
        assert!(grid
            .classification()
            .iter()
            .all(|&c| c == CloudType::StriatedStratus));

        let mut grid = template;
        CloudAnalysis::new(AnalysisConfig {
            stratus_threshold: 0.6,
            ..Default::default()
        })
        .unwrap()
        .run(&mut grid)
        .unwrap();
        assert!(grid
            .classification()
            .iter()
            .all(|&c| c == CloudType::AmorphousStratus));
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        assert!(CloudAnalysis::new(AnalysisConfig::default().with_cutoff(0)).is_err());
    }
}
