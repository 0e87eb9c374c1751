//! Cutoff sweep for timing the parallel passes

use super::{AnalysisConfig, AnalysisReport, CloudAnalysis};
use crate::core_types::Wind;
use crate::error::{CloudError, Result};
use crate::grid::CloudGrid;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Timing for one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSample {
    /// Row label (`sequential` or `cutoff=N`)
    pub label: String,
    /// Cutoff used, `None` for the sequential baseline
    pub cutoff: Option<usize>,
    /// Fastest of the repeats
    pub best: Duration,
    /// Mean over the repeats
    pub mean: Duration,
    /// Splits per run
    pub splits: Option<u64>,
    /// Prevailing wind from the last repeat
    pub prevailing_wind: Wind,
}

/// Time the sequential baseline and a parallel run for each cutoff.
///
/// Every configuration is run `repeats` times on `grid`; classification is
/// reset between runs. The baseline is the first sample.
///
/// # Errors
/// Returns [`CloudError::InvalidConfig`] if `repeats` is zero or a cutoff is
/// invalid, and [`CloudError::EmptyGrid`] for an empty grid.
pub fn benchmark_cutoffs(
    grid: &mut CloudGrid,
    base: &AnalysisConfig,
    cutoffs: &[usize],
    repeats: usize,
) -> Result<Vec<BenchmarkSample>> {
    if repeats == 0 {
        return Err(CloudError::InvalidConfig {
            field: "repeats",
            reason: "must be at least 1".into(),
        });
    }

    let mut samples = Vec::with_capacity(cutoffs.len() + 1);

    let baseline = CloudAnalysis::new(base.clone())?;
    samples.push(time_runs(grid, repeats, "sequential".into(), None, |g| {
        baseline.run_sequential(g)
    })?);

    for &cutoff in cutoffs {
        let analysis = CloudAnalysis::new(base.clone().with_cutoff(cutoff))?;
        samples.push(time_runs(
            grid,
            repeats,
            format!("cutoff={cutoff}"),
            Some(cutoff),
            |g| analysis.run(g),
        )?);
    }

    Ok(samples)
}

fn time_runs<F>(
    grid: &mut CloudGrid,
    repeats: usize,
    label: String,
    cutoff: Option<usize>,
    mut run: F,
) -> Result<BenchmarkSample>
where
    F: FnMut(&mut CloudGrid) -> Result<AnalysisReport>,
{
    grid.reset_classification();
    let mut report = run(grid)?;
    let mut best = report.elapsed;
    let mut total = report.elapsed;

    for _ in 1..repeats {
        grid.reset_classification();
        report = run(grid)?;
        best = best.min(report.elapsed);
        total += report.elapsed;
    }

    let mean = total / repeats as u32;
    info!(
        label = %label,
        best_ms = best.as_secs_f64() * 1000.0,
        mean_ms = mean.as_secs_f64() * 1000.0,
        "benchmark sample"
    );

    Ok(BenchmarkSample {
        label,
        cutoff,
        best,
        mean,
        splits: report.splits,
        prevailing_wind: report.prevailing_wind,
    })
}
