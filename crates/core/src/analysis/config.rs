//! Analysis configuration

use crate::classifier::constants::STRATUS_WIND_THRESHOLD;
use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};

/// Analysis constants
pub mod constants {
    /// Range length below which a task stops splitting and runs sequentially.
    pub const DEFAULT_SEQUENTIAL_CUTOFF: usize = 2000;
}

/// Configuration for one classification + prevailing-wind run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sequential cutoff for the divide-and-conquer passes.
    /// 1 forces maximal splitting; anything above the grid size runs
    /// the whole grid as a single leaf.
    pub cutoff: usize,

    /// Compute the advection sum inside the classification traversal instead
    /// of running a separate reduction pass
    pub fused: bool,

    /// Worker threads for a dedicated pool. `None` uses rayon's global pool.
    pub threads: Option<usize>,

    /// Wind speed above which wind-dominated points become striated stratus
    pub stratus_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cutoff: constants::DEFAULT_SEQUENTIAL_CUTOFF,
            fused: true,
            threads: None,
            stratus_threshold: STRATUS_WIND_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Same configuration with a different cutoff.
    pub fn with_cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidConfig`] for a zero cutoff, a zero thread
    /// count, or a negative or non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        if self.cutoff == 0 {
            return Err(CloudError::InvalidConfig {
                field: "cutoff",
                reason: "must be at least 1".into(),
            });
        }
        if self.threads == Some(0) {
            return Err(CloudError::InvalidConfig {
                field: "threads",
                reason: "must be at least 1 when set".into(),
            });
        }
        if !self.stratus_threshold.is_finite() || self.stratus_threshold < 0.0 {
            return Err(CloudError::InvalidConfig {
                field: "stratus_threshold",
                reason: format!(
                    "must be finite and non-negative, got {}",
                    self.stratus_threshold
                ),
            });
        }
        Ok(())
    }
}
