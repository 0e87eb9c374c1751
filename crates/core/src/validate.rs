//! Comparison of a finished run against a reference output file

use crate::core_types::{CloudType, Wind};
use crate::error::{CloudError, Result};
use crate::grid::{CloudGrid, GridDims};
use crate::io::TokenStream;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default tolerance for prevailing-wind components.
pub const DEFAULT_WIND_EPSILON: f64 = 1e-6;

/// Expected results loaded from an output-format file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceOutput {
    pub dims: GridDims,
    pub wind: Wind,
    pub classification: Vec<CloudType>,
}

/// Result of comparing a run with a reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub dims_match: bool,
    pub wind_match: bool,
    /// Largest absolute difference between wind components
    pub wind_error: f64,
    /// Points whose code differs or is missing (0 if dimensions differ)
    pub mismatched_points: usize,
    /// Linear index of the first differing point
    pub first_mismatch: Option<usize>,
}

impl ValidationReport {
    /// True when dimensions, wind and every code agree.
    pub fn is_correct(&self) -> bool {
        self.dims_match && self.wind_match && self.mismatched_points == 0
    }
}

/// Read a reference output file.
///
/// # Errors
/// Returns [`CloudError::Io`] if the file cannot be read, plus any error
/// from [`parse_reference`].
pub fn read_reference(path: &Path) -> Result<ReferenceOutput> {
    let content = std::fs::read_to_string(path).map_err(|e| CloudError::io(path, e))?;
    let reference = parse_reference(&content)?;
    debug!(path = %path.display(), dims = %reference.dims, "loaded reference output");
    Ok(reference)
}

/// Parse output-format text.
///
/// # Errors
/// - [`CloudError::Parse`] for a malformed token or a code outside `{0,1,2}`
/// - [`CloudError::InvalidDimensions`] for a negative header
/// - [`CloudError::Truncated`] if codes are missing
pub fn parse_reference(content: &str) -> Result<ReferenceOutput> {
    let mut tokens = TokenStream::new(content);
    let dims = tokens.read_dims()?;
    let n = dims.dim();
    let expected = n.saturating_add(5);

    let wind = Wind::new(
        tokens.next_value("wind x", expected)?,
        tokens.next_value("wind y", expected)?,
    );

    let mut classification = Vec::with_capacity(n.min(content.len() / 2));
    for _ in 0..n {
        let code: u8 = tokens.next_value("classification code", expected)?;
        let cloud = CloudType::from_code(code).ok_or_else(|| CloudError::Parse {
            line: tokens.line(),
            message: format!("classification code {code} is not 0, 1 or 2"),
        })?;
        classification.push(cloud);
    }

    Ok(ReferenceOutput {
        dims,
        wind,
        classification,
    })
}

/// Compare a classified grid and its prevailing wind with a reference.
pub fn compare(
    grid: &CloudGrid,
    wind: Wind,
    reference: &ReferenceOutput,
    epsilon: f64,
) -> ValidationReport {
    let dims_match = grid.dims() == reference.dims;
    let diff = wind - reference.wind;
    let wind_error = diff.x.abs().max(diff.y.abs());
    let wind_match = wind_error <= epsilon;

    let (mismatched_points, first_mismatch) = if dims_match {
        let got = grid.classification();
        let want = &reference.classification;
        let (differing, first) = got
            .iter()
            .zip(want)
            .enumerate()
            .filter(|(_, (got, want))| got != want)
            .fold((0, None), |(count, first), (pos, _)| {
                (count + 1, first.or(Some(pos)))
            });

        // Points missing from either side count as mismatches
        let shared = got.len().min(want.len());
        let missing = got.len().abs_diff(want.len());
        let first = first.or((missing > 0).then_some(shared));
        (differing + missing, first)
    } else {
        (0, None)
    };

    if !dims_match {
        warn!(got = %grid.dims(), expected = %reference.dims, "dimensions differ");
    }
    if !wind_match {
        warn!(wind_error, epsilon, "average wind does not match");
    }
    if mismatched_points > 0 {
        warn!(mismatched_points, ?first_mismatch, "classification is incorrect");
    }

    let report = ValidationReport {
        dims_match,
        wind_match,
        wind_error,
        mismatched_points,
        first_mismatch,
    };
    if report.is_correct() {
        info!("output matches reference");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisConfig, CloudAnalysis};
    use crate::io::format_output;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn classified_grid() -> (CloudGrid, Wind) {
        let dims = GridDims::new(2, 4, 3).unwrap();
        let mut grid = CloudGrid::random(dims, &mut StdRng::seed_from_u64(31));
        let report = CloudAnalysis::new(AnalysisConfig::default().with_cutoff(5))
            .unwrap()
            .run(&mut grid)
            .unwrap();
        (grid, report.prevailing_wind)
    }

    #[test]
    fn test_own_output_validates() {
        let (grid, wind) = classified_grid();
        let reference = parse_reference(&format_output(&grid, wind)).unwrap();
        let report = compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON);
        assert!(report.is_correct(), "{report:?}");
    }

    #[test]
    fn test_detects_changed_code() {
        let (grid, wind) = classified_grid();
        let mut reference = parse_reference(&format_output(&grid, wind)).unwrap();
        let flipped = match reference.classification[7] {
            CloudType::Cumulus => CloudType::AmorphousStratus,
            _ => CloudType::Cumulus,
        };
        reference.classification[7] = flipped;

        let report = compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON);
        assert!(!report.is_correct());
        assert_eq!(report.mismatched_points, 1);
        assert_eq!(report.first_mismatch, Some(7));
    }

    #[test]
    fn test_detects_wind_drift_in_either_direction() {
        let (grid, wind) = classified_grid();
        let mut reference = parse_reference(&format_output(&grid, wind)).unwrap();
        reference.wind = wind;
        reference.wind.y += 1e-3;
        assert!(!compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON).wind_match);

        reference.wind = wind;
        reference.wind.x -= 1e-3;
        assert!(!compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON).wind_match);
    }

    #[test]
    fn test_detects_dimension_mismatch() {
        let (grid, wind) = classified_grid();
        let mut reference = parse_reference(&format_output(&grid, wind)).unwrap();
        reference.dims = GridDims::new(1, 4, 3).unwrap();
        let report = compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON);
        assert!(!report.dims_match);
        assert!(!report.is_correct());
    }

    #[test]
    fn test_short_reference_counts_missing_points() {
        let (grid, wind) = classified_grid();
        let mut reference = parse_reference(&format_output(&grid, wind)).unwrap();
        reference.classification.truncate(20);

        let report = compare(&grid, wind, &reference, DEFAULT_WIND_EPSILON);
        assert!(report.dims_match);
        assert_eq!(report.mismatched_points, 4);
        assert_eq!(report.first_mismatch, Some(20));
        assert!(!report.is_correct());
    }

    #[test]
    fn test_oversized_header_is_truncation() {
        let err = parse_reference("100000 100000 100000\n0.0 0.0\n1 \n").unwrap_err();
        assert!(matches!(err, CloudError::Truncated { found: 6, .. }));
    }

    #[test]
    fn test_rejects_unknown_code() {
        let err = parse_reference("1 1 2\n0.0 0.0\n1 7 \n").unwrap_err();
        assert!(matches!(err, CloudError::Parse { line: 3, .. }));
    }
}
