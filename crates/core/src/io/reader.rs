//! Grid input reader

use super::TokenStream;
use crate::core_types::Wind;
use crate::error::{CloudError, Result};
use crate::grid::CloudGrid;
use std::path::Path;
use tracing::debug;

/// Read a grid from an input file.
///
/// # Errors
/// Returns [`CloudError::Io`] if the file cannot be read, plus any error
/// from [`parse_grid`].
pub fn read_grid(path: &Path) -> Result<CloudGrid> {
    let content = std::fs::read_to_string(path).map_err(|e| CloudError::io(path, e))?;
    let grid = parse_grid(&content)?;
    debug!(path = %path.display(), dims = %grid.dims(), "loaded grid");
    Ok(grid)
}

/// Parse a grid from input-format text.
///
/// Tokens after the last announced value are ignored.
///
/// # Errors
/// - [`CloudError::Parse`] for a non-numeric token
/// - [`CloudError::InvalidDimensions`] for a negative or oversized header
/// - [`CloudError::Truncated`] if fewer values than announced are present
pub fn parse_grid(content: &str) -> Result<CloudGrid> {
    let mut tokens = TokenStream::new(content);
    let dims = tokens.read_dims()?;
    let n = dims.dim();
    let expected = n
        .checked_mul(3)
        .and_then(|v| v.checked_add(3))
        .ok_or_else(|| CloudError::invalid_dimensions(format!("{dims} grid is too large")))?;

    // The header is untrusted: never reserve more than the text can hold
    let capacity = n.min(content.len() / 6);
    let mut advection = Vec::with_capacity(capacity);
    let mut convection = Vec::with_capacity(capacity);
    for _ in 0..n {
        let u: f64 = tokens.next_value("wind u component", expected)?;
        let v: f64 = tokens.next_value("wind v component", expected)?;
        let w: f64 = tokens.next_value("uplift", expected)?;
        advection.push(Wind::new(u, v));
        convection.push(w);
    }
    debug_assert_eq!(tokens.consumed(), expected);

    CloudGrid::new(dims, advection, convection)
}
