//! Grid and classification writers

use crate::core_types::Wind;
use crate::error::{CloudError, Result};
use crate::grid::CloudGrid;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Render the classification grid and prevailing wind in output format.
///
/// Each code is followed by a single space, and each time step ends with a
/// newline.
pub fn format_output(grid: &CloudGrid, wind: Wind) -> String {
    let dims = grid.dims();
    let layer = dims.layer_size();
    let mut out = String::with_capacity(32 + grid.dim() * 2 + dims.dimt);

    let _ = writeln!(out, "{} {} {}", dims.dimt, dims.dimx, dims.dimy);
    let _ = writeln!(out, "{:.6} {:.6}", wind.x, wind.y);
    if layer > 0 {
        for step in grid.classification().chunks(layer) {
            for cloud in step {
                let _ = write!(out, "{} ", cloud.code());
            }
            out.push('\n');
        }
    } else {
        for _ in 0..dims.dimt {
            out.push('\n');
        }
    }
    out
}

/// Write the classification grid and prevailing wind to `path`.
///
/// # Errors
/// Returns [`CloudError::Io`] if the file cannot be written.
pub fn write_output(path: &Path, grid: &CloudGrid, wind: Wind) -> Result<()> {
    std::fs::write(path, format_output(grid, wind)).map_err(|e| CloudError::io(path, e))?;
    debug!(path = %path.display(), "wrote classification output");
    Ok(())
}

/// Render the grid's input fields in input format, one point per line.
pub fn format_grid(grid: &CloudGrid) -> String {
    let dims = grid.dims();
    let mut out = String::with_capacity(32 + grid.dim() * 48);
    let _ = writeln!(out, "{} {} {}", dims.dimt, dims.dimx, dims.dimy);
    for (wind, uplift) in grid.advection().iter().zip(grid.convection()) {
        let _ = writeln!(out, "{} {} {}", wind.x, wind.y, uplift);
    }
    out
}

/// Write the grid's input fields to `path` in input format.
///
/// # Errors
/// Returns [`CloudError::Io`] if the file cannot be written.
pub fn write_grid(path: &Path, grid: &CloudGrid) -> Result<()> {
    std::fs::write(path, format_grid(grid)).map_err(|e| CloudError::io(path, e))?;
    debug!(path = %path.display(), dims = %grid.dims(), "wrote grid");
    Ok(())
}
