//! Grid storage and indexing

pub mod cloud_grid;
pub mod dims;

// Re-export main types
pub use cloud_grid::*;
pub use dims::*;
