//! Evaluation grids and the surfaces computed over them

mod axes;
mod surface;

pub use axes::{Grid, MAX_AXIS_LEN, MAX_GRID_NODES};
pub use surface::{Surface, SurfaceStatistics};
