//! Low-level building blocks for custom pipelines.
//!
//! These are the per-phase functions the renderer runs on each work range.
//! Each one writes only the slice it is handed, so callers can drive them
//! from their own threads. Most users should prefer [`crate::Renderer`].

pub use crate::contour::stamp_rows;
pub use crate::grid::{
    classify, config_code, sample_grid, sample_grid_edge_row, sample_grid_rows, GridView,
};
pub use crate::image::resample::{resample_rows_bicubic, resize_bicubic, sample_bicubic};
pub use crate::partition::{partition, split_mut};
pub use crate::template::{TemplateLibrary, TemplateSet};
