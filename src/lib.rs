//! Isoline renders marching-squares contour overlays onto color images.
//!
//! An input image is resampled to a canonical resolution when it is too
//! large, thresholded into a binary grid every `step` pixels, and each grid
//! cell is overwritten with one of 16 contour templates chosen by its four
//! corners. All phases run on a fixed number of worker threads, each owning
//! a disjoint range of rows or indices, separated by barriers.

pub mod contour;
pub mod grid;
pub mod image;
pub mod lowlevel;
pub mod partition;
pub mod pipeline;
pub mod template;
mod trace;
pub mod util;

// `crate::` keeps these unambiguous next to the `image` dependency.
#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::grid::{BinaryGrid, CONTOUR_CONFIG_COUNT};
pub use crate::image::{ImageView, PixelBuffer, Rgb};
pub use crate::partition::WorkRange;
pub use crate::pipeline::{ContourConfig, Execution, Renderer, Sampled};
pub use crate::template::{ProceduralTemplates, TemplateSource};
pub use crate::util::{IsolineError, IsolineResult};

#[cfg(feature = "image-io")]
pub use crate::template::DirTemplates;
