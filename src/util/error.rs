//! Error types for isoline.

use thiserror::Error;

/// Result alias for isoline operations.
pub type IsolineResult<T> = std::result::Result<T, IsolineError>;

/// Errors that can occur while rendering contour overlays.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IsolineError {
    /// Image dimensions are zero or overflow the address space.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Pixel data does not match the declared dimensions.
    #[error("buffer size mismatch: expected {expected} samples, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A buffer allocation could not be satisfied.
    #[error("unable to allocate {bytes} bytes")]
    Allocation { bytes: usize },
    /// A template index outside the configuration code space.
    #[error("template index {index} is out of range")]
    TemplateIndex { index: usize },
    /// A template does not cover exactly one grid cell.
    #[error("template {index} is {width}x{height}, expected {expected}x{expected}")]
    TemplateSize {
        index: usize,
        expected: usize,
        width: usize,
        height: usize,
    },
    /// A template asset could not be read or decoded.
    #[error("failed to load template {index}: {reason}")]
    TemplateLoad { index: usize, reason: String },
    /// Template slots were still empty after the load phase.
    #[error("template set incomplete: {missing} slot(s) empty")]
    IncompleteTemplateSet { missing: usize },
    /// An OS worker thread could not be created.
    #[error("failed to spawn worker thread: {reason}")]
    ThreadSpawn { reason: String },
    /// A worker thread panicked before finishing its phases.
    #[error("worker thread panicked")]
    WorkerPanicked,
    /// Image decoding or encoding failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
}
