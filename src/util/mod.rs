//! Shared utility helpers.

pub mod error;

pub use error::{IsolineError, IsolineResult};
