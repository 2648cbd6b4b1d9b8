//! Contour template library.
//!
//! One `step x step` image per configuration code. Slots are populated once
//! during the load phase, each by the single thread whose work range owns
//! that index, and stored in a `OnceLock` so the filled set can be shared
//! read-only by every stamping thread afterwards.

use crate::grid::CONTOUR_CONFIG_COUNT;
use crate::image::PixelBuffer;
use crate::partition::WorkRange;
use crate::util::{IsolineError, IsolineResult};
use std::sync::OnceLock;

#[cfg(feature = "image-io")]
mod dir;
mod procedural;

#[cfg(feature = "image-io")]
pub use dir::DirTemplates;
pub use procedural::ProceduralTemplates;

/// Source of contour templates, addressed by configuration code.
pub trait TemplateSource: Sync {
    /// Loads the template for configuration code `index` in `0..16`.
    fn load(&self, index: usize) -> IsolineResult<PixelBuffer>;
}

impl<T: TemplateSource + ?Sized> TemplateSource for &T {
    fn load(&self, index: usize) -> IsolineResult<PixelBuffer> {
        (**self).load(index)
    }
}

impl<T: TemplateSource + ?Sized> TemplateSource for Box<T> {
    fn load(&self, index: usize) -> IsolineResult<PixelBuffer> {
        (**self).load(index)
    }
}

/// Write-once slots for the 16 templates.
pub struct TemplateLibrary {
    step: usize,
    slots: Vec<OnceLock<PixelBuffer>>,
}

impl TemplateLibrary {
    /// Creates an empty library expecting `step x step` templates.
    pub fn new(step: usize) -> Self {
        Self {
            step,
            slots: (0..CONTOUR_CONFIG_COUNT).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Loads and validates every template on the calling thread.
    pub fn load_all<S: TemplateSource + ?Sized>(source: &S, step: usize) -> IsolineResult<Self> {
        let library = Self::new(step);
        let all = WorkRange {
            start: 0,
            end: CONTOUR_CONFIG_COUNT,
        };
        library.load_range(source, all)?;
        Ok(library)
    }

    /// Expected template edge length.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Loads the templates whose indices fall in `range`.
    ///
    /// Stops at the first failure; the failed slot and any later ones in the
    /// range stay empty.
    pub fn load_range<S: TemplateSource + ?Sized>(
        &self,
        source: &S,
        range: WorkRange,
    ) -> IsolineResult<()> {
        for index in range {
            let slot = self
                .slots
                .get(index)
                .ok_or(IsolineError::TemplateIndex { index })?;
            let tpl = source.load(index)?;
            if tpl.width() != self.step || tpl.height() != self.step {
                return Err(IsolineError::TemplateSize {
                    index,
                    expected: self.step,
                    width: tpl.width(),
                    height: tpl.height(),
                });
            }
            slot.set(tpl)
                .map_err(|_| IsolineError::InvalidInput("template slot loaded twice"))?;
        }
        Ok(())
    }

    /// Number of slots that are still empty.
    pub fn missing(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_none()).count()
    }

    /// Borrows the full set, failing if any slot is empty.
    pub fn complete(&self) -> IsolineResult<TemplateSet<'_>> {
        let mut templates = Vec::with_capacity(CONTOUR_CONFIG_COUNT);
        for slot in &self.slots {
            match slot.get() {
                Some(tpl) => templates.push(tpl),
                None => {
                    return Err(IsolineError::IncompleteTemplateSet {
                        missing: self.missing(),
                    })
                }
            }
        }
        Ok(TemplateSet {
            step: self.step,
            templates,
        })
    }
}

/// Read-only view of a fully loaded template library.
#[derive(Clone, Debug)]
pub struct TemplateSet<'a> {
    step: usize,
    templates: Vec<&'a PixelBuffer>,
}

impl<'a> TemplateSet<'a> {
    /// Template edge length.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns the template for configuration code `code`.
    pub fn get(&self, code: u8) -> Option<&'a PixelBuffer> {
        self.templates.get(code as usize).copied()
    }
}
