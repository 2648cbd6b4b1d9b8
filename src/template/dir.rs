//! Templates stored on disk as `<dir>/<index>.ppm`.

use crate::image::io::load_rgb_image;
use crate::image::PixelBuffer;
use crate::template::TemplateSource;
use crate::util::{IsolineError, IsolineResult};
use std::path::{Path, PathBuf};

/// Template source reading one image file per configuration code.
#[derive(Clone, Debug)]
pub struct DirTemplates {
    dir: PathBuf,
}

impl DirTemplates {
    /// Reads `<dir>/<index>.ppm`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the template file for `index`.
    pub fn path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{index}.ppm"))
    }
}

impl TemplateSource for DirTemplates {
    fn load(&self, index: usize) -> IsolineResult<PixelBuffer> {
        load_rgb_image(self.path(index)).map_err(|err| IsolineError::TemplateLoad {
            index,
            reason: err.to_string(),
        })
    }
}
