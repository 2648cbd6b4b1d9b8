//! Convenience helpers for decoding and encoding images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Any format the `image`
//! crate was built with is accepted on input (PPM and PNG by default); the
//! output format follows the file extension.

use crate::image::{PixelBuffer, Rgb};
use crate::util::{IsolineError, IsolineResult};
use std::path::Path;

/// Creates an owned pixel buffer from an 8-bit RGB image.
pub fn buffer_from_rgb_image(img: &image::RgbImage) -> IsolineResult<PixelBuffer> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.pixels().map(|px| Rgb::from(px.0)).collect();
    PixelBuffer::new(data, width, height)
}

/// Converts a pixel buffer into an 8-bit RGB image.
pub fn rgb_image_from_buffer(buffer: &PixelBuffer) -> IsolineResult<image::RgbImage> {
    let invalid = IsolineError::InvalidDimensions {
        width: buffer.width(),
        height: buffer.height(),
    };
    let width = u32::try_from(buffer.width()).map_err(|_| invalid.clone())?;
    let height = u32::try_from(buffer.height()).map_err(|_| invalid.clone())?;
    let raw = buffer.data().iter().flat_map(|px| px.channels()).collect();
    image::RgbImage::from_raw(width, height, raw).ok_or(invalid)
}

/// Decodes an image from disk, converting it to 8-bit RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> IsolineResult<PixelBuffer> {
    let img = image::open(path).map_err(|err| IsolineError::ImageIo {
        reason: err.to_string(),
    })?;
    buffer_from_rgb_image(&img.to_rgb8())
}

/// Encodes `buffer` to `path`, choosing the format from the extension.
pub fn save_rgb_image<P: AsRef<Path>>(buffer: &PixelBuffer, path: P) -> IsolineResult<()> {
    rgb_image_from_buffer(buffer)?
        .save(path)
        .map_err(|err| IsolineError::ImageIo {
            reason: err.to_string(),
        })
}
