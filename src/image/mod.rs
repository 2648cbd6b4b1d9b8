//! Pixel buffers and borrowed image views.
//!
//! `PixelBuffer` owns a row-major array of `width * height` three-channel
//! samples. `ImageView` borrows the same layout, so phase functions can read
//! a canonical image that is shared between worker threads.

use crate::util::{IsolineError, IsolineResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resample;

/// One color sample with three independent 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::gray(0);
    pub const WHITE: Rgb = Rgb::gray(255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sample with all three channels set to `value`.
    pub const fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Mean of the three channels, truncated: `(r + g + b) / 3`.
    pub fn luminance(self) -> u8 {
        let sum = u16::from(self.r) + u16::from(self.g) + u16::from(self.b);
        (sum / 3) as u8
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// Owned contiguous color image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<Rgb>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Wraps row-major pixel data; `data.len()` must equal `width * height`.
    pub fn new(data: Vec<Rgb>, width: usize, height: usize) -> IsolineResult<Self> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(IsolineError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Allocates a buffer filled with `pixel`.
    ///
    /// Allocation failure is reported as [`IsolineError::Allocation`] instead
    /// of aborting the process.
    pub fn filled(width: usize, height: usize, pixel: Rgb) -> IsolineResult<Self> {
        let len = sample_count(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| IsolineError::Allocation {
                bytes: len.saturating_mul(std::mem::size_of::<Rgb>()),
            })?;
        data.resize(len, pixel);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> IsolineResult<Self>
    where
        F: FnMut(usize, usize) -> Rgb,
    {
        let mut buffer = Self::filled(width, height, Rgb::default())?;
        for y in 0..height {
            let row = &mut buffer.data[y * width..(y + 1) * width];
            for (x, px) in row.iter_mut().enumerate() {
                *px = f(x, y);
            }
        }
        Ok(buffer)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[Rgb] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Rgb] {
        &mut self.data
    }

    /// Returns the pixel at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y` as a slice of length `width`.
    pub fn row(&self, y: usize) -> Option<&[Rgb]> {
        if y >= self.height {
            return None;
        }
        self.data.get(y * self.width..(y + 1) * self.width)
    }

    /// Returns a borrowed view of the whole buffer.
    pub fn view(&self) -> ImageView<'_, Rgb> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns true when either dimension exceeds the given bound.
    pub fn exceeds(&self, max_width: usize, max_height: usize) -> bool {
        self.width > max_width || self.height > max_height
    }
}

/// Borrowed row-major 2D image view.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Wraps `width * height` row-major elements.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> IsolineResult<Self> {
        let expected = sample_count(width, height)?;
        if data.len() != expected {
            return Err(IsolineError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Returns the element at `(x, y)` with both coordinates clamped to the
    /// valid range.
    pub fn get_clamped(&self, x: isize, y: isize) -> &'a T {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        &self.data[y * self.width + x]
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }
}

fn sample_count(width: usize, height: usize) -> IsolineResult<usize> {
    if width == 0 || height == 0 {
        return Err(IsolineError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(IsolineError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{PixelBuffer, Rgb};
    use crate::util::IsolineError;

    #[test]
    fn luminance_truncates_channel_mean() {
        assert_eq!(Rgb::new(200, 200, 201).luminance(), 200);
        assert_eq!(Rgb::new(255, 255, 255).luminance(), 255);
        assert_eq!(Rgb::new(1, 1, 0).luminance(), 0);
    }

    #[test]
    fn buffer_rejects_length_mismatch() {
        let err = PixelBuffer::new(vec![Rgb::BLACK; 5], 2, 3).unwrap_err();
        assert_eq!(
            err,
            IsolineError::BufferSizeMismatch {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn from_fn_is_row_major() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| Rgb::gray((y * 3 + x) as u8)).unwrap();
        assert_eq!(buf.get(2, 1), Some(Rgb::gray(5)));
        assert_eq!(buf.row(1).unwrap()[0], Rgb::gray(3));
        assert!(buf.get(3, 0).is_none());
    }

    #[test]
    fn clamped_access_saturates_at_edges() {
        let buf = PixelBuffer::from_fn(2, 2, |x, y| Rgb::gray((y * 2 + x) as u8)).unwrap();
        let view = buf.view();
        assert_eq!(*view.get_clamped(-3, -1), Rgb::gray(0));
        assert_eq!(*view.get_clamped(5, 9), Rgb::gray(3));
    }
}
