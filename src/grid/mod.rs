//! Binary sample grid and marching-squares configuration codes.
//!
//! For a `width x height` canonical image and stride `step`, the grid has
//! `p = height / step` cell rows and `q = width / step` cell columns, stored
//! as a flat row-major `(p + 1) x (q + 1)` array of corner values in `{0, 1}`.
//! Corner `(i, j)` for `i < p`, `j < q` is sampled at pixel row `i * step`,
//! column `j * step`; row `p` and column `q` are sampled from the last pixel
//! row and column. Corner `(p, q)` is always 0.

use crate::util::{IsolineError, IsolineResult};

mod sample;

pub use sample::{classify, sample_grid, sample_grid_edge_row, sample_grid_rows};

/// Number of distinct configuration codes (and templates).
pub const CONTOUR_CONFIG_COUNT: usize = 16;

/// Combines four corner values into a 4-bit configuration code.
///
/// Corners are weighted clockwise from the top-left, most significant first:
/// `8 * tl + 4 * tr + 2 * br + 1 * bl`.
#[inline]
pub fn config_code(tl: u8, tr: u8, br: u8, bl: u8) -> u8 {
    debug_assert!(tl <= 1 && tr <= 1 && br <= 1 && bl <= 1);
    (tl << 3) | (tr << 2) | (br << 1) | bl
}

/// Flat `(p + 1) x (q + 1)` matrix of binary corner values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryGrid {
    cells: Vec<u8>,
    p: usize,
    q: usize,
}

impl BinaryGrid {
    /// Allocates an all-zero grid with `p x q` cells.
    pub fn new(p: usize, q: usize) -> IsolineResult<Self> {
        let invalid = IsolineError::InvalidDimensions {
            width: q.saturating_add(1),
            height: p.saturating_add(1),
        };
        let len = p
            .checked_add(1)
            .zip(q.checked_add(1))
            .and_then(|(rows, cols)| rows.checked_mul(cols))
            .ok_or(invalid)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| IsolineError::Allocation { bytes: len })?;
        cells.resize(len, 0);
        Ok(Self { cells, p, q })
    }

    /// Allocates the grid matching a `width x height` image sampled every
    /// `step` pixels.
    pub fn for_image(width: usize, height: usize, step: usize) -> IsolineResult<Self> {
        if step == 0 {
            return Err(IsolineError::InvalidInput("grid step must be non-zero"));
        }
        Self::new(height / step, width / step)
    }

    /// Number of cell rows (`height / step`).
    pub fn p(&self) -> usize {
        self.p
    }

    /// Number of cell columns (`width / step`).
    pub fn q(&self) -> usize {
        self.q
    }

    /// Corner values per stored row (`q + 1`).
    pub fn stride(&self) -> usize {
        self.q + 1
    }

    /// Returns the corner value at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<u8> {
        if i > self.p || j > self.q {
            return None;
        }
        self.cells.get(i * self.stride() + j).copied()
    }

    /// Returns the stored corner row `i` (length `q + 1`).
    pub fn row(&self, i: usize) -> Option<&[u8]> {
        if i > self.p {
            return None;
        }
        let start = i * self.stride();
        self.cells.get(start..start + self.stride())
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Returns the configuration code of cell `(i, j)`, `i < p`, `j < q`.
    pub fn code(&self, i: usize, j: usize) -> Option<u8> {
        self.view().code(i, j)
    }

    /// Returns all `p * q` configuration codes in row-major order.
    pub fn codes(&self) -> Vec<u8> {
        let view = self.view();
        let mut out = Vec::with_capacity(self.p * self.q);
        for i in 0..self.p {
            for j in 0..self.q {
                out.push(view.code_unchecked(i, j));
            }
        }
        out
    }

    /// Returns a borrowed view of the grid.
    pub fn view(&self) -> GridView<'_> {
        GridView {
            cells: &self.cells,
            p: self.p,
            q: self.q,
        }
    }
}

/// Borrowed read-only grid, as seen by the stamping phase.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [u8],
    p: usize,
    q: usize,
}

impl<'a> GridView<'a> {
    /// Wraps a flat `(p + 1) x (q + 1)` corner array.
    pub fn new(cells: &'a [u8], p: usize, q: usize) -> IsolineResult<Self> {
        let expected = p
            .checked_add(1)
            .zip(q.checked_add(1))
            .and_then(|(rows, cols)| rows.checked_mul(cols))
            .ok_or(IsolineError::InvalidDimensions {
                width: q.saturating_add(1),
                height: p.saturating_add(1),
            })?;
        if cells.len() != expected {
            return Err(IsolineError::BufferSizeMismatch {
                expected,
                got: cells.len(),
            });
        }
        Ok(Self { cells, p, q })
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Returns the configuration code of cell `(i, j)`, `i < p`, `j < q`.
    pub fn code(&self, i: usize, j: usize) -> Option<u8> {
        if i >= self.p || j >= self.q {
            return None;
        }
        Some(self.code_unchecked(i, j))
    }

    /// Code of cell `(i, j)`; panics when the cell lies outside the grid.
    #[inline]
    pub(crate) fn code_unchecked(&self, i: usize, j: usize) -> u8 {
        let stride = self.q + 1;
        let top = i * stride;
        let bottom = top + stride;
        config_code(
            self.cells[top + j],
            self.cells[top + j + 1],
            self.cells[bottom + j + 1],
            self.cells[bottom + j],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{config_code, BinaryGrid, CONTOUR_CONFIG_COUNT};

    #[test]
    fn code_weights_are_clockwise_from_top_left() {
        assert_eq!(config_code(1, 0, 0, 0), 8);
        assert_eq!(config_code(0, 1, 0, 0), 4);
        assert_eq!(config_code(0, 0, 1, 0), 2);
        assert_eq!(config_code(0, 0, 0, 1), 1);
    }

    #[test]
    fn every_corner_combination_maps_to_a_distinct_code() {
        let mut seen = [false; CONTOUR_CONFIG_COUNT];
        for bits in 0..16u8 {
            let code = config_code((bits >> 3) & 1, (bits >> 2) & 1, (bits >> 1) & 1, bits & 1);
            assert!((code as usize) < CONTOUR_CONFIG_COUNT);
            assert!(!seen[code as usize]);
            seen[code as usize] = true;
        }
    }

    #[test]
    fn grid_shape_follows_image_and_step() {
        let grid = BinaryGrid::for_image(40, 17, 8).unwrap();
        assert_eq!((grid.p(), grid.q()), (2, 5));
        assert_eq!(grid.cells().len(), 3 * 6);
        assert_eq!(grid.get(2, 5), Some(0));
        assert!(grid.get(3, 0).is_none());
        assert!(grid.code(2, 0).is_none());
    }

    #[test]
    fn code_reads_the_four_corners() {
        let mut grid = BinaryGrid::new(1, 2).unwrap();
        // Corner rows: [1, 0, 1] / [0, 1, 1]
        grid.cells_mut().copy_from_slice(&[1, 0, 1, 0, 1, 1]);
        assert_eq!(grid.code(0, 0), Some(8 + 2));
        assert_eq!(grid.code(0, 1), Some(4 + 2 + 1));
        assert_eq!(grid.codes(), vec![10, 7]);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(BinaryGrid::for_image(8, 8, 0).is_err());
    }
}
