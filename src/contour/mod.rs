//! Contour stamping: replaces each grid cell's pixel block with the
//! template selected by the cell's configuration code.

use crate::grid::GridView;
use crate::image::Rgb;
use crate::partition::WorkRange;
use crate::template::TemplateSet;
use crate::util::{IsolineError, IsolineResult};

/// Stamps grid rows `rows` into the pixel rows they cover.
///
/// `out` holds pixel rows `rows.start * step .. rows.end * step` of an image
/// `width` pixels wide. For cell `(i, j)` the template for `grid.code(i, j)`
/// overwrites the `step x step` block whose top-left pixel is at row
/// `i * step`, column `j * step`. Pixels right of column `q * step` are left
/// untouched.
pub fn stamp_rows(
    grid: GridView<'_>,
    templates: &TemplateSet<'_>,
    width: usize,
    rows: WorkRange,
    out: &mut [Rgb],
) -> IsolineResult<()> {
    let step = templates.step();
    if step == 0 {
        return Err(IsolineError::InvalidInput("grid step must be non-zero"));
    }
    if grid.q() * step > width {
        return Err(IsolineError::InvalidInput("grid is wider than the image"));
    }
    if rows.end > grid.p() {
        return Err(IsolineError::InvalidInput("grid row range exceeds grid"));
    }
    let band = step * width;
    let expected = rows.len() * band;
    if out.len() != expected {
        return Err(IsolineError::BufferSizeMismatch {
            expected,
            got: out.len(),
        });
    }

    for (i, band_px) in rows.iter().zip(out.chunks_exact_mut(band)) {
        for j in 0..grid.q() {
            let code = grid.code_unchecked(i, j);
            let tpl = templates
                .get(code)
                .ok_or(IsolineError::TemplateIndex {
                    index: code as usize,
                })?;
            let x0 = j * step;
            for (ty, tpl_row) in tpl.data().chunks_exact(step).enumerate() {
                let start = ty * width + x0;
                band_px[start..start + step].copy_from_slice(tpl_row);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::stamp_rows;
    use crate::grid::BinaryGrid;
    use crate::image::{PixelBuffer, Rgb};
    use crate::partition::WorkRange;
    use crate::template::{TemplateLibrary, TemplateSource};
    use crate::util::IsolineResult;

    /// Each template is filled with its own code as a gray level.
    struct CodeFill;

    impl TemplateSource for CodeFill {
        fn load(&self, index: usize) -> IsolineResult<PixelBuffer> {
            PixelBuffer::filled(2, 2, Rgb::gray(index as u8))
        }
    }

    #[test]
    fn blocks_receive_their_cell_template() {
        let lib = TemplateLibrary::load_all(&CodeFill, 2).unwrap();
        let set = lib.complete().unwrap();
        let mut grid = BinaryGrid::new(1, 2).unwrap();
        grid.cells_mut().copy_from_slice(&[1, 0, 0, 1, 1, 0]);

        // 5 pixels wide: the last column is not covered by any cell.
        let mut img = PixelBuffer::filled(5, 2, Rgb::gray(99)).unwrap();
        let rows = WorkRange { start: 0, end: 1 };
        stamp_rows(grid.view(), &set, 5, rows, img.data_mut()).unwrap();

        let left = grid.code(0, 0).unwrap();
        let right = grid.code(0, 1).unwrap();
        assert_eq!((left, right), (8 + 2 + 1, 1));
        for y in 0..2 {
            assert_eq!(img.get(0, y), Some(Rgb::gray(left)));
            assert_eq!(img.get(1, y), Some(Rgb::gray(left)));
            assert_eq!(img.get(2, y), Some(Rgb::gray(right)));
            assert_eq!(img.get(3, y), Some(Rgb::gray(right)));
            assert_eq!(img.get(4, y), Some(Rgb::gray(99)));
        }
    }

    #[test]
    fn rejects_mismatched_band() {
        let lib = TemplateLibrary::load_all(&CodeFill, 2).unwrap();
        let set = lib.complete().unwrap();
        let grid = BinaryGrid::new(2, 2).unwrap();
        let mut out = vec![Rgb::BLACK; 4 * 3];
        let rows = WorkRange { start: 0, end: 1 };
        assert!(stamp_rows(grid.view(), &set, 4, rows, &mut out).is_err());
    }
}
