//! Luminance thresholding of the canonical image into grid corners.

use crate::grid::BinaryGrid;
use crate::image::{ImageView, Rgb};
use crate::partition::WorkRange;
use crate::util::{IsolineError, IsolineResult};

/// Classifies one sample: 1 when `luminance <= sigma`, else 0.
///
/// The comparison is inclusive, so a pixel whose channel mean equals
/// `sigma` is "inside" (1).
#[inline]
pub fn classify(px: Rgb, sigma: u8) -> u8 {
    u8::from(px.luminance() <= sigma)
}

fn check_len(expected: usize, got: usize) -> IsolineResult<()> {
    if expected != got {
        return Err(IsolineError::BufferSizeMismatch { expected, got });
    }
    Ok(())
}

/// Fills grid rows `rows` (all `i < p`) including their last column `q`.
///
/// `out` holds exactly those grid rows, `rows.len() * (q + 1)` values.
/// Column `j < q` samples pixel column `j * step`; column `q` samples the
/// last pixel column.
pub fn sample_grid_rows(
    image: ImageView<'_, Rgb>,
    step: usize,
    sigma: u8,
    rows: WorkRange,
    out: &mut [u8],
) -> IsolineResult<()> {
    if step == 0 {
        return Err(IsolineError::InvalidInput("grid step must be non-zero"));
    }
    let q = image.width() / step;
    let stride = q + 1;
    check_len(rows.len() * stride, out.len())?;
    if rows.end > image.height() / step {
        return Err(IsolineError::InvalidInput("grid row range exceeds grid"));
    }
    if rows.is_empty() {
        return Ok(());
    }

    let last_x = image.width() - 1;
    for (i, grid_row) in rows.iter().zip(out.chunks_exact_mut(stride)) {
        let y = i * step;
        let px_row = image
            .row(y)
            .ok_or(IsolineError::InvalidInput("sample row outside image"))?;
        let (interior, last) = grid_row.split_at_mut(q);
        for (j, cell) in interior.iter_mut().enumerate() {
            *cell = classify(px_row[j * step], sigma);
        }
        last[0] = classify(px_row[last_x], sigma);
    }
    Ok(())
}

/// Fills columns `cols` (all `j < q`) of the last grid row `p`.
///
/// The last grid row samples the last pixel row. `out` holds exactly
/// `cols.len()` values. Corner `(p, q)` is not touched.
pub fn sample_grid_edge_row(
    image: ImageView<'_, Rgb>,
    step: usize,
    sigma: u8,
    cols: WorkRange,
    out: &mut [u8],
) -> IsolineResult<()> {
    if step == 0 {
        return Err(IsolineError::InvalidInput("grid step must be non-zero"));
    }
    check_len(cols.len(), out.len())?;
    if cols.end > image.width() / step {
        return Err(IsolineError::InvalidInput("grid column range exceeds grid"));
    }
    if cols.is_empty() {
        return Ok(());
    }

    let px_row = image
        .row(image.height() - 1)
        .ok_or(IsolineError::InvalidInput("sample row outside image"))?;
    for (j, cell) in cols.iter().zip(out.iter_mut()) {
        *cell = classify(px_row[j * step], sigma);
    }
    Ok(())
}

/// Samples the full grid of `image` on the calling thread.
pub fn sample_grid(image: ImageView<'_, Rgb>, step: usize, sigma: u8) -> IsolineResult<BinaryGrid> {
    let mut grid = BinaryGrid::for_image(image.width(), image.height(), step)?;
    let (p, q) = (grid.p(), grid.q());
    let stride = grid.stride();
    let (body, edge) = grid.cells_mut().split_at_mut(p * stride);
    sample_grid_rows(image, step, sigma, WorkRange { start: 0, end: p }, body)?;
    sample_grid_edge_row(image, step, sigma, WorkRange { start: 0, end: q }, &mut edge[..q])?;
    edge[q] = 0;
    Ok(grid)
}
