//! Bicubic resampling to the canonical resolution.
//!
//! Destination pixel `(x, y)` is mapped to normalized coordinates
//! `u = x / (W' - 1)`, `v = y / (H' - 1)` and from there into source space as
//! `sx = u * W - 0.5`, `sy = v * H - 0.5`. The 4x4 source neighborhood around
//! `(sx, sy)` is interpolated with a Catmull-Rom cubic, first along x for
//! each of the four rows and then along y. Neighborhood coordinates are
//! clamped to the source bounds. Each channel is clamped to `[0, 255]` and
//! truncated, since the cubic can overshoot near sharp edges.

use crate::image::{ImageView, PixelBuffer, Rgb};
use crate::partition::WorkRange;
use crate::util::{IsolineError, IsolineResult};

/// 1D Catmull-Rom interpolation between `p1` and `p2` at `t` in `[0, 1)`.
fn cubic_1d(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
    let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
    let c = -0.5 * p0 + 0.5 * p2;
    let d = p1;
    ((a * t + b) * t + c) * t + d
}

fn normalized(index: usize, extent: usize) -> f32 {
    if extent > 1 {
        index as f32 / (extent - 1) as f32
    } else {
        0.0
    }
}

/// Samples `src` at normalized coordinates `(u, v)` in `[0, 1]`.
pub fn sample_bicubic(src: ImageView<'_, Rgb>, u: f32, v: f32) -> Rgb {
    let sx = u * src.width() as f32 - 0.5;
    let sy = v * src.height() as f32 - 0.5;
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let x0 = x0 as isize;
    let y0 = y0 as isize;

    let mut out = [0u8; 3];
    for (channel, slot) in out.iter_mut().enumerate() {
        let mut cols = [0.0f32; 4];
        for (row, col_value) in cols.iter_mut().enumerate() {
            let y = y0 + row as isize - 1;
            let p = |dx: isize| src.get_clamped(x0 + dx, y).channels()[channel] as f32;
            *col_value = cubic_1d(p(-1), p(0), p(1), p(2), fx);
        }
        let value = cubic_1d(cols[0], cols[1], cols[2], cols[3], fy);
        *slot = value.clamp(0.0, 255.0) as u8;
    }
    Rgb::from(out)
}

/// Fills destination rows `rows` of a `dst_width x dst_height` image.
///
/// `out` holds exactly those rows, `rows.len() * dst_width` samples, so
/// threads owning disjoint row ranges can write without coordination.
pub fn resample_rows_bicubic(
    src: ImageView<'_, Rgb>,
    dst_width: usize,
    dst_height: usize,
    rows: WorkRange,
    out: &mut [Rgb],
) -> IsolineResult<()> {
    let expected = rows.len() * dst_width;
    if out.len() != expected {
        return Err(IsolineError::BufferSizeMismatch {
            expected,
            got: out.len(),
        });
    }
    if rows.end > dst_height {
        return Err(IsolineError::InvalidInput("row range exceeds destination height"));
    }
    if rows.is_empty() {
        return Ok(());
    }

    for (y, dst_row) in rows.iter().zip(out.chunks_exact_mut(dst_width)) {
        let v = normalized(y, dst_height);
        for (x, px) in dst_row.iter_mut().enumerate() {
            *px = sample_bicubic(src, normalized(x, dst_width), v);
        }
    }
    Ok(())
}

/// Resamples the whole of `src` to `dst_width x dst_height` on the calling
/// thread.
pub fn resize_bicubic(
    src: &PixelBuffer,
    dst_width: usize,
    dst_height: usize,
) -> IsolineResult<PixelBuffer> {
    let mut dst = PixelBuffer::filled(dst_width, dst_height, Rgb::BLACK)?;
    let rows = WorkRange {
        start: 0,
        end: dst_height,
    };
    resample_rows_bicubic(src.view(), dst_width, dst_height, rows, dst.data_mut())?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::{cubic_1d, resample_rows_bicubic, resize_bicubic, sample_bicubic};
    use crate::image::{PixelBuffer, Rgb};
    use crate::partition::WorkRange;

    #[test]
    fn cubic_passes_through_control_points() {
        assert!((cubic_1d(1.0, 2.0, 3.0, 4.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((cubic_1d(1.0, 2.0, 3.0, 4.0, 0.5) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn constant_image_stays_constant() {
        let src = PixelBuffer::filled(37, 23, Rgb::new(10, 120, 250)).unwrap();
        let dst = resize_bicubic(&src, 16, 16).unwrap();
        assert!(dst.data().iter().all(|&px| px == Rgb::new(10, 120, 250)));
    }

    #[test]
    fn overshoot_is_clamped() {
        // A hard black/white edge makes Catmull-Rom overshoot on both sides.
        let src = PixelBuffer::from_fn(8, 1, |x, _| if x < 4 { Rgb::BLACK } else { Rgb::WHITE })
            .unwrap();
        let view = src.view();
        for i in 0..=20 {
            let u = i as f32 / 20.0;
            let px = sample_bicubic(view, u, 0.0);
            assert_eq!(px.r, px.g);
            assert_eq!(px.g, px.b);
        }
        assert_eq!(sample_bicubic(view, 0.0, 0.0), Rgb::BLACK);
        assert_eq!(sample_bicubic(view, 1.0, 0.0), Rgb::WHITE);
    }

    #[test]
    fn row_ranges_compose_into_full_image() {
        let src = PixelBuffer::from_fn(40, 30, |x, y| Rgb::new((x * 6) as u8, (y * 8) as u8, 77))
            .unwrap();
        let full = resize_bicubic(&src, 12, 9).unwrap();

        let mut pieces = vec![Rgb::BLACK; 12 * 9];
        let (top, bottom) = pieces.split_at_mut(4 * 12);
        resample_rows_bicubic(src.view(), 12, 9, WorkRange { start: 0, end: 4 }, top).unwrap();
        resample_rows_bicubic(src.view(), 12, 9, WorkRange { start: 4, end: 9 }, bottom).unwrap();
        assert_eq!(pieces.as_slice(), full.data());
    }

    #[test]
    fn rejects_wrong_output_length() {
        let src = PixelBuffer::filled(4, 4, Rgb::WHITE).unwrap();
        let mut out = vec![Rgb::BLACK; 5];
        let rows = WorkRange { start: 0, end: 1 };
        assert!(resample_rows_bicubic(src.view(), 4, 4, rows, &mut out).is_err());
    }
}
