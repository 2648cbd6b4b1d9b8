//! Fork-join executor on a rayon pool (feature-gated).
//!
//! The pool has exactly as many threads as the renderer is configured with.
//! Each phase is one parallel loop over the per-thread work ranges, with the
//! outputs split into owned chunks up front; the end of the loop is the
//! phase barrier.

use crate::contour::stamp_rows;
use crate::grid::{sample_grid_edge_row, sample_grid_rows, BinaryGrid, CONTOUR_CONFIG_COUNT};
use crate::image::resample::resample_rows_bicubic;
use crate::image::PixelBuffer;
use crate::partition::{partition, split_mut, WorkRange};
use crate::pipeline::Stages;
use crate::template::TemplateSource;
use crate::trace::trace_span;
use crate::util::{IsolineError, IsolineResult};
use rayon::prelude::*;

pub(crate) fn run<S: TemplateSource + ?Sized>(
    stages: &Stages<'_, S>,
    canonical: &mut PixelBuffer,
    grid: &mut BinaryGrid,
) -> IsolineResult<()> {
    let threads = stages.threads;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|id| format!("isoline-{id}"))
        .build()
        .map_err(|err| IsolineError::ThreadSpawn {
            reason: err.to_string(),
        })?;

    pool.install(|| {
        let templates = {
            let _span = trace_span!("load_templates", threads = threads).entered();
            (0..threads).into_par_iter().try_for_each(|t| {
                let range = WorkRange::for_thread(t, threads, CONTOUR_CONFIG_COUNT);
                stages.library.load_range(stages.templates, range)
            })?;
            stages.library.complete()?
        };

        let (width, height) = (canonical.width(), canonical.height());
        if let Some(source) = stages.source {
            let _span = trace_span!("resample", threads = threads).entered();
            let ranges = partition(threads, height);
            let chunks = split_mut(canonical.data_mut(), &ranges, width);
            ranges
                .into_par_iter()
                .zip(chunks)
                .try_for_each(|(rows, out)| {
                    resample_rows_bicubic(source.view(), width, height, rows, out)
                })?;
        }

        {
            let _span = trace_span!("sample_grid", threads = threads).entered();
            let (step, sigma) = (stages.config.step, stages.config.sigma);
            let (p, q) = (grid.p(), grid.q());
            let stride = grid.stride();
            let image = canonical.view();
            let (body, edge) = grid.cells_mut().split_at_mut(p * stride);
            let (edge, corner) = edge.split_at_mut(q);

            let row_ranges = partition(threads, p);
            let row_chunks = split_mut(body, &row_ranges, stride);
            row_ranges
                .into_par_iter()
                .zip(row_chunks)
                .try_for_each(|(rows, out)| sample_grid_rows(image, step, sigma, rows, out))?;

            let col_ranges = partition(threads, q);
            let col_chunks = split_mut(edge, &col_ranges, 1);
            col_ranges
                .into_par_iter()
                .zip(col_chunks)
                .try_for_each(|(cols, out)| {
                    sample_grid_edge_row(image, step, sigma, cols, out)
                })?;
            corner[0] = 0;
        }

        if stages.stamp {
            let _span = trace_span!("stamp", threads = threads).entered();
            let band = stages.config.step * width;
            let view = grid.view();
            let ranges = partition(threads, grid.p());
            let chunks = split_mut(canonical.data_mut(), &ranges, band);
            ranges
                .into_par_iter()
                .zip(chunks)
                .try_for_each(|(rows, out)| stamp_rows(view, &templates, width, rows, out))?;
        }
        Ok(())
    })
}
