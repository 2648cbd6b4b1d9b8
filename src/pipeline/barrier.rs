//! Phase coordinator built on persistent scoped threads and one barrier.
//!
//! Workers never return early between barriers: a failing phase is recorded
//! and the worker still arrives at the next barrier, so a peer is never left
//! waiting for a thread that already quit. The only early exit is right
//! after the load barrier, where every worker sees the same template slots
//! and therefore makes the same decision.

use crate::contour::stamp_rows;
use crate::grid::{
    sample_grid_edge_row, sample_grid_rows, BinaryGrid, GridView, CONTOUR_CONFIG_COUNT,
};
use crate::image::resample::resample_rows_bicubic;
use crate::image::{ImageView, PixelBuffer, Rgb};
use crate::partition::WorkRange;
use crate::pipeline::shared::SharedSlice;
use crate::pipeline::{first_error, Stages};
use crate::template::{TemplateSet, TemplateSource};
use crate::trace::trace_span;
use crate::util::{IsolineError, IsolineResult};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Barrier};
use std::thread;

pub(crate) fn run<S: TemplateSource + ?Sized>(
    stages: &Stages<'_, S>,
    canonical: &mut PixelBuffer,
    grid: &mut BinaryGrid,
) -> IsolineResult<()> {
    run_with(stages, canonical, grid, |_| Ok(()))
}

/// Like [`run`], with `before_spawn(id)` checked ahead of spawning worker
/// `id`. An error from it is handled like a failed spawn.
fn run_with<S, F>(
    stages: &Stages<'_, S>,
    canonical: &mut PixelBuffer,
    grid: &mut BinaryGrid,
    before_spawn: F,
) -> IsolineResult<()>
where
    S: TemplateSource + ?Sized,
    F: Fn(usize) -> io::Result<()>,
{
    let threads = stages.threads;
    let (width, height) = (canonical.width(), canonical.height());
    let (p, q) = (grid.p(), grid.q());
    let image = SharedSlice::new(canonical.data_mut());
    let cells = SharedSlice::new(grid.cells_mut());
    let barrier = Barrier::new(threads);

    let results = thread::scope(|scope| {
        let mut gates = Vec::with_capacity(threads);
        let mut handles = Vec::with_capacity(threads);
        for id in 0..threads {
            let worker = Worker {
                thread: id,
                stages,
                image: &image,
                cells: &cells,
                barrier: &barrier,
                width,
                height,
                p,
                q,
            };
            // Workers hold at the gate until every thread exists, so a
            // failed spawn never strands the others at the barrier.
            let (open, gate) = mpsc::channel::<()>();
            let spawned = before_spawn(id).and_then(|()| {
                thread::Builder::new()
                    .name(format!("isoline-{id}"))
                    .spawn_scoped(scope, move || match gate.recv() {
                        Ok(()) => worker.run(),
                        Err(_) => Ok(()),
                    })
            });
            match spawned {
                Ok(handle) => {
                    gates.push(open);
                    handles.push(handle);
                }
                Err(err) => {
                    drop(gates);
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return vec![Err(IsolineError::ThreadSpawn {
                        reason: err.to_string(),
                    })];
                }
            }
        }
        for open in &gates {
            let _ = open.send(());
        }
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(IsolineError::WorkerPanicked)))
            .collect::<Vec<_>>()
    });
    first_error(results)
}

struct Worker<'s, 'a, S: ?Sized> {
    thread: usize,
    stages: &'s Stages<'a, S>,
    image: &'s SharedSlice<'s, Rgb>,
    cells: &'s SharedSlice<'s, u8>,
    barrier: &'s Barrier,
    width: usize,
    height: usize,
    p: usize,
    q: usize,
}

impl<S: TemplateSource + ?Sized> Worker<'_, '_, S> {
    fn range(&self, len: usize) -> WorkRange {
        WorkRange::for_thread(self.thread, self.stages.threads, len)
    }

    fn run(&self) -> IsolineResult<()> {
        let loaded = guarded(|| self.load_templates());
        self.barrier.wait();
        // Every worker observes the same slots here, so either all continue
        // or all stop.
        let templates = match self.stages.library.complete() {
            Ok(templates) => templates,
            Err(incomplete) => return loaded.and(Err(incomplete)),
        };
        let mut status = loaded;

        if let Some(source) = self.stages.source {
            status = status.and(guarded(|| self.resample(source)));
            self.barrier.wait();
        }

        status = status.and(guarded(|| self.sample()));
        self.barrier.wait();

        if self.stages.stamp {
            status = status.and(guarded(|| self.stamp(&templates)));
        }
        status
    }

    fn load_templates(&self) -> IsolineResult<()> {
        let range = self.range(CONTOUR_CONFIG_COUNT);
        let _span = trace_span!("load_templates", thread = self.thread).entered();
        self.stages.library.load_range(self.stages.templates, range)
    }

    fn resample(&self, source: &PixelBuffer) -> IsolineResult<()> {
        let rows = self.range(self.height);
        let _span = trace_span!("resample", thread = self.thread, rows = rows.len()).entered();
        // SAFETY: destination rows are partitioned by thread and nothing
        // reads the canonical image during this phase.
        let out = unsafe { self.image.range_mut(rows.scaled(self.width)) };
        resample_rows_bicubic(source.view(), self.width, self.height, rows, out)
    }

    fn sample(&self) -> IsolineResult<()> {
        let step = self.stages.config.step;
        let sigma = self.stages.config.sigma;
        let stride = self.q + 1;
        let rows = self.range(self.p);
        let cols = self.range(self.q);
        let _span = trace_span!("sample_grid", thread = self.thread, rows = rows.len()).entered();

        // SAFETY: the canonical image is read-only in this phase.
        let pixels = unsafe { self.image.all() };
        let image = ImageView::from_slice(pixels, self.width, self.height)?;

        // SAFETY: grid rows below `p` are partitioned by row range, the cells
        // of row `p` by column range, and corner `(p, q)` belongs to thread 0.
        // No one reads the grid in this phase.
        let body = unsafe { self.cells.range_mut(rows.scaled(stride)) };
        sample_grid_rows(image, step, sigma, rows, body)?;

        let edge_start = self.p * stride;
        // SAFETY: see above.
        let edge = unsafe {
            self.cells
                .range_mut(edge_start + cols.start..edge_start + cols.end)
        };
        sample_grid_edge_row(image, step, sigma, cols, edge)?;

        if self.thread == 0 {
            let corner = edge_start + self.q;
            // SAFETY: see above.
            let cell = unsafe { self.cells.range_mut(corner..corner + 1) };
            cell[0] = 0;
        }
        Ok(())
    }

    fn stamp(&self, templates: &TemplateSet<'_>) -> IsolineResult<()> {
        let step = self.stages.config.step;
        let rows = self.range(self.p);
        let _span = trace_span!("stamp", thread = self.thread, rows = rows.len()).entered();

        // SAFETY: the grid is read-only in this phase.
        let cells = unsafe { self.cells.all() };
        let grid = GridView::new(cells, self.p, self.q)?;
        // SAFETY: each grid row owns the `step` pixel rows below it, so
        // threads with disjoint grid rows write disjoint pixel bands.
        let out = unsafe { self.image.range_mut(rows.scaled(step * self.width)) };
        stamp_rows(grid, templates, self.width, rows, out)
    }
}

/// Runs one phase body, turning a panic into an error so the worker still
/// reaches the next barrier.
fn guarded<F>(phase: F) -> IsolineResult<()>
where
    F: FnOnce() -> IsolineResult<()>,
{
    panic::catch_unwind(AssertUnwindSafe(phase)).unwrap_or(Err(IsolineError::WorkerPanicked))
}
