//! Multi-phase contour rendering over a fixed set of worker threads.
//!
//! Every worker runs the same phase sequence over its own work range:
//!
//! 1. load its share of the 16 templates,
//! 2. resample its destination rows (only when the input exceeds the
//!    canonical resolution),
//! 3. sample its grid rows and its share of the last grid row,
//! 4. stamp the templates of its grid rows into the canonical image.
//!
//! A phase starts only after every worker finished the previous one, since
//! each phase reads what all workers wrote before. Whether phase 2 runs is
//! decided once, before any worker starts, so all workers agree on the
//! number of barriers.

mod barrier;
#[cfg(feature = "rayon")]
mod forkjoin;
pub(crate) mod shared;

use crate::grid::BinaryGrid;
use crate::image::{PixelBuffer, Rgb};
use crate::template::{TemplateLibrary, TemplateSource};
use crate::trace::{trace_event, trace_span};
use crate::util::{IsolineError, IsolineResult};

/// Fixed parameters of a rendering run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourConfig {
    /// Grid stride in pixels; templates are `step x step`.
    pub step: usize,
    /// Luminance threshold; samples with `luminance <= sigma` are inside.
    pub sigma: u8,
    /// Canonical width images are resampled to when too large.
    pub rescale_width: usize,
    /// Canonical height images are resampled to when too large.
    pub rescale_height: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            step: 8,
            sigma: 200,
            rescale_width: 2048,
            rescale_height: 2048,
        }
    }
}

impl ContourConfig {
    /// Checks the parameters for values the pipeline cannot run with.
    pub fn validate(&self) -> IsolineResult<()> {
        if self.step == 0 {
            return Err(IsolineError::InvalidInput("step must be non-zero"));
        }
        if self.rescale_width < 2 || self.rescale_height < 2 {
            return Err(IsolineError::InvalidInput(
                "canonical resolution must be at least 2x2",
            ));
        }
        Ok(())
    }

    /// Returns true if `image` has to be resampled before sampling the grid.
    pub fn needs_rescale(&self, image: &PixelBuffer) -> bool {
        image.exceeds(self.rescale_width, self.rescale_height)
    }
}

/// How worker threads are organized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    /// Persistent OS threads separated by a shared barrier.
    #[default]
    Barrier,
    /// A rayon pool; each phase is a parallel loop joined before the next.
    #[cfg(feature = "rayon")]
    ForkJoin,
}

/// Canonical image and grid after the sampling phase.
#[derive(Clone, Debug)]
pub struct Sampled {
    /// Canonical-resolution image (stamped if produced by `render`).
    pub image: PixelBuffer,
    /// Sampled binary grid.
    pub grid: BinaryGrid,
    /// Whether the input was resampled.
    pub rescaled: bool,
}

/// Renders contour overlays with a template source and fixed thread count.
pub struct Renderer<S> {
    templates: S,
    config: ContourConfig,
    threads: usize,
    execution: Execution,
}

impl<S: TemplateSource> Renderer<S> {
    /// Creates a single-threaded renderer.
    pub fn new(templates: S, config: ContourConfig) -> Self {
        Self {
            templates,
            config,
            threads: 1,
            execution: Execution::default(),
        }
    }

    /// Sets the number of worker threads (must be at least 1).
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Selects the executor that runs the phases.
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Parameters every run uses.
    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    /// Number of worker threads per run.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs all phases and returns the stamped canonical image.
    pub fn render(&self, image: PixelBuffer) -> IsolineResult<PixelBuffer> {
        self.run(image, true).map(|sampled| sampled.image)
    }

    /// Runs all phases except stamping.
    ///
    /// The returned image is the canonical buffer the grid was sampled from.
    pub fn sample_grid(&self, image: PixelBuffer) -> IsolineResult<Sampled> {
        self.run(image, false)
    }

    fn run(&self, image: PixelBuffer, stamp: bool) -> IsolineResult<Sampled> {
        self.config.validate()?;
        if self.threads == 0 {
            return Err(IsolineError::InvalidInput("thread count must be at least 1"));
        }
        let _span = trace_span!("render", threads = self.threads, stamp = stamp).entered();

        let rescaled = self.config.needs_rescale(&image);
        let (source, mut canonical) = if rescaled {
            let canonical = PixelBuffer::filled(
                self.config.rescale_width,
                self.config.rescale_height,
                Rgb::BLACK,
            )?;
            (Some(image), canonical)
        } else {
            (None, image)
        };
        let mut grid =
            BinaryGrid::for_image(canonical.width(), canonical.height(), self.config.step)?;
        let library = TemplateLibrary::new(self.config.step);
        trace_event!(
            "canonical_ready",
            width = canonical.width(),
            height = canonical.height(),
            rescaled = rescaled
        );

        let stages = Stages {
            templates: &self.templates,
            library: &library,
            source: source.as_ref(),
            config: &self.config,
            threads: self.threads,
            stamp,
        };
        match self.execution {
            Execution::Barrier => barrier::run(&stages, &mut canonical, &mut grid)?,
            #[cfg(feature = "rayon")]
            Execution::ForkJoin => forkjoin::run(&stages, &mut canonical, &mut grid)?,
        }
        trace_event!("grid_ready", rows = grid.p(), cols = grid.q());

        Ok(Sampled {
            image: canonical,
            grid,
            rescaled,
        })
    }
}

/// Read-only inputs shared by every worker for one run.
pub(crate) struct Stages<'a, S: ?Sized> {
    pub(crate) templates: &'a S,
    pub(crate) library: &'a TemplateLibrary,
    /// Original image, present only when resampling runs.
    pub(crate) source: Option<&'a PixelBuffer>,
    pub(crate) config: &'a ContourConfig,
    pub(crate) threads: usize,
    pub(crate) stamp: bool,
}

/// Picks the error to report when several workers failed.
///
/// `IncompleteTemplateSet` only echoes a peer's load failure, so the
/// originating error wins.
pub(crate) fn first_error(results: Vec<IsolineResult<()>>) -> IsolineResult<()> {
    let mut echo = None;
    for result in results {
        match result {
            Ok(()) => {}
            Err(err @ IsolineError::IncompleteTemplateSet { .. }) => {
                echo.get_or_insert(err);
            }
            Err(err) => return Err(err),
        }
    }
    echo.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::{first_error, ContourConfig, Renderer};
    use crate::image::{PixelBuffer, Rgb};
    use crate::template::ProceduralTemplates;
    use crate::util::IsolineError;

    #[test]
    fn default_config_matches_reference_constants() {
        let cfg = ContourConfig::default();
        assert_eq!(cfg.step, 8);
        assert_eq!(cfg.sigma, 200);
        assert_eq!((cfg.rescale_width, cfg.rescale_height), (2048, 2048));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let zero_step = ContourConfig {
            step: 0,
            ..ContourConfig::default()
        };
        assert!(zero_step.validate().is_err());
        let tiny = ContourConfig {
            rescale_width: 1,
            ..ContourConfig::default()
        };
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn builder_keeps_threads_and_config() {
        let cfg = ContourConfig {
            sigma: 90,
            ..ContourConfig::default()
        };
        let renderer = Renderer::new(ProceduralTemplates::new(8), cfg.clone()).with_threads(6);
        assert_eq!(renderer.threads(), 6);
        assert_eq!(renderer.config(), &cfg);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let renderer = Renderer::new(ProceduralTemplates::new(8), ContourConfig::default())
            .with_threads(0);
        let img = PixelBuffer::filled(16, 16, Rgb::WHITE).unwrap();
        assert!(matches!(
            renderer.render(img),
            Err(IsolineError::InvalidInput(_))
        ));
    }

    #[test]
    fn originating_error_beats_echoes() {
        let results = vec![
            Err(IsolineError::IncompleteTemplateSet { missing: 1 }),
            Ok(()),
            Err(IsolineError::TemplateLoad {
                index: 7,
                reason: "boom".into(),
            }),
        ];
        assert!(matches!(
            first_error(results),
            Err(IsolineError::TemplateLoad { index: 7, .. })
        ));
        assert!(first_error(vec![Ok(()), Ok(())]).is_ok());
    }
}
