use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::controllers::interactive::{
    ChannelReceiver, FractalGenerator, GeneratorError, GeneratorState, JobScheduler,
    SchedulerError, UpdateStatus,
};
use crate::core::actions::cancellation::NeverCancel;
use crate::core::actions::generate_fractal::generate_fractal_parallel_rayon::{
    GenerateFractalError, generate_fractal_parallel_rayon,
};
use crate::core::data::progressive_level::FINAL_LEVEL;
use crate::core::data::raster_buffer::{INTERIOR, RasterData};
use crate::core::data::resolution::{Resolution, ResolutionError};
use crate::core::fractals::algorithm::EscapeTimeAlgorithm;
use crate::core::fractals::escape_time::EscapeTimeError;
use crate::core::util::pixel_to_plane_coords::PixelToPlaneCoordsError;

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Algorithm(#[from] EscapeTimeError),
    #[error(transparent)]
    Render(#[from] GenerateFractalError<PixelToPlaneCoordsError>),
    #[error("generator dropped its notification channel")]
    Disconnected,
    #[error("render stopped at completion level {0} after a pass lost bands")]
    Incomplete(u32),
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub resolution: Resolution,
    pub max_iterations: u32,
    pub completion_level: u32,
    pub updates: usize,
    pub interior_pixels: usize,
    /// Smallest and largest escape index, `None` if every pixel is interior.
    pub escape_range: Option<(f64, f64)>,
    pub elapsed: Duration,
}

impl RenderSummary {
    fn from_values(
        resolution: Resolution,
        max_iterations: u32,
        completion_level: u32,
        updates: usize,
        values: &[f64],
        elapsed: Duration,
    ) -> Self {
        let interior_pixels = values.iter().filter(|value| **value == INTERIOR).count();
        let escape_range = values
            .iter()
            .copied()
            .filter(|value| *value != INTERIOR)
            .fold(None, |range: Option<(f64, f64)>, value| match range {
                Some((low, high)) => Some((low.min(value), high.max(value))),
                None => Some((value, value)),
            });

        Self {
            resolution,
            max_iterations,
            completion_level,
            updates,
            interior_pixels,
            escape_range,
            elapsed,
        }
    }
}

/// Drives one engine run without a UI, acting as its own consumer.
pub struct HeadlessController {
    config: EngineConfig,
    raster: RasterData,
}

impl HeadlessController {
    /// `config` is sanitized before use.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
            raster: RasterData::new(),
        }
    }

    #[must_use]
    pub fn raster(&self) -> &RasterData {
        &self.raster
    }

    /// Runs a progressive generator until it converges, or until the
    /// preview pass lands when preview mode is configured.
    ///
    /// A run that stops short of convergence outside preview mode is
    /// reported as [`HeadlessError::Incomplete`].
    pub fn run_progressive(&mut self) -> Result<RenderSummary, HeadlessError> {
        let config = &self.config;
        let resolution = config.resolution()?;

        let scheduler = match config.worker_threads {
            Some(threads) => JobScheduler::new(threads)?,
            None => JobScheduler::with_default_workers()?,
        };
        let (receiver, notifications) = ChannelReceiver::channel();
        let mut generator = FractalGenerator::new(scheduler.handle(), Arc::new(receiver));

        info!(
            width = resolution.width(),
            height = resolution.height(),
            workers = scheduler.worker_count().get(),
            preview = config.preview,
            "rendering progressively"
        );

        let start = Instant::now();
        generator.set_priority(config.priority);
        generator.set_preview_mode(config.preview)?;
        generator.set_generator_settings(config.settings)?;
        generator.set_parameters(config.fractal, config.position)?;
        generator.set_resolution(resolution.width(), resolution.height())?;

        let mut updates = 0;
        loop {
            notifications
                .recv()
                .map_err(|_| HeadlessError::Disconnected)?;
            let status = generator.update_data(&mut self.raster);
            updates += 1;
            debug!(?status, level = self.raster.completion_level(), "update received");

            if status == UpdateStatus::FullUpdate {
                break;
            }
            if generator.state() == GeneratorState::Idle {
                // the copy above may predate the pass that stopped the run
                generator.update_data(&mut self.raster);
                break;
            }
        }

        let completion_level = self.raster.completion_level();
        if !config.preview && completion_level < FINAL_LEVEL {
            return Err(HeadlessError::Incomplete(completion_level));
        }

        let summary = RenderSummary::from_values(
            resolution,
            generator.maximum_iterations(),
            self.raster.completion_level(),
            updates,
            self.raster.values(),
            start.elapsed(),
        );
        log_summary(&summary);

        Ok(summary)
    }

    /// Renders the full raster in one rayon pass.
    pub fn run_one_shot(&mut self) -> Result<RenderSummary, HeadlessError> {
        let config = &self.config;
        let resolution = config.resolution()?;
        let algorithm =
            EscapeTimeAlgorithm::new(&config.fractal, &config.position, &config.settings, resolution)?;

        info!(
            width = resolution.width(),
            height = resolution.height(),
            "rendering in one pass"
        );

        let start = Instant::now();
        let values = generate_fractal_parallel_rayon(&algorithm, &NeverCancel)?;
        let elapsed = start.elapsed();

        let summary = RenderSummary::from_values(
            resolution,
            algorithm.max_iterations(),
            1,
            1,
            &values,
            elapsed,
        );
        log_summary(&summary);

        Ok(summary)
    }
}

fn log_summary(summary: &RenderSummary) {
    info!(
        width = summary.resolution.width(),
        height = summary.resolution.height(),
        max_iterations = summary.max_iterations,
        completion_level = summary.completion_level,
        updates = summary.updates,
        interior = summary.interior_pixels,
        escape_range = ?summary.escape_range,
        elapsed = ?summary.elapsed,
        "render finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::progressive_level::PREVIEW_LEVEL;
    use std::num::NonZeroUsize;

    fn small_config() -> EngineConfig {
        EngineConfig {
            worker_threads: NonZeroUsize::new(2),
            width: 24,
            height: 16,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_progressive_run_converges() {
        let mut controller = HeadlessController::new(&small_config());

        let summary = controller.run_progressive().unwrap();

        assert_eq!(summary.completion_level, FINAL_LEVEL);
        assert_eq!(summary.resolution, Resolution::new(24, 16).unwrap());
        assert!(summary.updates >= 1);
        assert_eq!(controller.raster().values().len(), 24 * 16);
    }

    #[test]
    fn test_preview_run_stops_at_preview_level() {
        let config = EngineConfig {
            preview: true,
            ..small_config()
        };
        let mut controller = HeadlessController::new(&config);

        let summary = controller.run_progressive().unwrap();

        assert_eq!(summary.completion_level, PREVIEW_LEVEL);
    }

    #[test]
    fn test_one_shot_matches_progressive() {
        let mut progressive = HeadlessController::new(&small_config());
        let mut one_shot = HeadlessController::new(&small_config());

        let a = progressive.run_progressive().unwrap();
        let b = one_shot.run_one_shot().unwrap();

        assert_eq!(a.interior_pixels, b.interior_pixels);
        assert_eq!(a.escape_range, b.escape_range);
        assert_eq!(a.max_iterations, b.max_iterations);
    }

    #[test]
    fn test_default_view_has_interior_and_escaped_pixels() {
        let mut controller = HeadlessController::new(&small_config());

        let summary = controller.run_one_shot().unwrap();

        assert!(summary.interior_pixels > 0);
        let (low, high) = summary.escape_range.unwrap();
        assert!(low >= 0.0);
        assert!(high < f64::from(summary.max_iterations) + 1.0);
    }

    #[test]
    fn test_summary_of_all_interior_raster() {
        let summary = RenderSummary::from_values(
            Resolution::new(2, 1).unwrap(),
            10,
            FINAL_LEVEL,
            1,
            &[INTERIOR, INTERIOR],
            Duration::ZERO,
        );

        assert_eq!(summary.interior_pixels, 2);
        assert_eq!(summary.escape_range, None);
    }
}
