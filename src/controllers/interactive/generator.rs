use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::controllers::interactive::errors::generator::GeneratorError;
use crate::controllers::interactive::events::update_status::UpdateStatus;
use crate::controllers::interactive::ports::update_receiver::UpdateReceiver;
use crate::controllers::interactive::raster_job::{PassProgress, RasterJob};
use crate::controllers::interactive::scheduler::{Job, Priority, SchedulerError, SchedulerHandle};
use crate::controllers::interactive::types::GeneratorState;
use crate::core::actions::cancellation::{CancelToken, CancellationToken};
use crate::core::data::fractal_type::FractalType;
use crate::core::data::generator_settings::GeneratorSettings;
use crate::core::data::position::Position;
use crate::core::data::progressive_level::{FINAL_LEVEL, PREVIEW_LEVEL, pass_step};
use crate::core::data::raster_buffer::{RasterBuffer, RasterData};
use crate::core::data::resolution::Resolution;
use crate::core::fractals::algorithm::EscapeTimeAlgorithm;
use crate::core::util::calculate_row_bands::calculate_row_bands;

const BANDS_PER_WORKER: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Parameters {
    fractal: FractalType,
    position: Position,
    settings: GeneratorSettings,
    resolution: Option<Resolution>,
}

/// Algorithm and buffer built from one parameter set. Replaced as a whole.
struct Snapshot {
    algorithm: Arc<EscapeTimeAlgorithm>,
    buffer: Arc<RasterBuffer>,
}

impl Snapshot {
    fn new(parameters: &Parameters, resolution: Resolution) -> Result<Self, GeneratorError> {
        let algorithm = EscapeTimeAlgorithm::new(
            &parameters.fractal,
            &parameters.position,
            &parameters.settings,
            resolution,
        )?;
        let buffer = RasterBuffer::try_new(resolution)?;

        Ok(Self {
            algorithm: Arc::new(algorithm),
            buffer: Arc::new(buffer),
        })
    }
}

struct CoreState {
    state: GeneratorState,
    snapshot: Option<Snapshot>,
    // shared by every pass of the current run
    token: Option<CancellationToken>,
    generation: u64,
    delivered_generation: u64,
    priority: Priority,
    preview: bool,
}

impl CoreState {
    fn resting_state(&self) -> GeneratorState {
        match &self.snapshot {
            Some(snapshot) if snapshot.buffer.completion_level() >= FINAL_LEVEL => {
                GeneratorState::Converged
            }
            _ => GeneratorState::Idle,
        }
    }
}

/// State shared between a generator and its in-flight jobs.
///
/// Lock order is always this core's mutex before the scheduler queue.
pub(crate) struct GeneratorCore {
    state: Mutex<CoreState>,
    scheduler: SchedulerHandle,
    receiver: Arc<dyn UpdateReceiver>,
    notification_pending: AtomicBool,
}

impl GeneratorCore {
    fn lock(&self) -> MutexGuard<'_, CoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Posts at most one pending notification until `update_data` runs.
    pub(crate) fn notify(&self) {
        if !self.notification_pending.swap(true, Ordering::AcqRel) {
            self.receiver.data_updated();
        }
    }

    /// Called by the last job of `pass` for `token`. An incomplete pass
    /// leaves the completion level where it was and stops refinement until
    /// the next restart or resume.
    pub(crate) fn pass_finished(
        self: &Arc<Self>,
        token: &CancellationToken,
        pass: u32,
        complete: bool,
    ) {
        let mut state = self.lock();
        if state.token.as_ref() != Some(token) || token.is_cancelled() {
            return;
        }

        if !complete {
            warn!(pass, generation = state.generation, "pass lost bands, refinement stopped");
            state.state = GeneratorState::Idle;
            state.token = None;
            drop(state);

            self.notify();
            return;
        }

        if let Some(snapshot) = &state.snapshot {
            snapshot.buffer.advance_completion(pass + 1);
        }
        debug!(pass, generation = state.generation, "pass complete");

        if let Err(error) = self.start_pass(&mut state, pass + 1) {
            warn!(%error, pass = pass + 1, "cannot schedule next pass");
        }
        drop(state);

        self.notify();
    }

    fn start_pass(
        self: &Arc<Self>,
        state: &mut CoreState,
        pass: u32,
    ) -> Result<(), SchedulerError> {
        let target = if state.preview { PREVIEW_LEVEL } else { FINAL_LEVEL };

        let (Some(snapshot), Some(step)) = (
            state.snapshot.as_ref(),
            pass_step(pass).and_then(NonZeroU32::new),
        ) else {
            state.state = state.resting_state();
            state.token = None;
            return Ok(());
        };

        if pass >= target {
            state.state = state.resting_state();
            state.token = None;
            debug!(pass, state = ?state.state, "refinement stopped");
            return Ok(());
        }

        let token = state
            .token
            .get_or_insert_with(CancellationToken::new)
            .clone();

        let workers = self.scheduler.worker_count().get();
        let max_bands = u32::try_from(workers.saturating_mul(BANDS_PER_WORKER))
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN);
        let bands = calculate_row_bands(snapshot.buffer.resolution().height(), step, max_bands);

        let progress = Arc::new(PassProgress::new(
            pass,
            bands.len(),
            token.clone(),
            Arc::clone(self),
        ));
        let jobs: Vec<Box<dyn Job>> = bands
            .into_iter()
            .map(|rows| {
                Box::new(RasterJob::new(
                    rows,
                    Arc::clone(&snapshot.algorithm),
                    Arc::clone(&snapshot.buffer),
                    Arc::clone(&progress),
                )) as Box<dyn Job>
            })
            .collect();

        debug!(pass, jobs = jobs.len(), token = token.id(), "pass submitted");
        state.state = GeneratorState::Computing(pass);

        let result = self.scheduler.submit(jobs, state.priority, &token);
        if result.is_err() {
            state.state = GeneratorState::Idle;
            state.token = None;
        }

        result
    }

    /// Cancels the current run and waits for its jobs to acknowledge.
    ///
    /// Never called with the core locked: finishing jobs may need the lock.
    fn drain(&self) {
        let previous = {
            let mut state = self.lock();
            let previous = state.token.take();
            if previous.is_some() {
                state.state = GeneratorState::Draining;
            }
            previous
        };

        if let Some(token) = previous {
            self.scheduler.cancel(&token);
            self.scheduler.wait(&token);
            debug!(token = token.id(), "drained");
        }
    }

    /// Drains, swaps in `snapshot` and starts from the first pass.
    fn restart(self: &Arc<Self>, snapshot: Option<Snapshot>) -> Result<(), SchedulerError> {
        self.drain();

        let mut state = self.lock();
        state.generation += 1;
        state.snapshot = snapshot;
        state.token = None;
        debug!(generation = state.generation, "generation restarted");

        self.start_pass(&mut state, 0)
    }

    /// Continues from the buffer's completion level unless already running.
    fn resume(self: &Arc<Self>) -> Result<(), SchedulerError> {
        let mut state = self.lock();
        if state.token.is_some() {
            return Ok(());
        }

        let level = state
            .snapshot
            .as_ref()
            .map_or(0, |snapshot| snapshot.buffer.completion_level());
        debug!(level, "resuming");

        self.start_pass(&mut state, level)
    }

    fn stop(&self) {
        self.drain();
        let mut state = self.lock();
        if state.token.is_none() {
            state.state = GeneratorState::Idle;
        }
    }

    fn has_snapshot(&self) -> bool {
        self.lock().snapshot.is_some()
    }
}

/// Progressive, cancellable renderer of one escape-time raster.
///
/// Every parameter change cancels the running passes, swaps in a fresh
/// buffer and starts over from the coarsest pass. Consumers are woken
/// through the [`UpdateReceiver`] and pull the current raster with
/// [`FractalGenerator::update_data`].
pub struct FractalGenerator {
    core: Arc<GeneratorCore>,
    parameters: Parameters,
    enabled: bool,
}

impl FractalGenerator {
    /// Creates an enabled generator with default parameters and no
    /// resolution. Nothing is computed until a resolution is set.
    pub fn new(scheduler: SchedulerHandle, receiver: Arc<dyn UpdateReceiver>) -> Self {
        Self {
            core: Arc::new(GeneratorCore {
                state: Mutex::new(CoreState {
                    state: GeneratorState::Idle,
                    snapshot: None,
                    token: None,
                    generation: 0,
                    delivered_generation: 0,
                    priority: Priority::default(),
                    preview: false,
                }),
                scheduler,
                receiver,
                notification_pending: AtomicBool::new(false),
            }),
            parameters: Parameters {
                fractal: FractalType::default(),
                position: Position::default(),
                settings: GeneratorSettings::default(),
                resolution: None,
            },
            enabled: true,
        }
    }

    pub fn set_parameters(
        &mut self,
        fractal: FractalType,
        position: Position,
    ) -> Result<(), GeneratorError> {
        self.apply(Parameters {
            fractal,
            position,
            ..self.parameters
        })
    }

    pub fn set_fractal_type(&mut self, fractal: FractalType) -> Result<(), GeneratorError> {
        self.apply(Parameters {
            fractal,
            ..self.parameters
        })
    }

    pub fn set_position(&mut self, position: Position) -> Result<(), GeneratorError> {
        self.apply(Parameters {
            position,
            ..self.parameters
        })
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), GeneratorError> {
        let resolution = Resolution::new(width, height)?;

        self.apply(Parameters {
            resolution: Some(resolution),
            ..self.parameters
        })
    }

    /// Out-of-range or non-finite knobs are clamped, not rejected.
    pub fn set_generator_settings(
        &mut self,
        settings: GeneratorSettings,
    ) -> Result<(), GeneratorError> {
        self.apply(Parameters {
            settings: settings.clamped(),
            ..self.parameters
        })
    }

    /// Caps refinement at the coarse pass while `preview` is set.
    pub fn set_preview_mode(&mut self, preview: bool) -> Result<(), GeneratorError> {
        let mut state = self.core.lock();
        if state.preview == preview {
            return Ok(());
        }
        state.preview = preview;
        debug!(preview, "preview mode changed");

        if preview {
            let refining = matches!(state.state, GeneratorState::Computing(pass) if pass >= PREVIEW_LEVEL);
            drop(state);
            if refining {
                self.core.stop();
            }
        } else {
            drop(state);
            if self.enabled {
                self.core.resume()?;
            }
        }

        Ok(())
    }

    /// Applies to future passes and re-queues pending jobs.
    pub fn set_priority(&mut self, priority: Priority) {
        let mut state = self.core.lock();
        state.priority = priority;
        if let Some(token) = &state.token {
            self.core.scheduler.reprioritize(token, priority);
        }
    }

    /// Disabling cancels in-flight jobs and keeps the buffer; enabling
    /// resumes from the last committed pass.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), GeneratorError> {
        if self.enabled == enabled {
            return Ok(());
        }

        if !enabled {
            self.enabled = false;
            self.core.stop();
            debug!("generator disabled");
            return Ok(());
        }

        if self.core.has_snapshot() {
            self.core.resume()?;
        } else if let Some(resolution) = self.parameters.resolution {
            let snapshot = Snapshot::new(&self.parameters, resolution)?;
            self.core.restart(Some(snapshot))?;
        }
        self.enabled = true;
        debug!("generator enabled");

        Ok(())
    }

    /// Copies the current raster into `out`.
    ///
    /// Never waits for jobs. Before any buffer exists `out` is left empty.
    /// Until the first band of a new buffer lands, `out` keeps the previous
    /// contents and the call reports [`UpdateStatus::PartialUpdate`].
    pub fn update_data(&self, out: &mut RasterData) -> UpdateStatus {
        self.core.notification_pending.swap(false, Ordering::AcqRel);

        let (buffer, first_delivery) = {
            let mut state = self.core.lock();
            let first_delivery = state.delivered_generation != state.generation;
            let buffer = state
                .snapshot
                .as_ref()
                .map(|snapshot| Arc::clone(&snapshot.buffer));

            // a fresh buffer with nothing written yet is not worth a redraw
            if first_delivery && buffer.as_ref().is_some_and(|buffer| !buffer.has_commits()) {
                return UpdateStatus::PartialUpdate;
            }
            state.delivered_generation = state.generation;
            (buffer, first_delivery)
        };

        let Some(buffer) = buffer else {
            out.clear();
            return if first_delivery {
                UpdateStatus::InitialUpdate
            } else {
                UpdateStatus::PartialUpdate
            };
        };

        buffer.copy_into(out);
        let converged = out.completion_level() >= FINAL_LEVEL;

        match (first_delivery, converged) {
            (true, true) => {
                // the consumer still needs to hear about convergence
                self.core.notify();
                UpdateStatus::InitialUpdate
            }
            (true, false) => UpdateStatus::InitialUpdate,
            (false, true) => UpdateStatus::FullUpdate,
            (false, false) => UpdateStatus::PartialUpdate,
        }
    }

    #[must_use]
    pub fn maximum_iterations(&self) -> u32 {
        self.parameters
            .settings
            .maximum_iterations(self.parameters.position.zoom_factor)
    }

    #[must_use]
    pub fn state(&self) -> GeneratorState {
        self.core.lock().state
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.core.lock().preview
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.core.lock().priority
    }

    #[must_use]
    pub fn fractal_type(&self) -> FractalType {
        self.parameters.fractal
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.parameters.position
    }

    #[must_use]
    pub fn settings(&self) -> GeneratorSettings {
        self.parameters.settings
    }

    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.parameters.resolution
    }

    fn apply(&mut self, next: Parameters) -> Result<(), GeneratorError> {
        if next == self.parameters {
            return Ok(());
        }

        next.fractal.validate()?;
        if !next.position.is_finite() {
            return Err(GeneratorError::InvalidPosition(next.position));
        }

        // built before anything is torn down so a failure changes nothing
        let snapshot = match next.resolution {
            Some(resolution) if self.enabled => Some(Snapshot::new(&next, resolution)?),
            _ => None,
        };

        self.parameters = next;
        self.core.restart(snapshot)?;

        Ok(())
    }
}

impl Drop for FractalGenerator {
    fn drop(&mut self) {
        self.core.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::interactive::ports::update_receiver::ChannelReceiver;
    use crate::controllers::interactive::scheduler::JobScheduler;
    use crate::controllers::interactive::scheduler::JobError;
    use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
    use crate::core::data::complex::Complex;
    use crate::core::data::fractal_type::{Exponent, MAX_EXPONENT};
    use crate::core::data::point::Point;
    use crossbeam_channel::{Receiver, bounded};
    use std::num::NonZeroUsize;
    use std::thread;
    use std::time::{Duration, Instant};
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("band unavailable")]
    struct BandUnavailable;

    struct FailingAlgorithm {
        resolution: Resolution,
        panics: bool,
    }

    impl FractalAlgorithm for FailingAlgorithm {
        type Success = f64;
        type Failure = BandUnavailable;

        fn compute(&self, _pixel: Point) -> Result<f64, BandUnavailable> {
            if self.panics {
                panic!("band exploded");
            }
            Err(BandUnavailable)
        }

        fn resolution(&self) -> Resolution {
            self.resolution
        }
    }

    /// Runs the last pass by hand with its lower half computed by `failing`,
    /// then reports the generator's state and what a consumer would see.
    fn run_last_pass_with_failing_band(
        failing: FailingAlgorithm,
    ) -> (GeneratorState, UpdateStatus, RasterData) {
        let (_scheduler, mut generator, _notifications) = setup();
        generator.set_enabled(false).unwrap();
        generator.set_resolution(8, 8).unwrap();

        let pass = FINAL_LEVEL - 1;
        let snapshot = Snapshot::new(&generator.parameters, failing.resolution).unwrap();
        let algorithm = Arc::clone(&snapshot.algorithm);
        let buffer = Arc::clone(&snapshot.buffer);
        buffer.advance_completion(pass);
        buffer.mark_committed();

        let token = CancellationToken::new();
        {
            let mut state = generator.core.lock();
            state.snapshot = Some(snapshot);
            state.token = Some(token.clone());
            state.state = GeneratorState::Computing(pass);
        }

        let progress = Arc::new(PassProgress::new(pass, 2, token.clone(), Arc::clone(&generator.core)));
        let jobs: Vec<Box<dyn Job>> = vec![
            Box::new(RasterJob::new(0..4, algorithm, Arc::clone(&buffer), Arc::clone(&progress))),
            Box::new(RasterJob::new(4..8, Arc::new(failing), buffer, progress)),
        ];
        generator
            .core
            .scheduler
            .submit(jobs, Priority::default(), &token)
            .unwrap();
        generator.core.scheduler.wait(&token);

        let mut out = RasterData::new();
        generator.update_data(&mut out);
        let status = generator.update_data(&mut out);

        (generator.state(), status, out)
    }

    fn block_workers(
        generator: &FractalGenerator,
        workers: usize,
    ) -> crossbeam_channel::Sender<()> {
        let (started_tx, started_rx) = bounded(workers);
        let (release_tx, release_rx) = bounded::<()>(0);

        for _ in 0..workers {
            let started = started_tx.clone();
            let release = release_rx.clone();
            let blocker: Box<dyn Job> = Box::new(move |_: &CancellationToken| {
                started.send(()).ok();
                release.recv().ok();
                Ok::<(), JobError>(())
            });
            generator
                .core
                .scheduler
                .submit(vec![blocker], Priority::INTERACTIVE, &CancellationToken::new())
                .unwrap();
        }
        for _ in 0..workers {
            started_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        }

        release_tx
    }

    fn setup() -> (JobScheduler, FractalGenerator, Receiver<()>) {
        let scheduler = JobScheduler::new(NonZeroUsize::new(2).unwrap()).unwrap();
        let (receiver, notifications) = ChannelReceiver::channel();
        let generator = FractalGenerator::new(scheduler.handle(), Arc::new(receiver));

        (scheduler, generator, notifications)
    }

    fn run_until_converged(
        generator: &FractalGenerator,
        notifications: &Receiver<()>,
        out: &mut RasterData,
    ) -> Vec<UpdateStatus> {
        let mut statuses = Vec::new();
        loop {
            notifications
                .recv_timeout(Duration::from_secs(10))
                .expect("generator stopped notifying");
            let status = generator.update_data(out);
            statuses.push(status);
            if status == UpdateStatus::FullUpdate {
                return statuses;
            }
        }
    }

    #[test]
    fn test_update_data_before_any_computation_is_empty() {
        let (_scheduler, generator, _notifications) = setup();
        let mut out = RasterData::new();

        assert_eq!(generator.update_data(&mut out), UpdateStatus::PartialUpdate);
        assert!(out.is_empty());
        assert_eq!(generator.state(), GeneratorState::Idle);
    }

    #[test]
    fn test_converges_after_resolution_is_set() {
        let (_scheduler, mut generator, notifications) = setup();
        let mut out = RasterData::new();

        generator.set_resolution(16, 12).unwrap();
        let statuses = run_until_converged(&generator, &notifications, &mut out);

        assert_eq!(statuses.first(), Some(&UpdateStatus::InitialUpdate));
        assert_eq!(out.completion_level(), FINAL_LEVEL);
        assert_eq!(out.values().len(), 16 * 12);
        assert_eq!(generator.state(), GeneratorState::Converged);
    }

    #[test]
    fn test_invalid_parameters_leave_state_untouched() {
        let (_scheduler, mut generator, _notifications) = setup();

        assert!(matches!(
            generator.set_resolution(0, 10),
            Err(GeneratorError::InvalidResolution(_))
        ));
        assert!(matches!(
            generator.set_fractal_type(FractalType::mandelbrot(Exponent::Integral(1))),
            Err(GeneratorError::InvalidFractalType(_))
        ));
        assert!(matches!(
            generator.set_position(Position::new(Complex::new(f64::NAN, 0.0), 0.0, 0.0)),
            Err(GeneratorError::InvalidPosition(_))
        ));

        assert_eq!(generator.resolution(), None);
        assert_eq!(generator.fractal_type(), FractalType::default());
        assert_eq!(generator.position(), Position::default());
    }

    #[test]
    fn test_setting_equal_value_does_not_restart() {
        let (_scheduler, mut generator, notifications) = setup();
        let mut out = RasterData::new();
        generator.set_resolution(8, 8).unwrap();
        run_until_converged(&generator, &notifications, &mut out);

        generator.set_resolution(8, 8).unwrap();
        generator.set_position(Position::default()).unwrap();

        assert_eq!(generator.state(), GeneratorState::Converged);
        assert_eq!(generator.update_data(&mut out), UpdateStatus::FullUpdate);
    }

    #[test]
    fn test_maximum_iterations_follows_settings_and_zoom() {
        let (_scheduler, mut generator, _notifications) = setup();

        assert_eq!(generator.maximum_iterations(), 500);

        generator
            .set_generator_settings(GeneratorSettings::new(0.0, 0.5))
            .unwrap();
        generator
            .set_position(Position::new(Complex::ZERO, 1.0, 0.0))
            .unwrap();

        assert_eq!(generator.maximum_iterations(), 100);
    }

    #[test]
    fn test_settings_are_clamped() {
        let (_scheduler, mut generator, _notifications) = setup();

        generator
            .set_generator_settings(GeneratorSettings::new(f64::NAN, 7.0))
            .unwrap();

        assert_eq!(
            generator.settings(),
            GeneratorSettings::new(f64::NAN, 7.0).clamped()
        );
    }

    #[test]
    fn test_set_priority_is_reported() {
        let (_scheduler, mut generator, _notifications) = setup();

        generator.set_priority(Priority::INTERACTIVE);

        assert_eq!(generator.priority(), Priority::INTERACTIVE);
    }

    #[test]
    fn test_failed_band_keeps_raster_short_of_convergence() {
        let (state, status, out) = run_last_pass_with_failing_band(FailingAlgorithm {
            resolution: Resolution::new(8, 8).unwrap(),
            panics: false,
        });

        assert_eq!(state, GeneratorState::Idle);
        assert_eq!(status, UpdateStatus::PartialUpdate);
        assert_eq!(out.completion_level(), FINAL_LEVEL - 1);
    }

    #[test]
    fn test_panicking_band_keeps_raster_short_of_convergence() {
        let (state, status, out) = run_last_pass_with_failing_band(FailingAlgorithm {
            resolution: Resolution::new(8, 8).unwrap(),
            panics: true,
        });

        assert_eq!(state, GeneratorState::Idle);
        assert_ne!(status, UpdateStatus::FullUpdate);
        assert_eq!(out.completion_level(), FINAL_LEVEL - 1);
    }

    #[test]
    fn test_oversized_exponent_is_rejected() {
        let (_scheduler, mut generator, _notifications) = setup();

        let result =
            generator.set_fractal_type(FractalType::mandelbrot(Exponent::Integral(20_000_000)));

        assert!(matches!(result, Err(GeneratorError::InvalidFractalType(_))));
        assert_eq!(generator.fractal_type(), FractalType::default());
    }

    #[test]
    fn test_setters_stay_responsive_at_largest_exponent() {
        let (_scheduler, mut generator, _notifications) = setup();
        generator
            .set_generator_settings(GeneratorSettings::new(2.0, 0.5))
            .unwrap();
        generator
            .set_fractal_type(FractalType::mandelbrot(Exponent::Integral(MAX_EXPONENT)))
            .unwrap();
        generator.set_resolution(4, 4).unwrap();
        thread::sleep(Duration::from_millis(100));

        let start = Instant::now();
        generator
            .set_position(Position::new(Complex::new(0.1, 0.0), 0.0, 0.0))
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed < Duration::from_secs(1), "set_position took {:?}", elapsed);
    }

    #[test]
    fn test_new_buffer_is_withheld_until_first_band_lands() {
        let (_scheduler, mut generator, notifications) = setup();
        let mut out = RasterData::new();
        generator.set_resolution(8, 8).unwrap();
        run_until_converged(&generator, &notifications, &mut out);
        let converged = out.clone();

        let release = block_workers(&generator, 2);
        generator
            .set_position(Position::new(Complex::new(0.25, 0.0), 0.5, 0.0))
            .unwrap();

        assert_eq!(generator.update_data(&mut out), UpdateStatus::PartialUpdate);
        assert_eq!(out, converged);

        drop(release);
        let statuses = run_until_converged(&generator, &notifications, &mut out);
        assert_eq!(
            statuses
                .iter()
                .filter(|status| **status == UpdateStatus::InitialUpdate)
                .count(),
            1
        );
        assert_ne!(out, converged);
    }

    #[test]
    fn test_generator_survives_scheduler_shutdown() {
        let (mut scheduler, mut generator, _notifications) = setup();
        scheduler.shutdown();

        let result = generator.set_resolution(4, 4);

        assert!(matches!(result, Err(GeneratorError::Scheduler(SchedulerError::ShutDown))));
        assert_eq!(generator.state(), GeneratorState::Idle);
    }
}
