use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::trace;

use crate::controllers::interactive::generator::GeneratorCore;
use crate::controllers::interactive::scheduler::{Job, JobError};
use crate::core::actions::cancellation::{
    CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, CancellationToken, Cancelled,
};
use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::point::Point;
use crate::core::data::progressive_level::{is_pass_sample, pass_step};
use crate::core::data::raster_buffer::RasterBuffer;
use crate::core::fractals::algorithm::EscapeTimeAlgorithm;

/// Tracks the jobs of one progressive pass. The last job to finish hands
/// the pass back to the generator, along with whether every band committed.
pub(crate) struct PassProgress {
    pass: u32,
    remaining: AtomicUsize,
    failed: AtomicBool,
    token: CancellationToken,
    core: Arc<GeneratorCore>,
}

impl PassProgress {
    pub(crate) fn new(
        pass: u32,
        jobs: usize,
        token: CancellationToken,
        core: Arc<GeneratorCore>,
    ) -> Self {
        Self {
            pass,
            remaining: AtomicUsize::new(jobs),
            failed: AtomicBool::new(false),
            token,
            core,
        }
    }

    fn job_finished(&self, committed: bool) {
        if self.token.is_cancelled() {
            return;
        }

        if !committed {
            self.failed.store(true, Ordering::Release);
        }
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let complete = !self.failed.load(Ordering::Acquire);
            self.core.pass_finished(&self.token, self.pass, complete);
        }
    }
}

/// Computes the samples of one pass inside a band of rows and paints them
/// into the buffer.
///
/// Samples are collected locally and committed only after the whole band is
/// done, so a cancelled or failed job leaves the buffer untouched.
pub(crate) struct RasterJob<A = EscapeTimeAlgorithm> {
    rows: Range<u32>,
    algorithm: Arc<A>,
    buffer: Arc<RasterBuffer>,
    progress: Arc<PassProgress>,
    committed: bool,
}

impl<A> RasterJob<A>
where
    A: FractalAlgorithm<Success = f64>,
{
    pub(crate) fn new(
        rows: Range<u32>,
        algorithm: Arc<A>,
        buffer: Arc<RasterBuffer>,
        progress: Arc<PassProgress>,
    ) -> Self {
        Self {
            rows,
            algorithm,
            buffer,
            progress,
            committed: false,
        }
    }

    fn compute_samples(&self, token: &CancellationToken, step: u32) -> Result<Vec<(Point, f64)>, JobError> {
        let pass = self.progress.pass;
        let width = self.buffer.resolution().width();
        let mut samples = Vec::new();

        for y in self.rows.clone().step_by(step as usize) {
            if token.is_cancelled() {
                return Err(Cancelled.into());
            }

            for (column, x) in (0..width).step_by(step as usize).enumerate() {
                if column > 0 && column % CANCEL_CHECK_INTERVAL_PIXELS == 0 && token.is_cancelled() {
                    return Err(Cancelled.into());
                }

                let point = Point { x, y };
                if !is_pass_sample(pass, point) {
                    continue;
                }

                let value = self
                    .algorithm
                    .compute(point)
                    .map_err(|error| JobError::Failed(error.to_string()))?;
                samples.push((point, value));
            }
        }

        Ok(samples)
    }
}

impl<A> Job for RasterJob<A>
where
    A: FractalAlgorithm<Success = f64> + Send + Sync,
{
    fn run(mut self: Box<Self>, token: &CancellationToken) -> Result<(), JobError> {
        let pass = self.progress.pass;
        let step = pass_step(pass)
            .ok_or_else(|| JobError::Failed(format!("no progressive pass {pass}")))?;

        let samples = self.compute_samples(token, step)?;

        if token.is_cancelled() {
            return Err(Cancelled.into());
        }

        for (point, value) in &samples {
            self.buffer.fill_block(*point, step, *value);
        }
        self.buffer.mark_committed();
        self.committed = true;

        trace!(pass, rows = ?self.rows, samples = samples.len(), "band committed");
        self.progress.core.notify();

        Ok(())
    }
}

// Runs after a commit, a cancellation, a failure, a panic, or when the job
// is discarded unrun. Only the cancelled cases are silent.
impl<A> Drop for RasterJob<A> {
    fn drop(&mut self) {
        self.progress.job_finished(self.committed);
    }
}
