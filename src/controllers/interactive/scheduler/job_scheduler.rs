use std::any::Any;
use std::cmp::Ordering as CmpOrdering;
use std::collections::{BinaryHeap, HashMap};
use std::io;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::controllers::interactive::scheduler::job::{Job, JobError, Priority};
use crate::core::actions::cancellation::{CancelToken, CancellationToken};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler has shut down")]
    ShutDown,
    #[error("cannot spawn worker thread")]
    Spawn(#[source] io::Error),
}

/// Worker count used when none is configured.
#[must_use]
pub fn default_worker_count() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

struct QueuedJob {
    priority: Priority,
    sequence: u64,
    token: CancellationToken,
    job: Box<dyn Job>,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

// max-heap: higher priority first, then the earlier submission
impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct WorkSet {
    token: CancellationToken,
    outstanding: usize,
}

#[derive(Default)]
struct QueueState {
    pending: BinaryHeap<QueuedJob>,
    // pending + running jobs per token id
    work_sets: HashMap<u64, WorkSet>,
    next_sequence: u64,
    shutdown: bool,
}

impl QueueState {
    fn take_jobs_where(&mut self, mut predicate: impl FnMut(&QueuedJob) -> bool) -> Vec<QueuedJob> {
        let (taken, kept): (Vec<_>, Vec<_>) =
            self.pending.drain().partition(|queued| predicate(queued));
        self.pending = kept.into();
        taken
    }

    /// Returns true once the token has nothing left pending or running.
    fn release(&mut self, token_id: u64, count: usize) -> bool {
        let Some(work_set) = self.work_sets.get_mut(&token_id) else {
            return true;
        };

        work_set.outstanding = work_set.outstanding.saturating_sub(count);
        if work_set.outstanding == 0 {
            self.work_sets.remove(&token_id);
            true
        } else {
            false
        }
    }
}

struct Shared {
    queue: Mutex<QueueState>,
    wake: Condvar,
    idle: Condvar,
    worker_count: NonZeroUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheap, clonable reference to a [`JobScheduler`]'s queue.
///
/// Jobs are never dropped while the queue lock is held, so a job's `Drop`
/// may call back into the scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
}

impl SchedulerHandle {
    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        self.shared.worker_count
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.lock().shutdown
    }

    /// Queues `jobs` under `token`.
    ///
    /// Jobs submitted with an already cancelled token are dropped. After
    /// shutdown the token is cancelled, the jobs are dropped and
    /// [`SchedulerError::ShutDown`] is returned.
    pub fn submit(
        &self,
        jobs: Vec<Box<dyn Job>>,
        priority: Priority,
        token: &CancellationToken,
    ) -> Result<(), SchedulerError> {
        let mut state = self.shared.lock();

        if state.shutdown {
            drop(state);
            token.cancel();
            drop(jobs);
            return Err(SchedulerError::ShutDown);
        }

        if token.is_cancelled() || jobs.is_empty() {
            drop(state);
            drop(jobs);
            return Ok(());
        }

        let count = jobs.len();
        state
            .work_sets
            .entry(token.id())
            .or_insert_with(|| WorkSet {
                token: token.clone(),
                outstanding: 0,
            })
            .outstanding += count;

        for job in jobs {
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.pending.push(QueuedJob {
                priority,
                sequence,
                token: token.clone(),
                job,
            });
        }
        drop(state);

        trace!(token = token.id(), jobs = count, priority = priority.0, "submitted");
        if count == 1 {
            self.shared.wake.notify_one();
        } else {
            self.shared.wake.notify_all();
        }

        Ok(())
    }

    /// Flags `token` and removes its pending jobs. Running jobs stop at their
    /// next checkpoint; use [`SchedulerHandle::wait`] to wait for them.
    pub fn cancel(&self, token: &CancellationToken) {
        token.cancel();

        let removed = {
            let mut state = self.shared.lock();
            let removed = state.take_jobs_where(|queued| queued.token == *token);
            if !removed.is_empty() && state.release(token.id(), removed.len()) {
                self.shared.idle.notify_all();
            }
            removed
        };

        if !removed.is_empty() {
            debug!(token = token.id(), dropped = removed.len(), "cancelled pending jobs");
        }
    }

    /// Blocks until no job of `token` is pending or running.
    ///
    /// Must not be called from inside a job of the same token.
    pub fn wait(&self, token: &CancellationToken) {
        let mut state = self.shared.lock();
        while state.work_sets.contains_key(&token.id()) {
            state = self
                .shared
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Cancels and drains `previous`, then submits `jobs` under a fresh
    /// token. No job of the new set can start before the old set has
    /// acknowledged cancellation.
    pub fn replace(
        &self,
        previous: Option<&CancellationToken>,
        jobs: Vec<Box<dyn Job>>,
        priority: Priority,
    ) -> Result<CancellationToken, SchedulerError> {
        if let Some(previous) = previous {
            self.cancel(previous);
            self.wait(previous);
        }

        let token = CancellationToken::new();
        self.submit(jobs, priority, &token)?;

        Ok(token)
    }

    /// Moves every pending job of `token` to `priority`, keeping their
    /// submission order.
    pub fn reprioritize(&self, token: &CancellationToken, priority: Priority) {
        let mut state = self.shared.lock();
        let mut moved = state.take_jobs_where(|queued| queued.token == *token);
        for queued in &mut moved {
            queued.priority = priority;
        }
        state.pending.extend(moved);
    }

    fn shutdown(&self) {
        let removed = {
            let mut state = self.shared.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;

            for work_set in state.work_sets.values() {
                work_set.token.cancel();
            }
            let removed: Vec<QueuedJob> = state.pending.drain().collect();
            for queued in &removed {
                state.release(queued.token.id(), 1);
            }
            removed
        };

        self.shared.wake.notify_all();
        self.shared.idle.notify_all();
        debug!(dropped = removed.len(), "scheduler shutting down");
    }

    fn next_job(&self) -> Option<QueuedJob> {
        let mut state = self.shared.lock();
        loop {
            if let Some(queued) = state.pending.pop() {
                return Some(queued);
            }
            if state.shutdown {
                return None;
            }
            state = self
                .shared
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn finish(&self, token: &CancellationToken) {
        let mut state = self.shared.lock();
        if state.release(token.id(), 1) {
            self.shared.idle.notify_all();
        }
    }

    fn worker_loop(&self, index: usize) {
        debug!(worker = index, "worker started");

        while let Some(QueuedJob { token, job, .. }) = self.next_job() {
            if token.is_cancelled() {
                drop(job);
            } else {
                match panic::catch_unwind(AssertUnwindSafe(|| job.run(&token))) {
                    Ok(Ok(())) => trace!(worker = index, token = token.id(), "job committed"),
                    Ok(Err(JobError::Cancelled(_))) => {
                        trace!(worker = index, token = token.id(), "job cancelled")
                    }
                    Ok(Err(JobError::Failed(message))) => {
                        warn!(worker = index, token = token.id(), error = %message, "job failed")
                    }
                    Err(payload) => error!(
                        worker = index,
                        token = token.id(),
                        panic = panic_message(payload.as_ref()),
                        "job panicked"
                    ),
                }
            }

            self.finish(&token);
        }

        debug!(worker = index, "worker stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Fixed-size worker pool running [`Job`]s from a priority queue.
///
/// Created once and shared with every generator through
/// [`JobScheduler::handle`]. Dropping the scheduler shuts it down.
pub struct JobScheduler {
    handle: SchedulerHandle,
    workers: Vec<JoinHandle<()>>,
}

impl JobScheduler {
    pub fn new(worker_count: NonZeroUsize) -> Result<Self, SchedulerError> {
        let handle = SchedulerHandle {
            shared: Arc::new(Shared {
                queue: Mutex::new(QueueState::default()),
                wake: Condvar::new(),
                idle: Condvar::new(),
                worker_count,
            }),
        };

        let mut scheduler = Self {
            handle,
            workers: Vec::with_capacity(worker_count.get()),
        };

        for index in 0..worker_count.get() {
            let worker_handle = scheduler.handle.clone();
            let worker = thread::Builder::new()
                .name(format!("fractal-worker-{index}"))
                .spawn(move || worker_handle.worker_loop(index))
                .map_err(SchedulerError::Spawn)?;
            scheduler.workers.push(worker);
        }

        debug!(workers = worker_count.get(), "scheduler started");

        Ok(scheduler)
    }

    pub fn with_default_workers() -> Result<Self, SchedulerError> {
        Self::new(default_worker_count())
    }

    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn worker_count(&self) -> NonZeroUsize {
        self.handle.worker_count()
    }

    /// Cancels everything pending or running and joins the workers.
    pub fn shutdown(&mut self) {
        self.handle.shutdown();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("worker thread panicked outside a job");
            }
        }
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
