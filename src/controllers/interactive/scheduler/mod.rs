//! Priority job scheduler backing every generator.
//!
//! A [`JobScheduler`] owns a fixed pool of worker threads. Generators hold a
//! [`SchedulerHandle`] and submit work-sets, each tagged with a
//! [`CancellationToken`](crate::core::actions::cancellation::CancellationToken)
//! so the whole set can be cancelled, waited on or reprioritised at once.

mod job;
mod job_scheduler;

pub use job::{Job, JobError, Priority};
pub use job_scheduler::{JobScheduler, SchedulerError, SchedulerHandle, default_worker_count};
