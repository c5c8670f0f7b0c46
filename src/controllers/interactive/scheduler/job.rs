use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::actions::cancellation::{CancellationToken, Cancelled};

/// Scheduling priority of a work-set. Higher values run first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const BACKGROUND: Priority = Priority(0);
    pub const INTERACTIVE: Priority = Priority(10);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("job failed: {0}")]
    Failed(String),
}

/// One schedulable unit of work.
///
/// A job runs at most once. It must poll `token` at bounded intervals and
/// return [`JobError::Cancelled`] without committing anything once the token
/// is flagged. A job that is dropped without running has been cancelled.
pub trait Job: Send {
    fn run(self: Box<Self>, token: &CancellationToken) -> Result<(), JobError>;
}

impl<F> Job for F
where
    F: FnOnce(&CancellationToken) -> Result<(), JobError> + Send,
{
    fn run(self: Box<Self>, token: &CancellationToken) -> Result<(), JobError> {
        (*self)(token)
    }
}
