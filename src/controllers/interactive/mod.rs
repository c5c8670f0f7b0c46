//! Interactive, progressive generation engine.
//!
//! # Architecture
//!
//! - **Scheduler**: a shared worker pool ([`JobScheduler`]) running
//!   cancellable work-sets by priority
//! - **Generator**: [`FractalGenerator`] turns parameter changes into
//!   progressive passes over a raster and tells the consumer when new data
//!   is ready
//! - **Ports**: [`UpdateReceiver`] is the only thing the engine calls on the
//!   consumer's behalf

pub mod errors;
pub mod events;
mod generator;
pub mod ports;
mod raster_job;
pub mod scheduler;
mod types;

pub use errors::generator::GeneratorError;
pub use events::update_status::UpdateStatus;
pub use generator::FractalGenerator;
pub use ports::update_receiver::{ChannelReceiver, UpdateReceiver};
pub use scheduler::{JobScheduler, Priority, SchedulerError, SchedulerHandle};
pub use types::GeneratorState;
