use thiserror::Error;

use crate::controllers::interactive::scheduler::SchedulerError;
use crate::core::data::fractal_type::FractalTypeError;
use crate::core::data::position::Position;
use crate::core::data::raster_buffer::RasterBufferError;
use crate::core::data::resolution::ResolutionError;
use crate::core::fractals::escape_time::EscapeTimeError;

/// Failure of a generator setter. The generator keeps its previous state.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid resolution")]
    InvalidResolution(#[from] ResolutionError),
    #[error("invalid fractal type")]
    InvalidFractalType(#[from] FractalTypeError),
    #[error("position must be finite: {0:?}")]
    InvalidPosition(Position),
    #[error("cannot set up the escape-time algorithm")]
    Algorithm(#[from] EscapeTimeError),
    #[error(transparent)]
    Allocation(#[from] RasterBufferError),
    #[error("cannot schedule generation")]
    Scheduler(#[from] SchedulerError),
}
