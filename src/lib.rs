mod config;
mod controllers;
mod core;

pub use config::{ConfigError, EngineConfig, MAX_DIMENSION, MAX_WORKER_THREADS};

pub use controllers::cli::{HeadlessController, HeadlessError, RenderSummary};
pub use controllers::interactive::scheduler::{Job, JobError, default_worker_count};
pub use controllers::interactive::{
    ChannelReceiver, FractalGenerator, GeneratorError, GeneratorState, JobScheduler, Priority,
    SchedulerError, SchedulerHandle, UpdateReceiver, UpdateStatus,
};

pub use crate::core::actions::cancellation::{CancelToken, CancellationToken, Cancelled, NeverCancel};
pub use crate::core::actions::generate_fractal::generate_fractal_parallel_rayon::{
    GenerateFractalError, generate_fractal_parallel_rayon,
};
pub use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
pub use crate::core::data::complex::Complex;
pub use crate::core::data::fractal_type::{
    Exponent, FractalKind, FractalType, FractalTypeError, MAX_EXPONENT, Variant,
};
pub use crate::core::data::generator_settings::GeneratorSettings;
pub use crate::core::data::point::Point;
pub use crate::core::data::position::Position;
pub use crate::core::data::progressive_level::{FINAL_LEVEL, PREVIEW_LEVEL};
pub use crate::core::data::raster_buffer::{INTERIOR, RasterBufferError, RasterData};
pub use crate::core::data::resolution::{Resolution, ResolutionError};
pub use crate::core::fractals::algorithm::EscapeTimeAlgorithm;
pub use crate::core::fractals::escape_time::{EscapeTime, EscapeTimeError, escape_radius};
pub use crate::core::util::pixel_to_plane_coords::{PixelToPlaneCoordsError, PlaneMapping};
