pub mod complex;
pub mod fractal_type;
pub mod generator_settings;
pub mod point;
pub mod position;
pub mod progressive_level;
pub mod raster_buffer;
pub mod resolution;
