use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::fractal_type::FractalType;
use crate::core::data::generator_settings::GeneratorSettings;
use crate::core::data::point::Point;
use crate::core::data::position::Position;
use crate::core::data::resolution::Resolution;
use crate::core::fractals::escape_time::{EscapeTime, EscapeTimeError};
use crate::core::util::pixel_to_plane_coords::{PixelToPlaneCoordsError, PlaneMapping};

/// Escape-time computation bound to one parameter snapshot and raster size.
#[derive(Debug, Clone, PartialEq)]
pub struct EscapeTimeAlgorithm {
    mapping: PlaneMapping,
    escape_time: EscapeTime,
}

impl FractalAlgorithm for EscapeTimeAlgorithm {
    type Success = f64;
    type Failure = PixelToPlaneCoordsError;

    fn compute(&self, pixel: Point) -> Result<Self::Success, Self::Failure> {
        let point = self.mapping.map(pixel)?;

        Ok(self.escape_time.escape_index(point))
    }

    fn resolution(&self) -> Resolution {
        self.mapping.resolution()
    }
}

impl EscapeTimeAlgorithm {
    pub fn new(
        fractal: &FractalType,
        position: &Position,
        settings: &GeneratorSettings,
        resolution: Resolution,
    ) -> Result<Self, EscapeTimeError> {
        let escape_time = EscapeTime::new(
            fractal,
            settings.maximum_iterations(position.zoom_factor),
            settings.bailout_radius(),
        )?;

        Ok(Self {
            mapping: PlaneMapping::new(position, resolution),
            escape_time,
        })
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.escape_time.max_iterations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::complex::Complex;
    use crate::core::data::fractal_type::Exponent;
    use crate::core::data::raster_buffer::INTERIOR;

    #[test]
    fn test_valid_constructor() {
        let algorithm = EscapeTimeAlgorithm::new(
            &FractalType::default(),
            &Position::default(),
            &GeneratorSettings::default(),
            Resolution::new(700, 400).unwrap(),
        );

        assert!(algorithm.is_ok());
        assert_eq!(algorithm.unwrap().max_iterations(), 500);
    }

    #[test]
    fn test_invalid_fractal_type_is_rejected() {
        let algorithm = EscapeTimeAlgorithm::new(
            &FractalType::mandelbrot(Exponent::Real(0.5)),
            &Position::default(),
            &GeneratorSettings::default(),
            Resolution::new(4, 4).unwrap(),
        );

        assert!(algorithm.is_err());
    }

    #[test]
    fn compute_returns_error_for_pixel_outside_raster() {
        let resolution = Resolution::new(10, 10).unwrap();
        let algorithm = EscapeTimeAlgorithm::new(
            &FractalType::default(),
            &Position::default(),
            &GeneratorSettings::default(),
            resolution,
        )
        .unwrap();
        let point = Point { x: 11, y: 0 };

        assert_eq!(
            algorithm.compute(point),
            Err(PixelToPlaneCoordsError::PointOutsideRaster { point, resolution })
        );
    }

    #[test]
    fn compute_classifies_cardioid_centre_as_interior() {
        // centred on -0.25 the middle pixels of a 2x2 view sit inside the cardioid
        let algorithm = EscapeTimeAlgorithm::new(
            &FractalType::default(),
            &Position::new(Complex::new(-0.25, 0.0), 1.0, 0.0),
            &GeneratorSettings::new(0.0, 0.5),
            Resolution::new(2, 2).unwrap(),
        )
        .unwrap();

        assert_eq!(algorithm.max_iterations(), 100);
        assert_eq!(algorithm.compute(Point { x: 0, y: 0 }), Ok(INTERIOR));
    }
}
