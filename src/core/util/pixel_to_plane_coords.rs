use thiserror::Error;

use crate::core::data::complex::Complex;
use crate::core::data::point::Point;
use crate::core::data::position::Position;
use crate::core::data::resolution::Resolution;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PixelToPlaneCoordsError {
    #[error("point {point:?} is outside the raster {resolution:?}")]
    PointOutsideRaster { point: Point, resolution: Resolution },
}

/// Precomputed affine map from pixel centres to fractal-plane coordinates
/// for one viewport and raster size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlaneMapping {
    resolution: Resolution,
    center: Complex,
    half_width: f64,
    half_height: f64,
    // scale folded into the rotation
    cos: f64,
    sin: f64,
}

impl PlaneMapping {
    #[must_use]
    pub fn new(position: &Position, resolution: Resolution) -> Self {
        let scale = position.visible_height() / f64::from(resolution.height());
        let (sin, cos) = position.angle.to_radians().sin_cos();

        Self {
            resolution,
            center: position.center,
            half_width: f64::from(resolution.width()) / 2.0,
            half_height: f64::from(resolution.height()) / 2.0,
            cos: cos * scale,
            sin: sin * scale,
        }
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn map(&self, pixel: Point) -> Result<Complex, PixelToPlaneCoordsError> {
        if !self.resolution.contains_point(pixel) {
            return Err(PixelToPlaneCoordsError::PointOutsideRaster {
                point: pixel,
                resolution: self.resolution,
            });
        }

        let dx = f64::from(pixel.x) + 0.5 - self.half_width;
        let dy = self.half_height - (f64::from(pixel.y) + 0.5);

        Ok(Complex {
            real: self.center.real + dx * self.cos - dy * self.sin,
            imag: self.center.imag + dx * self.sin + dy * self.cos,
        })
    }
}
