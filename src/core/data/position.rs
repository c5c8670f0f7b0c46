use serde::{Deserialize, Serialize};

use crate::core::data::complex::Complex;
use crate::core::util::fuzzy_compare::fuzzy_eq;

/// Viewport into the fractal plane.
///
/// `zoom_factor` is `log10` of the magnification: the visible height of the
/// raster spans `10^-zoom_factor` plane units, so larger values zoom in.
/// `angle` rotates the view counter-clockwise, in degrees.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub center: Complex,
    pub zoom_factor: f64,
    pub angle: f64,
}

impl Position {
    #[must_use]
    pub fn new(center: Complex, zoom_factor: f64, angle: f64) -> Self {
        Self {
            center,
            zoom_factor,
            angle,
        }
    }

    /// Size of one plane unit per raster height.
    #[must_use]
    pub fn visible_height(&self) -> f64 {
        10f64.powf(-self.zoom_factor)
    }

    /// Viewport framing the Julia set derived from this view, compensating
    /// the zoom for the exponent so the Julia set shows a comparable level
    /// of detail.
    #[must_use]
    pub fn julia_default_for(&self, exponent: f64) -> Self {
        Self {
            center: Complex::ZERO,
            zoom_factor: (self.zoom_factor + 0.45) / exponent - 0.45,
            angle: 0.0,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.zoom_factor.is_finite() && self.angle.is_finite()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.center == other.center
            && fuzzy_eq(self.zoom_factor, other.zoom_factor)
            && fuzzy_eq(self.angle, other.angle)
    }
}
