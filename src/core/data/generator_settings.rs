use serde::{Deserialize, Serialize};

use crate::core::util::fuzzy_compare::fuzzy_eq;

pub const MIN_CALCULATION_DEPTH: f64 = 0.0;
pub const MAX_CALCULATION_DEPTH: f64 = 4.0;
pub const BASE_ITERATIONS: f64 = 50.0;
pub const MAX_ITERATIONS_LIMIT: u32 = 1 << 24;

/// Quality knobs for the generator.
///
/// Both values are continuous sliders. `calculation_depth` maps to the
/// iteration cap as `round(50 · 10^depth · (1 + max(zoom, 0)))`, so deeper
/// zooms get proportionally more iterations. `detail_threshold` maps to the
/// bailout radius as `2^(1 + 4·threshold)`.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub calculation_depth: f64,
    pub detail_threshold: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            calculation_depth: 1.0,
            detail_threshold: 0.5,
        }
    }
}

impl GeneratorSettings {
    #[must_use]
    pub fn new(calculation_depth: f64, detail_threshold: f64) -> Self {
        Self {
            calculation_depth,
            detail_threshold,
        }
    }

    /// Copy with both knobs forced into their supported ranges. Non-finite
    /// values fall back to the defaults.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let depth = if self.calculation_depth.is_finite() {
            self.calculation_depth
        } else {
            defaults.calculation_depth
        };
        let threshold = if self.detail_threshold.is_finite() {
            self.detail_threshold
        } else {
            defaults.detail_threshold
        };

        Self {
            calculation_depth: depth.clamp(MIN_CALCULATION_DEPTH, MAX_CALCULATION_DEPTH),
            detail_threshold: threshold.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn maximum_iterations(&self, zoom_factor: f64) -> u32 {
        let settings = self.clamped();
        let zoom_boost = if zoom_factor.is_finite() {
            1.0 + zoom_factor.max(0.0)
        } else {
            1.0
        };
        let iterations = BASE_ITERATIONS * 10f64.powf(settings.calculation_depth) * zoom_boost;

        iterations.round().clamp(1.0, f64::from(MAX_ITERATIONS_LIMIT)) as u32
    }

    #[must_use]
    pub fn bailout_radius(&self) -> f64 {
        2f64.powf(1.0 + 4.0 * self.clamped().detail_threshold)
    }
}

impl PartialEq for GeneratorSettings {
    fn eq(&self, other: &Self) -> bool {
        fuzzy_eq(self.calculation_depth, other.calculation_depth)
            && fuzzy_eq(self.detail_threshold, other.detail_threshold)
    }
}
