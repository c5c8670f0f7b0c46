use std::error::Error;

use crate::core::data::point::Point;
use crate::core::data::resolution::Resolution;

/// Per-pixel computation shared by the progressive generator and the
/// one-shot renderer.
pub trait FractalAlgorithm {
    type Success;
    type Failure: Error;

    fn compute(&self, pixel: Point) -> Result<Self::Success, Self::Failure>;

    fn resolution(&self) -> Resolution;
}
