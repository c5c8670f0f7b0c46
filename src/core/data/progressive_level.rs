//! Sampling pattern of the progressive passes.
//!
//! Pass `n` samples the lattice of spacing `PASS_STEPS[n]` minus the points
//! already sampled by earlier passes, and paints each sample over its
//! `step`×`step` block. Every pixel is sampled by exactly one pass, so the
//! final raster does not depend on how many passes ran before it.

use crate::core::data::point::Point;

/// Lattice spacing of each pass, coarsest first.
pub const PASS_STEPS: [u32; 3] = [4, 2, 1];

/// Completion level of a raster once every pass has committed.
pub const FINAL_LEVEL: u32 = PASS_STEPS.len() as u32;

/// Completion level at which preview mode stops refining.
pub const PREVIEW_LEVEL: u32 = 1;

/// Lattice spacing of `pass`, or `None` past the last pass.
#[must_use]
pub fn pass_step(pass: u32) -> Option<u32> {
    PASS_STEPS.get(pass as usize).copied()
}

/// Whether `point` is computed by `pass`.
#[must_use]
pub fn is_pass_sample(pass: u32, point: Point) -> bool {
    let Some(step) = pass_step(pass) else {
        return false;
    };

    let on_lattice = |step: u32| point.x % step == 0 && point.y % step == 0;

    on_lattice(step) && (pass == 0 || !on_lattice(PASS_STEPS[pass as usize - 1]))
}
