use std::collections::TryReserveError;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use thiserror::Error;

use crate::core::data::point::Point;
use crate::core::data::resolution::Resolution;

/// Stored for points whose orbit never escaped.
pub const INTERIOR: f64 = -1.0;

#[derive(Debug, Clone, Error)]
pub enum RasterBufferError {
    #[error("cannot allocate a raster of {resolution:?}")]
    Allocation {
        resolution: Resolution,
        #[source]
        source: TryReserveError,
    },
}

/// Shared output of one generation: one continuous escape index per pixel.
///
/// Each value lives in its own `AtomicU64` holding the `f64` bits, so a
/// reader racing a writer sees either the old or the new value of a pixel,
/// never a mix of both. Nothing orders pixels against each other.
#[derive(Debug)]
pub struct RasterBuffer {
    resolution: Resolution,
    values: Box<[AtomicU64]>,
    completion_level: AtomicU32,
    committed: AtomicBool,
}

impl RasterBuffer {
    pub fn try_new(resolution: Resolution) -> Result<Self, RasterBufferError> {
        let pixel_count = resolution.pixel_count();
        let mut values = Vec::new();

        values
            .try_reserve_exact(pixel_count)
            .map_err(|source| RasterBufferError::Allocation { resolution, source })?;
        values.extend((0..pixel_count).map(|_| AtomicU64::new(INTERIOR.to_bits())));

        Ok(Self {
            resolution,
            values: values.into_boxed_slice(),
            completion_level: AtomicU32::new(0),
            committed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Number of progressive passes fully committed into this buffer.
    #[must_use]
    pub fn completion_level(&self) -> u32 {
        self.completion_level.load(Ordering::Acquire)
    }

    /// True once any band has been written, so the buffer holds more than
    /// its initial fill.
    #[must_use]
    pub fn has_commits(&self) -> bool {
        self.committed.load(Ordering::Acquire)
    }

    pub fn mark_committed(&self) {
        self.committed.store(true, Ordering::Release);
    }

    /// Raises the completion level; it never goes down.
    pub fn advance_completion(&self, level: u32) {
        self.completion_level.fetch_max(level, Ordering::AcqRel);
    }

    #[must_use]
    pub fn load(&self, point: Point) -> Option<f64> {
        if !self.resolution.contains_point(point) {
            return None;
        }

        let bits = self.values[self.resolution.index_of(point)].load(Ordering::Relaxed);
        Some(f64::from_bits(bits))
    }

    /// Writes `value` into the `size`×`size` block anchored at `top_left`,
    /// clipped to the raster.
    pub fn fill_block(&self, top_left: Point, size: u32, value: f64) {
        let bits = value.to_bits();
        let width = self.resolution.width();
        let x_end = top_left.x.saturating_add(size).min(width);
        let y_end = top_left.y.saturating_add(size).min(self.resolution.height());

        for y in top_left.y..y_end {
            let row_start = y as usize * width as usize;
            for x in top_left.x..x_end {
                self.values[row_start + x as usize].store(bits, Ordering::Relaxed);
            }
        }
    }

    /// Copies the current contents into `out`, reusing its allocation.
    pub fn copy_into(&self, out: &mut RasterData) {
        out.resolution = Some(self.resolution);
        out.completion_level = self.completion_level();
        out.values.clear();
        out.values.extend(
            self.values
                .iter()
                .map(|value| f64::from_bits(value.load(Ordering::Relaxed))),
        );
    }
}

/// Consumer-side copy of a raster, filled by the generator's `update_data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterData {
    resolution: Option<Resolution>,
    values: Vec<f64>,
    completion_level: u32,
}

impl RasterData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the generator has produced a buffer.
    #[must_use]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn completion_level(&self) -> u32 {
        self.completion_level
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw stored value, including the [`INTERIOR`] sentinel.
    #[must_use]
    pub fn value(&self, point: Point) -> Option<f64> {
        let resolution = self.resolution?;
        if !resolution.contains_point(point) {
            return None;
        }
        self.values.get(resolution.index_of(point)).copied()
    }

    /// Escape index of an escaped point; `None` for interior points.
    #[must_use]
    pub fn escape_index(&self, point: Point) -> Option<f64> {
        self.value(point).filter(|value| *value != INTERIOR)
    }

    pub(crate) fn clear(&mut self) {
        self.resolution = None;
        self.values.clear();
        self.completion_level = 0;
    }
}
