use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::data::point::Point;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("resolution must be positive: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("resolution {width}x{height} has too many pixels to address")]
    TooLarge { width: u32, height: u32 },
}

/// Size of a raster in pixels. Both dimensions are always non-zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResolution")]
pub struct Resolution {
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct RawResolution {
    width: u32,
    height: u32,
}

impl TryFrom<RawResolution> for Resolution {
    type Error = ResolutionError;

    fn try_from(raw: RawResolution) -> Result<Self, Self::Error> {
        Resolution::new(raw.width, raw.height)
    }
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, ResolutionError> {
        if width == 0 || height == 0 {
            return Err(ResolutionError::InvalidSize { width, height });
        }

        (width as usize)
            .checked_mul(height as usize)
            .ok_or(ResolutionError::TooLarge { width, height })?;

        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    /// Row-major index of `point`; callers check [`Self::contains_point`] first.
    #[must_use]
    pub fn index_of(&self, point: Point) -> usize {
        point.y as usize * self.width as usize + point.x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_new_valid() {
        let resolution = Resolution::new(640, 480).unwrap();

        assert_eq!(resolution.width(), 640);
        assert_eq!(resolution.height(), 480);
        assert_eq!(resolution.pixel_count(), 307_200);
    }

    #[test]
    fn test_resolution_dimensions_must_be_positive() {
        assert_eq!(
            Resolution::new(0, 10),
            Err(ResolutionError::InvalidSize { width: 0, height: 10 })
        );
        assert_eq!(
            Resolution::new(10, 0),
            Err(ResolutionError::InvalidSize { width: 10, height: 0 })
        );
    }

    #[test]
    fn test_single_pixel_is_allowed() {
        assert!(Resolution::new(1, 1).is_ok());
    }

    #[test]
    fn test_contains_point_and_index() {
        let resolution = Resolution::new(4, 3).unwrap();

        assert!(resolution.contains_point(Point { x: 3, y: 2 }));
        assert!(!resolution.contains_point(Point { x: 4, y: 0 }));
        assert!(!resolution.contains_point(Point { x: 0, y: 3 }));
        assert_eq!(resolution.index_of(Point { x: 1, y: 2 }), 9);
    }

    #[test]
    fn test_deserialize_rejects_zero_dimension() {
        let parsed: Result<Resolution, _> = serde_json::from_str(r#"{"width":0,"height":5}"#);
        assert!(parsed.is_err());

        let parsed: Resolution = serde_json::from_str(r#"{"width":8,"height":5}"#).unwrap();
        assert_eq!(parsed, Resolution::new(8, 5).unwrap());
    }
}
