//! Engine configuration: JSON file, then command-line overrides, then
//! clamping.

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::controllers::interactive::Priority;
use crate::core::data::complex::Complex;
use crate::core::data::fractal_type::FractalType;
use crate::core::data::generator_settings::GeneratorSettings;
use crate::core::data::position::Position;
use crate::core::data::resolution::{Resolution, ResolutionError};

pub const MAX_DIMENSION: u32 = 16_384;
pub const MAX_WORKER_THREADS: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Initial state of one engine run. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `None` sizes the pool to the available parallelism.
    pub worker_threads: Option<NonZeroUsize>,
    pub width: u32,
    pub height: u32,
    pub fractal: FractalType,
    pub position: Position,
    pub settings: GeneratorSettings,
    pub preview: bool,
    pub priority: Priority,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            width: 640,
            height: 480,
            fractal: FractalType::default(),
            position: Position::new(Complex::new(-0.5, 0.0), -0.45, 0.0),
            settings: GeneratorSettings::default(),
            preview: false,
            priority: Priority::INTERACTIVE,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Copy with every value forced into a range the engine accepts.
    /// Values that cannot be repaired fall back to their defaults.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();

        let fractal = FractalType {
            exponent: self.fractal.exponent.clamped(),
            ..self.fractal
        };
        let fractal = match fractal.validate() {
            Ok(()) => fractal,
            Err(error) => {
                warn!(%error, "invalid fractal type in config, using default");
                defaults.fractal
            }
        };

        let position = if self.position.is_finite() {
            self.position
        } else {
            warn!(position = ?self.position, "non-finite position in config, using default");
            defaults.position
        };

        Self {
            worker_threads: self.worker_threads.map(|threads| {
                NonZeroUsize::new(threads.get().min(MAX_WORKER_THREADS)).unwrap_or(NonZeroUsize::MIN)
            }),
            width: self.width.clamp(1, MAX_DIMENSION),
            height: self.height.clamp(1, MAX_DIMENSION),
            fractal,
            position,
            settings: self.settings.clamped(),
            preview: self.preview,
            priority: self.priority,
        }
    }

    pub fn resolution(&self) -> Result<Resolution, ResolutionError> {
        Resolution::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::fractal_type::{Exponent, MAX_EXPONENT};
    use std::env;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_json_overrides_fields() {
        let json = r#"{
            "width": 32,
            "worker_threads": 3,
            "fractal": {
                "kind": { "fractal": "julia", "parameter": { "real": -0.4, "imag": 0.6 } },
                "exponent": { "integral": 3 }
            },
            "settings": { "calculation_depth": 2.0 },
            "priority": 2
        }"#;

        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.width, 32);
        assert_eq!(config.height, 480);
        assert_eq!(config.worker_threads, NonZeroUsize::new(3));
        assert_eq!(
            config.fractal,
            FractalType::julia(Complex::new(-0.4, 0.6), Exponent::Integral(3))
        );
        assert_eq!(config.settings, GeneratorSettings::new(2.0, 0.5));
        assert_eq!(config.priority, Priority(2));
    }

    #[test]
    fn test_zero_worker_threads_is_rejected() {
        let result: Result<EngineConfig, _> = serde_json::from_str(r#"{ "worker_threads": 0 }"#);

        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_clamps_values() {
        let config = EngineConfig {
            worker_threads: NonZeroUsize::new(10_000),
            width: 0,
            height: 100_000,
            fractal: FractalType::mandelbrot(Exponent::Real(0.5)),
            position: Position::new(Complex::new(f64::INFINITY, 0.0), 0.0, 0.0),
            settings: GeneratorSettings::new(9.0, -1.0),
            preview: true,
            priority: Priority(3),
        };

        let sanitized = config.sanitized();

        assert_eq!(sanitized.worker_threads, NonZeroUsize::new(MAX_WORKER_THREADS));
        assert_eq!(sanitized.width, 1);
        assert_eq!(sanitized.height, MAX_DIMENSION);
        assert_eq!(sanitized.fractal, FractalType::default());
        assert_eq!(sanitized.position, EngineConfig::default().position);
        assert_eq!(sanitized.settings, GeneratorSettings::new(4.0, 0.0));
        assert!(sanitized.preview);
        assert_eq!(sanitized.priority, Priority(3));
        assert!(sanitized.resolution().is_ok());
    }

    #[test]
    fn test_sanitized_clamps_oversized_exponent() {
        let config = EngineConfig {
            fractal: FractalType::julia(Complex::new(-0.4, 0.6), Exponent::Integral(20_000_000)),
            ..EngineConfig::default()
        };

        let sanitized = config.sanitized();

        assert_eq!(
            sanitized.fractal,
            FractalType::julia(Complex::new(-0.4, 0.6), Exponent::Integral(MAX_EXPONENT))
        );
    }

    #[test]
    fn test_load_reports_missing_file() {
        let path = env::temp_dir().join("fractal_engine_missing_config.json");

        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_reads_json_file() {
        let path = env::temp_dir().join(format!(
            "fractal_engine_config_{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"{ "width": 8, "height": 6, "preview": true }"#).unwrap();

        let config = EngineConfig::load(&path);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.resolution().unwrap(), Resolution::new(8, 6).unwrap());
        assert!(config.preview);
    }

    #[test]
    fn test_load_reports_parse_error() {
        let path = env::temp_dir().join(format!(
            "fractal_engine_bad_config_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();

        let result = EngineConfig::load(&path);
        fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
