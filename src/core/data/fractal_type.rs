//! What to compute: fractal family, exponent and formula variant.
//!
//! Tagged fields are sum types, so a value from an inactive branch cannot
//! survive a kind or exponent switch. The flat accessors still hand out a
//! neutral default for the inactive branch so callers never have to match
//! just to read a number.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::data::complex::Complex;
use crate::core::util::fuzzy_compare::fuzzy_eq;

/// Largest exponent, integral or real, the iteration accepts.
pub const MAX_EXPONENT: i32 = 64;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum FractalTypeError {
    #[error("integral exponent must be between 2 and {MAX_EXPONENT}, got {0}")]
    IntegralExponentOutOfRange(i32),
    #[error("real exponent must be greater than 1 and at most {MAX_EXPONENT}, got {0}")]
    InvalidRealExponent(f64),
    #[error("julia parameter must be finite, got {0:?}")]
    NonFiniteParameter(Complex),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fractal", rename_all = "snake_case")]
pub enum FractalKind {
    Mandelbrot,
    Julia { parameter: Complex },
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exponent {
    Integral(i32),
    Real(f64),
}

impl Exponent {
    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Exponent::Integral(exponent) => f64::from(exponent),
            Exponent::Real(exponent) => exponent,
        }
    }

    fn validate(&self) -> Result<(), FractalTypeError> {
        match *self {
            Exponent::Integral(exponent) if !(2..=MAX_EXPONENT).contains(&exponent) => {
                Err(FractalTypeError::IntegralExponentOutOfRange(exponent))
            }
            Exponent::Real(exponent)
                if !(exponent > 1.0 && exponent <= f64::from(MAX_EXPONENT)) =>
            {
                Err(FractalTypeError::InvalidRealExponent(exponent))
            }
            _ => Ok(()),
        }
    }

    /// Pulls the exponent into the accepted range where a nearest valid
    /// value exists. Real exponents at or below 1 and non-finite ones are
    /// left for `validate` to reject.
    #[must_use]
    pub fn clamped(&self) -> Self {
        match *self {
            Exponent::Integral(exponent) => Exponent::Integral(exponent.clamp(2, MAX_EXPONENT)),
            Exponent::Real(exponent) if exponent.is_finite() && exponent > 1.0 => {
                Exponent::Real(exponent.min(f64::from(MAX_EXPONENT)))
            }
            real => real,
        }
    }
}

impl PartialEq for Exponent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Exponent::Integral(a), Exponent::Integral(b)) => a == b,
            (Exponent::Real(a), Exponent::Real(b)) => fuzzy_eq(*a, *b),
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// `z ← z^e + c`
    #[default]
    Normal,
    /// `z ← conj(z)^e + c`
    Conjugate,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractalType {
    pub kind: FractalKind,
    pub exponent: Exponent,
    #[serde(default)]
    pub variant: Variant,
}

impl Default for FractalType {
    fn default() -> Self {
        Self::mandelbrot(Exponent::Integral(2))
    }
}

impl FractalType {
    #[must_use]
    pub fn mandelbrot(exponent: Exponent) -> Self {
        Self {
            kind: FractalKind::Mandelbrot,
            exponent,
            variant: Variant::Normal,
        }
    }

    #[must_use]
    pub fn julia(parameter: Complex, exponent: Exponent) -> Self {
        Self {
            kind: FractalKind::Julia { parameter },
            exponent,
            variant: Variant::Normal,
        }
    }

    #[must_use]
    pub fn with_variant(self, variant: Variant) -> Self {
        Self { variant, ..self }
    }

    /// The Julia type seeded at `point`, keeping exponent and variant.
    #[must_use]
    pub fn julia_at(&self, point: Complex) -> Self {
        Self {
            kind: FractalKind::Julia { parameter: point },
            ..*self
        }
    }

    #[must_use]
    pub fn is_julia(&self) -> bool {
        matches!(self.kind, FractalKind::Julia { .. })
    }

    /// Julia parameter, or the origin for Mandelbrot.
    #[must_use]
    pub fn julia_parameter(&self) -> Complex {
        match self.kind {
            FractalKind::Julia { parameter } => parameter,
            FractalKind::Mandelbrot => Complex::ZERO,
        }
    }

    /// Integral exponent, or `0` when the exponent is real.
    #[must_use]
    pub fn integral_exponent(&self) -> i32 {
        match self.exponent {
            Exponent::Integral(exponent) => exponent,
            Exponent::Real(_) => 0,
        }
    }

    /// Real exponent, or `0.0` when the exponent is integral.
    #[must_use]
    pub fn real_exponent(&self) -> f64 {
        match self.exponent {
            Exponent::Real(exponent) => exponent,
            Exponent::Integral(_) => 0.0,
        }
    }

    pub fn validate(&self) -> Result<(), FractalTypeError> {
        if let FractalKind::Julia { parameter } = self.kind {
            if !parameter.is_finite() {
                return Err(FractalTypeError::NonFiniteParameter(parameter));
            }
        }

        self.exponent.validate()
    }
}
