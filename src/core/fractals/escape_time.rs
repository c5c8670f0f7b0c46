//! Continuous escape-time iteration for the Mandelbrot/Julia family.
//!
//! The map is `z ← z^e + c` (or `conj(z)^e + c` for the conjugate variant).
//! Mandelbrot seeds `z0 = 0, c = point`; Julia seeds `z0 = point` and uses the
//! fixed Julia parameter as `c`. An escaped orbit is smoothed into a
//! fractional index `n − ln(ln|z| / ln R) / ln e` so consumers can map it to
//! a gradient without banding.

use thiserror::Error;

use crate::core::data::complex::Complex;
use crate::core::data::fractal_type::{
    Exponent, FractalKind, FractalType, FractalTypeError, Variant,
};
use crate::core::data::raster_buffer::INTERIOR;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EscapeTimeError {
    #[error("maximum iterations must be greater than zero")]
    ZeroMaxIterations,
    #[error("bailout radius must be finite and positive, got {0}")]
    InvalidBailout(f64),
    #[error(transparent)]
    FractalType(#[from] FractalTypeError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Power {
    Integral(u32),
    Real(f64),
}

/// Validated iteration setup for one parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeTime {
    kind: FractalKind,
    power: Power,
    conjugate: bool,
    max_iterations: u32,
    bailout_squared: f64,
    ln_bailout: f64,
    ln_exponent: f64,
}

impl EscapeTime {
    pub fn new(
        fractal: &FractalType,
        max_iterations: u32,
        bailout_radius: f64,
    ) -> Result<Self, EscapeTimeError> {
        fractal.validate()?;

        if max_iterations == 0 {
            return Err(EscapeTimeError::ZeroMaxIterations);
        }
        if !bailout_radius.is_finite() || bailout_radius <= 0.0 {
            return Err(EscapeTimeError::InvalidBailout(bailout_radius));
        }

        let exponent = fractal.exponent.value();
        let power = match fractal.exponent {
            Exponent::Integral(exponent) => Power::Integral(exponent.unsigned_abs()),
            Exponent::Real(exponent) => Power::Real(exponent),
        };

        // below 2^(1/(e-1)) an orbit can leave the disc and still come back
        let bailout = bailout_radius.max(escape_radius(exponent));

        Ok(Self {
            kind: fractal.kind,
            power,
            conjugate: fractal.variant == Variant::Conjugate,
            max_iterations,
            bailout_squared: bailout * bailout,
            ln_bailout: bailout.ln(),
            ln_exponent: exponent.ln(),
        })
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[must_use]
    pub fn bailout_radius(&self) -> f64 {
        self.bailout_squared.sqrt()
    }

    /// Continuous escape index of `point`, or [`INTERIOR`] when the orbit
    /// stays bounded for `max_iterations` steps.
    ///
    /// Escaped values lie in `[0, max_iterations]`.
    #[must_use]
    pub fn escape_index(&self, point: Complex) -> f64 {
        let (mut z, c) = match self.kind {
            FractalKind::Mandelbrot => (Complex::ZERO, point),
            FractalKind::Julia { parameter } => (point, parameter),
        };

        if self.has_escaped(z) {
            return self.smooth(0, z);
        }

        for iteration in 1..=self.max_iterations {
            z = self.step(z) + c;

            if self.has_escaped(z) {
                return self.smooth(iteration, z);
            }
        }

        INTERIOR
    }

    #[inline]
    fn step(&self, z: Complex) -> Complex {
        let z = if self.conjugate { z.conjugate() } else { z };

        match self.power {
            Power::Integral(2) => z * z,
            Power::Integral(exponent) => z.powi(exponent),
            Power::Real(exponent) => z.powf(exponent),
        }
    }

    // NaN fails every comparison, so a non-finite orbit counts as escaped
    #[inline]
    fn has_escaped(&self, z: Complex) -> bool {
        !(z.magnitude_squared() <= self.bailout_squared)
    }

    fn smooth(&self, iteration: u32, z: Complex) -> f64 {
        let n = f64::from(iteration);
        let ln_modulus = 0.5 * z.magnitude_squared().ln();
        let index = n - (ln_modulus / self.ln_bailout).ln() / self.ln_exponent;

        if index.is_finite() {
            index.clamp(0.0, n)
        } else {
            n
        }
    }
}

/// Smallest radius outside of which every orbit of `z^e + c` with `|c|`
/// inside the radius diverges.
#[must_use]
pub fn escape_radius(exponent: f64) -> f64 {
    2f64.powf(1.0 / (exponent - 1.0)).max(2.0)
}
