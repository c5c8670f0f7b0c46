use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

// implement Complex instead of using the num-complex trait for learning
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    pub real: f64,
    pub imag: f64,
}

impl Complex {
    pub const ZERO: Self = Self { real: 0.0, imag: 0.0 };

    #[must_use]
    pub const fn new(real: f64, imag: f64) -> Self {
        Self { real, imag }
    }

    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.real * self.real + self.imag * self.imag
    }

    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.real.hypot(self.imag)
    }

    #[must_use]
    pub fn argument(&self) -> f64 {
        self.imag.atan2(self.real)
    }

    #[must_use]
    pub fn conjugate(self) -> Self {
        Self {
            real: self.real,
            imag: -self.imag,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.real.is_finite() && self.imag.is_finite()
    }

    /// Raises to an integer power by square-and-multiply. `z^0` is one.
    #[must_use]
    pub fn powi(self, exponent: u32) -> Self {
        let mut base = self;
        let mut remaining = exponent;
        let mut result: Option<Self> = None;

        while remaining > 0 {
            if remaining & 1 == 1 {
                result = Some(match result {
                    Some(result) => result * base,
                    None => base,
                });
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base * base;
            }
        }

        result.unwrap_or(Self::new(1.0, 0.0))
    }

    /// Raises to a real power through the polar form `r^e·(cos eθ + i·sin eθ)`.
    #[must_use]
    pub fn powf(self, exponent: f64) -> Self {
        let modulus = self.magnitude().powf(exponent);
        let angle = self.argument() * exponent;
        let (sin, cos) = angle.sin_cos();

        Self {
            real: modulus * cos,
            imag: modulus * sin,
        }
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            real: self.real + other.real,
            imag: self.imag + other.imag,
        }
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            real: self.real - other.real,
            imag: self.imag - other.imag,
        }
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Self {
            real: self.real * other.real - self.imag * other.imag,
            imag: self.real * other.imag + self.imag * other.real,
        }
    }
}
