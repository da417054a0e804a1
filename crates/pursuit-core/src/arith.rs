//! Arithmetic backends for the pursuit recurrence.
//!
//! The engine is generic over [`ArithBackend`] so the same recurrence can run
//! on native `f64` (fast, drifts) or on MPFR-backed decimals (slow, stable).
//! Precision is carried by the backend value itself rather than by any
//! process-global setting, so concurrent runs at different precisions never
//! interfere.

use std::fmt;

use rug::Float;
use rug::float::Constant;

use crate::EngineError;

/// Arithmetic capability required by the pursuit engine.
///
/// Every operation the recurrence performs goes through this trait; the
/// backend decides representation, precision, and rounding. Implementations
/// must be deterministic so identical runs reproduce digit-identical
/// histories.
pub trait ArithBackend {
    /// Scalar representation used by this backend.
    type Value: Clone + PartialOrd + PartialEq + fmt::Debug + Send;

    /// Lift an `f64` into the backend representation (exact for both
    /// provided backends: every `f64` is representable).
    fn lift(&self, value: f64) -> Self::Value;

    /// Lower a backend value to the nearest `f64`, for display, progress
    /// reporting, and plot-ready views.
    fn lower(&self, value: &Self::Value) -> f64;

    /// The constant π at the backend's working precision.
    fn pi(&self) -> Self::Value;

    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn div(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn abs(&self, value: &Self::Value) -> Self::Value;
    fn sqrt(&self, value: &Self::Value) -> Self::Value;
    /// `sqrt(a² + b²)` without intermediate overflow.
    fn hypot(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn asin(&self, value: &Self::Value) -> Self::Value;
    fn sin(&self, value: &Self::Value) -> Self::Value;
    fn cos(&self, value: &Self::Value) -> Self::Value;
    fn ceil(&self, value: &Self::Value) -> Self::Value;

    /// Floor-style remainder: `a - floor(a / modulus) * modulus`.
    ///
    /// The result is non-negative for a positive modulus even when `a` is
    /// negative, unlike the sign-of-dividend `%` operator. Heading wrap
    /// depends on this.
    fn floor_rem(&self, a: &Self::Value, modulus: &Self::Value) -> Self::Value;
}

/// Normalize a heading into `[-π, π)`.
///
/// Keeping headings wrapped keeps the arguments of `sin`/`cos` small, which
/// matters for trigonometric accuracy over runs of millions of cycles.
pub fn wrap_heading<B: ArithBackend>(backend: &B, angle: &B::Value) -> B::Value {
    let pi = backend.pi();
    let two_pi = backend.add(&pi, &pi);
    let shifted = backend.add(angle, &pi);
    backend.sub(&backend.floor_rem(&shifted, &two_pi), &pi)
}

/// Native double-precision backend.
///
/// Expected to drift away from [`DecimalBackend`] after enough cycles; that
/// divergence is the measurement target of the precision comparison driver,
/// not a defect of this backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Float64Backend;

impl ArithBackend for Float64Backend {
    type Value = f64;

    fn lift(&self, value: f64) -> f64 {
        value
    }

    fn lower(&self, value: &f64) -> f64 {
        *value
    }

    fn pi(&self) -> f64 {
        std::f64::consts::PI
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn sub(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn div(&self, a: &f64, b: &f64) -> f64 {
        a / b
    }

    fn abs(&self, value: &f64) -> f64 {
        value.abs()
    }

    fn sqrt(&self, value: &f64) -> f64 {
        value.sqrt()
    }

    fn hypot(&self, a: &f64, b: &f64) -> f64 {
        a.hypot(*b)
    }

    fn asin(&self, value: &f64) -> f64 {
        value.asin()
    }

    fn sin(&self, value: &f64) -> f64 {
        value.sin()
    }

    fn cos(&self, value: &f64) -> f64 {
        value.cos()
    }

    fn ceil(&self, value: &f64) -> f64 {
        value.ceil()
    }

    fn floor_rem(&self, a: &f64, modulus: &f64) -> f64 {
        a.rem_euclid(*modulus)
    }
}

/// Extra binary digits kept beyond the requested decimal precision so that
/// rounding in intermediate steps does not eat into the advertised digits.
const GUARD_BITS: u32 = 32;

/// Arbitrary-precision backend built on MPFR floats.
///
/// Precision is requested in decimal digits and converted to binary digits
/// internally. Each backend value owns its scope; nothing global is mutated,
/// so runs at different precisions can execute in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalBackend {
    digits: u32,
    precision_bits: u32,
}

impl DecimalBackend {
    /// Default decimal-digit precision, enough to keep distance and heading
    /// sequences meaningful over millions of cycles.
    pub const DEFAULT_DIGITS: u32 = 80;

    /// Build a backend carrying `digits` decimal digits of precision.
    pub fn new(digits: u32) -> Result<Self, EngineError> {
        if digits == 0 {
            return Err(EngineError::InvalidConfig(
                "precision digits must be non-zero",
            ));
        }
        let precision_bits =
            (f64::from(digits) * std::f64::consts::LOG2_10).ceil() as u32 + GUARD_BITS;
        Ok(Self {
            digits,
            precision_bits,
        })
    }

    /// Configured precision in decimal digits.
    #[must_use]
    pub const fn digits(&self) -> u32 {
        self.digits
    }

    /// Working precision in binary digits (includes guard bits).
    #[must_use]
    pub const fn precision_bits(&self) -> u32 {
        self.precision_bits
    }
}

impl Default for DecimalBackend {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIGITS).unwrap_or(Self {
            digits: Self::DEFAULT_DIGITS,
            precision_bits: 298,
        })
    }
}

impl ArithBackend for DecimalBackend {
    type Value = Float;

    fn lift(&self, value: f64) -> Float {
        Float::with_val(self.precision_bits, value)
    }

    fn lower(&self, value: &Float) -> f64 {
        value.to_f64()
    }

    fn pi(&self) -> Float {
        Float::with_val(self.precision_bits, Constant::Pi)
    }

    fn add(&self, a: &Float, b: &Float) -> Float {
        Float::with_val(self.precision_bits, a + b)
    }

    fn sub(&self, a: &Float, b: &Float) -> Float {
        Float::with_val(self.precision_bits, a - b)
    }

    fn mul(&self, a: &Float, b: &Float) -> Float {
        Float::with_val(self.precision_bits, a * b)
    }

    fn div(&self, a: &Float, b: &Float) -> Float {
        Float::with_val(self.precision_bits, a / b)
    }

    fn abs(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.abs_ref())
    }

    fn sqrt(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.sqrt_ref())
    }

    fn hypot(&self, a: &Float, b: &Float) -> Float {
        Float::with_val(self.precision_bits, a.hypot_ref(b))
    }

    fn asin(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.asin_ref())
    }

    fn sin(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.sin_ref())
    }

    fn cos(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.cos_ref())
    }

    fn ceil(&self, value: &Float) -> Float {
        Float::with_val(self.precision_bits, value.ceil_ref())
    }

    fn floor_rem(&self, a: &Float, modulus: &Float) -> Float {
        let mut quotient = Float::with_val(self.precision_bits, a / modulus);
        quotient.floor_mut();
        let scaled = Float::with_val(self.precision_bits, &quotient * modulus);
        let mut remainder = Float::with_val(self.precision_bits, a - &scaled);
        if remainder.is_sign_negative() && !remainder.is_zero() {
            remainder += modulus;
        }
        remainder
    }
}
