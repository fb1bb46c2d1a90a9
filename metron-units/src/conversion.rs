//! Value transforms between a unit and the coherent SI base
//!
//! A conversion maps a value expressed in some unit to the same quantity in
//! coherent SI base units (`to_base`) and back (`from_base`).

use std::fmt;
use std::sync::Arc;
use crate::dimension::Exponent;

/// An invertible, monotonic transform to and from base units.
///
/// Implementations must satisfy `from_base(to_base(x)) ≈ x` on their domain.
pub trait MonotonicScale: fmt::Debug + Send + Sync {
    fn to_base(&self, value: f64) -> f64;
    fn from_base(&self, value: f64) -> f64;
}

/// Logarithmic level relative to a reference value.
///
/// `base_value = reference * radix^(level / multiplier)`. A power level in
/// bels uses radix 10 and multiplier 1; a field (root-power) level in bels
/// uses multiplier 2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    pub reference: f64,
    pub radix: f64,
    pub multiplier: f64,
}

impl LogScale {
    /// Bel of a power quantity relative to `reference`
    pub fn power_bel(reference: f64) -> Self {
        LogScale { reference, radix: 10.0, multiplier: 1.0 }
    }

    /// Bel of a root-power (field) quantity relative to `reference`
    pub fn field_bel(reference: f64) -> Self {
        LogScale { reference, radix: 10.0, multiplier: 2.0 }
    }
}

impl MonotonicScale for LogScale {
    fn to_base(&self, value: f64) -> f64 {
        self.reference * self.radix.powf(value / self.multiplier)
    }

    fn from_base(&self, value: f64) -> f64 {
        // Zero and negative inputs yield -inf / NaN, as log does
        self.multiplier * (value / self.reference).log(self.radix)
    }
}

/// How a unit (or a whole expression) maps onto base units
#[derive(Debug, Clone)]
pub enum Conversion {
    /// `base = value * factor`
    Linear(f64),
    /// `base = value * factor + offset`
    Affine { factor: f64, offset: f64 },
    /// `base = scale.to_base(value * input) * output`
    General {
        scale: Arc<dyn MonotonicScale>,
        input: f64,
        output: f64,
    },
}

/// Kind of a conversion, without its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    Linear,
    Affine,
    General,
}

impl Conversion {
    pub fn linear(factor: f64) -> Self {
        Conversion::Linear(factor)
    }

    pub fn affine(factor: f64, offset: f64) -> Self {
        Conversion::Affine { factor, offset }
    }

    pub fn general(scale: impl MonotonicScale + 'static) -> Self {
        Conversion::General { scale: Arc::new(scale), input: 1.0, output: 1.0 }
    }

    pub fn identity() -> Self {
        Conversion::Linear(1.0)
    }

    pub fn kind(&self) -> ConversionKind {
        match self {
            Conversion::Linear(_) => ConversionKind::Linear,
            Conversion::Affine { .. } => ConversionKind::Affine,
            Conversion::General { .. } => ConversionKind::General,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Conversion::Linear(_))
    }

    /// The single multiplicative factor, if this conversion has one
    pub fn factor(&self) -> Option<f64> {
        match self {
            Conversion::Linear(f) => Some(*f),
            _ => None,
        }
    }

    /// The additive offset of an affine conversion
    pub fn offset(&self) -> Option<f64> {
        match self {
            Conversion::Affine { offset, .. } => Some(*offset),
            _ => None,
        }
    }

    pub fn to_base(&self, value: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => value * factor,
            Conversion::Affine { factor, offset } => value * factor + offset,
            Conversion::General { scale, input, output } => scale.to_base(value * input) * output,
        }
    }

    pub fn from_base(&self, value: f64) -> f64 {
        match self {
            Conversion::Linear(factor) => value / factor,
            Conversion::Affine { factor, offset } => (value - offset) / factor,
            Conversion::General { scale, input, output } => scale.from_base(value / output) / input,
        }
    }

    /// Scale the result in base units by `k` (unit defined as k × another unit)
    pub fn scaled(&self, k: f64) -> Conversion {
        match self {
            Conversion::Linear(factor) => Conversion::Linear(factor * k),
            Conversion::Affine { factor, offset } => Conversion::Affine { factor: factor * k, offset: offset * k },
            Conversion::General { scale, input, output } => Conversion::General {
                scale: Arc::clone(scale),
                input: *input,
                output: output * k,
            },
        }
    }

    /// Scale the input value by a prefix factor. Offsets are left untouched.
    pub fn prefixed(&self, p: f64) -> Conversion {
        match self {
            Conversion::Linear(factor) => Conversion::Linear(factor * p),
            Conversion::Affine { factor, offset } => Conversion::Affine { factor: factor * p, offset: *offset },
            Conversion::General { scale, input, output } => Conversion::General {
                scale: Arc::clone(scale),
                input: input * p,
                output: *output,
            },
        }
    }
}

/// `base^exp` for a rational exponent, exact `powi` for integers
pub(crate) fn pow_exponent(base: f64, exp: Exponent) -> f64 {
    if exp.is_integer() {
        base.powi(exp.to_integer())
    } else {
        base.powf(*exp.numer() as f64 / *exp.denom() as f64)
    }
}

/// Purely relative comparison; zero only equals zero
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= tolerance * scale
}
