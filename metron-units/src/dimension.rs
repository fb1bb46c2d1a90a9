//! Dimensional analysis types
//!
//! Each physical quantity has dimensions represented as rational exponents of
//! the 7 SI base quantities [length, mass, time, current, temperature, amount,
//! luminosity], plus one extra axis per unregistered symbol.

use std::collections::BTreeMap;
use std::fmt;
use num_rational::Rational32;
use num_traits::{CheckedAdd, CheckedMul, One, Zero};
use serde::{Serialize, Deserialize};

/// Exponent of a dimension axis or of a term in a unit expression
pub type Exponent = Rational32;

/// The 7 SI base quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseDimension {
    Length,
    Mass,
    Time,
    Current,
    Temperature,
    Amount,
    Luminosity,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; 7] = [
        BaseDimension::Length,
        BaseDimension::Mass,
        BaseDimension::Time,
        BaseDimension::Current,
        BaseDimension::Temperature,
        BaseDimension::Amount,
        BaseDimension::Luminosity,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Dimension symbol used in dimension formulas (L, M, T, ...)
    pub fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Length => "L",
            BaseDimension::Mass => "M",
            BaseDimension::Time => "T",
            BaseDimension::Current => "I",
            BaseDimension::Temperature => "Θ",
            BaseDimension::Amount => "N",
            BaseDimension::Luminosity => "J",
        }
    }

    /// Symbol of the coherent SI base unit for this quantity
    pub fn si_unit(self) -> &'static str {
        match self {
            BaseDimension::Length => "m",
            BaseDimension::Mass => "kg",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::Amount => "mol",
            BaseDimension::Luminosity => "cd",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseDimension::Length => "length",
            BaseDimension::Mass => "mass",
            BaseDimension::Time => "time",
            BaseDimension::Current => "current",
            BaseDimension::Temperature => "temperature",
            BaseDimension::Amount => "amount",
            BaseDimension::Luminosity => "luminosity",
        }
    }
}

/// Dimensions of a physical quantity.
///
/// Zero exponents are never stored on unknown axes, so the derived
/// equality and hashing are exact axis-by-axis comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dimension {
    base: [Exponent; 7],
    unknown: BTreeMap<String, Exponent>,
}

impl Dimension {
    /// Dimensionless quantity (all exponents zero)
    pub fn dimensionless() -> Self {
        Dimension {
            base: [Exponent::zero(); 7],
            unknown: BTreeMap::new(),
        }
    }

    /// A single base quantity with exponent 1
    pub fn base(kind: BaseDimension) -> Self {
        let mut dim = Self::dimensionless();
        dim.base[kind.index()] = Exponent::one();
        dim
    }

    /// Create a dimension from integer base exponents
    /// [length, mass, time, current, temperature, amount, luminosity]
    pub fn from_exponents(exponents: [i32; 7]) -> Self {
        let mut dim = Self::dimensionless();
        for (slot, exp) in dim.base.iter_mut().zip(exponents) {
            *slot = Exponent::from_integer(exp);
        }
        dim
    }

    /// The private axis of an unregistered symbol, raised to `exponent`
    pub fn unknown(literal: &str, exponent: Exponent) -> Self {
        let mut dim = Self::dimensionless();
        if !exponent.is_zero() {
            dim.unknown.insert(literal.to_string(), exponent);
        }
        dim
    }

    pub fn exponent(&self, kind: BaseDimension) -> Exponent {
        self.base[kind.index()]
    }

    pub fn base_exponents(&self) -> &[Exponent; 7] {
        &self.base
    }

    pub fn unknown_exponent(&self, literal: &str) -> Exponent {
        self.unknown.get(literal).copied().unwrap_or_else(Exponent::zero)
    }

    /// Unknown axes in literal order
    pub fn unknown_axes(&self) -> impl Iterator<Item = (&str, Exponent)> + '_ {
        self.unknown.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check if this is a dimensionless quantity
    pub fn is_dimensionless(&self) -> bool {
        self.base.iter().all(|e| e.is_zero()) && self.unknown.is_empty()
    }

    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_empty()
    }

    /// True when every exponent is an integer
    pub fn is_integral(&self) -> bool {
        self.base.iter().chain(self.unknown.values()).all(|e| e.is_integer())
    }

    /// Only the SI axes
    pub fn base_part(&self) -> Dimension {
        Dimension { base: self.base, unknown: BTreeMap::new() }
    }

    /// Only the unknown-symbol axes
    pub fn unknown_part(&self) -> Dimension {
        Dimension { base: [Exponent::zero(); 7], unknown: self.unknown.clone() }
    }

    /// Multiply dimensions (add exponents); `None` if an exponent overflows
    pub fn multiply(&self, other: &Dimension) -> Option<Dimension> {
        let mut result = self.clone();
        for (slot, exp) in result.base.iter_mut().zip(other.base.iter()) {
            *slot = slot.checked_add(exp)?;
        }
        for (literal, exp) in &other.unknown {
            let sum = result.unknown_exponent(literal).checked_add(exp)?;
            if sum.is_zero() {
                result.unknown.remove(literal);
            } else {
                result.unknown.insert(literal.clone(), sum);
            }
        }
        Some(result)
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Option<Dimension> {
        self.multiply(&other.invert()?)
    }

    /// Raise to a rational power (multiply exponents); `None` on overflow
    pub fn power(&self, exp: Exponent) -> Option<Dimension> {
        if exp.is_zero() {
            return Some(Self::dimensionless());
        }
        let mut result = self.clone();
        for slot in result.base.iter_mut() {
            *slot = slot.checked_mul(&exp)?;
        }
        for value in result.unknown.values_mut() {
            *value = value.checked_mul(&exp)?;
        }
        Some(result)
    }

    /// Invert dimensions (negate exponents)
    pub fn invert(&self) -> Option<Dimension> {
        self.power(-Exponent::one())
    }

    /// Get the dimension name if it matches a common dimension
    pub fn name(&self) -> Option<&'static str> {
        if self.has_unknown() || !self.is_integral() {
            return None;
        }
        let mut exps = [0i32; 7];
        for (slot, exp) in exps.iter_mut().zip(self.base.iter()) {
            *slot = exp.to_integer();
        }
        match exps {
            [0, 0, 0, 0, 0, 0, 0] => Some("dimensionless"),
            [1, 0, 0, 0, 0, 0, 0] => Some("length"),
            [0, 1, 0, 0, 0, 0, 0] => Some("mass"),
            [0, 0, 1, 0, 0, 0, 0] => Some("time"),
            [0, 0, 0, 1, 0, 0, 0] => Some("current"),
            [0, 0, 0, 0, 1, 0, 0] => Some("temperature"),
            [0, 0, 0, 0, 0, 1, 0] => Some("amount"),
            [0, 0, 0, 0, 0, 0, 1] => Some("luminosity"),
            [1, 0, -1, 0, 0, 0, 0] => Some("velocity"),
            [1, 0, -2, 0, 0, 0, 0] => Some("acceleration"),
            [1, 1, -2, 0, 0, 0, 0] => Some("force"),
            [2, 1, -2, 0, 0, 0, 0] => Some("energy"),
            [2, 1, -3, 0, 0, 0, 0] => Some("power"),
            [-1, 1, -2, 0, 0, 0, 0] => Some("pressure"),
            [2, 0, 0, 0, 0, 0, 0] => Some("area"),
            [3, 0, 0, 0, 0, 0, 0] => Some("volume"),
            [0, 0, -1, 0, 0, 0, 0] => Some("frequency"),
            [0, 0, 1, 1, 0, 0, 0] => Some("charge"),
            [2, 1, -3, -1, 0, 0, 0] => Some("voltage"),
            [2, 1, -3, -2, 0, 0, 0] => Some("resistance"),
            [0, 1, -2, -1, 0, 0, 0] => Some("magnetic flux density"),
            [-3, 1, 0, 0, 0, 0, 0] => Some("density"),
            _ => None,
        }
    }
}

/// Render an exponent suffix: nothing for 1, `^n` or `^p/q` otherwise
pub(crate) fn exponent_suffix(exp: Exponent) -> String {
    if exp.is_one() {
        String::new()
    } else {
        format!("^{}", exp)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        for kind in BaseDimension::ALL {
            let exp = self.base[kind.index()];
            if !exp.is_zero() {
                parts.push(format!("{}{}", kind.symbol(), exponent_suffix(exp)));
            }
        }
        for (literal, exp) in &self.unknown {
            parts.push(format!("[{}]{}", literal, exponent_suffix(*exp)));
        }

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::dimensionless()
    }
}
