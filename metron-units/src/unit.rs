//! Unit and prefix definitions
//!
//! `UnitDef` and `PrefixDef` are the declarative records catalogs are made
//! of. The registry resolves every `UnitDef` into a `Unit`, whose conversion
//! and dimension are expressed against the coherent SI base units.

use std::fmt;
use crate::{Conversion, Dimension};
use crate::conversion::{LogScale, MonotonicScale};
use crate::dimension::BaseDimension;

/// Family a prefix belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    /// Decimal prefixes (k, M, m, μ, ...)
    Si,
    /// Binary prefixes (Ki, Mi, ...)
    Binary,
}

/// Which prefix families a unit accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefixes {
    None,
    Si,
    Binary,
    SiAndBinary,
}

impl Prefixes {
    pub fn accepts(self, kind: PrefixKind) -> bool {
        match (self, kind) {
            (Prefixes::None, _) => false,
            (Prefixes::Si, PrefixKind::Si) => true,
            (Prefixes::Binary, PrefixKind::Binary) => true,
            (Prefixes::SiAndBinary, _) => true,
            _ => false,
        }
    }
}

/// What a unit is measured against
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// A multiple of one SI base quantity
    Base(BaseDimension),
    /// A pure number
    Dimensionless,
    /// A product of powers of other registered units, e.g. `"kg m s^-2"`
    Expression(String),
}

/// Declarative unit record, as contributed by a catalog
#[derive(Debug, Clone)]
pub struct UnitDef {
    /// The first symbol is canonical, the rest are aliases
    pub symbols: Vec<String>,
    pub name: String,
    pub prefixes: Prefixes,
    /// Conversion to whatever `definition` denotes
    pub conversion: Conversion,
    pub definition: Definition,
}

impl UnitDef {
    fn make(symbols: &[&str], name: &str, conversion: Conversion, definition: Definition) -> Self {
        UnitDef {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
            prefixes: Prefixes::None,
            conversion,
            definition,
        }
    }

    /// A base quantity unit, `factor` times the SI base unit
    pub fn base(symbols: &[&str], name: &str, kind: BaseDimension, factor: f64) -> Self {
        Self::make(symbols, name, Conversion::linear(factor), Definition::Base(kind))
    }

    /// A unit equal to the given expression (`N` = `kg m s^-2`)
    pub fn derived(symbols: &[&str], name: &str, expression: &str) -> Self {
        Self::scaled(symbols, name, 1.0, expression)
    }

    /// A unit equal to `factor` times the given expression (`ft` = 0.3048 `m`)
    pub fn scaled(symbols: &[&str], name: &str, factor: f64, expression: &str) -> Self {
        Self::make(symbols, name, Conversion::linear(factor),
            Definition::Expression(expression.to_string()))
    }

    /// `value * factor + offset` of the given expression (temperature scales)
    pub fn affine(symbols: &[&str], name: &str, factor: f64, offset: f64, expression: &str) -> Self {
        Self::make(symbols, name, Conversion::affine(factor, offset),
            Definition::Expression(expression.to_string()))
    }

    /// An arbitrary monotonic scale over the given expression
    pub fn general(symbols: &[&str], name: &str, scale: impl MonotonicScale + 'static, expression: &str) -> Self {
        Self::make(symbols, name, Conversion::general(scale),
            Definition::Expression(expression.to_string()))
    }

    /// A logarithmic level unit, see `LogScale`
    pub fn level(symbols: &[&str], name: &str, scale: LogScale, expression: &str) -> Self {
        Self::general(symbols, name, scale, expression)
    }

    /// A pure number with the given factor (`%` = 0.01)
    pub fn dimensionless(symbols: &[&str], name: &str, factor: f64) -> Self {
        Self::make(symbols, name, Conversion::linear(factor), Definition::Dimensionless)
    }

    /// Builder: set the accepted prefix families
    pub fn with_prefixes(mut self, prefixes: Prefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Builder: accept SI prefixes
    pub fn si_prefixed(self) -> Self {
        self.with_prefixes(Prefixes::Si)
    }

    /// Canonical symbol
    pub fn symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or("")
    }
}

/// Declarative prefix record
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixDef {
    pub symbols: Vec<String>,
    pub name: String,
    pub factor: f64,
    pub kind: PrefixKind,
}

impl PrefixDef {
    pub fn si(symbols: &[&str], name: &str, factor: f64) -> Self {
        PrefixDef {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            name: name.to_string(),
            factor,
            kind: PrefixKind::Si,
        }
    }

    pub fn binary(symbols: &[&str], name: &str, factor: f64) -> Self {
        PrefixDef {
            kind: PrefixKind::Binary,
            ..Self::si(symbols, name, factor)
        }
    }
}

/// A registered unit, resolved against the SI base units
#[derive(Debug, Clone)]
pub struct Unit {
    pub symbols: Vec<String>,
    pub name: String,
    pub prefixes: Prefixes,
    /// Conversion to coherent SI base units
    pub conversion: Conversion,
    /// Base-unit decomposition
    pub dimension: Dimension,
    /// Name of the catalog that contributed this unit
    pub catalog: String,
}

impl Unit {
    /// Canonical symbol
    pub fn symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or("")
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }

    pub fn accepts(&self, kind: PrefixKind) -> bool {
        self.prefixes.accepts(kind)
    }

    pub fn is_linear(&self) -> bool {
        self.conversion.is_linear()
    }

    /// Check if two units are dimensionally compatible (can be converted)
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A registered prefix
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub symbols: Vec<String>,
    pub name: String,
    pub factor: f64,
    pub kind: PrefixKind,
}

impl Prefix {
    pub fn symbol(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or("")
    }
}

impl From<PrefixDef> for Prefix {
    fn from(def: PrefixDef) -> Self {
        Prefix { symbols: def.symbols, name: def.name, factor: def.factor, kind: def.kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_acceptance() {
        assert!(Prefixes::Si.accepts(PrefixKind::Si));
        assert!(!Prefixes::Si.accepts(PrefixKind::Binary));
        assert!(Prefixes::SiAndBinary.accepts(PrefixKind::Binary));
        assert!(!Prefixes::None.accepts(PrefixKind::Si));
    }

    #[test]
    fn test_unit_def_builders() {
        let ft = UnitDef::scaled(&["ft", "foot", "feet"], "foot", 0.3048, "m");
        assert_eq!(ft.symbol(), "ft");
        assert_eq!(ft.prefixes, Prefixes::None);
        assert_eq!(ft.definition, Definition::Expression("m".to_string()));
        assert_eq!(ft.conversion.factor(), Some(0.3048));

        let g = UnitDef::base(&["g"], "gram", BaseDimension::Mass, 1e-3).si_prefixed();
        assert_eq!(g.prefixes, Prefixes::Si);
        assert_eq!(g.definition, Definition::Base(BaseDimension::Mass));
    }

    #[test]
    fn test_binary_prefix_def() {
        let kibi = PrefixDef::binary(&["Ki"], "kibi", 1024.0);
        assert_eq!(kibi.kind, PrefixKind::Binary);
        let prefix = Prefix::from(kibi);
        assert_eq!(prefix.symbol(), "Ki");
    }
}
