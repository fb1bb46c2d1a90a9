//! Metron Units - unit expressions, conversion and simplification
//!
//! Unit text such as `"kg m^2 s^-2"`, `"km/h"` or `"dBm"` is parsed against a
//! registry of named units and prefixes, resolved to a dimension vector and a
//! conversion, and converted or simplified from there.
//!
//! - Dimensions are exact rational exponent vectors over the seven SI base
//!   quantities, plus free axes for unregistered symbols (`"widget"`).
//! - Conversions are linear, affine (`degC`) or general monotonic
//!   (logarithmic levels such as `dBm`).
//! - Simplification finds the shortest named-unit forms of a quantity and
//!   memoises them in a shared cache.
//!
//! Catalogs:
//! - SI base, derived and accepted units with all SI prefixes
//! - Imperial and US customary
//! - Data (bit, byte, binary prefixes)
//! - Atomic and Planck units
//! - Historical CGS and legacy units
//! - Logarithmic levels (dBm, dBV, dBSPL)

mod dimension;
mod conversion;
mod error;
mod unit;
mod registry;
mod parse;
mod resolve;
mod cache;
mod simplify;
mod system;
mod functions;
pub mod catalogs;

pub use dimension::{BaseDimension, Dimension, Exponent};
pub use conversion::{approx_eq, Conversion, ConversionKind, LogScale, MonotonicScale};
pub use error::UnitError;
pub use unit::{Definition, Prefix, PrefixDef, PrefixKind, Prefixes, Unit, UnitDef};
pub use registry::{Catalog, RegistryBuilder, UnitRegistry, RUNTIME_CATALOG};
pub use parse::{ParsedTerm, Term, UnitExpression};
pub use resolve::Resolved;
pub use cache::{CacheKey, CacheStats, SimplifyCache};
pub use simplify::{SearchLimits, Simplifier};
pub use system::{UnitInput, UnitSystem, EQUIVALENCE_TOLERANCE, UNITS};

use std::collections::BTreeSet;
use std::sync::Arc;
use metron_plugin::PluginRegistry;

/// Load unit functions into registry
pub fn load_units_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Conversion (3 functions)
        .with_function(functions::Convert)
        .with_function(functions::Factor)
        .with_function(functions::ToBase)

        // Simplification (2 functions)
        .with_function(functions::Simplify)
        .with_function(functions::BaseUnits)

        // Comparison (2 functions)
        .with_function(functions::Convertible)
        .with_function(functions::Equivalent)

        // Inspection (2 functions)
        .with_function(functions::Dimensions)
        .with_function(functions::IsDimensionless)
}

/// Parse against the built-in units
pub fn parse(text: &str) -> Result<UnitExpression, UnitError> {
    UNITS.parse(text)
}

/// Convert with the built-in units
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    UNITS.convert(value, from, to)
}

pub fn factor(from: &str, to: &str) -> Result<Option<f64>, UnitError> {
    UNITS.factor(from, to)
}

pub fn convertible(a: &str, b: &str) -> Result<bool, UnitError> {
    UNITS.convertible(a, b)
}

pub fn equivalent(value: f64, a: &str, b: &str) -> Result<bool, UnitError> {
    UNITS.equivalent(value, a, b)
}

/// Simplify with the built-in units and the shared cache
pub fn simplify(unit: &str) -> Result<Arc<BTreeSet<String>>, UnitError> {
    UNITS.simplify(unit)
}
