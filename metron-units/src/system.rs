//! The unit system - registry, simplifier and cache behind one API

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};
use crate::{Conversion, Dimension, UnitError, UnitRegistry};
use crate::cache::{CacheKey, SimplifyCache};
use crate::catalogs;
use crate::conversion::approx_eq;
use crate::dimension::BaseDimension;
use crate::parse::{parse, render_terms, UnitExpression};
use crate::registry::RegistryBuilder;
use crate::resolve::{resolve, Resolved};
use crate::simplify::{SearchLimits, Simplifier};
use crate::unit::{Prefix, PrefixDef, Unit, UnitDef};

/// Relative tolerance of `equivalent`
pub const EQUIVALENCE_TOLERANCE: f64 = 1e-9;

/// Absolute slack when the expected value is exactly zero
const ZERO_FLOOR: f64 = 1e-12;

/// Default unit system over the built-in catalogs
pub static UNITS: LazyLock<UnitSystem> = LazyLock::new(|| {
    UnitSystem::builtin().expect("built-in catalogs are consistent")
});

/// Anything that can stand for a unit expression
pub trait UnitInput {
    fn to_expression<'a>(&'a self, registry: &UnitRegistry) -> Result<Cow<'a, UnitExpression>, UnitError>;
}

impl UnitInput for str {
    fn to_expression<'a>(&'a self, registry: &UnitRegistry) -> Result<Cow<'a, UnitExpression>, UnitError> {
        parse(self, registry).map(Cow::Owned)
    }
}

impl UnitInput for String {
    fn to_expression<'a>(&'a self, registry: &UnitRegistry) -> Result<Cow<'a, UnitExpression>, UnitError> {
        self.as_str().to_expression(registry)
    }
}

impl UnitInput for UnitExpression {
    fn to_expression<'a>(&'a self, _registry: &UnitRegistry) -> Result<Cow<'a, UnitExpression>, UnitError> {
        Ok(Cow::Borrowed(self))
    }
}

/// Parses, converts and simplifies unit expressions against one registry
#[derive(Debug)]
pub struct UnitSystem {
    registry: UnitRegistry,
    simplifier: Simplifier,
    cache: Arc<SimplifyCache>,
}

impl UnitSystem {
    pub fn new(registry: UnitRegistry) -> Self {
        Self::with_cache(registry, Arc::new(SimplifyCache::new()))
    }

    /// Use a caller-supplied cache, e.g. a fresh or pre-seeded one in tests
    pub fn with_cache(registry: UnitRegistry, cache: Arc<SimplifyCache>) -> Self {
        let simplifier = Simplifier::new(&registry, SearchLimits::default());
        UnitSystem { registry, simplifier, cache }
    }

    /// Replace the search bounds. Cached results are dropped.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.simplifier = Simplifier::new(&self.registry, limits);
        self.cache.clear();
        self
    }

    /// A system over every built-in catalog
    pub fn builtin() -> Result<Self, UnitError> {
        let registry = RegistryBuilder::new().catalogs(catalogs::builtin()).build()?;
        Ok(Self::new(registry))
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<SimplifyCache> {
        &self.cache
    }

    pub fn limits(&self) -> SearchLimits {
        self.simplifier.limits()
    }

    pub fn parse(&self, text: &str) -> Result<UnitExpression, UnitError> {
        parse(text, &self.registry)
    }

    pub fn resolve(&self, unit: &(impl UnitInput + ?Sized)) -> Result<Resolved, UnitError> {
        let expression = unit.to_expression(&self.registry)?;
        resolve(&expression)
    }

    /// Convert `value` from one expression to another
    pub fn convert(
        &self,
        value: f64,
        from: &(impl UnitInput + ?Sized),
        to: &(impl UnitInput + ?Sized),
    ) -> Result<f64, UnitError> {
        let (from, to) = self.resolve_pair(from, to)?;
        Ok(to.conversion.from_base(from.conversion.to_base(value)))
    }

    /// Pure multiplicative factor from `from` to `to`, when both are linear
    pub fn factor(
        &self,
        from: &(impl UnitInput + ?Sized),
        to: &(impl UnitInput + ?Sized),
    ) -> Result<Option<f64>, UnitError> {
        let (from, to) = self.resolve_pair(from, to)?;
        Ok(match (from.conversion.factor(), to.conversion.factor()) {
            (Some(a), Some(b)) => Some(a / b),
            _ => None,
        })
    }

    /// Value in coherent SI base units
    pub fn to_base(&self, value: f64, unit: &(impl UnitInput + ?Sized)) -> Result<f64, UnitError> {
        Ok(self.resolve(unit)?.conversion.to_base(value))
    }

    pub fn dimension(&self, unit: &(impl UnitInput + ?Sized)) -> Result<Dimension, UnitError> {
        Ok(self.resolve(unit)?.dimension)
    }

    /// The expression's dimension written in SI base-unit symbols: `N` → `kg m s^-2`
    pub fn base_units(&self, unit: &(impl UnitInput + ?Sized)) -> Result<String, UnitError> {
        let dimension = self.dimension(unit)?;
        let known = BaseDimension::ALL
            .iter()
            .map(|kind| (kind.si_unit().to_string(), dimension.exponent(*kind)))
            .collect();
        let unknown = dimension.unknown_axes().map(|(l, e)| (l.to_string(), e));
        Ok(render_terms(known, unknown))
    }

    /// Whether the two expressions have the same dimension
    pub fn convertible(
        &self,
        a: &(impl UnitInput + ?Sized),
        b: &(impl UnitInput + ?Sized),
    ) -> Result<bool, UnitError> {
        Ok(self.dimension(a)? == self.dimension(b)?)
    }

    /// Whether `value` means the same quantity in both expressions
    pub fn equivalent(
        &self,
        value: f64,
        a: &(impl UnitInput + ?Sized),
        b: &(impl UnitInput + ?Sized),
    ) -> Result<bool, UnitError> {
        self.equivalent_within(value, a, b, EQUIVALENCE_TOLERANCE)
    }

    pub fn equivalent_within(
        &self,
        value: f64,
        a: &(impl UnitInput + ?Sized),
        b: &(impl UnitInput + ?Sized),
        tolerance: f64,
    ) -> Result<bool, UnitError> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        if a.dimension != b.dimension {
            return Ok(false);
        }
        let there = b.conversion.from_base(a.conversion.to_base(value));
        let back = a.conversion.from_base(b.conversion.to_base(there));
        Ok(within(there, value, tolerance) && within(back, value, tolerance))
    }

    /// Minimal named-unit forms of an expression.
    ///
    /// Results are cached per dimension and scale. When no compact form
    /// exists the expression's own text is returned, with repeated symbols
    /// merged.
    pub fn simplify(&self, unit: &(impl UnitInput + ?Sized)) -> Result<Arc<BTreeSet<String>>, UnitError> {
        let expression = unit.to_expression(&self.registry)?;
        let resolved = resolve(&expression)?;

        let found = match resolved.conversion {
            Conversion::Linear(scale) => self.simplify_dimension(&resolved.dimension, scale),
            Conversion::Affine { factor, offset } => {
                let key = CacheKey::affine(&resolved.dimension, factor, offset);
                self.cache.get_or_insert_with(key, || {
                    self.simplifier.simplify_affine(&resolved.dimension, factor, offset)
                })
            }
            Conversion::General { .. } => Arc::new(BTreeSet::new()),
        };

        if found.is_empty() {
            Ok(Arc::new(BTreeSet::from([expression.merged_text()])))
        } else {
            Ok(found)
        }
    }

    /// Cached simplification of a dimension at a scale; empty when the
    /// scale cannot be expressed
    pub fn simplify_dimension(&self, dimension: &Dimension, scale: f64) -> Arc<BTreeSet<String>> {
        self.cache.get_or_insert_with(CacheKey::linear(dimension, scale), || {
            self.simplifier.simplify(dimension, scale)
        })
    }

    /// Add a unit; cached simplifications are dropped
    pub fn register_unit(&mut self, def: UnitDef) -> Result<Arc<Unit>, UnitError> {
        let unit = self.registry.register_unit(def)?;
        self.refresh();
        Ok(unit)
    }

    /// Add a prefix; cached simplifications are dropped
    pub fn register_prefix(&mut self, def: PrefixDef) -> Result<Arc<Prefix>, UnitError> {
        let prefix = self.registry.register_prefix(def)?;
        self.refresh();
        Ok(prefix)
    }

    fn refresh(&mut self) {
        self.simplifier = Simplifier::new(&self.registry, self.simplifier.limits());
        self.cache.clear();
    }

    fn resolve_pair(
        &self,
        from: &(impl UnitInput + ?Sized),
        to: &(impl UnitInput + ?Sized),
    ) -> Result<(Resolved, Resolved), UnitError> {
        let from_expr = from.to_expression(&self.registry)?;
        let to_expr = to.to_expression(&self.registry)?;
        let from_resolved = resolve(&from_expr)?;
        let to_resolved = resolve(&to_expr)?;
        if from_resolved.dimension != to_resolved.dimension {
            return Err(UnitError::IncompatibleDimensions {
                from: from_expr.source().to_string(),
                to: to_expr.source().to_string(),
                from_dim: from_resolved.dimension,
                to_dim: to_resolved.dimension,
            });
        }
        Ok((from_resolved, to_resolved))
    }
}

/// Relative match, or absolute when `expected` is exactly zero
fn within(actual: f64, expected: f64, tolerance: f64) -> bool {
    if expected == 0.0 {
        actual.abs() <= ZERO_FLOOR
    } else {
        approx_eq(actual, expected, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;

    fn system() -> UnitSystem {
        UnitSystem::builtin().unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        approx_eq(a, b, 1e-9)
    }

    #[test]
    fn test_convert_simple() {
        let units = system();
        assert!(close(units.convert(5.0, "km", "m").unwrap(), 5000.0));
        assert!(close(units.convert(1.0, "mi", "km").unwrap(), 1.609344));
        assert!(close(units.convert(1.0, "h", "s").unwrap(), 3600.0));
        assert!(close(units.convert(1.0, "KiB", "bit").unwrap(), 8192.0));
    }

    #[test]
    fn test_convert_compound() {
        let units = system();
        assert!(close(units.convert(36.0, "km/h", "m s^-1").unwrap(), 10.0));
        assert!(close(units.convert(1.0, "kW h", "MJ").unwrap(), 3.6));
        assert!(close(units.convert(1.0, "N m", "J").unwrap(), 1.0));
    }

    #[test]
    fn test_convert_temperature() {
        let units = system();
        assert!(close(units.convert(100.0, "degC", "degF").unwrap(), 212.0));
        assert!(units.convert(32.0, "°F", "°C").unwrap().abs() < 1e-9);
        assert!(close(units.convert(0.0, "degC", "K").unwrap(), 273.15));
    }

    #[test]
    fn test_huge_exponents_are_rejected() {
        let units = system();
        let is_format = |r: Result<(), UnitError>| matches!(r, Err(UnitError::Format { .. }));
        assert!(is_format(units.convert(1.0, "N^2000000000", "m").map(|_| ())));
        assert!(is_format(units.convertible("s^2000000000 s^2000000000", "s").map(|_| ())));
        assert!(is_format(units.simplify("s^2000000000 s^2000000000").map(|_| ())));
    }

    #[test]
    fn test_convert_incompatible() {
        let units = system();
        let err = units.convert(1.0, "m", "s").unwrap_err();
        match err {
            UnitError::IncompatibleDimensions { from, to, .. } => {
                assert_eq!(from, "m");
                assert_eq!(to, "s");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_convert_accepts_parsed_expressions() {
        let units = system();
        let km = units.parse("km").unwrap();
        let owned = String::from("m");
        assert!(close(units.convert(2.0, &km, &owned).unwrap(), 2000.0));
    }

    #[test]
    fn test_factor() {
        let units = system();
        assert!(close(units.factor("kg", "t").unwrap().unwrap(), 1e-3));
        assert_eq!(units.factor("degC", "K").unwrap(), None);
        assert!(units.factor("kg", "m").is_err());
    }

    #[test]
    fn test_to_base_and_base_units() {
        let units = system();
        assert!(close(units.to_base(5.0, "km").unwrap(), 5000.0));
        assert!(close(units.to_base(100.0, "degC").unwrap(), 373.15));
        assert_eq!(units.base_units("N").unwrap(), "kg m s^-2");
        assert_eq!(units.base_units("V").unwrap(), "kg m^2 A^-1 s^-3");
        assert_eq!(units.base_units("%").unwrap(), "");
        assert_eq!(units.base_units("m foo").unwrap(), "m foo");
    }

    #[test]
    fn test_convertible_and_equivalent() {
        let units = system();
        assert!(units.convertible("s", "min").unwrap());
        assert!(!units.equivalent(1.0, "s", "min").unwrap());
        assert!(units.equivalent(1.0, "J", "N m").unwrap());
        assert!(!units.equivalent(0.0, "degC", "degF").unwrap());
        assert!(!units.convertible("m", "s").unwrap());
        assert!(!units.equivalent(1.0, "m", "s").unwrap());
    }

    #[test]
    fn test_equivalent_small_values() {
        let units = system();
        assert!(!units.equivalent(1e-13, "m", "km").unwrap());
        assert!(units.equivalent(1e-13, "m", "m").unwrap());
        assert!(units.equivalent(1e-20, "eV", "eV").unwrap());
        // Zero is zero in every linear unit
        assert!(units.equivalent(0.0, "m", "km").unwrap());
    }

    #[test]
    fn test_simplify_general_unit_returns_input() {
        let units = system();
        assert_eq!(*units.simplify("dBm").unwrap(), BTreeSet::from(["dBm".to_string()]));
    }

    #[test]
    fn test_simplify_affine() {
        let units = system();
        assert_eq!(*units.simplify("°F").unwrap(), BTreeSet::from(["degF".to_string()]));
    }

    #[test]
    fn test_simplify_unrepresentable_returns_merged_input() {
        let units = system();
        assert_eq!(*units.simplify("kB kB").unwrap(), BTreeSet::from(["kB^2".to_string()]));
    }

    #[test]
    fn test_injected_cache() {
        let cache = Arc::new(SimplifyCache::new());
        let registry = RegistryBuilder::new().catalogs(catalogs::builtin()).build().unwrap();
        let units = UnitSystem::with_cache(registry, Arc::clone(&cache));

        // A pre-seeded entry is served as is
        let speed = units.dimension("m/s").unwrap();
        cache.insert(CacheKey::linear(&speed, 1.0), BTreeSet::from(["m/s".to_string()]));
        assert_eq!(*units.simplify("m s^-1").unwrap(), BTreeSet::from(["m/s".to_string()]));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 0 });
    }

    #[test]
    fn test_register_unit_clears_cache() {
        let mut units = system();
        units.simplify("kg m^2 s^-2").unwrap();
        assert!(!units.cache().is_empty());

        let furlong = UnitDef::scaled(&["fur", "furlong"], "furlong", 201.168, "m");
        units.register_unit(furlong).unwrap();
        assert!(units.cache().is_empty());
        assert!(close(units.convert(1.0, "fur", "m").unwrap(), 201.168));
        assert!(units.simplify("m").unwrap().contains("m"));
    }

    #[test]
    fn test_register_prefix() {
        let mut units = system();
        assert!(units.register_prefix(PrefixDef::si(&["k"], "kilo", 1e3)).is_err());
        units.register_prefix(PrefixDef::si(&["my"], "myria", 1e4)).unwrap();
        assert!(close(units.convert(1.0, "mym", "m").unwrap(), 1e4));
    }

    #[test]
    fn test_with_limits() {
        let units = system().with_limits(SearchLimits { max_terms: 1, ..SearchLimits::default() });
        assert_eq!(units.limits().max_terms, 1);
        let simplified = units.simplify("kg^3 m^4 s^-6 A^-1").unwrap();
        assert_eq!(*simplified, BTreeSet::from(["kg^3 m^4 A^-1 s^-6".to_string()]));
    }
}
