//! Unit registry - catalogs of named units and prefixes
//!
//! A `UnitRegistry` is assembled from an ordered list of `Catalog`s by a
//! `RegistryBuilder`. Catalogs earlier in the list take precedence: a symbol
//! already claimed by a previous catalog is skipped in later ones. Derived
//! definitions (`N` = `kg m s^-2`) are expanded down to SI base units at
//! build time, so lookups never recurse.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use crate::{Dimension, UnitError};
use crate::conversion::pow_exponent;
use crate::parse::tokenize;
use crate::unit::{Definition, Prefix, PrefixDef, PrefixKind, Unit, UnitDef};

/// Catalog name recorded on units registered after the build
pub const RUNTIME_CATALOG: &str = "runtime";

/// A named table of unit and prefix definitions
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub name: String,
    pub units: Vec<UnitDef>,
    pub prefixes: Vec<PrefixDef>,
}

impl Catalog {
    pub fn new(name: &str) -> Self {
        Catalog { name: name.to_string(), units: Vec::new(), prefixes: Vec::new() }
    }

    pub fn unit(mut self, def: UnitDef) -> Self {
        self.units.push(def);
        self
    }

    pub fn prefix(mut self, def: PrefixDef) -> Self {
        self.prefixes.push(def);
        self
    }

    pub fn units(mut self, defs: impl IntoIterator<Item = UnitDef>) -> Self {
        self.units.extend(defs);
        self
    }

    pub fn prefixes(mut self, defs: impl IntoIterator<Item = PrefixDef>) -> Self {
        self.prefixes.extend(defs);
        self
    }
}

/// Collects catalogs in precedence order and resolves them into a registry
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    catalogs: Vec<Catalog>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder { catalogs: Vec::new() }
    }

    /// Append a catalog; it loses every symbol clash with catalogs added before it
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalogs.push(catalog);
        self
    }

    pub fn catalogs(mut self, catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        self.catalogs.extend(catalogs);
        self
    }

    /// Resolve every definition against the SI base units.
    ///
    /// Fails with `DuplicateSymbol` when one catalog defines a symbol twice,
    /// `CyclicDefinition` when derived definitions refer to each other in a
    /// loop, and `InvalidDefinition` when a definition references an unknown
    /// symbol or a non-linear unit.
    pub fn build(self) -> Result<UnitRegistry, UnitError> {
        let mut prefixes: Vec<Arc<Prefix>> = Vec::new();
        let mut prefix_by_symbol: HashMap<String, usize> = HashMap::new();
        let mut defs: Vec<(UnitDef, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for catalog in self.catalogs {
            let mut local_prefixes = HashSet::new();
            for mut def in catalog.prefixes {
                claim_symbols(&mut def.symbols, &mut local_prefixes, &prefix_by_symbol, &catalog.name)?;
                if def.symbols.is_empty() {
                    continue;
                }
                let slot = prefixes.len();
                for symbol in &def.symbols {
                    prefix_by_symbol.insert(symbol.clone(), slot);
                }
                prefixes.push(Arc::new(Prefix::from(def)));
            }

            let mut local_units = HashSet::new();
            for mut def in catalog.units {
                let canonical = def.symbol().to_string();
                claim_symbols(&mut def.symbols, &mut local_units, &index, &catalog.name)?;
                if def.symbols.is_empty() {
                    debug!(symbol = %canonical, catalog = %catalog.name, "unit fully shadowed, skipped");
                    continue;
                }
                let slot = defs.len();
                for symbol in &def.symbols {
                    index.insert(symbol.clone(), slot);
                }
                defs.push((def, catalog.name.clone()));
            }
        }

        let prefix_order = prefix_order(&prefix_by_symbol);
        let slots = vec![Slot::Pending; defs.len()];
        let mut resolver = Resolver {
            defs,
            index,
            prefixes,
            prefix_order,
            slots,
            stack: Vec::new(),
        };

        let mut units = Vec::with_capacity(resolver.defs.len());
        for i in 0..resolver.defs.len() {
            units.push(resolver.unit(i)?);
        }

        debug!(units = units.len(), prefixes = resolver.prefixes.len(), "unit registry built");

        Ok(UnitRegistry {
            units,
            by_symbol: resolver.index,
            prefixes: resolver.prefixes,
            prefix_by_symbol,
            prefix_order: resolver.prefix_order,
        })
    }
}

/// Drop symbols already owned by an earlier catalog; reject repeats within one catalog
fn claim_symbols(
    symbols: &mut Vec<String>,
    local: &mut HashSet<String>,
    claimed: &HashMap<String, usize>,
    catalog: &str,
) -> Result<(), UnitError> {
    for symbol in symbols.iter() {
        if !local.insert(symbol.clone()) {
            return Err(UnitError::DuplicateSymbol(symbol.clone()));
        }
    }
    symbols.retain(|symbol| {
        let free = !claimed.contains_key(symbol);
        if !free {
            debug!(symbol = %symbol, catalog = %catalog, "symbol shadowed by an earlier catalog");
        }
        free
    });
    Ok(())
}

/// Prefix symbols, longest first, so `da` is tried before `d`
fn prefix_order(prefix_by_symbol: &HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = prefix_by_symbol
        .iter()
        .map(|(symbol, index)| (symbol.clone(), *index))
        .collect();
    order.sort_by(|a, b| {
        b.0.chars().count().cmp(&a.0.chars().count()).then_with(|| a.0.cmp(&b.0))
    });
    order
}

/// Longest-match symbol lookup: the bare symbol first, then each prefix that
/// leaves a non-empty remainder naming a unit which accepts that prefix.
fn match_symbol<T>(
    text: &str,
    prefixes: &[Arc<Prefix>],
    prefix_order: &[(String, usize)],
    lookup: impl Fn(&str) -> Option<T>,
    accepts: impl Fn(&T, PrefixKind) -> bool,
) -> Option<(T, Option<usize>)> {
    if let Some(found) = lookup(text) {
        return Some((found, None));
    }
    for (symbol, index) in prefix_order {
        let Some(rest) = text.strip_prefix(symbol.as_str()) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        if let Some(found) = lookup(rest) {
            if accepts(&found, prefixes[*index].kind) {
                return Some((found, Some(*index)));
            }
        }
    }
    None
}

/// Expand one definition, looking up referenced symbols through `lookup`,
/// which yields the prefix factor and the resolved unit.
fn expand_definition(
    def: &UnitDef,
    catalog: &str,
    mut lookup: impl FnMut(&str) -> Result<Option<(f64, Arc<Unit>)>, UnitError>,
) -> Result<Unit, UnitError> {
    let symbol = def.symbol();
    let (dimension, conversion) = match &def.definition {
        Definition::Base(kind) => (Dimension::base(*kind), def.conversion.clone()),
        Definition::Dimensionless => (Dimension::dimensionless(), def.conversion.clone()),
        Definition::Expression(expression) => {
            let terms = tokenize(expression).map_err(|e| UnitError::invalid(symbol, e.to_string()))?;
            let mut dimension = Dimension::dimensionless();
            let mut factor = 1.0;
            for term in terms {
                let Some((prefix, unit)) = lookup(&term.symbol)? else {
                    return Err(UnitError::invalid(symbol, format!("unknown symbol '{}'", term.symbol)));
                };
                let Some(unit_factor) = unit.conversion.factor() else {
                    return Err(UnitError::invalid(symbol, format!("'{}' is not a linear unit", term.symbol)));
                };
                factor *= pow_exponent(prefix * unit_factor, term.exponent);
                dimension = unit
                    .dimension
                    .power(term.exponent)
                    .and_then(|d| dimension.multiply(&d))
                    .ok_or_else(|| UnitError::invalid(symbol, "exponent overflow"))?;
            }
            (dimension, def.conversion.scaled(factor))
        }
    };

    Ok(Unit {
        symbols: def.symbols.clone(),
        name: def.name.clone(),
        prefixes: def.prefixes,
        conversion,
        dimension,
        catalog: catalog.to_string(),
    })
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Visiting,
    Done(Arc<Unit>),
}

/// Memoised depth-first expansion of catalog definitions
struct Resolver {
    defs: Vec<(UnitDef, String)>,
    index: HashMap<String, usize>,
    prefixes: Vec<Arc<Prefix>>,
    prefix_order: Vec<(String, usize)>,
    slots: Vec<Slot>,
    /// Canonical symbols currently being expanded, outermost first
    stack: Vec<String>,
}

impl Resolver {
    fn unit(&mut self, i: usize) -> Result<Arc<Unit>, UnitError> {
        match &self.slots[i] {
            Slot::Done(unit) => return Ok(Arc::clone(unit)),
            Slot::Visiting => {
                let symbol = self.defs[i].0.symbol().to_string();
                let start = self.stack.iter().position(|s| *s == symbol).unwrap_or(0);
                let mut chain = self.stack[start..].to_vec();
                chain.push(symbol);
                return Err(UnitError::CyclicDefinition(chain));
            }
            Slot::Pending => {}
        }

        self.slots[i] = Slot::Visiting;
        let (def, catalog) = self.defs[i].clone();
        self.stack.push(def.symbol().to_string());

        let expanded = expand_definition(&def, &catalog, |symbol| {
            let found = match_symbol(
                symbol,
                &self.prefixes,
                &self.prefix_order,
                |s| self.index.get(s).copied(),
                |&j, kind| self.defs[j].0.prefixes.accepts(kind),
            );
            match found {
                Some((j, prefix)) => {
                    let factor = prefix.map_or(1.0, |p| self.prefixes[p].factor);
                    Ok(Some((factor, self.unit(j)?)))
                }
                None => Ok(None),
            }
        });

        self.stack.pop();
        let unit = Arc::new(expanded?);
        self.slots[i] = Slot::Done(Arc::clone(&unit));
        Ok(unit)
    }
}

/// Resolved units and prefixes, indexed by every symbol and alias
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: Vec<Arc<Unit>>,
    by_symbol: HashMap<String, usize>,
    prefixes: Vec<Arc<Prefix>>,
    prefix_by_symbol: HashMap<String, usize>,
    prefix_order: Vec<(String, usize)>,
}

impl UnitRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Exact lookup by symbol or alias, no prefix handling
    pub fn get(&self, symbol: &str) -> Option<&Arc<Unit>> {
        self.by_symbol.get(symbol).map(|&i| &self.units[i])
    }

    pub fn prefix(&self, symbol: &str) -> Option<&Arc<Prefix>> {
        self.prefix_by_symbol.get(symbol).map(|&i| &self.prefixes[i])
    }

    /// Resolve a possibly prefixed symbol (`km`, `KiB`, `dBm`).
    ///
    /// The unprefixed symbol wins, so `min` is a minute rather than a
    /// milli-inch. Otherwise the longest prefix leaving a known unit that
    /// accepts it is used.
    pub fn resolve(&self, symbol: &str) -> Option<(Arc<Unit>, Option<Arc<Prefix>>)> {
        match_symbol(
            symbol,
            &self.prefixes,
            &self.prefix_order,
            |s| self.get(s),
            |unit, kind| unit.accepts(kind),
        )
        .map(|(unit, prefix)| (Arc::clone(unit), prefix.map(|p| Arc::clone(&self.prefixes[p]))))
    }

    /// Base-unit decomposition of a registered symbol
    pub fn base_units_of(&self, symbol: &str) -> Option<&Dimension> {
        self.get(symbol).map(|unit| unit.dimension())
    }

    /// Units in registration order
    pub fn units(&self) -> &[Arc<Unit>] {
        &self.units
    }

    pub fn prefixes(&self) -> &[Arc<Prefix>] {
        &self.prefixes
    }

    /// Every registered unit symbol and alias, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.by_symbol.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Units contributed by the named catalog
    pub fn by_catalog(&self, catalog: &str) -> Vec<&Arc<Unit>> {
        self.units.iter().filter(|u| u.catalog == catalog).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Add a unit after the build. Its definition may reference any
    /// registered unit; every symbol must be new.
    pub fn register_unit(&mut self, def: UnitDef) -> Result<Arc<Unit>, UnitError> {
        if def.symbols.is_empty() {
            return Err(UnitError::invalid("", "a unit needs at least one symbol"));
        }
        check_unclaimed(&def.symbols, &self.by_symbol)?;

        let unit = Arc::new(expand_definition(&def, RUNTIME_CATALOG, |symbol| {
            Ok(self.resolve(symbol).map(|(unit, prefix)| (prefix.map_or(1.0, |p| p.factor), unit)))
        })?);

        let slot = self.units.len();
        for symbol in &unit.symbols {
            self.by_symbol.insert(symbol.clone(), slot);
        }
        debug!(symbol = %unit.symbol(), "unit registered");
        self.units.push(Arc::clone(&unit));
        Ok(unit)
    }

    /// Add a prefix after the build; every symbol must be new
    pub fn register_prefix(&mut self, def: PrefixDef) -> Result<Arc<Prefix>, UnitError> {
        if def.symbols.is_empty() {
            return Err(UnitError::invalid("", "a prefix needs at least one symbol"));
        }
        check_unclaimed(&def.symbols, &self.prefix_by_symbol)?;

        let prefix = Arc::new(Prefix::from(def));
        let slot = self.prefixes.len();
        for symbol in &prefix.symbols {
            self.prefix_by_symbol.insert(symbol.clone(), slot);
        }
        self.prefixes.push(Arc::clone(&prefix));
        self.prefix_order = prefix_order(&self.prefix_by_symbol);
        debug!(symbol = %prefix.symbol(), "prefix registered");
        Ok(prefix)
    }
}

fn check_unclaimed(symbols: &[String], claimed: &HashMap<String, usize>) -> Result<(), UnitError> {
    let mut seen = HashSet::new();
    for symbol in symbols {
        if claimed.contains_key(symbol) || !seen.insert(symbol) {
            return Err(UnitError::DuplicateSymbol(symbol.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::approx_eq;
    use crate::dimension::BaseDimension;
    use crate::unit::Prefixes;

    fn base_catalog() -> Catalog {
        Catalog::new("base")
            .prefixes([
                PrefixDef::si(&["k"], "kilo", 1e3),
                PrefixDef::si(&["m"], "milli", 1e-3),
                PrefixDef::si(&["d"], "deci", 1e-1),
                PrefixDef::si(&["da"], "deca", 1e1),
            ])
            .units([
                UnitDef::base(&["m", "metre"], "metre", BaseDimension::Length, 1.0).si_prefixed(),
                UnitDef::base(&["g"], "gram", BaseDimension::Mass, 1e-3).si_prefixed(),
                UnitDef::base(&["s"], "second", BaseDimension::Time, 1.0).si_prefixed(),
                UnitDef::derived(&["N"], "newton", "kg m s^-2").si_prefixed(),
                UnitDef::derived(&["J"], "joule", "N m").si_prefixed(),
                UnitDef::scaled(&["min"], "minute", 60.0, "s"),
                UnitDef::scaled(&["t"], "tonne", 1000.0, "kg"),
            ])
    }

    fn registry() -> UnitRegistry {
        RegistryBuilder::new().catalog(base_catalog()).build().unwrap()
    }

    #[test]
    fn test_derived_units_expand_to_base() {
        let reg = registry();
        let joule = reg.get("J").unwrap();
        assert_eq!(joule.dimension, Dimension::from_exponents([2, 1, -2, 0, 0, 0, 0]));
        assert!(approx_eq(joule.conversion.factor().unwrap(), 1.0, 1e-12));

        let tonne = reg.get("t").unwrap();
        assert!(approx_eq(tonne.conversion.factor().unwrap(), 1000.0, 1e-12));
        assert_eq!(tonne.dimension, Dimension::base(BaseDimension::Mass));
    }

    #[test]
    fn test_resolve_prefers_unprefixed() {
        let reg = registry();
        let (unit, prefix) = reg.resolve("min").unwrap();
        assert_eq!(unit.symbol(), "min");
        assert!(prefix.is_none());

        let (unit, prefix) = reg.resolve("mm").unwrap();
        assert_eq!(unit.symbol(), "m");
        assert_eq!(prefix.unwrap().symbol(), "m");
    }

    #[test]
    fn test_resolve_longest_prefix_first() {
        let reg = registry();
        let (unit, prefix) = reg.resolve("dam").unwrap();
        assert_eq!(unit.symbol(), "m");
        assert_eq!(prefix.unwrap().name, "deca");

        let (unit, prefix) = reg.resolve("dm").unwrap();
        assert_eq!(unit.symbol(), "m");
        assert_eq!(prefix.unwrap().name, "deci");
    }

    #[test]
    fn test_resolve_respects_prefix_rules() {
        let reg = registry();
        // tonne takes no prefixes
        assert!(reg.resolve("kt").is_none());
        assert!(reg.resolve("kmin").is_none());
        assert!(reg.resolve("k").is_none());
        assert!(reg.resolve("metre").is_some());
    }

    #[test]
    fn test_first_catalog_wins() {
        let override_catalog = Catalog::new("override")
            .unit(UnitDef::scaled(&["t", "ton"], "short ton", 907.18474, "kg"));
        let reg = RegistryBuilder::new()
            .catalog(base_catalog())
            .catalog(override_catalog)
            .build()
            .unwrap();

        let tonne = reg.get("t").unwrap();
        assert_eq!(tonne.catalog, "base");
        // The loser keeps its unclaimed aliases
        let ton = reg.get("ton").unwrap();
        assert_eq!(ton.catalog, "override");
        assert_eq!(ton.symbol(), "ton");
        assert_eq!(reg.by_catalog("override").len(), 1);
    }

    #[test]
    fn test_duplicate_within_catalog() {
        let catalog = base_catalog().unit(UnitDef::scaled(&["min"], "minim", 6.161e-8, "m^3"));
        let err = RegistryBuilder::new().catalog(catalog).build().unwrap_err();
        assert_eq!(err, UnitError::DuplicateSymbol("min".to_string()));
    }

    #[test]
    fn test_cycle_detected() {
        let catalog = base_catalog()
            .unit(UnitDef::scaled(&["foo"], "foo", 2.0, "bar"))
            .unit(UnitDef::scaled(&["bar"], "bar", 3.0, "foo m"));
        let err = RegistryBuilder::new().catalog(catalog).build().unwrap_err();
        assert_eq!(err, UnitError::CyclicDefinition(vec![
            "foo".to_string(), "bar".to_string(), "foo".to_string(),
        ]));
    }

    #[test]
    fn test_unknown_reference_is_invalid() {
        let catalog = base_catalog().unit(UnitDef::derived(&["Pa"], "pascal", "N m^-2 zz"));
        let err = RegistryBuilder::new().catalog(catalog).build().unwrap_err();
        assert!(matches!(err, UnitError::InvalidDefinition { ref symbol, .. } if symbol == "Pa"), "{:?}", err);
    }

    #[test]
    fn test_non_linear_reference_is_invalid() {
        let catalog = base_catalog()
            .unit(UnitDef::affine(&["degC"], "degree Celsius", 1.0, 273.15, "s"))
            .unit(UnitDef::derived(&["bad"], "bad", "degC m"));
        let err = RegistryBuilder::new().catalog(catalog).build().unwrap_err();
        assert!(matches!(err, UnitError::InvalidDefinition { ref symbol, .. } if symbol == "bad"), "{:?}", err);
    }

    #[test]
    fn test_register_unit_after_build() {
        let mut reg = registry();
        let before = reg.len();
        let furlong = reg.register_unit(UnitDef::scaled(&["fur"], "furlong", 201.168, "m")).unwrap();
        assert_eq!(furlong.catalog, RUNTIME_CATALOG);
        assert_eq!(reg.len(), before + 1);

        let err = reg.register_unit(UnitDef::scaled(&["m"], "mystery", 2.0, "s")).unwrap_err();
        assert_eq!(err, UnitError::DuplicateSymbol("m".to_string()));
    }

    #[test]
    fn test_register_prefix_after_build() {
        let mut reg = registry();
        reg.register_prefix(PrefixDef::si(&["M"], "mega", 1e6)).unwrap();
        let (unit, prefix) = reg.resolve("Mm").unwrap();
        assert_eq!(unit.symbol(), "m");
        assert_eq!(prefix.unwrap().factor, 1e6);

        let err = reg.register_prefix(PrefixDef::si(&["k"], "kilo", 1e3)).unwrap_err();
        assert_eq!(err, UnitError::DuplicateSymbol("k".to_string()));
    }

    #[test]
    fn test_listing() {
        let reg = registry();
        let symbols = reg.symbols();
        assert!(symbols.contains(&"metre"));
        assert!(symbols.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reg.prefixes().len(), 4);
        assert!(!reg.is_empty());
        assert_eq!(reg.get("m").unwrap().prefixes, Prefixes::Si);
    }
}
