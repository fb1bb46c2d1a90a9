//! Simplification - the most compact named-unit form of a dimension and scale
//!
//! Registered linear units are grouped into classes sharing a dimension.
//! The search deepens over the number of distinct symbols (1, 2, 3, ...),
//! enumerating class combinations with small integer exponents whose
//! weighted dimension sum equals the target; the last class of every
//! combination comes from a lookup table keyed by the residual dimension.
//! Each covering is then expanded over class members and kept when the
//! product of member factors reproduces the requested scale.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use num_traits::Zero;
use tracing::debug;
use crate::{Dimension, UnitRegistry};
use crate::conversion::{approx_eq, pow_exponent, Conversion, ConversionKind};
use crate::dimension::{BaseDimension, Exponent};
use crate::parse::render_terms;
use crate::unit::{Prefix, Unit};

/// Bounds of the simplification search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    /// Largest number of distinct symbols tried
    pub max_terms: usize,
    /// Exponents range over `-max_exponent..=max_exponent`, zero excluded
    pub max_exponent: i32,
    /// Relative tolerance when matching scales
    pub tolerance: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits { max_terms: 3, max_exponent: 4, tolerance: 1e-9 }
    }
}

type Terms = Vec<(String, Exponent)>;

/// A unit as it may appear in a simplified expression
#[derive(Debug, Clone)]
struct Member {
    unit: Arc<Unit>,
    prefix: Option<Arc<Prefix>>,
    /// Factor of the bare unit
    unit_factor: f64,
    /// Factor including the prefix
    factor: f64,
}

impl Member {
    fn new(unit: &Arc<Unit>, prefix: Option<&Arc<Prefix>>) -> Option<Self> {
        let unit_factor = unit.conversion.factor()?;
        let factor = prefix.map_or(1.0, |p| p.factor) * unit_factor;
        Some(Member { unit: Arc::clone(unit), prefix: prefix.cloned(), unit_factor, factor })
    }

    fn symbol(&self) -> String {
        symbol_with(&self.unit, self.prefix.as_deref())
    }
}

fn symbol_with(unit: &Unit, prefix: Option<&Prefix>) -> String {
    match prefix {
        Some(prefix) => format!("{}{}", prefix.symbol(), unit.symbol()),
        None => unit.symbol().to_string(),
    }
}

/// Units sharing one dimension vector
#[derive(Debug, Clone)]
struct UnitClass {
    vector: [i32; 7],
    members: Vec<Member>,
}

/// Search state derived from a registry; rebuilt when the registry changes
#[derive(Debug, Clone)]
pub struct Simplifier {
    classes: Vec<UnitClass>,
    /// `vector * exponent` → every (class, exponent) producing it
    table: HashMap<[i32; 7], Vec<(usize, i32)>>,
    dimensionless: Vec<Arc<Unit>>,
    affine: Vec<Arc<Unit>>,
    /// Coherent unit for each base quantity (`m`, `kg`, `s`, ...)
    coherent: [Option<Member>; 7],
    prefixes: Vec<Arc<Prefix>>,
    /// Unit symbols; a prefixed spelling equal to one would parse as that unit
    claimed: HashSet<String>,
    limits: SearchLimits,
}

impl Simplifier {
    pub fn new(registry: &UnitRegistry, limits: SearchLimits) -> Self {
        let coherent: [Option<Member>; 7] =
            std::array::from_fn(|i| coherent_member(registry, BaseDimension::ALL[i], limits.tolerance));

        let mut classes: Vec<UnitClass> = Vec::new();
        let mut class_of: HashMap<[i32; 7], usize> = HashMap::new();
        let mut dimensionless = Vec::new();
        let mut affine = Vec::new();

        for unit in registry.units() {
            match unit.conversion.kind() {
                ConversionKind::Linear => {}
                ConversionKind::Affine => {
                    affine.push(Arc::clone(unit));
                    continue;
                }
                ConversionKind::General => continue,
            }
            if unit.dimension.is_dimensionless() {
                dimensionless.push(Arc::clone(unit));
                continue;
            }
            let (Some(vector), Some(member)) = (integer_vector(&unit.dimension), Member::new(unit, None)) else {
                continue;
            };
            let slot = *class_of.entry(vector).or_insert_with(|| {
                classes.push(UnitClass { vector, members: Vec::new() });
                classes.len() - 1
            });
            classes[slot].members.push(member);
        }

        // kg joins the mass class as a member in its own right
        for member in coherent.iter().flatten().filter(|m| m.prefix.is_some()) {
            if let Some(vector) = integer_vector(&member.unit.dimension) {
                if let Some(&slot) = class_of.get(&vector) {
                    classes[slot].members.push(member.clone());
                }
            }
        }

        let mut table: HashMap<[i32; 7], Vec<(usize, i32)>> = HashMap::new();
        for (index, class) in classes.iter().enumerate() {
            for exp in exponents(limits.max_exponent) {
                table.entry(scale_vector(class.vector, exp)).or_default().push((index, exp));
            }
        }

        debug!(classes = classes.len(), "simplifier ready");

        Simplifier {
            classes,
            table,
            dimensionless,
            affine,
            coherent,
            prefixes: registry.prefixes().to_vec(),
            claimed: registry.symbols().into_iter().map(str::to_string).collect(),
            limits,
        }
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Whether `unit` may carry `prefix` in output: `mP` is Planck mass, not millipoise
    fn can_prefix(&self, unit: &Unit, prefix: &Prefix) -> bool {
        unit.accepts(prefix.kind) && !self.claimed.contains(&symbol_with(unit, Some(prefix)))
    }

    /// Every minimal named-unit text for `dimension` at `scale` (value in
    /// base units per unit of the expression).
    ///
    /// Unknown axes are appended verbatim. An empty set means the scale
    /// cannot be expressed.
    pub fn simplify(&self, dimension: &Dimension, scale: f64) -> BTreeSet<String> {
        let unknown: Terms = dimension.unknown_axes().map(|(l, e)| (l.to_string(), e)).collect();
        let base = dimension.base_part();

        let found = if base.is_dimensionless() {
            self.dimensionless_matches(scale, unknown.is_empty())
        } else {
            let searched = match integer_vector(&base) {
                Some(target) => self.search(target, scale),
                None => Vec::new(),
            };
            if searched.is_empty() {
                self.base_fallback(&base, scale)
            } else {
                searched
            }
        };

        found
            .into_iter()
            .map(|known| render_terms(known, unknown.iter().cloned()))
            .collect()
    }

    /// Registered affine units with exactly this dimension, factor and offset
    pub fn simplify_affine(&self, dimension: &Dimension, factor: f64, offset: f64) -> BTreeSet<String> {
        let tolerance = self.limits.tolerance;
        self.affine
            .iter()
            .filter(|unit| unit.dimension == *dimension)
            .filter(|unit| match unit.conversion {
                Conversion::Affine { factor: f, offset: o } => {
                    approx_eq(f, factor, tolerance) && approx_eq(o, offset, tolerance)
                }
                _ => false,
            })
            .map(|unit| unit.symbol().to_string())
            .collect()
    }

    /// Named dimensionless units with this factor. At scale 1 the empty
    /// form comes first; named ones (`rad`) join only when `named` is set.
    fn dimensionless_matches(&self, scale: f64, named: bool) -> Vec<Terms> {
        let tolerance = self.limits.tolerance;
        let unit_scale = approx_eq(scale, 1.0, tolerance);
        let mut found = if unit_scale { vec![Vec::new()] } else { Vec::new() };
        if unit_scale && !named {
            return found;
        }
        found.extend(
            self.dimensionless
                .iter()
                .filter(|unit| unit.conversion.factor().is_some_and(|f| approx_eq(f, scale, tolerance)))
                .map(|unit| vec![(unit.symbol().to_string(), Exponent::from_integer(1))]),
        );
        found
    }

    fn search(&self, target: [i32; 7], scale: f64) -> Vec<Terms> {
        for depth in 1..=self.limits.max_terms {
            let coverings = self.coverings(target, depth);
            debug!(depth, coverings = coverings.len(), "simplify search level");

            let mut exact = Vec::new();
            let mut prefixed = Vec::new();
            for covering in &coverings {
                self.match_covering(covering, scale, &mut exact, &mut prefixed);
            }
            if !exact.is_empty() {
                return exact;
            }
            if !prefixed.is_empty() {
                return prefixed;
            }
        }
        Vec::new()
    }

    /// Class combinations of exactly `depth` classes whose weighted
    /// vectors sum to `target`. Class indices strictly increase.
    fn coverings(&self, target: [i32; 7], depth: usize) -> Vec<Vec<(usize, i32)>> {
        let mut found = Vec::new();
        let mut chosen = Vec::with_capacity(depth);
        self.cover(target, depth, 0, &mut chosen, &mut found);
        found
    }

    fn cover(
        &self,
        residual: [i32; 7],
        remaining: usize,
        first_class: usize,
        chosen: &mut Vec<(usize, i32)>,
        found: &mut Vec<Vec<(usize, i32)>>,
    ) {
        if remaining == 1 {
            if let Some(entries) = self.table.get(&residual) {
                for &(class, exp) in entries.iter().filter(|(class, _)| *class >= first_class) {
                    chosen.push((class, exp));
                    found.push(chosen.clone());
                    chosen.pop();
                }
            }
            return;
        }
        for class in first_class..self.classes.len() {
            for exp in exponents(self.limits.max_exponent) {
                let next = subtract(residual, scale_vector(self.classes[class].vector, exp));
                chosen.push((class, exp));
                self.cover(next, remaining - 1, class + 1, chosen, found);
                chosen.pop();
            }
        }
    }

    /// Expand a covering over class members. Exact scale matches go to
    /// `exact`; when a single extra prefix on one term fixes the scale the
    /// result goes to `prefixed`, which is only consulted without exact ones.
    fn match_covering(
        &self,
        covering: &[(usize, i32)],
        scale: f64,
        exact: &mut Vec<Terms>,
        prefixed: &mut Vec<Terms>,
    ) {
        let tolerance = self.limits.tolerance;
        let mut indices = vec![0usize; covering.len()];
        loop {
            let choice: Vec<(&Member, i32)> = covering
                .iter()
                .zip(&indices)
                .map(|(&(class, exp), &i)| (&self.classes[class].members[i], exp))
                .collect();
            let product: f64 = choice.iter().map(|(m, e)| m.factor.powi(*e)).product();

            if approx_eq(product, scale, tolerance) {
                exact.push(choice_terms(&choice, None));
            } else if exact.is_empty() {
                let ratio = scale / product;
                for (i, (member, exp)) in choice.iter().enumerate() {
                    if member.prefix.is_some() {
                        continue;
                    }
                    for prefix in &self.prefixes {
                        if self.can_prefix(&member.unit, prefix) && approx_eq(prefix.factor.powi(*exp), ratio, tolerance) {
                            prefixed.push(choice_terms(&choice, Some((i, prefix))));
                        }
                    }
                }
            }

            if !advance(&mut indices, |pos| self.classes[covering[pos].0].members.len()) {
                break;
            }
        }
    }

    /// Coherent base units with exact exponents; if the scale differs, one
    /// term may take a prefix to absorb it.
    fn base_fallback(&self, base: &Dimension, scale: f64) -> Vec<Terms> {
        let tolerance = self.limits.tolerance;
        let mut terms: Vec<(&Member, Exponent)> = Vec::new();
        for kind in BaseDimension::ALL {
            let exp = base.exponent(kind);
            if exp.is_zero() {
                continue;
            }
            match &self.coherent[kind.index()] {
                Some(member) => terms.push((member, exp)),
                None => return Vec::new(),
            }
        }

        let factors: Vec<f64> = terms.iter().map(|(m, e)| pow_exponent(m.factor, *e)).collect();
        let product: f64 = factors.iter().product();
        let render = |replace: Option<(usize, Option<&Prefix>)>| -> Terms {
            terms
                .iter()
                .enumerate()
                .map(|(i, (member, exp))| match replace {
                    Some((j, prefix)) if j == i => (symbol_with(&member.unit, prefix), *exp),
                    _ => (member.symbol(), *exp),
                })
                .collect()
        };

        if approx_eq(product, scale, tolerance) {
            return vec![render(None)];
        }

        let mut found = Vec::new();
        for (i, (member, exp)) in terms.iter().enumerate() {
            let needed = scale * factors[i] / product;
            let options = std::iter::once(None).chain(
                self.prefixes.iter().filter(|p| self.can_prefix(&member.unit, p)).map(|p| Some(&**p)),
            );
            for prefix in options {
                let p = prefix.map_or(1.0, |p| p.factor);
                if approx_eq(pow_exponent(p * member.unit_factor, *exp), needed, tolerance) {
                    found.push(render(Some((i, prefix))));
                }
            }
        }
        found
    }
}

/// The unit measuring one base quantity with factor 1, bare (`m`) or
/// through a prefix (`kg`)
fn coherent_member(registry: &UnitRegistry, kind: BaseDimension, tolerance: f64) -> Option<Member> {
    let target = Dimension::base(kind);
    let candidates: Vec<&Arc<Unit>> = registry
        .units()
        .iter()
        .filter(|u| u.is_linear() && u.dimension == target)
        .collect();

    let bare = candidates
        .iter()
        .filter_map(|u| Member::new(u, None))
        .find(|m| approx_eq(m.factor, 1.0, tolerance));
    if bare.is_some() {
        return bare;
    }

    candidates.iter().find_map(|unit| {
        registry
            .prefixes()
            .iter()
            .filter(|p| unit.accepts(p.kind))
            .filter_map(|p| Member::new(unit, Some(p)))
            .find(|m| approx_eq(m.factor, 1.0, tolerance))
    })
}

fn choice_terms(choice: &[(&Member, i32)], replace: Option<(usize, &Arc<Prefix>)>) -> Terms {
    choice
        .iter()
        .enumerate()
        .map(|(i, (member, exp))| {
            let symbol = match replace {
                Some((j, prefix)) if j == i => symbol_with(&member.unit, Some(&**prefix)),
                _ => member.symbol(),
            };
            (symbol, Exponent::from_integer(*exp))
        })
        .collect()
}

/// Odometer step over member indices; false once every choice was visited
fn advance(indices: &mut [usize], len_of: impl Fn(usize) -> usize) -> bool {
    for pos in 0..indices.len() {
        indices[pos] += 1;
        if indices[pos] < len_of(pos) {
            return true;
        }
        indices[pos] = 0;
    }
    false
}

fn exponents(max: i32) -> impl Iterator<Item = i32> {
    (-max..=max).filter(|e| *e != 0)
}

fn integer_vector(dimension: &Dimension) -> Option<[i32; 7]> {
    if dimension.has_unknown() || !dimension.is_integral() {
        return None;
    }
    let mut vector = [0i32; 7];
    for (slot, exp) in vector.iter_mut().zip(dimension.base_exponents()) {
        *slot = exp.to_integer();
    }
    Some(vector)
}

fn scale_vector(vector: [i32; 7], k: i32) -> [i32; 7] {
    vector.map(|v| v * k)
}

fn subtract(a: [i32; 7], b: [i32; 7]) -> [i32; 7] {
    let mut out = a;
    for (slot, v) in out.iter_mut().zip(b) {
        *slot -= v;
    }
    out
}
