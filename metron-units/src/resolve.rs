//! Resolution of parsed expressions into a dimension and a conversion

use num_traits::One;
use crate::{Conversion, Dimension, UnitError};
use crate::conversion::pow_exponent;
use crate::parse::{Term, UnitExpression};

/// Dimension and combined conversion of a whole expression
#[derive(Debug, Clone)]
pub struct Resolved {
    pub dimension: Dimension,
    pub conversion: Conversion,
}

impl Resolved {
    pub fn is_linear(&self) -> bool {
        self.conversion.is_linear()
    }
}

/// Combine the terms of an expression.
///
/// Linear terms multiply. At most one affine or non-linear term may appear,
/// and only with exponent 1. An affine term absorbs the factor of the others
/// into both its factor and offset; a non-linear term requires the others to
/// be dimensionless and has its output scaled by their factor.
pub fn resolve(expression: &UnitExpression) -> Result<Resolved, UnitError> {
    let overflow = || UnitError::format(expression.source(), "exponent overflow");
    let mut dimension = Dimension::dimensionless();
    let mut rest = Dimension::dimensionless();
    let mut factor = 1.0;
    let mut special: Option<(String, Conversion)> = None;

    for term in expression.terms() {
        let (term_dimension, is_special) = match &term.term {
            Term::Unknown(literal) => (Dimension::unknown(literal, term.exponent), false),
            Term::Known { prefix, unit } => {
                let prefix_factor = prefix.as_ref().map_or(1.0, |p| p.factor);
                match unit.conversion.factor() {
                    Some(unit_factor) => {
                        factor *= pow_exponent(prefix_factor * unit_factor, term.exponent);
                        (unit.dimension.power(term.exponent).ok_or_else(overflow)?, false)
                    }
                    None => {
                        if let Some((previous, _)) = &special {
                            return Err(UnitError::format(
                                expression.source(),
                                format!("'{}' and '{}' cannot be combined", previous, term.text),
                            ));
                        }
                        if !term.exponent.is_one() {
                            return Err(UnitError::format(
                                expression.source(),
                                format!("'{}' cannot be raised to a power", term.symbol()),
                            ));
                        }
                        special = Some((term.text.clone(), unit.conversion.prefixed(prefix_factor)));
                        (unit.dimension.clone(), true)
                    }
                }
            }
        };
        if !is_special {
            rest = rest.multiply(&term_dimension).ok_or_else(overflow)?;
        }
        dimension = dimension.multiply(&term_dimension).ok_or_else(overflow)?;
    }

    let conversion = match special {
        None => Conversion::linear(factor),
        Some((_, conversion @ Conversion::Affine { .. })) => conversion.scaled(factor),
        Some((text, conversion)) => {
            if !rest.is_dimensionless() {
                return Err(UnitError::format(
                    expression.source(),
                    format!("'{}' can only be combined with dimensionless factors", text),
                ));
            }
            conversion.scaled(factor)
        }
    };

    Ok(Resolved { dimension, conversion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Catalog, RegistryBuilder, UnitRegistry};
    use crate::parse::parse;
    use crate::conversion::{approx_eq, ConversionKind, LogScale};
    use crate::dimension::{BaseDimension, Exponent};
    use crate::unit::{PrefixDef, UnitDef};

    fn registry() -> UnitRegistry {
        let catalog = Catalog::new("test")
            .prefixes([
                PrefixDef::si(&["k"], "kilo", 1e3),
                PrefixDef::si(&["m"], "milli", 1e-3),
                PrefixDef::si(&["d"], "deci", 1e-1),
            ])
            .units([
                UnitDef::base(&["m"], "metre", BaseDimension::Length, 1.0).si_prefixed(),
                UnitDef::base(&["g"], "gram", BaseDimension::Mass, 1e-3).si_prefixed(),
                UnitDef::base(&["s"], "second", BaseDimension::Time, 1.0).si_prefixed(),
                UnitDef::base(&["K"], "kelvin", BaseDimension::Temperature, 1.0).si_prefixed(),
                UnitDef::derived(&["W"], "watt", "kg m^2 s^-3").si_prefixed(),
                UnitDef::dimensionless(&["%"], "percent", 0.01),
                UnitDef::affine(&["degC"], "degree Celsius", 1.0, 273.15, "K"),
                UnitDef::level(&["Bm"], "bel-milliwatt", LogScale::power_bel(1e-3), "W").si_prefixed(),
            ]);
        RegistryBuilder::new().catalog(catalog).build().unwrap()
    }

    fn resolved(text: &str) -> Result<Resolved, UnitError> {
        resolve(&parse(text, &registry()).unwrap())
    }

    #[test]
    fn test_linear_product() {
        let r = resolved("km^2 s^-1").unwrap();
        assert!(approx_eq(r.conversion.factor().unwrap(), 1e6, 1e-12));
        assert_eq!(r.dimension, Dimension::from_exponents([2, 0, -1, 0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_is_identity() {
        let r = resolved("").unwrap();
        assert!(r.dimension.is_dimensionless());
        assert_eq!(r.conversion.factor(), Some(1.0));
    }

    #[test]
    fn test_unknown_literal_axis() {
        let r = resolved("m foo^2").unwrap();
        assert_eq!(r.dimension.unknown_exponent("foo"), Exponent::from_integer(2));
        assert_eq!(r.conversion.factor(), Some(1.0));
    }

    #[test]
    fn test_affine_absorbs_factor() {
        let r = resolved("degC").unwrap();
        assert_eq!(r.conversion.kind(), ConversionKind::Affine);
        assert!(approx_eq(r.conversion.to_base(100.0), 373.15, 1e-12));

        // Offset scales with the other terms
        let r = resolved("degC %").unwrap();
        assert!(approx_eq(r.conversion.to_base(100.0), 3.7315, 1e-12));
    }

    #[test]
    fn test_affine_power_rejected() {
        assert!(matches!(resolved("degC^2"), Err(UnitError::Format { .. })));
    }

    #[test]
    fn test_two_special_terms_rejected() {
        assert!(matches!(resolved("degC degC"), Err(UnitError::Format { .. })));
        assert!(matches!(resolved("degC Bm"), Err(UnitError::Format { .. })));
    }

    #[test]
    fn test_general_with_dimensionless_scale() {
        let r = resolved("dBm").unwrap();
        assert_eq!(r.conversion.kind(), ConversionKind::General);
        assert!(approx_eq(r.conversion.to_base(30.0), 1.0, 1e-12));

        let r = resolved("Bm %").unwrap();
        assert!(approx_eq(r.conversion.to_base(3.0), 0.01, 1e-12));
    }

    #[test]
    fn test_general_with_dimensioned_factor_rejected() {
        assert!(matches!(resolved("Bm s^-1"), Err(UnitError::Format { .. })));
    }

    #[test]
    fn test_exponent_overflow_is_format_error() {
        assert!(matches!(resolved("W^2000000000"), Err(UnitError::Format { .. })));
        assert!(matches!(resolved("s^2000000000 s^2000000000"), Err(UnitError::Format { .. })));
        assert!(matches!(resolved("foo^2000000000 foo^2000000000"), Err(UnitError::Format { .. })));

        let r = resolved("s^2000000000 s^-2000000000").unwrap();
        assert!(r.dimension.is_dimensionless());
    }
}
