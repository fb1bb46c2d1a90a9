//! Logarithmic level units
//!
//! Each level unit is a bel referenced to a fixed quantity; the decibel
//! forms come from the SI deci prefix (`dBm`, `dBV`).

use crate::Catalog;
use crate::conversion::LogScale;
use crate::unit::UnitDef;

pub fn level() -> Catalog {
    Catalog::new("level").units([
        UnitDef::level(&["Bm", "BmW"], "bel-milliwatt", LogScale::power_bel(1e-3), "W").si_prefixed(),
        UnitDef::level(&["BW"], "bel-watt", LogScale::power_bel(1.0), "W").si_prefixed(),
        UnitDef::level(&["BV"], "bel-volt", LogScale::field_bel(1.0), "V").si_prefixed(),
        UnitDef::level(&["BuV", "BμV"], "bel-microvolt", LogScale::field_bel(1e-6), "V").si_prefixed(),
        UnitDef::level(&["BSPL"], "bel sound pressure level", LogScale::field_bel(2e-5), "Pa").si_prefixed(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegistryBuilder;
    use crate::catalogs::si;
    use crate::conversion::approx_eq;

    #[test]
    fn test_level_units_resolve_to_their_reference() {
        let registry = RegistryBuilder::new().catalog(si()).catalog(level()).build().unwrap();
        let (unit, prefix) = registry.resolve("dBm").unwrap();
        assert_eq!(unit.symbol(), "Bm");
        assert_eq!(prefix.unwrap().name, "deci");
        assert_eq!(unit.dimension, registry.get("W").unwrap().dimension);

        let volt = registry.get("BV").unwrap();
        assert!(approx_eq(volt.conversion.to_base(1.0), 10f64.sqrt(), 1e-12));
    }
}
