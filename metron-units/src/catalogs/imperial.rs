//! Imperial and US customary units

use crate::Catalog;
use crate::unit::UnitDef;

/// Units shared by the imperial and US customary systems, plus imperial volumes
pub fn imperial() -> Catalog {
    Catalog::new("imperial").units([
        // Length
        UnitDef::scaled(&["in", "inch", "inches"], "inch", 0.0254, "m"),
        UnitDef::scaled(&["ft", "foot", "feet"], "foot", 12.0, "in"),
        UnitDef::scaled(&["yd", "yard"], "yard", 3.0, "ft"),
        UnitDef::scaled(&["mi", "mile"], "mile", 1760.0, "yd"),
        UnitDef::scaled(&["nmi", "NM"], "nautical mile", 1852.0, "m"),
        // Mass
        UnitDef::scaled(&["lb", "lbs", "pound"], "pound", 0.45359237, "kg"),
        UnitDef::scaled(&["oz", "ounce"], "ounce", 1.0 / 16.0, "lb"),
        UnitDef::scaled(&["st", "stone"], "stone", 14.0, "lb"),
        UnitDef::scaled(&["gr", "grain"], "grain", 1.0 / 7000.0, "lb"),
        // Temperature
        UnitDef::scaled(&["degR", "°R", "rankine"], "degree Rankine", 5.0 / 9.0, "K"),
        UnitDef::affine(&["degF", "°F", "fahrenheit"], "degree Fahrenheit", 1.0, 459.67, "degR"),
        // Area, speed
        UnitDef::scaled(&["ac", "acre"], "acre", 43560.0, "ft^2"),
        UnitDef::scaled(&["mph"], "mile per hour", 1.0, "mi h^-1"),
        UnitDef::scaled(&["kn", "kt", "knot"], "knot", 1.0, "nmi h^-1"),
        // Mechanics
        UnitDef::scaled(&["lbf"], "pound-force", 9.80665, "lb m s^-2"),
        UnitDef::scaled(&["psi"], "pound per square inch", 1.0, "lbf in^-2"),
        UnitDef::scaled(&["hp", "horsepower"], "mechanical horsepower", 550.0, "ft lbf s^-1"),
        UnitDef::scaled(&["Btu", "BTU"], "British thermal unit", 1055.05585262, "J"),
        // Imperial volume
        UnitDef::scaled(&["impgal"], "imperial gallon", 4.54609, "L"),
        UnitDef::scaled(&["imppt"], "imperial pint", 1.0 / 8.0, "impgal"),
    ])
}

pub fn us_customary() -> Catalog {
    Catalog::new("us-customary").units([
        UnitDef::scaled(&["gal", "gallon"], "US gallon", 231.0, "in^3"),
        UnitDef::scaled(&["qt", "quart"], "US quart", 1.0 / 4.0, "gal"),
        UnitDef::scaled(&["pt", "pint"], "US pint", 1.0 / 2.0, "qt"),
        UnitDef::scaled(&["cup"], "US cup", 1.0 / 2.0, "pt"),
        UnitDef::scaled(&["floz"], "US fluid ounce", 1.0 / 16.0, "pt"),
        UnitDef::scaled(&["tbsp"], "tablespoon", 1.0 / 2.0, "floz"),
        UnitDef::scaled(&["tsp"], "teaspoon", 1.0 / 3.0, "tbsp"),
        UnitDef::scaled(&["bbl", "barrel"], "oil barrel", 42.0, "gal"),
        UnitDef::scaled(&["ton"], "short ton", 2000.0, "lb"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RegistryBuilder, UnitRegistry};
    use crate::catalogs::si;
    use crate::conversion::approx_eq;

    fn registry() -> UnitRegistry {
        RegistryBuilder::new()
            .catalog(si())
            .catalog(imperial())
            .catalog(us_customary())
            .build()
            .unwrap()
    }

    fn factor(reg: &UnitRegistry, symbol: &str) -> f64 {
        reg.get(symbol).and_then(|u| u.conversion.factor()).unwrap()
    }

    #[test]
    fn test_exact_definitions() {
        let reg = registry();
        assert!(approx_eq(factor(&reg, "mi"), 1609.344, 1e-12));
        assert!(approx_eq(factor(&reg, "oz"), 0.028349523125, 1e-12));
        assert!(approx_eq(factor(&reg, "gal"), 3.785411784e-3, 1e-12));
        assert!(approx_eq(factor(&reg, "lbf"), 4.4482216152605, 1e-12));
        assert!(approx_eq(factor(&reg, "hp"), 745.69987158227022, 1e-12));
    }

    #[test]
    fn test_fahrenheit() {
        let reg = registry();
        let fahrenheit = reg.get("degF").unwrap();
        assert!(approx_eq(fahrenheit.conversion.to_base(32.0), 273.15, 1e-12));
        assert!(approx_eq(fahrenheit.conversion.to_base(212.0), 373.15, 1e-12));
    }
}
