//! SI base, derived and accepted units with the SI prefixes

use std::f64::consts::PI;
use crate::Catalog;
use crate::dimension::BaseDimension;
use crate::unit::{PrefixDef, UnitDef};

fn prefixes() -> Vec<PrefixDef> {
    vec![
        PrefixDef::si(&["Q"], "quetta", 1e30),
        PrefixDef::si(&["R"], "ronna", 1e27),
        PrefixDef::si(&["Y"], "yotta", 1e24),
        PrefixDef::si(&["Z"], "zetta", 1e21),
        PrefixDef::si(&["E"], "exa", 1e18),
        PrefixDef::si(&["P"], "peta", 1e15),
        PrefixDef::si(&["T"], "tera", 1e12),
        PrefixDef::si(&["G"], "giga", 1e9),
        PrefixDef::si(&["M"], "mega", 1e6),
        PrefixDef::si(&["k"], "kilo", 1e3),
        PrefixDef::si(&["h"], "hecto", 1e2),
        PrefixDef::si(&["da"], "deca", 1e1),
        PrefixDef::si(&["d"], "deci", 1e-1),
        PrefixDef::si(&["c"], "centi", 1e-2),
        PrefixDef::si(&["m"], "milli", 1e-3),
        PrefixDef::si(&["μ", "µ", "u"], "micro", 1e-6),
        PrefixDef::si(&["n"], "nano", 1e-9),
        PrefixDef::si(&["p"], "pico", 1e-12),
        PrefixDef::si(&["f"], "femto", 1e-15),
        PrefixDef::si(&["a"], "atto", 1e-18),
        PrefixDef::si(&["z"], "zepto", 1e-21),
        PrefixDef::si(&["y"], "yocto", 1e-24),
        PrefixDef::si(&["r"], "ronto", 1e-27),
        PrefixDef::si(&["q"], "quecto", 1e-30),
    ]
}

fn base_units() -> Vec<UnitDef> {
    vec![
        UnitDef::base(&["m", "meter", "metre"], "metre", BaseDimension::Length, 1.0).si_prefixed(),
        UnitDef::base(&["g", "gram"], "gram", BaseDimension::Mass, 1e-3).si_prefixed(),
        UnitDef::base(&["s", "sec", "second"], "second", BaseDimension::Time, 1.0).si_prefixed(),
        UnitDef::base(&["A", "amp", "ampere"], "ampere", BaseDimension::Current, 1.0).si_prefixed(),
        UnitDef::base(&["K", "kelvin"], "kelvin", BaseDimension::Temperature, 1.0).si_prefixed(),
        UnitDef::base(&["mol", "mole"], "mole", BaseDimension::Amount, 1.0).si_prefixed(),
        UnitDef::base(&["cd", "candela"], "candela", BaseDimension::Luminosity, 1.0).si_prefixed(),
    ]
}

fn derived_units() -> Vec<UnitDef> {
    vec![
        UnitDef::derived(&["rad", "radian"], "radian", "m m^-1").si_prefixed(),
        UnitDef::derived(&["sr", "steradian"], "steradian", "rad^2").si_prefixed(),
        UnitDef::derived(&["Hz", "hertz"], "hertz", "s^-1").si_prefixed(),
        UnitDef::derived(&["N", "newton"], "newton", "kg m s^-2").si_prefixed(),
        UnitDef::derived(&["Pa", "pascal"], "pascal", "N m^-2").si_prefixed(),
        UnitDef::derived(&["J", "joule"], "joule", "N m").si_prefixed(),
        UnitDef::derived(&["W", "watt"], "watt", "J s^-1").si_prefixed(),
        UnitDef::derived(&["C", "coulomb"], "coulomb", "A s").si_prefixed(),
        UnitDef::derived(&["V", "volt"], "volt", "W A^-1").si_prefixed(),
        UnitDef::derived(&["F", "farad"], "farad", "C V^-1").si_prefixed(),
        UnitDef::derived(&["Ω", "ohm"], "ohm", "V A^-1").si_prefixed(),
        UnitDef::derived(&["S", "siemens"], "siemens", "A V^-1").si_prefixed(),
        UnitDef::derived(&["Wb", "weber"], "weber", "V s").si_prefixed(),
        UnitDef::derived(&["T", "tesla"], "tesla", "Wb m^-2").si_prefixed(),
        UnitDef::derived(&["H", "henry"], "henry", "Wb A^-1").si_prefixed(),
        UnitDef::derived(&["lm", "lumen"], "lumen", "cd sr").si_prefixed(),
        UnitDef::derived(&["lx", "lux"], "lux", "lm m^-2").si_prefixed(),
        UnitDef::derived(&["Bq", "becquerel"], "becquerel", "s^-1").si_prefixed(),
        UnitDef::derived(&["Gy", "gray"], "gray", "J kg^-1").si_prefixed(),
        UnitDef::derived(&["Sv", "sievert"], "sievert", "J kg^-1").si_prefixed(),
        UnitDef::derived(&["kat", "katal"], "katal", "mol s^-1").si_prefixed(),
    ]
}

/// Non-SI units accepted for use with the SI
fn accepted_units() -> Vec<UnitDef> {
    vec![
        UnitDef::scaled(&["min", "minute"], "minute", 60.0, "s"),
        UnitDef::scaled(&["h", "hr", "hour"], "hour", 3600.0, "s"),
        UnitDef::scaled(&["d", "day"], "day", 86400.0, "s"),
        UnitDef::scaled(&["wk", "week"], "week", 604800.0, "s"),
        UnitDef::scaled(&["yr", "year"], "Julian year", 31557600.0, "s"),
        UnitDef::scaled(&["L", "l", "litre", "liter"], "litre", 1e-3, "m^3").si_prefixed(),
        UnitDef::scaled(&["t", "tonne"], "tonne", 1e3, "kg"),
        UnitDef::scaled(&["ha", "hectare"], "hectare", 1e4, "m^2"),
        UnitDef::scaled(&["deg", "°", "degree"], "degree", PI / 180.0, "rad"),
        UnitDef::scaled(&["arcmin", "′"], "arcminute", PI / 10800.0, "rad"),
        UnitDef::scaled(&["arcsec", "″"], "arcsecond", PI / 648000.0, "rad"),
        UnitDef::scaled(&["au", "AU"], "astronomical unit", 149597870700.0, "m"),
        UnitDef::dimensionless(&["%", "percent"], "percent", 1e-2),
        UnitDef::dimensionless(&["ppm"], "parts per million", 1e-6),
        UnitDef::dimensionless(&["ppb"], "parts per billion", 1e-9),
        UnitDef::affine(&["degC", "°C", "celsius"], "degree Celsius", 1.0, 273.15, "K"),
    ]
}

pub fn si() -> Catalog {
    Catalog::new("si")
        .prefixes(prefixes())
        .units(base_units())
        .units(derived_units())
        .units(accepted_units())
}
