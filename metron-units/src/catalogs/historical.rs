//! CGS and other legacy units still found in the literature

use crate::Catalog;
use crate::unit::UnitDef;

pub fn historical() -> Catalog {
    Catalog::new("historical").units([
        UnitDef::scaled(&["dyn", "dyne"], "dyne", 1e-5, "N"),
        UnitDef::scaled(&["erg"], "erg", 1e-7, "J"),
        UnitDef::scaled(&["G", "gauss"], "gauss", 1e-4, "T"),
        UnitDef::scaled(&["Mx", "maxwell"], "maxwell", 1e-8, "Wb"),
        UnitDef::scaled(&["cal", "calorie"], "thermochemical calorie", 4.184, "J").si_prefixed(),
        UnitDef::scaled(&["atm"], "standard atmosphere", 101325.0, "Pa"),
        UnitDef::scaled(&["Torr", "torr"], "torr", 1.0 / 760.0, "atm"),
        UnitDef::scaled(&["mmHg"], "millimetre of mercury", 133.322387415, "Pa"),
        UnitDef::scaled(&["bar"], "bar", 1e5, "Pa").si_prefixed(),
        UnitDef::scaled(&["P", "poise"], "poise", 0.1, "Pa s").si_prefixed(),
        UnitDef::scaled(&["St", "stokes"], "stokes", 1e-4, "m^2 s^-1").si_prefixed(),
        UnitDef::scaled(&["Ci", "curie"], "curie", 3.7e10, "Bq"),
        UnitDef::scaled(&["R", "roentgen"], "roentgen", 2.58e-4, "C kg^-1"),
        UnitDef::scaled(&["ly", "lightyear"], "light-year", 9460730472580800.0, "m"),
        UnitDef::scaled(&["pc", "parsec"], "parsec", 3.0856775814913673e16, "m"),
    ])
}
