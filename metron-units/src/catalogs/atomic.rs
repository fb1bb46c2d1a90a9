//! Atomic-scale and natural (Planck) units

use crate::Catalog;
use crate::unit::UnitDef;

pub fn atomic() -> Catalog {
    Catalog::new("atomic").units([
        UnitDef::scaled(&["eV", "electronvolt"], "electronvolt", 1.602176634e-19, "J").si_prefixed(),
        UnitDef::scaled(&["Da", "u", "dalton"], "dalton", 1.66053906660e-27, "kg").si_prefixed(),
        UnitDef::scaled(&["Å", "angstrom"], "ångström", 1e-10, "m"),
        UnitDef::scaled(&["barn"], "barn", 1e-28, "m^2"),
        UnitDef::scaled(&["Ha", "hartree"], "hartree", 4.3597447222071e-18, "J"),
        UnitDef::scaled(&["bohr", "a0"], "Bohr radius", 5.29177210903e-11, "m"),
        UnitDef::scaled(&["me"], "electron mass", 9.1093837015e-31, "kg"),
    ])
}

pub fn planck() -> Catalog {
    Catalog::new("planck").units([
        UnitDef::scaled(&["lP"], "Planck length", 1.616255e-35, "m"),
        UnitDef::scaled(&["mP"], "Planck mass", 2.176434e-8, "kg"),
        UnitDef::scaled(&["tP"], "Planck time", 5.391247e-44, "s"),
        UnitDef::scaled(&["TP"], "Planck temperature", 1.416784e32, "K"),
        UnitDef::scaled(&["qP"], "Planck charge", 1.875545956e-18, "C"),
    ])
}
