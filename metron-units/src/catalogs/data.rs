//! Information units with the binary (IEC) prefixes

use crate::Catalog;
use crate::unit::{PrefixDef, Prefixes, UnitDef};

pub fn data() -> Catalog {
    Catalog::new("data")
        .prefixes([
            PrefixDef::binary(&["Ki"], "kibi", 1024.0),
            PrefixDef::binary(&["Mi"], "mebi", 1024f64.powi(2)),
            PrefixDef::binary(&["Gi"], "gibi", 1024f64.powi(3)),
            PrefixDef::binary(&["Ti"], "tebi", 1024f64.powi(4)),
            PrefixDef::binary(&["Pi"], "pebi", 1024f64.powi(5)),
            PrefixDef::binary(&["Ei"], "exbi", 1024f64.powi(6)),
            PrefixDef::binary(&["Zi"], "zebi", 1024f64.powi(7)),
            PrefixDef::binary(&["Yi"], "yobi", 1024f64.powi(8)),
        ])
        .units([
            UnitDef::dimensionless(&["bit"], "bit", 1.0).with_prefixes(Prefixes::SiAndBinary),
            UnitDef::scaled(&["B", "byte"], "byte", 8.0, "bit").with_prefixes(Prefixes::SiAndBinary),
        ])
}
