//! Built-in unit catalogs
//!
//! Each catalog is plain data. `builtin()` returns them in precedence
//! order: SI first, so a later catalog can never redefine an SI symbol.

mod si;
mod imperial;
mod data;
mod atomic;
mod historical;
mod level;

pub use si::si;
pub use imperial::{imperial, us_customary};
pub use data::data;
pub use atomic::{atomic, planck};
pub use historical::historical;
pub use level::level;

use crate::Catalog;

/// Every built-in catalog, highest precedence first
pub fn builtin() -> Vec<Catalog> {
    vec![
        si(),
        imperial(),
        us_customary(),
        data(),
        atomic(),
        planck(),
        historical(),
        level(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegistryBuilder;

    #[test]
    fn test_builtin_catalogs_build() {
        let registry = RegistryBuilder::new().catalogs(builtin()).build().unwrap();
        assert!(registry.len() > 100);
        for name in ["si", "imperial", "us-customary", "data", "atomic", "planck", "historical", "level"] {
            assert!(!registry.by_catalog(name).is_empty(), "catalog {} is empty", name);
        }
    }

    #[test]
    fn test_catalog_names_unique() {
        let catalogs = builtin();
        let mut names: Vec<&str> = catalogs.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalogs.len());
    }
}
