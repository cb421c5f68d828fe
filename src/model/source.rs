//! Data access the model needs from its caller.

use serde_json::Value;
use std::sync::Arc;

/// Resolves a weapon `blk` reference to its parsed definition.
/// `None` means no data, not a fault.
pub trait WeaponSource {
    fn load_weapon_definition(&self, path: &str) -> Option<Arc<Value>>;
}

impl<F> WeaponSource for F
where
    F: Fn(&str) -> Option<Arc<Value>>,
{
    fn load_weapon_definition(&self, path: &str) -> Option<Arc<Value>> {
        self(path)
    }
}

/// Human-readable names.
pub trait Localizer {
    fn localize_ammo_name(&self, raw_name: &str) -> Option<String>;

    /// Always returns something usable; the default formats the id.
    fn localize_vehicle_name(&self, vehicle_id: &str) -> String {
        format_vehicle_id(vehicle_id)
    }
}

/// Localizer with no tables: ammo names stay raw, vehicle ids are formatted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalization;

impl Localizer for NoLocalization {
    fn localize_ammo_name(&self, _raw_name: &str) -> Option<String> {
        None
    }
}

/// `ussr_t_80bvm` -> `Ussr T 80bvm`.
pub fn format_vehicle_id(vehicle_id: &str) -> String {
    vehicle_id
        .split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_ids_in_title_case() {
        assert_eq!(format_vehicle_id("ussr_t_80bvm"), "Ussr T 80bvm");
        assert_eq!(format_vehicle_id("germ_leopard-2A6"), "Germ Leopard 2a6");
        assert_eq!(NoLocalization.localize_vehicle_name("us_m1a2"), "Us M1a2");
    }

    #[test]
    fn closures_are_weapon_sources() {
        let def = Arc::new(serde_json::json!({"shotFreq": 0.1}));
        let one = move |p: &str| (p == "a.blk").then(|| def.clone());
        assert!(one.load_weapon_definition("a.blk").is_some());
        assert!(one.load_weapon_definition("b.blk").is_none());
        let nothing = |_: &str| -> Option<Arc<Value>> { None };
        assert!(nothing.load_weapon_definition("a.blk").is_none());
    }
}
