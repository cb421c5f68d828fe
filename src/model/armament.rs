//! Weapon list normalization and primary cannon lookup.

use super::{Stabilizer, WeaponRef};
use crate::blk::{one_or_many, BlkExt};
use crate::keys;
use serde_json::Value;

/// Parse one weapon list entry.
pub fn weapon_ref_from_value(value: &Value) -> WeaponRef {
    let stabilizer = value.get_table(keys::GUN_STABILIZER).map(|s| Stabilizer {
        horizontal: s.get_bool(keys::HAS_HORIZONTAL).unwrap_or(false),
        vertical: s.get_bool(keys::HAS_VERTICAL).unwrap_or(false),
    });
    let limits = value.get_table(keys::LIMITS);
    WeaponRef {
        trigger: value.get_str(keys::TRIGGER).unwrap_or_default().to_string(),
        blk: value.get_str(keys::BLK).unwrap_or_default().to_string(),
        speed_pitch: value.get_num(keys::SPEED_PITCH),
        speed_yaw: value.get_num(keys::SPEED_YAW),
        stabilizer,
        pitch_limits: limits.and_then(|l| l.get_pair(keys::PITCH)),
        yaw_limits: limits.and_then(|l| l.get_pair(keys::YAW)),
        auto_loader: value.get_bool(keys::AUTO_LOADER).unwrap_or(false),
    }
}

/// Weapon entries from a `Weapon` field holding a single object or a list.
pub fn weapon_refs_from_value(weapons: Option<&Value>) -> Vec<WeaponRef> {
    one_or_many(weapons)
        .into_iter()
        .map(weapon_ref_from_value)
        .collect()
}

/// Weapon entries of a tankmodel (`commonWeapons.Weapon`).
pub fn weapon_refs_from_record(record: &Value) -> Vec<WeaponRef> {
    weapon_refs_from_value(
        record
            .get_table(keys::COMMON_WEAPONS)
            .and_then(|c| c.get(keys::WEAPON)),
    )
}

/// First weapon on the gunner trigger whose definition path names a cannon.
/// Coaxial machine guns share the trigger but not the path token.
pub fn find_primary_cannon<'a>(
    weapons: &'a [WeaponRef],
    gunner_trigger: &str,
    cannon_token: &str,
) -> Option<&'a WeaponRef> {
    let token = cannon_token.to_lowercase();
    weapons
        .iter()
        .find(|w| w.trigger == gunner_trigger && w.blk.to_lowercase().contains(&token))
}
