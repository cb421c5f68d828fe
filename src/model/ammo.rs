//! Ammunition extraction from weapon definitions.
//!
//! A weapon definition carries a default `bullet` (one object or a list) and
//! any number of named ammo slots. A slot holds its own `bullet` entries
//! and/or an `ammoRack` of clusters, each cluster holding `shell` entries.

use super::penetration::{armor_power_at_0m, penetration_angles, perforation_limit};
use super::{AmmoRecord, ArmorPowerPoint, LanzOdermattParams, Localizer, PenetratorMaterial};
use crate::blk::{as_pair, one_or_many, BlkExt};
use crate::config::TargetArmor;
use crate::keys;
use crate::util::finite;
use serde_json::Value;
use std::collections::BTreeSet;

/// Ammo slot keys unlocked by the vehicle's modifications, with any
/// `_ammo_pack` suffix stripped. `None` when the record has no
/// modifications block (every slot is then allowed).
pub fn allowed_ammo_keys(record: &Value) -> Option<BTreeSet<String>> {
    let mods = record.get_table(keys::MODIFICATIONS)?.as_table()?;
    Some(
        mods.keys()
            .map(|k| k.strip_suffix(keys::AMMO_PACK_SUFFIX).unwrap_or(k).to_string())
            .collect(),
    )
}

/// All rounds of a weapon. The default bullet is always included; named
/// slots only when their key is in `allowed_keys` (or when it is `None`).
/// Rounds with a `bulletName` are de-duplicated by it, first occurrence
/// wins. Unnamed rounds are all kept, named `{slot}_{index}`.
pub fn extract_ammunition(
    weapon_def: &Value,
    allowed_keys: Option<&BTreeSet<String>>,
    localizer: &dyn Localizer,
    target: &TargetArmor,
) -> Vec<AmmoRecord> {
    let default_bullets = one_or_many(weapon_def.get(keys::BULLET));
    let nominal_caliber_m = weapon_def
        .get_num(keys::CALIBER)
        .or_else(|| default_bullets.iter().find_map(|b| b.get_num(keys::CALIBER)));

    let mut raw: Vec<(&Value, String)> = default_bullets
        .into_iter()
        .enumerate()
        .map(|(i, b)| (b, format!("{}_{}", keys::BULLET, i)))
        .collect();

    let Some(table) = weapon_def.as_table() else {
        return Vec::new();
    };
    for (slot, value) in table {
        if slot == keys::BULLET || !is_ammo_slot(value) {
            continue;
        }
        if allowed_keys.is_some_and(|allowed| !allowed.contains(slot)) {
            continue;
        }
        for (i, bullet) in slot_bullets(value).into_iter().enumerate() {
            raw.push((bullet, format!("{}_{}", slot, i)));
        }
    }

    let mut seen = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (bullet, fallback_name) in raw {
        if let Some(name) = bullet.get_str(keys::BULLET_NAME) {
            if !seen.insert(name.to_string()) {
                continue;
            }
        }
        out.push(bullet_to_ammo(
            bullet,
            &fallback_name,
            nominal_caliber_m,
            localizer,
            target,
        ));
    }
    out
}

fn is_ammo_slot(value: &Value) -> bool {
    value.is_object() && (value.get(keys::BULLET).is_some() || value.get(keys::AMMO_RACK).is_some())
}

/// Bullets of one slot: its own `bullet` entries, then rack cluster shells.
/// Clusters are one level deep; nothing below a shell is searched.
fn slot_bullets(slot: &Value) -> Vec<&Value> {
    let mut out = one_or_many(slot.get(keys::BULLET));
    if let Some(rack) = slot.get_table(keys::AMMO_RACK) {
        for cluster in one_or_many(rack.get(keys::CLUSTER)) {
            out.extend(one_or_many(cluster.get(keys::SHELL)));
        }
    }
    out
}

/// Convert one raw bullet. Datamine lengths are in metres.
pub fn bullet_to_ammo(
    bullet: &Value,
    fallback_name: &str,
    nominal_caliber_m: Option<f64>,
    localizer: &dyn Localizer,
    target: &TargetArmor,
) -> AmmoRecord {
    let name = bullet
        .get_str(keys::BULLET_NAME)
        .unwrap_or(fallback_name)
        .to_string();
    let localized_name = localizer
        .localize_ammo_name(&name)
        .unwrap_or_else(|| name.clone());
    let caliber_mm = bullet
        .get_num(keys::CALIBER)
        .or(nominal_caliber_m)
        .filter(|c| *c > 0.0)
        .map(|c| c * 1000.0);
    let muzzle_velocity_ms = bullet.get_num(keys::SPEED).filter(|v| *v > 0.0);
    let lanz_odermatt = lanz_odermatt_params(bullet);
    let armor_power = armor_power_table(bullet);

    let rod_diameter_mm = bullet
        .get_num(keys::DAMAGE_CALIBER)
        .filter(|d| *d > 0.0)
        .map(|d| d * 1000.0)
        .or(caliber_mm)
        .unwrap_or(0.0);
    let from_model = match (lanz_odermatt, muzzle_velocity_ms) {
        (Some(lo), Some(v)) => finite(perforation_limit(
            lo.working_length_mm,
            rod_diameter_mm,
            lo.density_kg_m3,
            target.density_kg_m3,
            v,
            lo.material,
            target.hardness_bhn,
            0.0,
        )),
        _ => None,
    };
    let penetration_0m = from_model.or_else(|| armor_power_at_0m(&armor_power));
    if penetration_0m.is_none() {
        tracing::debug!(round = %name, "no penetration source");
    }

    AmmoRecord {
        name,
        localized_name,
        ammo_type: bullet.get_str(keys::BULLET_TYPE).unwrap_or_default().to_string(),
        caliber_mm,
        mass_kg: bullet.get_num(keys::BULLET_MASS).filter(|m| *m > 0.0),
        muzzle_velocity_ms,
        lanz_odermatt,
        penetration_0m,
        penetration_by_angle: penetration_0m.map(penetration_angles),
        armor_power,
    }
}

fn lanz_odermatt_params(bullet: &Value) -> Option<LanzOdermattParams> {
    let lo = bullet.get_table(keys::LANZ_ODERMATT)?;
    let working_length_m = lo.get_num(keys::WORKING_LENGTH).filter(|l| *l > 0.0)?;
    let density = lo.get_num(keys::DENSITY).filter(|d| *d > 0.0)?;
    Some(LanzOdermattParams {
        working_length_mm: working_length_m * 1000.0,
        density_kg_m3: density,
        material: lo
            .get_str(keys::MATERIAL)
            .map(PenetratorMaterial::from_tag)
            .unwrap_or_default(),
        drag_coefficient: lo
            .get_num(keys::DRAG_CX)
            .or_else(|| bullet.get_num(keys::DRAG_CX)),
    })
}

/// `armorpower` entries are `[penetration_mm, distance_m]` pairs, sorted here
/// by ascending distance.
fn armor_power_table(bullet: &Value) -> Vec<ArmorPowerPoint> {
    let Some(table) = bullet.get_table(keys::ARMOR_POWER).and_then(Value::as_object) else {
        return Vec::new();
    };
    let mut points: Vec<ArmorPowerPoint> = table
        .values()
        .filter_map(as_pair)
        .map(|[penetration_mm, distance_m]| ArmorPowerPoint {
            penetration_mm,
            distance_m,
        })
        .collect();
    points.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    points
}
