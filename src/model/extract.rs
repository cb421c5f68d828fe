//! Build a performance profile from a parsed tankmodel.

use super::{
    allowed_ammo_keys, battle_rating_and_rank, best_penetration, compute_top_speeds,
    economic_type, extract_ammunition, find_primary_cannon, gearbox_from_record,
    has_autoloader_sound, nation_from_id, reload_profile, vehicle_type_from_record,
    weapon_refs_from_record, Localizer, MainGun, PenetrationData, PerformanceProfile,
    ReloadProfile, StabilizerType, VehicleData, WeaponRef, WeaponSource,
};
use crate::blk::BlkExt;
use crate::config::ModelConfig;
use crate::keys;
use crate::util::{finite, round_to};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::debug;

/// Crew node roles, matched against `DamageParts.crew` keys minus `_dm`.
const CREW_ROLES: [&str; 6] = [
    "driver",
    "gunner",
    "loader",
    "commander",
    "machine_gunner",
    "radioman",
];

/// Takeoff masses at or below this (kg) are treated as missing.
const MIN_TAKEOFF_KG: f64 = 1000.0;

/// Full vehicle entry: identity and economy around [`build_performance`].
pub fn vehicle_from_record(
    vehicle_id: &str,
    record: &Value,
    wpcost_entry: Option<&Value>,
    weapons: &dyn WeaponSource,
    localizer: &dyn Localizer,
    cfg: &ModelConfig,
) -> VehicleData {
    let (battle_rating, rank) = battle_rating_and_rank(wpcost_entry);
    VehicleData {
        id: vehicle_id.to_string(),
        name: vehicle_id.to_string(),
        localized_name: localizer.localize_vehicle_name(vehicle_id),
        nation: nation_from_id(vehicle_id),
        rank,
        battle_rating,
        vehicle_type: vehicle_type_from_record(record).to_string(),
        economic_type: economic_type(wpcost_entry).to_string(),
        performance: build_performance(record, weapons, localizer, cfg),
        image_url: format!("vehicles/{}.png", vehicle_id),
        source: "datamine_tankmodel".to_string(),
    }
}

/// Aggregate mobility, crew, gun, armament and sensor data of one tankmodel.
/// Never fails: whatever cannot be derived stays `None`.
pub fn build_performance(
    record: &Value,
    weapons: &dyn WeaponSource,
    localizer: &dyn Localizer,
    cfg: &ModelConfig,
) -> PerformanceProfile {
    let mut perf = PerformanceProfile::default();
    apply_mobility(&mut perf, record);
    perf.crew_count = crew_count(record);

    let refs = weapon_refs_from_record(record);
    match find_primary_cannon(&refs, &cfg.gunner_trigger, &cfg.cannon_token) {
        Some(gun) => {
            apply_gun_mounting(&mut perf, gun);
            apply_armament(&mut perf, record, gun, weapons, localizer, cfg);
        }
        None => debug!(weapons = refs.len(), "no primary cannon"),
    }

    let (gunner, commander) = thermal_resolutions(record);
    perf.gunner_thermal_resolution = gunner;
    perf.commander_thermal_resolution = commander;
    perf.gunner_thermal_diagonal = gunner.and_then(thermal_diagonal);
    perf.commander_thermal_diagonal = commander.and_then(thermal_diagonal);

    perf.stabilizer_value = u8::from(perf.has_stabilizer == Some(true));
    perf.elevation_range_value = perf
        .elevation_range
        .and_then(|[min, max]| finite(round_to((max - min).abs(), 1)));
    perf
}

fn apply_mobility(perf: &mut PerformanceProfile, record: &Value) {
    let phys = record.get_table(keys::VEHICLE_PHYS);
    perf.weight = phys
        .and_then(|p| p.get_table(keys::MASS))
        .and_then(|m| m.get_num(keys::TAKEOFF))
        .filter(|kg| *kg > MIN_TAKEOFF_KG)
        .map(|kg| round_to(kg / 1000.0, 2));
    perf.horsepower = phys
        .and_then(|p| p.get_table(keys::ENGINE))
        .and_then(|e| e.get_num(keys::HORSE_POWERS));
    perf.power_to_weight = match (perf.horsepower, perf.weight) {
        (Some(hp), Some(t)) if hp != 0.0 && t > 0.0 => finite(round_to(hp / t, 2)),
        _ => None,
    };

    let (forward, reverse) = gearbox_from_record(record)
        .map(|g| compute_top_speeds(&g))
        .unwrap_or((None, None));
    if forward.is_none() || reverse.is_none() {
        debug!(?forward, ?reverse, "gearbox speed incomplete, using direct fields");
    }
    perf.max_speed = forward.or_else(|| direct_speed(record, keys::MAX_FWD_SPEED));
    perf.max_reverse_speed = reverse.or_else(|| direct_speed(record, keys::MAX_REV_SPEED));
}

fn direct_speed(record: &Value, key: &str) -> Option<f64> {
    record.get_num(key).map(|s| round_to(s, 1))
}

/// Number of distinct crew roles. A node like `loader_2_dm` counts as `loader`.
fn crew_count(record: &Value) -> Option<u32> {
    let crew = record
        .get_table(keys::DAMAGE_PARTS)?
        .get_table(keys::CREW)?
        .as_table()?;
    let roles: BTreeSet<&str> = crew
        .keys()
        .filter_map(|k| k.strip_suffix(keys::CREW_NODE_SUFFIX))
        .filter_map(|role| {
            if CREW_ROLES.contains(&role) {
                return Some(role);
            }
            let base = role.split('_').next()?;
            CREW_ROLES.contains(&base).then_some(base)
        })
        .collect();
    u32::try_from(roles.len()).ok().filter(|n| *n > 0)
}

fn apply_gun_mounting(perf: &mut PerformanceProfile, gun: &WeaponRef) {
    perf.elevation_speed = gun.speed_pitch.map(|s| round_to(s, 1));
    perf.traverse_speed = gun.speed_yaw.map(|s| round_to(s, 1));
    perf.stabilizer_type = StabilizerType::from_axes(gun.stabilizer);
    perf.has_stabilizer = Some(perf.stabilizer_type != StabilizerType::None);
    perf.elevation_range = gun.pitch_limits;
    perf.traverse_range = gun.yaw_limits;
}

fn apply_armament(
    perf: &mut PerformanceProfile,
    record: &Value,
    gun: &WeaponRef,
    weapons: &dyn WeaponSource,
    localizer: &dyn Localizer,
    cfg: &ModelConfig,
) {
    let Some(def) = weapons.load_weapon_definition(&gun.blk) else {
        debug!(blk = %gun.blk, "weapon definition not available");
        let reload = reload_profile(None, gun.auto_loader, false);
        perf.auto_loader = reload.auto_loader;
        perf.main_gun = Some(main_gun(gun, None, &reload));
        return;
    };

    let allowed = allowed_ammo_keys(record);
    let ammo = extract_ammunition(&def, allowed.as_ref(), localizer, &cfg.target);
    let hint = gun.auto_loader || def.get_bool(keys::AUTO_LOADER).unwrap_or(false);
    let reload = reload_profile(
        def.get_num(keys::SHOT_FREQ),
        hint,
        has_autoloader_sound(&def, &cfg.autoloader_cue),
    );

    let best = best_penetration(&ammo, |t| cfg.is_kinetic_type(t));
    perf.penetration = best.and_then(|a| a.penetration_0m);
    perf.penetration_data = best
        .and_then(|a| a.penetration_by_angle)
        .map(|at_0m| PenetrationData { at_0m });
    if perf.penetration.is_none() {
        debug!(blk = %gun.blk, rounds = ammo.len(), "no round with a penetration value");
    }

    let caliber_mm = def
        .get_num(keys::CALIBER)
        .filter(|c| *c > 0.0)
        .map(|c| c * 1000.0)
        .or_else(|| ammo.first().and_then(|a| a.caliber_mm));
    perf.reload_time = reload.reload_time_s;
    perf.auto_loader = reload.auto_loader;
    perf.main_gun = Some(main_gun(gun, caliber_mm, &reload));
    perf.ammunition = ammo;
}

fn main_gun(gun: &WeaponRef, caliber_mm: Option<f64>, reload: &ReloadProfile) -> MainGun {
    MainGun {
        name: gun.name().to_string(),
        blk: gun.blk.clone(),
        caliber_mm,
        reload_time: reload.reload_time_s,
        reload_times: reload.by_skill,
        auto_loader: reload.auto_loader,
    }
}

/// Night vision block from the thermal modification, else from the root.
fn night_vision(record: &Value) -> Option<&Value> {
    record
        .get_table(keys::MODIFICATIONS)
        .and_then(|m| m.get_table(keys::NIGHT_VISION_SYSTEM))
        .and_then(|n| n.get_table(keys::EFFECTS))
        .and_then(|e| e.get_table(keys::NIGHT_VISION))
        .filter(|nv| nv.as_table().is_some_and(|t| !t.is_empty()))
        .or_else(|| record.get_table(keys::NIGHT_VISION))
}

fn thermal_resolutions(record: &Value) -> (Option<[u32; 2]>, Option<[u32; 2]>) {
    let Some(nv) = night_vision(record) else {
        return (None, None);
    };
    let resolution = |key: &str| {
        let [w, h] = nv.get_table(key)?.get_pair(keys::RESOLUTION)?;
        (w >= 0.0 && h >= 0.0).then_some([w as u32, h as u32])
    };
    (
        resolution(keys::GUNNER_THERMAL),
        resolution(keys::COMMANDER_THERMAL),
    )
}

fn thermal_diagonal([w, h]: [u32; 2]) -> Option<f64> {
    let (w, h) = (f64::from(w), f64::from(h));
    finite(round_to((w * w + h * h).sqrt(), 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoLocalization;
    use serde_json::json;
    use std::sync::Arc;

    const CANNON_BLK: &str = "gameData/Weapons/groundModels_weapons/120mm_rh120_l55_cannon.blk";

    fn tankmodel() -> Value {
        json!({
            "type": "typeMediumTank",
            "VehiclePhys": {
                "Mass": {"TakeOff": 62300.0},
                "engine": {"horsePowers": 1500.0, "maxRPM": 2600.0},
                "mechanics": {
                    "driveGearRadius": 0.35,
                    "mainGearRatio": 1.0,
                    "sideGearRatio": 8.0,
                    "gearRatios": {"ratio": [-1.5, 0.0, 3.0, 0.5]}
                }
            },
            "DamageParts": {
                "crew": {
                    "driver_dm": {}, "gunner_dm": {}, "loader_dm": {},
                    "commander_dm": {}, "loader_2_dm": {}, "ammo_dm": {}
                }
            },
            "commonWeapons": {
                "Weapon": [
                    {"trigger": "gunner0", "blk": "gameData/Weapons/groundModels_weapons/7_62mm_mg3.blk"},
                    {
                        "trigger": "gunner0",
                        "blk": CANNON_BLK,
                        "speedPitch": 6.04,
                        "speedYaw": 40.0,
                        "gunStabilizer": {"hasHorizontal": true, "hasVertical": true},
                        "limits": {"pitch": [-9.0, 20.0], "yaw": [-180.0, 180.0]}
                    }
                ]
            },
            "modifications": {
                "apfsds_ammo_pack": {},
                "night_vision_system": {
                    "effects": {
                        "nightVision": {
                            "gunnerThermal": {"resolution": [1200, 800]},
                            "commanderViewThermal": {"resolution": [800, 600]}
                        }
                    }
                }
            }
        })
    }

    fn cannon_def() -> Value {
        json!({
            "shotFreq": 0.166667,
            "bullet": {
                "bulletName": "120mm_dm12",
                "bulletType": "heat_fs_tank",
                "caliber": 0.12,
                "speed": 1140.0,
                "armorpower": {"ArmorPower0m": [480.0, 10.0]}
            },
            "apfsds": {
                "bullet": {
                    "bulletName": "120mm_dm53",
                    "bulletType": "apds_fs_long_tank",
                    "speed": 1670.0,
                    "damageCaliber": 0.024,
                    "lanzOdermatt": {"workingLength": 0.66, "density": 18200.0, "material": "tungsten"}
                }
            },
            "he_pack": {"bullet": {"bulletName": "120mm_dm11", "bulletType": "he_frag_tank"}}
        })
    }

    fn source(path: &str) -> Option<Arc<Value>> {
        (path == CANNON_BLK).then(|| Arc::new(cannon_def()))
    }

    fn profile(record: &Value) -> PerformanceProfile {
        build_performance(record, &source, &NoLocalization, &ModelConfig::default())
    }

    #[test]
    fn full_profile() {
        let p = profile(&tankmodel());
        assert_eq!(p.weight, Some(62.3));
        assert_eq!(p.horsepower, Some(1500.0));
        assert_eq!(p.power_to_weight, Some(24.08));
        assert_eq!(p.max_speed, Some(85.8));
        assert_eq!(p.max_reverse_speed, Some(28.6));
        assert_eq!(p.crew_count, Some(4));
        assert_eq!(p.elevation_speed, Some(6.0));
        assert_eq!(p.stabilizer_type, StabilizerType::Both);
        assert_eq!(p.stabilizer_value, 1);
        assert_eq!(p.elevation_range_value, Some(29.0));
        assert_eq!(p.gunner_thermal_diagonal, Some(1442.2));
        assert_eq!(p.commander_thermal_diagonal, Some(1000.0));

        let names: Vec<&str> = p.ammunition.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["120mm_dm12", "120mm_dm53"]);
        let pen = p.penetration.unwrap();
        assert!((pen - 629.9).abs() <= 0.1);
        assert_eq!(p.penetration_data.unwrap().at_0m.angle0, pen);

        assert_eq!(p.reload_time, Some(6.0));
        let gun = p.main_gun.unwrap();
        assert_eq!(gun.name, "120mm_rh120_l55_cannon");
        assert_eq!(gun.caliber_mm, Some(120.0));
        let r = gun.reload_times.unwrap();
        assert_eq!((r.base, r.expert, r.ace), (7.8, 6.9, 6.0));
        assert!(!gun.auto_loader);
    }

    #[test]
    fn canonical_output_names() {
        let v = serde_json::to_value(profile(&tankmodel())).unwrap();
        assert!(v["penetration"].is_number());
        assert!(v["mainGun"]["reloadTimes"]["expert"].is_number());
        assert!(v["penetrationData"]["at0m"]["angle30"].is_number());
        assert!(v["penetrationData"]["at0m"]["angle60"].is_number());
    }

    #[test]
    fn gearbox_fallback_to_direct_fields() {
        let mut record = tankmodel();
        record["VehiclePhys"]["engine"]["maxRPM"] = json!(0.0);
        record["maxFwdSpeed"] = json!(70.04);
        let p = profile(&record);
        assert_eq!(p.max_speed, Some(70.0));
        assert_eq!(p.max_reverse_speed, None);
    }

    #[test]
    fn no_cannon_leaves_armament_absent() {
        let mut record = tankmodel();
        record["commonWeapons"]["Weapon"] =
            json!({"trigger": "gunner0", "blk": "gameData/Weapons/groundModels_weapons/30mm_2a38m.blk"});
        let p = profile(&record);
        assert!(p.main_gun.is_none());
        assert!(p.penetration.is_none());
        assert!(p.ammunition.is_empty());
        assert_eq!(p.stabilizer_type, StabilizerType::None);
        assert_eq!(p.stabilizer_value, 0);
        assert_eq!(p.has_stabilizer, None);
        assert!(p.max_speed.is_some());
    }

    #[test]
    fn missing_weapon_file_keeps_gun_mounting() {
        let nothing = |_: &str| -> Option<Arc<Value>> { None };
        let p = build_performance(&tankmodel(), &nothing, &NoLocalization, &ModelConfig::default());
        assert_eq!(p.traverse_speed, Some(40.0));
        let gun = p.main_gun.unwrap();
        assert_eq!(gun.reload_time, None);
        assert!(p.penetration.is_none());
    }

    #[test]
    fn empty_record_yields_no_numbers() {
        let p = profile(&json!({}));
        let v = serde_json::to_value(&p).unwrap();
        let obj = v.as_object().unwrap();
        let keys: Vec<&String> = obj.keys().collect();
        assert_eq!(keys, vec!["auto_loader", "stabilizer_type", "stabilizer_value"]);
    }

    #[test]
    fn light_takeoff_mass_is_ignored() {
        let mut record = tankmodel();
        record["VehiclePhys"]["Mass"]["TakeOff"] = json!(900.0);
        let p = profile(&record);
        assert_eq!(p.weight, None);
        assert_eq!(p.power_to_weight, None);
    }

    #[test]
    fn root_night_vision_when_no_modification() {
        let mut record = tankmodel();
        record["modifications"] = json!({});
        record["nightVision"] = json!({"gunnerThermal": {"resolution": [500, 300]}});
        let p = profile(&record);
        assert_eq!(p.gunner_thermal_resolution, Some([500, 300]));
        assert_eq!(p.gunner_thermal_diagonal, Some(583.1));
        assert_eq!(p.commander_thermal_resolution, None);
        // an empty modification set unlocks no named slots
        assert_eq!(p.ammunition.len(), 1);
    }

    #[test]
    fn vehicle_envelope() {
        let wpcost = json!({"economicRankHistorical": 35, "rank": 8, "value": 0});
        let v = vehicle_from_record(
            "germ_leopard_2a6",
            &tankmodel(),
            Some(&wpcost),
            &source,
            &NoLocalization,
            &ModelConfig::default(),
        );
        assert_eq!(v.nation, "germany");
        assert_eq!(v.battle_rating, 12.7);
        assert_eq!(v.economic_type, "premium");
        assert_eq!(v.localized_name, "Germ Leopard 2a6");
        assert_eq!(v.image_url, "vehicles/germ_leopard_2a6.png");
        assert_eq!(v.vehicle_type, "medium_tank");
    }
}
