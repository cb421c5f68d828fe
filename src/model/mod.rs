//! Vehicle performance model: mobility, armament, penetration, sensors.
//!
//! Everything under `model` is a pure function of already-parsed datamine
//! values. File access is injected through the traits in [`source`].

mod ammo;
mod armament;
mod drivetrain;
mod extract;
mod penetration;
mod reload;
mod source;
mod vehicle;

pub use ammo::{allowed_ammo_keys, bullet_to_ammo, extract_ammunition};
pub use armament::{find_primary_cannon, weapon_refs_from_record, weapon_refs_from_value};
pub use drivetrain::{compute_top_speeds, gearbox_from_record};
pub use extract::{build_performance, vehicle_from_record};
pub use penetration::{
    armor_power_at_0m, best_penetration, penetration_angles, penetration_at_angle,
    perforation_limit, MaterialCoefficients, GRAZING_CUTOFF_DEG,
};
pub use reload::{has_autoloader_sound, reload_profile, BASE_CREW_FACTOR, EXPERT_CREW_FACTOR};
pub use source::{format_vehicle_id, Localizer, NoLocalization, WeaponSource};
pub use vehicle::{
    battle_rating_and_rank, economic_rank_to_br, economic_type, nation_from_id,
    vehicle_type_from_record,
};

use serde::{Deserialize, Serialize};

/// Drivetrain inputs for the top speed model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearboxSpec {
    pub max_rpm: f64,
    pub tire_radius_m: f64,
    pub main_ratio: f64,
    pub side_ratio: f64,
    /// 0 is neutral, negative entries are reverse gears.
    pub gear_ratios: Vec<f64>,
}

/// Stabilizer axes present on a gun.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stabilizer {
    pub horizontal: bool,
    pub vertical: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilizerType {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

impl StabilizerType {
    pub fn from_axes(s: Option<Stabilizer>) -> Self {
        match s {
            Some(Stabilizer {
                horizontal: true,
                vertical: true,
            }) => StabilizerType::Both,
            Some(Stabilizer {
                horizontal: true, ..
            }) => StabilizerType::Horizontal,
            Some(Stabilizer { vertical: true, .. }) => StabilizerType::Vertical,
            _ => StabilizerType::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StabilizerType::None => "none",
            StabilizerType::Horizontal => "horizontal",
            StabilizerType::Vertical => "vertical",
            StabilizerType::Both => "both",
        }
    }
}

/// One entry of a vehicle's weapon list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponRef {
    pub trigger: String,
    /// Path of the weapon definition, e.g. `gameData/Weapons/groundModels_weapons/x.blk`.
    pub blk: String,
    /// Elevation speed, deg/s.
    pub speed_pitch: Option<f64>,
    /// Traverse speed, deg/s.
    pub speed_yaw: Option<f64>,
    /// `None` when the weapon has no stabilizer block at all.
    pub stabilizer: Option<Stabilizer>,
    pub pitch_limits: Option<[f64; 2]>,
    pub yaw_limits: Option<[f64; 2]>,
    pub auto_loader: bool,
}

impl WeaponRef {
    /// File stem of the weapon definition path.
    pub fn name(&self) -> &str {
        let file = self.blk.rsplit(['/', '\\']).next().unwrap_or(&self.blk);
        file.split('.').next().unwrap_or(file)
    }
}

/// Penetrator material for the Lanz–Odermatt model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenetratorMaterial {
    #[default]
    Tungsten,
    DepletedUranium,
}

impl PenetratorMaterial {
    /// Unrecognized tags fall back to tungsten.
    pub fn from_tag(tag: &str) -> Self {
        let t = tag.trim().to_lowercase().replace(['-', ' '], "_");
        match t.as_str() {
            "depleted_uranium" | "du" | "uranium" | "depleteduranium" => {
                PenetratorMaterial::DepletedUranium
            }
            _ => PenetratorMaterial::Tungsten,
        }
    }
}

/// Long-rod penetrator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanzOdermattParams {
    pub working_length_mm: f64,
    pub density_kg_m3: f64,
    pub material: PenetratorMaterial,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drag_coefficient: Option<f64>,
}

/// One `(penetration, distance)` entry of a round's armor power table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmorPowerPoint {
    pub penetration_mm: f64,
    pub distance_m: f64,
}

/// Penetration at 0°, 30° and 60°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenetrationAngles {
    pub angle0: f64,
    pub angle30: f64,
    pub angle60: f64,
}

/// Penetration of the best round, by range bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenetrationData {
    #[serde(rename = "at0m")]
    pub at_0m: PenetrationAngles,
}

/// One round available to the main gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmmoRecord {
    pub name: String,
    pub localized_name: String,
    #[serde(rename = "type")]
    pub ammo_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caliber_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muzzle_velocity_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanz_odermatt: Option<LanzOdermattParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penetration_0m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penetration_by_angle: Option<PenetrationAngles>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub armor_power: Vec<ArmorPowerPoint>,
}

/// Reload time per crew skill level, seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillReloads {
    pub base: f64,
    pub expert: f64,
    pub ace: f64,
}

/// Output of the reload/loader model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReloadProfile {
    pub reload_time_s: Option<f64>,
    pub by_skill: Option<SkillReloads>,
    pub auto_loader: bool,
}

/// Main gun descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainGun {
    pub name: String,
    pub blk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caliber_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_times: Option<SkillReloads>,
    pub auto_loader: bool,
}

/// Aggregate performance profile for one vehicle. Fields with no computable
/// value are `None` and omitted from serialized output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<f64>,
    /// Takeoff mass, tons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// hp/t.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_to_weight: Option<f64>,
    /// km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reverse_speed: Option<f64>,
    /// Stored (ace crew) reload of the main gun, seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_time: Option<f64>,
    /// Best round penetration at 0 m and 0°, mm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penetration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traverse_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_stabilizer: Option<bool>,
    #[serde(default)]
    pub stabilizer_type: StabilizerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traverse_range: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gunner_thermal_resolution: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commander_thermal_resolution: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gunner_thermal_diagonal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commander_thermal_diagonal: Option<f64>,
    #[serde(default)]
    pub stabilizer_value: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_range_value: Option<f64>,
    #[serde(default)]
    pub auto_loader: bool,
    #[serde(rename = "mainGun", default, skip_serializing_if = "Option::is_none")]
    pub main_gun: Option<MainGun>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ammunition: Vec<AmmoRecord>,
    #[serde(
        rename = "penetrationData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub penetration_data: Option<PenetrationData>,
}

/// Complete vehicle entry: identity, economy and performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    pub id: String,
    pub name: String,
    #[serde(rename = "localizedName")]
    pub localized_name: String,
    pub nation: String,
    pub rank: u32,
    pub battle_rating: f64,
    pub vehicle_type: String,
    pub economic_type: String,
    pub performance: PerformanceProfile,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub source: String,
}
