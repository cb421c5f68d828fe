//! Datamine field names.

// tankmodel root
pub const VEHICLE_PHYS: &str = "VehiclePhys";
pub const MASS: &str = "Mass";
pub const TAKEOFF: &str = "TakeOff";
pub const ENGINE: &str = "engine";
pub const HORSE_POWERS: &str = "horsePowers";
pub const MAX_RPM: &str = "maxRPM";
pub const MECHANICS: &str = "mechanics";
pub const DRIVE_GEAR_RADIUS: &str = "driveGearRadius";
pub const MAIN_GEAR_RATIO: &str = "mainGearRatio";
pub const SIDE_GEAR_RATIO: &str = "sideGearRatio";
pub const GEAR_RATIOS: &str = "gearRatios";
pub const RATIO: &str = "ratio";
pub const MAX_FWD_SPEED: &str = "maxFwdSpeed";
pub const MAX_REV_SPEED: &str = "maxRevSpeed";
pub const DAMAGE_PARTS: &str = "DamageParts";
pub const CREW: &str = "crew";
pub const CREW_NODE_SUFFIX: &str = "_dm";
pub const VEHICLE_TYPE: &str = "type";
pub const MODIFICATIONS: &str = "modifications";
pub const AMMO_PACK_SUFFIX: &str = "_ammo_pack";
pub const NIGHT_VISION_SYSTEM: &str = "night_vision_system";
pub const EFFECTS: &str = "effects";
pub const NIGHT_VISION: &str = "nightVision";
pub const GUNNER_THERMAL: &str = "gunnerThermal";
pub const COMMANDER_THERMAL: &str = "commanderViewThermal";
pub const RESOLUTION: &str = "resolution";

// weapon references
pub const COMMON_WEAPONS: &str = "commonWeapons";
pub const WEAPON: &str = "Weapon";
pub const TRIGGER: &str = "trigger";
pub const BLK: &str = "blk";
pub const SPEED_PITCH: &str = "speedPitch";
pub const SPEED_YAW: &str = "speedYaw";
pub const GUN_STABILIZER: &str = "gunStabilizer";
pub const HAS_HORIZONTAL: &str = "hasHorizontal";
pub const HAS_VERTICAL: &str = "hasVertical";
pub const LIMITS: &str = "limits";
pub const PITCH: &str = "pitch";
pub const YAW: &str = "yaw";
pub const AUTO_LOADER: &str = "autoLoader";

// weapon definition
pub const BULLET: &str = "bullet";
pub const SHOT_FREQ: &str = "shotFreq";
pub const AMMO_RACK: &str = "ammoRack";
pub const CLUSTER: &str = "cluster";
pub const SHELL: &str = "shell";

// bullet
pub const BULLET_NAME: &str = "bulletName";
pub const BULLET_TYPE: &str = "bulletType";
pub const CALIBER: &str = "caliber";
pub const DAMAGE_CALIBER: &str = "damageCaliber";
pub const BULLET_MASS: &str = "mass";
pub const SPEED: &str = "speed";
pub const DRAG_CX: &str = "Cx";
pub const LANZ_ODERMATT: &str = "lanzOdermatt";
pub const WORKING_LENGTH: &str = "workingLength";
pub const DENSITY: &str = "density";
pub const MATERIAL: &str = "material";
pub const ARMOR_POWER: &str = "armorpower";

// wpcost
pub const ECONOMIC_RANK_HISTORICAL: &str = "economicRankHistorical";
pub const ECONOMIC_RANK: &str = "economicRank";
pub const RANK: &str = "rank";
pub const RESEARCH_TYPE: &str = "researchType";
pub const CLAN_VEHICLE: &str = "clanVehicle";
pub const VALUE: &str = "value";
