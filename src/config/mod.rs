//! Configuration loading and validation.

use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Maximum number of tankmodel files to process in one scan (bound input size).
pub const MAX_VEHICLE_FILES: usize = 20_000;

/// Maximum size in bytes for a single blkx file.
pub const MAX_BLKX_FILE_BYTES: usize = 16 * 1024 * 1024;

/// Rolled homogeneous armour density (kg/m³).
pub const RHA_DENSITY_KG_M3: f64 = 7850.0;

/// Rolled homogeneous armour Brinell hardness.
pub const RHA_HARDNESS_BHN: f64 = 260.0;

pub const DEFAULT_GUNNER_TRIGGER: &str = "gunner0";
pub const DEFAULT_CANNON_TOKEN: &str = "cannon";
pub const DEFAULT_AUTOLOADER_CUE: &str = "autoloader";
pub const DEFAULT_KINETIC_TYPE_MARKER: &str = "apds_fs";
pub const DEFAULT_LANGUAGE: &str = "English";

/// Target plate the perforation model is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TargetArmor {
    #[serde(default = "default_target_density")]
    pub density_kg_m3: f64,
    #[serde(default = "default_target_hardness")]
    pub hardness_bhn: f64,
}

impl Default for TargetArmor {
    fn default() -> Self {
        Self {
            density_kg_m3: RHA_DENSITY_KG_M3,
            hardness_bhn: RHA_HARDNESS_BHN,
        }
    }
}

/// Tunables for extraction and modeling. Every field has a default, so an
/// empty `[model]` table (or no config file at all) is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Trigger tag shared by the main gun and its coaxial guns.
    #[serde(default = "default_gunner_trigger")]
    pub gunner_trigger: String,
    /// Case-insensitive token in the weapon blk path that marks a cannon.
    #[serde(default = "default_cannon_token")]
    pub cannon_token: String,
    /// Ammo type substrings that qualify a round for best-penetration selection.
    #[serde(default = "default_kinetic_type_markers")]
    pub kinetic_type_markers: Vec<String>,
    /// Substring of a sound cue that marks an auto-loader.
    #[serde(default = "default_autoloader_cue")]
    pub autoloader_cue: String,
    /// Localization CSV column header to read names from.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub target: TargetArmor,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            gunner_trigger: default_gunner_trigger(),
            cannon_token: default_cannon_token(),
            kinetic_type_markers: default_kinetic_type_markers(),
            autoloader_cue: default_autoloader_cue(),
            language: default_language(),
            target: TargetArmor::default(),
        }
    }
}

impl ModelConfig {
    /// True when the ammo type tag names a fin-stabilized kinetic round.
    pub fn is_kinetic_type(&self, ammo_type: &str) -> bool {
        let t = ammo_type.to_lowercase();
        self.kinetic_type_markers
            .iter()
            .any(|m| t.contains(&m.to_lowercase()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    model: ModelConfig,
}

/// Load `[model]` from a TOML file; `None` yields defaults.
pub fn load_model_config(path: Option<&Path>) -> Result<ModelConfig> {
    let Some(path) = path else {
        return Ok(ModelConfig::default());
    };
    let s = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&s)?;
    Ok(file.model)
}

fn default_target_density() -> f64 {
    RHA_DENSITY_KG_M3
}

fn default_target_hardness() -> f64 {
    RHA_HARDNESS_BHN
}

fn default_gunner_trigger() -> String {
    DEFAULT_GUNNER_TRIGGER.to_string()
}

fn default_cannon_token() -> String {
    DEFAULT_CANNON_TOKEN.to_string()
}

fn default_kinetic_type_markers() -> Vec<String> {
    vec![DEFAULT_KINETIC_TYPE_MARKER.to_string()]
}

fn default_autoloader_cue() -> String {
    DEFAULT_AUTOLOADER_CUE.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Path to the datamine checkout (or its aces.vromfs.bin_u directory).
    pub data_dir: PathBuf,
    /// Output directory for reports and SQLite DB.
    pub out_dir: PathBuf,
    /// Stop after this many vehicles.
    pub limit: Option<usize>,
    pub model: ModelConfig,
}

impl ScanConfig {
    pub fn new(data_dir: PathBuf, out_dir: PathBuf) -> Self {
        Self {
            data_dir,
            out_dir,
            limit: None,
            model: ModelConfig::default(),
        }
    }
}
