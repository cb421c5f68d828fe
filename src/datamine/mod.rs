//! Datamine checkout access: directory layout, cached blkx loading, wpcost
//! and archive extraction.

mod localization;

pub use localization::Localization;

use crate::blk::BlkExt;
use crate::config::{ModelConfig, MAX_BLKX_FILE_BYTES, MAX_VEHICLE_FILES};
use crate::error::{Error, Result};
use crate::model::{vehicle_from_record, VehicleData, WeaponSource};
use crate::util::{check_file_bounds, normalize_id};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const ACES_DIR: &str = "aces.vromfs.bin_u";
pub const CHAR_DIR: &str = "char.vromfs.bin_u";
pub const LANG_DIR: &str = "lang.vromfs.bin_u";

const GAMEDATA: &str = "gamedata";
const TANKMODELS: &str = "units/tankmodels";
const WPCOST: &str = "config/wpcost.blkx";
const LANG_CSV_DIR: &str = "lang";
const BLKX_EXT: &str = "blkx";

/// Archive members kept by [`extract_datamine`], as (prefix, suffix).
const EXTRACT_PATTERNS: [(&str, &str); 4] = [
    ("aces.vromfs.bin_u/gamedata/units/tankmodels/", ".blkx"),
    ("aces.vromfs.bin_u/gamedata/weapons/groundmodels_weapons/", ".blkx"),
    ("char.vromfs.bin_u/config/wpcost.blkx", ""),
    ("lang.vromfs.bin_u/lang/", ".csv"),
];

/// Where the pieces of a datamine checkout live.
#[derive(Debug, Clone)]
pub struct DatamineLayout {
    pub gamedata: PathBuf,
    pub tankmodels: PathBuf,
    pub wpcost: Option<PathBuf>,
    pub lang_dir: Option<PathBuf>,
}

impl DatamineLayout {
    /// Accepts the checkout root or its `aces.vromfs.bin_u` directory.
    pub fn resolve(root: &Path) -> Result<Self> {
        let root = root.canonicalize()?;
        let aces = if root.join(ACES_DIR).is_dir() {
            root.join(ACES_DIR)
        } else if root.join(GAMEDATA).is_dir() {
            root.clone()
        } else {
            return Err(Error::Layout(format!(
                "no {} or {} under {}",
                ACES_DIR,
                GAMEDATA,
                root.display()
            )));
        };
        let gamedata = aces.join(GAMEDATA);
        let tankmodels = gamedata.join(TANKMODELS);
        if !tankmodels.is_dir() {
            return Err(Error::Layout(format!(
                "{} has no {}",
                gamedata.display(),
                TANKMODELS
            )));
        }
        let base = aces.parent().unwrap_or(&aces);
        let wpcost = Some(base.join(CHAR_DIR).join(WPCOST)).filter(|p| p.is_file());
        let lang_dir = Some(base.join(LANG_DIR).join(LANG_CSV_DIR)).filter(|p| p.is_dir());
        Ok(Self {
            gamedata,
            tankmodels,
            wpcost,
            lang_dir,
        })
    }

    /// Tankmodel files sorted by name, bounded by `MAX_VEHICLE_FILES`.
    pub fn tankmodel_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.tankmodels)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == BLKX_EXT) {
                files.push(path);
            }
        }
        files.sort();
        if files.len() > MAX_VEHICLE_FILES {
            warn!(
                found = files.len(),
                max = MAX_VEHICLE_FILES,
                "too many tankmodels, truncating"
            );
            files.truncate(MAX_VEHICLE_FILES);
        }
        Ok(files)
    }

    /// `None` for ids that are not a single plain file name.
    pub fn tankmodel_path(&self, vehicle_id: &str) -> Option<PathBuf> {
        let id = normalize_id(vehicle_id);
        let mut parts = Path::new(&id).components();
        match (parts.next(), parts.next()) {
            (Some(Component::Normal(_)), None) => {
                Some(self.tankmodels.join(format!("{}.{}", id, BLKX_EXT)))
            }
            _ => None,
        }
    }
}

/// Vehicle id of a tankmodel file (its stem).
pub fn vehicle_id_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Parse one blkx (JSON) file, refusing oversized files.
pub fn read_blkx(path: &Path) -> Result<Value> {
    check_file_bounds(path, MAX_BLKX_FILE_BYTES)?;
    let s = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

/// Memoized blkx loader, shared by every vehicle of a scan. Failed loads
/// are remembered too, so a broken weapon file is reported once.
#[derive(Debug)]
pub struct BlkCache {
    gamedata: PathBuf,
    entries: Mutex<HashMap<PathBuf, Option<Arc<Value>>>>,
}

impl BlkCache {
    pub fn new(gamedata: impl Into<PathBuf>) -> Self {
        Self {
            gamedata: gamedata.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Option<Arc<Value>>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load `path`, or return the earlier result for it. The file is read
    /// unlocked; when two loads race, the first stored result wins.
    pub fn load(&self, path: &Path) -> Option<Arc<Value>> {
        if let Some(hit) = self.entries().get(path) {
            return hit.clone();
        }
        let loaded = match read_blkx(path) {
            Ok(v) => Some(Arc::new(v)),
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "blkx not found");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable blkx");
                None
            }
        };
        self.entries()
            .entry(path.to_path_buf())
            .or_insert(loaded)
            .clone()
    }

    /// `gameData/Weapons/groundModels_weapons/x.blk` ->
    /// `<gamedata>/weapons/groundmodels_weapons/x.blkx`. References that
    /// climb out of the gamedata tree resolve to nothing.
    pub fn weapon_path(&self, blk_ref: &str) -> Option<PathBuf> {
        let rel = blk_ref.trim().replace('\\', "/").to_lowercase();
        let rel = rel.strip_prefix("gamedata/").unwrap_or(&rel);
        let rel = rel.strip_suffix(".blk").unwrap_or(rel);
        if rel.is_empty() {
            return None;
        }
        if !Path::new(rel)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.gamedata.join(format!("{}.{}", rel, BLKX_EXT)))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WeaponSource for BlkCache {
    fn load_weapon_definition(&self, path: &str) -> Option<Arc<Value>> {
        self.load(&self.weapon_path(path)?)
    }
}

/// Economy table (`wpcost.blkx`), keyed by vehicle id.
#[derive(Debug, Clone, Default)]
pub struct Wpcost {
    root: Value,
}

impl Wpcost {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            root: read_blkx(path)?,
        })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn entry(&self, vehicle_id: &str) -> Option<&Value> {
        self.root.get_table(vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.root.as_table().map_or(0, |t| t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a scan reads, opened once.
pub struct Datamine {
    pub layout: DatamineLayout,
    pub weapons: BlkCache,
    pub localization: Localization,
    pub wpcost: Wpcost,
}

impl Datamine {
    /// Open a checkout. Missing wpcost or language tables are logged and
    /// replaced by empty ones.
    pub fn open(root: &Path, cfg: &ModelConfig) -> Result<Self> {
        let layout = DatamineLayout::resolve(root)?;
        let wpcost = match &layout.wpcost {
            Some(p) => Wpcost::load(p).unwrap_or_else(|e| {
                warn!(path = %p.display(), error = %e, "wpcost unreadable");
                Wpcost::default()
            }),
            None => {
                warn!("no wpcost.blkx, battle ratings use defaults");
                Wpcost::default()
            }
        };
        let localization = match &layout.lang_dir {
            Some(dir) => Localization::load_dir(dir, &cfg.language).unwrap_or_else(|e| {
                warn!(dir = %dir.display(), error = %e, "localization unreadable");
                Localization::default()
            }),
            None => {
                warn!("no lang directory, names stay raw");
                Localization::default()
            }
        };
        info!(
            tankmodels = %layout.tankmodels.display(),
            wpcost_entries = wpcost.len(),
            names = localization.len(),
            "datamine opened"
        );
        Ok(Self {
            weapons: BlkCache::new(&layout.gamedata),
            layout,
            localization,
            wpcost,
        })
    }

    /// Profile of one tankmodel file.
    pub fn vehicle_from_file(&self, path: &Path, cfg: &ModelConfig) -> Result<VehicleData> {
        let id = vehicle_id_from_path(path)
            .ok_or_else(|| Error::NotFound(path.display().to_string()))?;
        let record = read_blkx(path)?;
        Ok(vehicle_from_record(
            &id,
            &record,
            self.wpcost.entry(&id),
            &self.weapons,
            &self.localization,
            cfg,
        ))
    }

    /// Profile of one vehicle by id.
    pub fn vehicle(&self, vehicle_id: &str, cfg: &ModelConfig) -> Result<VehicleData> {
        match self.layout.tankmodel_path(vehicle_id) {
            Some(path) if path.is_file() => self.vehicle_from_file(&path, cfg),
            _ => Err(Error::NotFound(format!("vehicle {}", vehicle_id))),
        }
    }

    /// Profile every tankmodel. A vehicle that fails is logged and skipped.
    pub fn scan(&self, cfg: &ModelConfig, limit: Option<usize>) -> Result<Vec<VehicleData>> {
        let mut files = self.layout.tankmodel_files()?;
        if let Some(n) = limit {
            files.truncate(n);
        }
        let mut vehicles = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            match self.vehicle_from_file(path, cfg) {
                Ok(v) => vehicles.push(v),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping vehicle"),
            }
            if (i + 1) % 100 == 0 {
                info!(done = i + 1, total = files.len(), "scanning");
            }
        }
        info!(
            vehicles = vehicles.len(),
            weapon_files = self.weapons.len(),
            "scan complete"
        );
        Ok(vehicles)
    }
}

/// Copy the tankmodels, ground weapons, wpcost and language tables of a
/// zipped datamine into `out_dir`, keeping the vromfs layout. Returns the
/// number of files written.
pub fn extract_datamine(archive: &Path, out_dir: &Path) -> Result<usize> {
    fs::create_dir_all(out_dir)?;
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;
    let mut count = 0usize;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let Some(name) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping unsafe archive path");
            continue;
        };
        let Some(rel) = datamine_relative_path(&name) else {
            continue;
        };
        if entry.size() > MAX_BLKX_FILE_BYTES as u64 {
            warn!(path = %rel, size = entry.size(), "skipping oversized file");
            continue;
        }
        let out_path = out_dir.join(&rel);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = fs::File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        count += 1;
    }
    info!(files = count, out = %out_dir.display(), "datamine extracted");
    Ok(count)
}

/// Archive member path relative to the datamine root, when it is one of the
/// kept files. Any folder above the vromfs directories is dropped.
fn datamine_relative_path(name: &Path) -> Option<String> {
    let lower = name.to_string_lossy().replace('\\', "/").to_lowercase();
    EXTRACT_PATTERNS.iter().find_map(|(prefix, suffix)| {
        let start = lower.find(prefix)?;
        let rel = &lower[start..];
        let keep = if suffix.is_empty() {
            rel == *prefix
        } else {
            rel.ends_with(suffix) && !rel[prefix.len()..].contains('/')
        };
        keep.then(|| rel.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let aces = dir.path().join(ACES_DIR).join("gamedata");
        write(
            &aces.join("units/tankmodels/germ_test.blkx"),
            &json!({"commonWeapons": {"Weapon": {
                "trigger": "gunner0",
                "blk": "gameData/Weapons/groundModels_weapons/105mm_test_cannon.blk"
            }}})
            .to_string(),
        );
        write(&aces.join("units/tankmodels/broken.blkx"), "{not json");
        write(
            &aces.join("weapons/groundmodels_weapons/105mm_test_cannon.blkx"),
            r#"{"shotFreq": 0.125, "bullet": {"bulletName": "105mm_ap", "bulletType": "apds_fs_tank",
                "armorpower": {"ArmorPower0m": [300.0, 10.0]}}}"#,
        );
        write(
            &dir.path().join(CHAR_DIR).join(WPCOST),
            r#"{"germ_test": {"economicRank": 9, "rank": 4, "value": 1000}}"#,
        );
        dir
    }

    #[test]
    fn resolves_root_and_aces_dir() {
        let dir = checkout();
        let layout = DatamineLayout::resolve(dir.path()).unwrap();
        assert!(layout.wpcost.is_some());
        assert!(layout.lang_dir.is_none());
        let from_aces = DatamineLayout::resolve(&dir.path().join(ACES_DIR)).unwrap();
        assert_eq!(from_aces.tankmodels, layout.tankmodels);
        assert!(from_aces.wpcost.is_some());
        assert_eq!(layout.tankmodel_files().unwrap().len(), 2);
    }

    #[test]
    fn unknown_tree_is_a_layout_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DatamineLayout::resolve(dir.path()),
            Err(Error::Layout(_))
        ));
    }

    #[test]
    fn weapon_refs_map_to_lowercase_blkx() {
        let cache = BlkCache::new("/dm/gamedata");
        assert_eq!(
            cache.weapon_path("gameData/Weapons/groundModels_weapons/120mm_RH120.blk"),
            Some(PathBuf::from("/dm/gamedata/weapons/groundmodels_weapons/120mm_rh120.blkx"))
        );
        assert_eq!(cache.weapon_path("gameData/../../etc/passwd.blk"), None);
        assert_eq!(cache.weapon_path(""), None);
    }

    #[test]
    fn cache_remembers_misses() {
        let dir = checkout();
        let layout = DatamineLayout::resolve(dir.path()).unwrap();
        let cache = BlkCache::new(&layout.gamedata);
        let hit = cache.load_weapon_definition("gameData/Weapons/groundModels_weapons/105mm_test_cannon.blk");
        assert!(hit.is_some());
        let again = cache.load_weapon_definition("gameData/Weapons/groundModels_weapons/105mm_test_cannon.blk");
        assert!(Arc::ptr_eq(&hit.unwrap(), &again.unwrap()));
        assert!(cache
            .load_weapon_definition("gameData/Weapons/groundModels_weapons/missing.blk")
            .is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_loads_share_one_entry() {
        let dir = checkout();
        let layout = DatamineLayout::resolve(dir.path()).unwrap();
        let cache = BlkCache::new(&layout.gamedata);
        let blk = "gameData/Weapons/groundModels_weapons/105mm_test_cannon.blk";
        let loaded: Vec<Arc<Value>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.load_weapon_definition(blk)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });
        let stored = cache.load_weapon_definition(blk).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(stored["shotFreq"], 0.125);
        assert!(loaded.iter().all(|v| Arc::ptr_eq(v, &stored)));
    }

    #[test]
    fn scan_skips_broken_tankmodels() {
        let dir = checkout();
        let cfg = ModelConfig::default();
        let dm = Datamine::open(dir.path(), &cfg).unwrap();
        let vehicles = dm.scan(&cfg, None).unwrap();
        assert_eq!(vehicles.len(), 1);
        let v = &vehicles[0];
        assert_eq!(v.id, "germ_test");
        assert_eq!(v.battle_rating, 4.0);
        assert_eq!(v.rank, 4);
        assert_eq!(v.performance.penetration, Some(300.0));
        assert_eq!(v.performance.reload_time, Some(8.0));
        assert!(matches!(dm.vehicle("nope", &cfg), Err(Error::NotFound(_))));
    }

    #[test]
    fn vehicle_ids_cannot_leave_tankmodels() {
        let dir = checkout();
        write(
            &dir.path().join(ACES_DIR).join("gamedata/units/outside.blkx"),
            "{}",
        );
        let cfg = ModelConfig::default();
        let dm = Datamine::open(dir.path(), &cfg).unwrap();
        assert!(dm.layout.tankmodel_path("germ_test").is_some());
        assert_eq!(dm.layout.tankmodel_path("../outside"), None);
        assert_eq!(dm.layout.tankmodel_path("/etc/passwd"), None);
        assert_eq!(dm.layout.tankmodel_path(""), None);
        assert!(matches!(dm.vehicle("../outside", &cfg), Err(Error::NotFound(_))));
        assert!(dm.vehicle("germ_test", &cfg).is_ok());
    }

    #[test]
    fn extracts_only_datamine_members() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("dm.zip");
        let mut zip = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
        let opts = zip::write::SimpleFileOptions::default();
        for name in [
            "WT-Datamine-master/aces.vromfs.bin_u/gamedata/units/tankmodels/germ_test.blkx",
            "WT-Datamine-master/aces.vromfs.bin_u/gamedata/weapons/groundmodels_weapons/a.blkx",
            "WT-Datamine-master/aces.vromfs.bin_u/gamedata/flightmodels/plane.blkx",
            "WT-Datamine-master/char.vromfs.bin_u/config/wpcost.blkx",
            "WT-Datamine-master/lang.vromfs.bin_u/lang/units.csv",
            "WT-Datamine-master/README.md",
        ] {
            zip.start_file(name, opts).unwrap();
            zip.write_all(b"{}").unwrap();
        }
        zip.finish().unwrap();

        let out = dir.path().join("out");
        assert_eq!(extract_datamine(&archive, &out).unwrap(), 4);
        assert!(out.join("aces.vromfs.bin_u/gamedata/units/tankmodels/germ_test.blkx").is_file());
        assert!(out.join("lang.vromfs.bin_u/lang/units.csv").is_file());
        assert!(!out.join("aces.vromfs.bin_u/gamedata/flightmodels").exists());
    }
}
