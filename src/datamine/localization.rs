//! Name tables from `lang.vromfs.bin_u/lang/*.csv`.

use crate::error::Result;
use crate::model::{format_vehicle_id, Localizer};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const FALLBACK_LANGUAGE: &str = "English";

/// Key -> display name, merged from every CSV of the language directory.
/// The first file (in name order) to define a key wins.
#[derive(Debug, Clone, Default)]
pub struct Localization {
    names: HashMap<String, String>,
}

impl Localization {
    pub fn load_dir(dir: &Path, language: &str) -> Result<Self> {
        let mut files: Vec<_> = fs::read_dir(dir)?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|e| e == "csv"))
            .collect();
        files.sort();
        let mut loc = Self::default();
        for path in files {
            let added = loc.add_csv(fs::File::open(&path)?, language)?;
            debug!(file = %path.display(), added, "localization table");
        }
        Ok(loc)
    }

    /// Merge one semicolon-delimited table. The first column is the key; the
    /// value column is picked by header (`<English>` style or bare). Empty
    /// cells fall back to the English column. Returns the number of new keys.
    pub fn add_csv<R: Read>(&mut self, reader: R, language: &str) -> Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| header_language(h).eq_ignore_ascii_case(name))
        };
        let fallback = column(FALLBACK_LANGUAGE);
        let Some(wanted) = column(language).or(fallback) else {
            return Ok(0);
        };

        let mut added = 0;
        for record in rdr.records() {
            let record = record?;
            let Some(key) = record.get(0).filter(|k| !k.is_empty()) else {
                continue;
            };
            let value = record
                .get(wanted)
                .filter(|v| !v.is_empty())
                .or_else(|| fallback.and_then(|i| record.get(i)).filter(|v| !v.is_empty()));
            if let Some(value) = value {
                if !self.names.contains_key(key) {
                    self.names.insert(key.to_string(), value.to_string());
                    added += 1;
                }
            }
        }
        Ok(added)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `<English>` -> `English`.
fn header_language(header: &str) -> &str {
    header
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
}

impl Localizer for Localization {
    fn localize_ammo_name(&self, raw_name: &str) -> Option<String> {
        self.get(raw_name)
            .or_else(|| self.get(&format!("{}/name/short", raw_name)))
            .map(str::to_string)
    }

    fn localize_vehicle_name(&self, vehicle_id: &str) -> String {
        self.get(&format!("{}_shop", vehicle_id))
            .or_else(|| self.get(&format!("{}_0", vehicle_id)))
            .map(str::to_string)
            .unwrap_or_else(|| format_vehicle_id(vehicle_id))
    }
}
