//! Vehicle identity and economy: nation, class, battle rating.

use crate::blk::BlkExt;
use crate::keys;
use crate::util::round_to;
use serde_json::Value;

pub const DEFAULT_BATTLE_RATING: f64 = 4.0;
pub const DEFAULT_RANK: u32 = 3;

/// Nation from the vehicle id prefix; unknown prefixes are returned as-is.
pub fn nation_from_id(vehicle_id: &str) -> String {
    let prefix = vehicle_id.split('_').next().unwrap_or(vehicle_id);
    match prefix {
        "germ" => "germany",
        "ussr" => "ussr",
        "us" => "usa",
        "uk" => "britain",
        "jp" => "japan",
        "cn" => "china",
        "it" => "italy",
        "fr" => "france",
        "sw" => "sweden",
        "il" => "israel",
        other => other,
    }
    .to_string()
}

/// Vehicle class from the tankmodel `type` tag.
pub fn vehicle_type_from_record(record: &Value) -> &'static str {
    match record.get_str(keys::VEHICLE_TYPE).unwrap_or_default() {
        "typeLightTank" => "light_tank",
        "typeHeavyTank" => "heavy_tank",
        "typeTankDestroyer" => "tank_destroyer",
        "typeSPAA" => "spaa",
        _ => "medium_tank",
    }
}

/// `round(economic_rank / 3 + 1, 1)`.
pub fn economic_rank_to_br(economic_rank: f64) -> f64 {
    round_to(economic_rank / 3.0 + 1.0, 1)
}

/// Battle rating and rank from a wpcost entry. Historical economic rank wins
/// over the arcade one; a missing entry or rank gives the defaults.
pub fn battle_rating_and_rank(wpcost_entry: Option<&Value>) -> (f64, u32) {
    let Some(entry) = wpcost_entry else {
        return (DEFAULT_BATTLE_RATING, DEFAULT_RANK);
    };
    let br = entry
        .get_num(keys::ECONOMIC_RANK_HISTORICAL)
        .or_else(|| entry.get_num(keys::ECONOMIC_RANK))
        .map(economic_rank_to_br)
        .unwrap_or(DEFAULT_BATTLE_RATING);
    let rank = entry
        .get(keys::RANK)
        .and_then(Value::as_u64)
        .and_then(|r| u32::try_from(r).ok())
        .unwrap_or(DEFAULT_RANK);
    (br, rank)
}

/// `clan`, `premium` or `regular`.
pub fn economic_type(wpcost_entry: Option<&Value>) -> &'static str {
    let Some(entry) = wpcost_entry else {
        return "regular";
    };
    if entry.get_str(keys::RESEARCH_TYPE) == Some(keys::CLAN_VEHICLE) {
        "clan"
    } else if entry.get_num(keys::VALUE) == Some(0.0) {
        "premium"
    } else {
        "regular"
    }
}
