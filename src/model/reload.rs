//! Reload time and auto-loader classification.

use super::{ReloadProfile, SkillReloads};
use crate::blk::find_any;
use crate::util::round_to;
use serde_json::Value;

/// Untrained crew reload relative to the stored (ace) value.
pub const BASE_CREW_FACTOR: f64 = 1.30;
/// Expert crew reload relative to the stored (ace) value.
pub const EXPERT_CREW_FACTOR: f64 = 1.15;

/// True when any string in the weapon definition contains `cue`
/// (case-insensitive), e.g. an auto-loader reload sound.
pub fn has_autoloader_sound(weapon_def: &Value, cue: &str) -> bool {
    let cue = cue.to_lowercase();
    find_any(weapon_def, &mut |v: &Value| {
        v.as_str()
            .map(|s| s.to_lowercase().contains(&cue))
            .unwrap_or(false)
    })
    .is_some()
}

/// Reload time from shot frequency, plus per-skill times.
///
/// `reload_time_s` is `1 / shot_frequency_hz` rounded to 3 places. Auto-loaders
/// reload in the same time for every crew; for manual loaders the stored time
/// is the ace time and base/expert are scaled from it, rounded to 2 places.
/// Times that round to zero are absent.
pub fn reload_profile(
    shot_frequency_hz: Option<f64>,
    auto_loader_hint: bool,
    has_autoloader_sound: bool,
) -> ReloadProfile {
    let auto_loader = auto_loader_hint || has_autoloader_sound;
    let reload_time_s = shot_frequency_hz
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| round_to(1.0 / f, 3))
        .filter(|t| *t > 0.0);
    let by_skill = reload_time_s.and_then(|ace| {
        let skills = if auto_loader {
            SkillReloads {
                base: ace,
                expert: ace,
                ace,
            }
        } else {
            SkillReloads {
                base: round_to(ace * BASE_CREW_FACTOR, 2),
                expert: round_to(ace * EXPERT_CREW_FACTOR, 2),
                ace: round_to(ace, 2),
            }
        };
        (skills.ace > 0.0).then_some(skills)
    });
    ReloadProfile {
        reload_time_s,
        by_skill,
        auto_loader,
    }
}
