//! Top speed from gearbox parameters.

use super::GearboxSpec;
use crate::blk::BlkExt;
use crate::keys;
use crate::util::{finite, round_to};
use serde_json::Value;
use std::f64::consts::PI;

/// Read the drivetrain blocks of a tankmodel. `None` when either the engine
/// or the mechanics block is missing. Missing ratios default to 1, missing
/// rpm/radius to 0 (which the speed model treats as not computable).
pub fn gearbox_from_record(record: &Value) -> Option<GearboxSpec> {
    let phys = record.get_table(keys::VEHICLE_PHYS)?;
    let engine = phys.get_table(keys::ENGINE)?;
    let mechanics = phys.get_table(keys::MECHANICS)?;
    let gear_ratios = mechanics
        .get_table(keys::GEAR_RATIOS)
        .and_then(|g| g.get(keys::RATIO))
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default();
    Some(GearboxSpec {
        max_rpm: engine.get_num(keys::MAX_RPM).unwrap_or(0.0),
        tire_radius_m: mechanics.get_num(keys::DRIVE_GEAR_RADIUS).unwrap_or(0.0),
        main_ratio: mechanics.get_num(keys::MAIN_GEAR_RATIO).unwrap_or(1.0),
        side_ratio: mechanics.get_num(keys::SIDE_GEAR_RATIO).unwrap_or(1.0),
        gear_ratios,
    })
}

/// Forward and reverse top speed in km/h, rounded to 0.1.
///
/// Forward uses the smallest positive ratio (top gear), reverse the negative
/// ratio closest to zero. A side with no gears of its sign is `None`; both
/// sides are `None` when rpm, tire radius or side ratio is not positive.
pub fn compute_top_speeds(spec: &GearboxSpec) -> (Option<f64>, Option<f64>) {
    if !(spec.max_rpm > 0.0 && spec.tire_radius_m > 0.0 && spec.side_ratio > 0.0) {
        return (None, None);
    }
    let forward = spec
        .gear_ratios
        .iter()
        .copied()
        .filter(|r| *r > 0.0)
        .min_by(f64::total_cmp);
    let reverse = spec
        .gear_ratios
        .iter()
        .copied()
        .filter(|r| *r < 0.0)
        .map(f64::abs)
        .min_by(f64::total_cmp);
    (
        forward.and_then(|r| wheel_speed_kmh(spec, r)),
        reverse.and_then(|r| wheel_speed_kmh(spec, r)),
    )
}

fn wheel_speed_kmh(spec: &GearboxSpec, gear_ratio: f64) -> Option<f64> {
    let total_ratio = gear_ratio * spec.side_ratio * spec.main_ratio;
    let wheel_rpm = spec.max_rpm / total_ratio;
    let speed_ms = wheel_rpm * 2.0 * PI * spec.tire_radius_m / 60.0;
    finite(round_to(speed_ms * 3.6, 1))
}
