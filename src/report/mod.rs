//! JSON and HTML report generation, and scan-to-scan diffs.

use crate::error::Result;
use crate::model::{PerformanceProfile, VehicleData};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Relative change above which a metric is reported by [`diff_scans`].
pub const CHANGE_THRESHOLD: f64 = 0.01;

/// Full vehicle list (`datamine.json`).
pub fn write_json_report(vehicles: &[VehicleData], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(vehicles)?;
    fs::write(path, json)?;
    Ok(())
}

/// `id -> performance` map (`vehicle_performance.json`).
pub fn write_performance_cache(vehicles: &[VehicleData], path: &Path) -> Result<()> {
    let cache: BTreeMap<&str, &PerformanceProfile> = vehicles
        .iter()
        .map(|v| (v.id.as_str(), &v.performance))
        .collect();
    fs::write(path, serde_json::to_string_pretty(&cache)?)?;
    Ok(())
}

pub fn write_html_report(vehicles: &[VehicleData], out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("index.html"), render_index(vehicles))?;
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string())
}

fn render_index(vehicles: &[VehicleData]) -> String {
    let rows: String = vehicles
        .iter()
        .map(|v| {
            let p = &v.performance;
            format!(
                "<tr><td title=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&v.id),
                html_escape(&v.localized_name),
                html_escape(&v.nation),
                v.battle_rating,
                html_escape(&v.vehicle_type),
                cell(p.penetration),
                cell(p.max_speed),
                cell(p.reload_time),
                cell(p.power_to_weight),
                p.crew_count.map(|c| c.to_string()).unwrap_or_else(|| "—".to_string()),
                cell(p.gunner_thermal_diagonal),
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>tankperf – Vehicles</title>
<style>body{{font-family:system-ui,sans-serif;margin:1rem;}} table{{border-collapse:collapse;}} th,td{{border:1px solid #ccc;padding:6px;}} td{{text-align:right;}} td:first-child,td:nth-child(3),td:nth-child(5){{text-align:left;}}</style>
</head>
<body>
<h1>Ground Vehicle Performance</h1>
<p>{} vehicle(s).</p>
<input type="text" id="search" placeholder="Search vehicle, nation or class…" style="margin-bottom:8px;">
<table><thead><tr><th>Vehicle</th><th>Nation</th><th>BR</th><th>Class</th><th>Penetration (mm)</th><th>Max speed (km/h)</th><th>Reload (s)</th><th>hp/t</th><th>Crew</th><th>Gunner thermal</th></tr></thead>
<tbody>{}</tbody>
</table>
<script>
document.getElementById('search').oninput=function(){{
 var q=this.value.toLowerCase(), rows=document.querySelectorAll('tbody tr');
 rows.forEach(function(r){{
   r.style.display=(r.textContent+r.cells[0].title).toLowerCase().indexOf(q)===-1?'none':'';
 }});
}};
</script>
</body>
</html>"#,
        vehicles.len(),
        rows
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// One metric that moved by more than [`CHANGE_THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChange {
    pub vehicle: String,
    pub metric: &'static str,
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub common: usize,
    pub changes: Vec<MetricChange>,
}

/// Compare two scans by vehicle id: membership, best penetration and top
/// speed. A metric present on only one side is not a change.
pub fn diff_scans(before: &[VehicleData], after: &[VehicleData]) -> ScanDiff {
    let a: BTreeMap<&str, &VehicleData> = before.iter().map(|v| (v.id.as_str(), v)).collect();
    let b: BTreeMap<&str, &VehicleData> = after.iter().map(|v| (v.id.as_str(), v)).collect();
    let ids_a: BTreeSet<&str> = a.keys().copied().collect();
    let ids_b: BTreeSet<&str> = b.keys().copied().collect();

    let mut diff = ScanDiff {
        added: ids_b.difference(&ids_a).map(|s| s.to_string()).collect(),
        removed: ids_a.difference(&ids_b).map(|s| s.to_string()).collect(),
        ..Default::default()
    };
    for id in ids_a.intersection(&ids_b) {
        diff.common += 1;
        let (pa, pb) = (&a[id].performance, &b[id].performance);
        let metrics = [
            ("penetration", pa.penetration, pb.penetration),
            ("max_speed", pa.max_speed, pb.max_speed),
        ];
        for (metric, before, after) in metrics {
            if let (Some(before), Some(after)) = (before, after) {
                if significant_change(before, after) {
                    diff.changes.push(MetricChange {
                        vehicle: id.to_string(),
                        metric,
                        before,
                        after,
                    });
                }
            }
        }
    }
    diff
}

fn significant_change(before: f64, after: f64) -> bool {
    if before == 0.0 {
        return after != 0.0;
    }
    ((after - before) / before).abs() > CHANGE_THRESHOLD
}
