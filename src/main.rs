//! Ground vehicle performance & penetration profiler — CLI.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tankperf::config::{load_model_config, ModelConfig, ScanConfig};
use tankperf::datamine::{extract_datamine, Datamine};
use tankperf::model::VehicleData;
use tankperf::report::{diff_scans, write_html_report, write_json_report, write_performance_cache};
use tankperf::store::Store;
use tankperf::util::{init_logging, normalize_id};
use tankperf::{Error, Result};

#[derive(Parser)]
#[command(name = "tankperf")]
#[command(about = "Ground vehicle performance & penetration profiler for War Thunder datamine exports")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with a [model] table overriding the defaults.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tankmodels, ground weapons, wpcost and language tables from a zipped datamine.
    Extract {
        #[arg(long, value_name = "ZIP")]
        archive: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "datamine")]
        out: PathBuf,
    },
    /// Profile every tankmodel, store the scan and emit reports.
    Scan {
        #[arg(long, value_name = "PATH")]
        data_dir: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "out")]
        out: PathBuf,
        /// Stop after this many vehicles.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print a readable profile for one vehicle.
    Vehicle {
        #[arg(long, value_name = "PATH")]
        data_dir: Option<PathBuf>,
        #[arg(long, value_name = "DB")]
        scan_db: Option<PathBuf>,
        vehicle_id: String,
    },
    /// Compare the latest scans of two databases (e.g. before/after a patch).
    Diff {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let model = load_model_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { archive, out } => run_extract(&archive, &out),
        Commands::Scan {
            data_dir,
            out,
            limit,
        } => run_scan(ScanConfig {
            limit,
            model,
            ..ScanConfig::new(data_dir, out)
        }),
        Commands::Vehicle {
            data_dir,
            scan_db,
            vehicle_id,
        } => run_vehicle(data_dir, scan_db, &vehicle_id, &model),
        Commands::Diff { a, b, out } => run_diff(&a, &b, out),
    }
}

fn run_extract(archive: &Path, out: &Path) -> Result<()> {
    let n = extract_datamine(archive, out)?;
    tracing::info!("extracted {} file(s) to {}", n, out.display());
    Ok(())
}

fn run_scan(cfg: ScanConfig) -> Result<()> {
    if !cfg.data_dir.is_dir() {
        return Err(Error::NotFound(format!(
            "data directory {}",
            cfg.data_dir.display()
        )));
    }
    let data_dir = cfg.data_dir.canonicalize()?;
    let datamine = Datamine::open(&data_dir, &cfg.model)?;
    let vehicles = datamine.scan(&cfg.model, cfg.limit)?;

    fs::create_dir_all(&cfg.out_dir)?;
    let mut store = Store::open(&cfg.out_dir.join("scan.sqlite"))?;
    let scan_id = store.insert_scan(&data_dir.to_string_lossy(), &vehicles)?;
    tracing::info!("stored scan {} with {} vehicles", scan_id, vehicles.len());

    let json_path = cfg.out_dir.join("datamine.json");
    write_json_report(&vehicles, &json_path)?;
    write_performance_cache(&vehicles, &cfg.out_dir.join("vehicle_performance.json"))?;
    let html_dir = cfg.out_dir.join("html");
    write_html_report(&vehicles, &html_dir)?;
    tracing::info!("wrote {} and {}", json_path.display(), html_dir.display());
    Ok(())
}

fn run_vehicle(
    data_dir: Option<PathBuf>,
    scan_db: Option<PathBuf>,
    vehicle_id: &str,
    model: &ModelConfig,
) -> Result<()> {
    let key = normalize_id(vehicle_id);
    if let Some(db_path) = scan_db {
        let store = Store::open(&db_path)?;
        let scan = store
            .latest_scan()?
            .ok_or_else(|| Error::NotFound(format!("scan in {}", db_path.display())))?;
        let found = store
            .get_scan_vehicles(scan.id)?
            .into_iter()
            .find(|v| normalize_id(&v.id) == key || normalize_id(&v.localized_name) == key);
        return match found {
            Some(v) => {
                print_vehicle(&v);
                Ok(())
            }
            None => Err(Error::NotFound(format!("vehicle {} in scan", vehicle_id))),
        };
    }
    if let Some(dir) = data_dir {
        let datamine = Datamine::open(&dir, model)?;
        let v = datamine.vehicle(&key, model)?;
        print_vehicle(&v);
        return Ok(());
    }
    Err(Error::NotFound("provide --data-dir or --scan-db".to_string()))
}

fn opt(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{} {}", v, unit).trim_end().to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn print_vehicle(v: &VehicleData) {
    let p = &v.performance;
    println!("Vehicle: {} ({})", v.id, v.localized_name);
    println!(
        "Nation: {}  Class: {}  BR: {}  Rank: {}  Economy: {}",
        v.nation, v.vehicle_type, v.battle_rating, v.rank, v.economic_type
    );
    println!("\nMobility:");
    println!("  weight         {}", opt(p.weight, "t"));
    println!("  engine         {}", opt(p.horsepower, "hp"));
    println!("  power/weight   {}", opt(p.power_to_weight, "hp/t"));
    println!("  max speed      {}", opt(p.max_speed, "km/h"));
    println!("  reverse speed  {}", opt(p.max_reverse_speed, "km/h"));
    println!(
        "  crew           {}",
        p.crew_count.map(|c| c.to_string()).unwrap_or_else(|| "—".to_string())
    );

    println!("\nMain gun:");
    match &p.main_gun {
        Some(gun) => {
            println!("  {}  caliber={}", gun.name, opt(gun.caliber_mm, "mm"));
            println!(
                "  reload {}{}",
                opt(gun.reload_time, "s"),
                if gun.auto_loader { " (auto-loader)" } else { "" }
            );
            if let Some(r) = gun.reload_times {
                println!("  by crew skill  base={}  expert={}  ace={}", r.base, r.expert, r.ace);
            }
            println!(
                "  elevation {}  traverse {}  stabilizer {}",
                opt(p.elevation_speed, "°/s"),
                opt(p.traverse_speed, "°/s"),
                p.stabilizer_type.as_str()
            );
        }
        None => println!("  None"),
    }
    match p.penetration_data {
        Some(d) => println!(
            "  penetration  0°={}  30°={}  60°={} mm",
            d.at_0m.angle0, d.at_0m.angle30, d.at_0m.angle60
        ),
        None => println!("  penetration  —"),
    }

    println!("\nAmmunition:");
    for a in &p.ammunition {
        println!(
            "  {}  [{}]  pen={}",
            a.localized_name,
            a.ammo_type,
            opt(a.penetration_0m, "mm")
        );
    }
    if p.ammunition.is_empty() {
        println!("  None");
    }

    if let Some([w, h]) = p.gunner_thermal_resolution {
        println!("\nGunner thermal: {}x{}", w, h);
    }
    if let Some([w, h]) = p.commander_thermal_resolution {
        println!("Commander thermal: {}x{}", w, h);
    }
}

fn latest_vehicles(db: &Path) -> Result<Vec<VehicleData>> {
    let store = Store::open(db)?;
    let scan = store
        .latest_scan()?
        .ok_or_else(|| Error::NotFound(format!("scan in {}", db.display())))?;
    store.get_scan_vehicles(scan.id)
}

fn run_diff(a: &Path, b: &Path, out: Option<PathBuf>) -> Result<()> {
    let diff = diff_scans(&latest_vehicles(a)?, &latest_vehicles(b)?);

    println!("Diff: {} vs {}", a.display(), b.display());
    println!("Vehicles added: {}", diff.added.len());
    for id in &diff.added {
        println!("  + {}", id);
    }
    println!("Vehicles removed: {}", diff.removed.len());
    for id in &diff.removed {
        println!("  - {}", id);
    }
    println!("Common vehicles: {}", diff.common);
    if !diff.changes.is_empty() {
        println!("Changes (>1%):");
        for c in &diff.changes {
            println!("  {}  {}  {} -> {}", c.vehicle, c.metric, c.before, c.after);
        }
    }

    if let Some(dir) = out {
        fs::create_dir_all(&dir)?;
        let diff_json = serde_json::json!({
            "scan_a": a.to_string_lossy(),
            "scan_b": b.to_string_lossy(),
            "vehicles_added": diff.added,
            "vehicles_removed": diff.removed,
            "changes": diff.changes,
        });
        let path = dir.join("diff.json");
        fs::write(&path, serde_json::to_string_pretty(&diff_json)?)?;
        tracing::info!("wrote {}", path.display());
    }
    Ok(())
}
