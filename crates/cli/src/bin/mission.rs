use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use flight_core::units::{m_to_ft, m_to_nm};
use flight_export::{MissionSummary, write_summary_json, write_trajectory_csv, writer_for_path};
use flight_vars::VariableSet;

#[derive(Parser)]
#[command(author, version, about = "Flight mission simulator")]
struct Cli {
    /// Mission definition file (YAML, or TOML by extension)
    #[arg(long)]
    mission_file: PathBuf,

    /// Mission identifier to simulate
    #[arg(long)]
    mission: String,

    /// Optional YAML file of external variable inputs (SI values)
    #[arg(long)]
    values: Option<PathBuf>,

    /// Write the trajectory as CSV to this path (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON mission summary to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Entry in the values file: scalar or vector input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueEntry {
    Scalar(f64),
    Vector(Vec<f64>),
}

fn load_values(path: &PathBuf) -> anyhow::Result<VariableSet> {
    let text = std::fs::read_to_string(path)?;
    let entries: BTreeMap<String, ValueEntry> = serde_yaml::from_str(&text)?;
    let mut provider = VariableSet::new();
    for (name, entry) in entries {
        match entry {
            ValueEntry::Scalar(value) => provider.insert(name, value),
            ValueEntry::Vector(values) => provider.insert_vector(name, values),
        }
    }
    Ok(provider)
}

fn format_duration(seconds: f64) -> (u64, u64, u64) {
    let total = seconds.max(0.0) as u64;
    (total / 3_600, (total % 3_600) / 60, total % 60)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .init();
    }

    let file = flight_config::load_mission_file(&cli.mission_file)?;
    let provider = match &cli.values {
        Some(path) => load_values(path)?,
        None => VariableSet::new(),
    };

    let setup = flight_config::build_mission_setup(&file, &cli.mission, &provider)?;
    let result = setup.run()?;

    let trajectory = &result.trajectory;
    let takeoff_mass = trajectory.first().map_or(0.0, |p| p.mass);
    let landing_mass = trajectory.last().map_or(0.0, |p| p.mass);
    let ceiling = trajectory
        .iter()
        .map(|p| p.altitude)
        .fold(f64::NEG_INFINITY, f64::max);
    let (h, m, s) = format_duration(result.block_time());

    println!("=== Mission Profile: {} ===", result.mission_id);
    println!(
        "Distance   : {:.1} NM ({:.0} km)",
        m_to_nm(result.total_distance()),
        result.total_distance() / 1_000.0
    );
    println!("Block time : {h}h {m:02}m {s:02}s");
    println!(
        "Block fuel : {:.0} kg (takeoff {:.0} kg, landing {:.0} kg)",
        result.block_fuel(),
        takeoff_mass,
        landing_mass
    );
    println!("Ceiling    : {:.0} ft", m_to_ft(ceiling));
    println!("Points     : {}", trajectory.len());

    if let Some(path) = &cli.csv {
        let writer = writer_for_path(path)?;
        write_trajectory_csv(writer, trajectory)?;
        if path != &PathBuf::from("-") {
            println!("Trajectory written to {}", path.display());
        }
    }
    if let Some(path) = &cli.json {
        let summary = MissionSummary {
            mission: result.mission_id.clone(),
            block_fuel_kg: result.block_fuel(),
            block_time_s: result.block_time(),
            distance_m: result.total_distance(),
            takeoff_mass_kg: takeoff_mass,
            landing_mass_kg: landing_mass,
            points: trajectory.len(),
        };
        write_summary_json(path, &summary)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}
