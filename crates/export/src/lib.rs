//! Export helpers for trajectory CSV tables and JSON mission summaries.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::to_writer_pretty;

use flight_core::{FlightPoint, Trajectory};

/// One CSV row of the trajectory table.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryRecord<'a> {
    pub time_s: f64,
    pub altitude_m: f64,
    pub ground_distance_m: f64,
    pub mass_kg: f64,
    pub true_airspeed_m_s: f64,
    pub equivalent_airspeed_m_s: f64,
    pub mach: f64,
    pub cl: f64,
    pub cd: f64,
    pub thrust_n: f64,
    pub thrust_rate: f64,
    pub engine_setting: &'a str,
    pub segment: &'a str,
    pub phase: &'a str,
}

impl<'a> TrajectoryRecord<'a> {
    pub fn from_point(point: &'a FlightPoint) -> Self {
        Self {
            time_s: point.time,
            altitude_m: point.altitude,
            ground_distance_m: point.ground_distance,
            mass_kg: point.mass,
            true_airspeed_m_s: point.true_airspeed,
            equivalent_airspeed_m_s: point.equivalent_airspeed,
            mach: point.mach,
            cl: point.cl,
            cd: point.cd,
            thrust_n: point.thrust,
            thrust_rate: point.thrust_rate,
            engine_setting: point
                .engine_setting
                .map_or("", |setting| match setting {
                    flight_core::EngineSetting::Takeoff => "takeoff",
                    flight_core::EngineSetting::Climb => "climb",
                    flight_core::EngineSetting::Cruise => "cruise",
                    flight_core::EngineSetting::Idle => "idle",
                }),
            segment: &point.segment_name,
            phase: &point.phase_name,
        }
    }
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Write the whole trajectory as a CSV table.
pub fn write_trajectory_csv<W: Write>(writer: W, trajectory: &Trajectory) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in trajectory.iter() {
        csv_writer.serialize(TrajectoryRecord::from_point(point))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Mission-level summary written as a JSON sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct MissionSummary {
    pub mission: String,
    pub block_fuel_kg: f64,
    pub block_time_s: f64,
    pub distance_m: f64,
    pub takeoff_mass_kg: f64,
    pub landing_mass_kg: f64,
    pub points: usize,
}

/// Write the mission summary sidecar, creating parent directories.
pub fn write_summary_json(path: &Path, summary: &MissionSummary) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    to_writer_pretty(File::create(path)?, summary)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_core::SpeedKind;

    fn sample_trajectory() -> Trajectory {
        let mut first = FlightPoint {
            altitude: 0.0,
            mass: 70_000.0,
            true_airspeed: 80.0,
            segment_name: "takeoff".to_string(),
            phase_name: "departure".to_string(),
            ..Default::default()
        };
        first.complete_speeds(SpeedKind::TrueAirspeed);
        let mut second = first.clone();
        second.time = 60.0;
        second.mass = 69_900.0;
        let mut trajectory = Trajectory::new();
        trajectory.push(first);
        trajectory.push(second);
        trajectory
    }

    #[test]
    fn csv_has_header_and_one_row_per_point() {
        let trajectory = sample_trajectory();
        let mut buffer = Vec::new();
        write_trajectory_csv(&mut buffer, &trajectory).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.trim_end().lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time_s,altitude_m,ground_distance_m,mass_kg"));
        assert!(lines[1].contains("takeoff"));
        assert!(lines[1].contains("departure"));
    }

    #[test]
    fn summary_sidecar_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");
        let summary = MissionSummary {
            mission: "operational".to_string(),
            block_fuel_kg: 12_345.6,
            block_time_s: 21_000.0,
            distance_m: 3_704_000.0,
            takeoff_mass_kg: 70_000.0,
            landing_mass_kg: 57_654.4,
            points: 1_234,
        };
        write_summary_json(&path, &summary).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["mission"], "operational");
        assert_eq!(parsed["points"], 1_234);
    }
}
