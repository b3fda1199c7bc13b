//! End-to-end mission simulation from the sample declarative definition.

use std::path::PathBuf;

use approx::assert_relative_eq;

use flight_mission_simulator::config::{build_mission_setup, load_mission_file};
use flight_mission_simulator::constants::NAUTICAL_MILE;
use flight_mission_simulator::export::write_trajectory_csv;
use flight_mission_simulator::vars::VariableSet;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join("missions")
        .join("medium_range.yaml")
}

fn provider() -> VariableSet {
    let mut provider = VariableSet::new();
    provider.insert("data:mission:operational:taxi_out:thrust_rate", 0.3);
    provider
}

#[test]
fn sample_mission_flies_its_route_range() {
    let file = load_mission_file(sample_path()).unwrap();
    let setup = build_mission_setup(&file, "operational", &provider()).unwrap();
    let result = setup.run().unwrap();
    let points = result.trajectory.points();

    // The route spans from the end of the takeoff transition to the last
    // descent point; its length must close on the declared 800 NM range.
    let route_start = points
        .iter()
        .filter(|p| p.segment_name == "takeoff")
        .next_back()
        .expect("takeoff points");
    let route_end = points
        .iter()
        .filter(|p| p.phase_name == "descent")
        .next_back()
        .expect("descent points");
    let route_distance = route_end.ground_distance - route_start.ground_distance;
    assert_relative_eq!(route_distance, 800.0 * NAUTICAL_MILE, epsilon = 500.0);

    // Cruise reached the declared flight level.
    let ceiling = points.iter().map(|p| p.altitude).fold(0.0, f64::max);
    assert_relative_eq!(ceiling, 32_000.0 * 0.3048, epsilon = 1.0);
}

#[test]
fn sample_mission_is_time_monotonic_and_burns_fuel() {
    let file = load_mission_file(sample_path()).unwrap();
    let setup = build_mission_setup(&file, "operational", &provider()).unwrap();
    let result = setup.run().unwrap();
    let points = result.trajectory.points();
    assert!(points.len() > 100);

    for pair in points.windows(2) {
        assert!(
            pair[1].time >= pair[0].time,
            "time regressed at t={}",
            pair[0].time
        );
        // Every mass change in this mission is a loss.
        assert!(
            pair[1].mass <= pair[0].mass + 1e-9,
            "mass increased at t={}",
            pair[0].time
        );
    }

    assert!(result.block_fuel() > 1_000.0);
    assert!(result.block_time() > 3_600.0);

    // The landing transition appends the reserve point: same time, less mass.
    let last = points.last().unwrap();
    let before_reserve = &points[points.len() - 2];
    assert_relative_eq!(last.time, before_reserve.time);
    let reserve = before_reserve.mass - last.mass;
    assert_relative_eq!(
        reserve,
        0.03 * (before_reserve.mass - reserve),
        epsilon = 1e-6
    );
}

#[test]
fn trajectory_exports_one_csv_row_per_point() {
    let file = load_mission_file(sample_path()).unwrap();
    let setup = build_mission_setup(&file, "operational", &provider()).unwrap();
    let result = setup.run().unwrap();

    let mut buffer = Vec::new();
    write_trajectory_csv(&mut buffer, &result.trajectory).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.trim_end().lines().count(), result.trajectory.len() + 1);
    assert!(text.contains("taxi"));
    assert!(text.contains("idle_descent"));
}
