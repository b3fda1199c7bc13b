use assert_cmd::Command;
use predicates::prelude::*;

const MISSION_YAML: &str = r#"
aircraft:
  reference_area: 120.0
  polar:
    cl: [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.2]
    cd: [0.02, 0.0218, 0.0272, 0.0362, 0.0488, 0.065, 0.0848]
  propulsion:
    sea_level_thrust: 240000.0
    tsfc_per_hour: 0.06
start:
  altitude: 0.0
  mass: { value: 70.0, unit: t }
  true_airspeed: 0.0
phases:
  departure:
    parts:
      - segment: taxi
        target:
          time: { value: 5.0, unit: min }
        thrust_rate: ~
        true_airspeed: 15.0
missions:
  operational:
    parts:
      - phase: departure
      - segment: transition
        name: takeoff
        target:
          delta_time: 90.0
          delta_mass: 120.0
          altitude: 450.0
          true_airspeed: 120.0
"#;

const VALUES_YAML: &str = r#"
data:mission:operational:departure:thrust_rate: 0.3
"#;

#[test]
fn runs_a_mission_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mission_path = dir.path().join("mission.yaml");
    let values_path = dir.path().join("values.yaml");
    let csv_path = dir.path().join("trajectory.csv");
    let json_path = dir.path().join("summary.json");
    std::fs::write(&mission_path, MISSION_YAML).unwrap();
    std::fs::write(&values_path, VALUES_YAML).unwrap();

    Command::cargo_bin("mission")
        .unwrap()
        .args([
            "--mission-file",
            mission_path.to_str().unwrap(),
            "--mission",
            "operational",
            "--values",
            values_path.to_str().unwrap(),
            "--csv",
            csv_path.to_str().unwrap(),
            "--json",
            json_path.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mission Profile: operational"))
        .stdout(predicate::str::contains("Block fuel"));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("time_s,altitude_m"));
    assert!(csv.lines().count() > 2);

    let json = std::fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"mission\": \"operational\""));
}

#[test]
fn missing_variable_input_fails_with_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let mission_path = dir.path().join("mission.yaml");
    std::fs::write(&mission_path, MISSION_YAML).unwrap();

    Command::cargo_bin("mission")
        .unwrap()
        .args([
            "--mission-file",
            mission_path.to_str().unwrap(),
            "--mission",
            "operational",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "data:mission:operational:departure:thrust_rate",
        ));
}

#[test]
fn unknown_mission_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mission_path = dir.path().join("mission.yaml");
    std::fs::write(&mission_path, MISSION_YAML).unwrap();

    Command::cargo_bin("mission")
        .unwrap()
        .args([
            "--mission-file",
            mission_path.to_str().unwrap(),
            "--mission",
            "nonexistent",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mission"));
}
