//! The flight-point state vector and trajectory container.

use std::fmt;

use thiserror::Error;

use crate::atmosphere::{self, Atmosphere};
use crate::units::Dimension;

/// Categorical engine operating mode consumed by propulsion models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSetting {
    Takeoff,
    Climb,
    Cruise,
    Idle,
}

/// Raised when an engine setting name is not one of the known modes.
#[derive(Debug, Clone, Error)]
#[error("unknown engine setting '{0}'")]
pub struct UnknownEngineSetting(pub String);

impl EngineSetting {
    pub fn parse(name: &str) -> Result<Self, UnknownEngineSetting> {
        match name.trim() {
            "takeoff" => Ok(EngineSetting::Takeoff),
            "climb" => Ok(EngineSetting::Climb),
            "cruise" => Ok(EngineSetting::Cruise),
            "idle" => Ok(EngineSetting::Idle),
            other => Err(UnknownEngineSetting(other.to_string())),
        }
    }
}

impl fmt::Display for EngineSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineSetting::Takeoff => "takeoff",
            EngineSetting::Climb => "climb",
            EngineSetting::Cruise => "cruise",
            EngineSetting::Idle => "idle",
        };
        write!(f, "{name}")
    }
}

/// The speed representation currently driving a flight point. The other two
/// are derived from it through the atmosphere at the current altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedKind {
    Mach,
    TrueAirspeed,
    EquivalentAirspeed,
}

/// Every quantity a segment target may constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Altitude,
    TrueAirspeed,
    EquivalentAirspeed,
    Mach,
    Mass,
    Time,
    GroundDistance,
    ThrustRate,
}

impl Parameter {
    /// Canonical physical dimension of the parameter.
    pub fn dimension(self) -> Dimension {
        match self {
            Parameter::Altitude | Parameter::GroundDistance => Dimension::Length,
            Parameter::TrueAirspeed | Parameter::EquivalentAirspeed => Dimension::Speed,
            Parameter::Mach | Parameter::ThrustRate => Dimension::Dimensionless,
            Parameter::Mass => Dimension::Mass,
            Parameter::Time => Dimension::Duration,
        }
    }

    /// Declaration-file spelling of the parameter.
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Altitude => "altitude",
            Parameter::TrueAirspeed => "true_airspeed",
            Parameter::EquivalentAirspeed => "equivalent_airspeed",
            Parameter::Mach => "mach",
            Parameter::Mass => "mass",
            Parameter::Time => "time",
            Parameter::GroundDistance => "ground_distance",
            Parameter::ThrustRate => "thrust_rate",
        }
    }

    /// Parse a declaration-file key, without any `delta_` prefix.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "altitude" => Some(Parameter::Altitude),
            "true_airspeed" => Some(Parameter::TrueAirspeed),
            "equivalent_airspeed" => Some(Parameter::EquivalentAirspeed),
            "mach" => Some(Parameter::Mach),
            "mass" => Some(Parameter::Mass),
            "time" => Some(Parameter::Time),
            "ground_distance" => Some(Parameter::GroundDistance),
            "thrust_rate" => Some(Parameter::ThrustRate),
            _ => None,
        }
    }

    /// Which of the three speed representations this parameter drives, if any.
    pub fn speed_kind(self) -> Option<SpeedKind> {
        match self {
            Parameter::Mach => Some(SpeedKind::Mach),
            Parameter::TrueAirspeed => Some(SpeedKind::TrueAirspeed),
            Parameter::EquivalentAirspeed => Some(SpeedKind::EquivalentAirspeed),
            _ => None,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Snapshot of the aircraft state at one simulated instant. All values SI.
///
/// Points are value types: once appended to a trajectory they are never
/// mutated, successors are built by clone-and-modify.
#[derive(Debug, Clone, Default)]
pub struct FlightPoint {
    pub time: f64,
    pub altitude: f64,
    pub ground_distance: f64,
    pub mass: f64,
    pub true_airspeed: f64,
    pub equivalent_airspeed: f64,
    pub mach: f64,
    pub cl: f64,
    pub cd: f64,
    pub drag: f64,
    pub thrust: f64,
    pub thrust_rate: f64,
    pub engine_setting: Option<EngineSetting>,
    pub slope_angle: f64,
    pub acceleration: f64,
    pub segment_name: String,
    pub phase_name: String,
}

impl FlightPoint {
    /// Read a targetable parameter by name.
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Altitude => self.altitude,
            Parameter::TrueAirspeed => self.true_airspeed,
            Parameter::EquivalentAirspeed => self.equivalent_airspeed,
            Parameter::Mach => self.mach,
            Parameter::Mass => self.mass,
            Parameter::Time => self.time,
            Parameter::GroundDistance => self.ground_distance,
            Parameter::ThrustRate => self.thrust_rate,
        }
    }

    /// Write a targetable parameter by name.
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        match parameter {
            Parameter::Altitude => self.altitude = value,
            Parameter::TrueAirspeed => self.true_airspeed = value,
            Parameter::EquivalentAirspeed => self.equivalent_airspeed = value,
            Parameter::Mach => self.mach = value,
            Parameter::Mass => self.mass = value,
            Parameter::Time => self.time = value,
            Parameter::GroundDistance => self.ground_distance = value,
            Parameter::ThrustRate => self.thrust_rate = value,
        }
    }

    /// Recompute the two derived speed representations from the driving one,
    /// using the atmosphere at the point's current altitude.
    pub fn complete_speeds(&mut self, driver: SpeedKind) {
        let atm = Atmosphere::at(self.altitude);
        match driver {
            SpeedKind::Mach => {
                self.true_airspeed = atmosphere::tas_from_mach(self.mach, &atm);
            }
            SpeedKind::TrueAirspeed => {}
            SpeedKind::EquivalentAirspeed => {
                self.true_airspeed = atmosphere::tas_from_eas(self.equivalent_airspeed, &atm);
            }
        }
        self.mach = atmosphere::mach_from_tas(self.true_airspeed, &atm);
        self.equivalent_airspeed = atmosphere::eas_from_tas(self.true_airspeed, &atm);
    }
}

/// Ordered, time-monotonic sequence of flight points.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    points: Vec<FlightPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<FlightPoint>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, point: FlightPoint) {
        self.points.push(point);
    }

    /// Append a sub-trajectory produced by a follow-on part, dropping its
    /// head point which duplicates the current trailing point.
    pub fn append(&mut self, other: Trajectory) {
        let mut iter = other.points.into_iter();
        if !self.points.is_empty() {
            iter.next();
        }
        self.points.extend(iter);
    }

    pub fn points(&self) -> &[FlightPoint] {
        &self.points
    }

    pub fn first(&self) -> Option<&FlightPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&FlightPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightPoint> {
        self.points.iter()
    }

    /// Stamp the segment name on every point that does not carry one yet.
    pub fn label_segment(&mut self, name: &str) {
        for point in &mut self.points {
            if point.segment_name.is_empty() {
                point.segment_name = name.to_string();
            }
        }
    }

    /// Stamp the phase name on every point that does not carry one yet.
    pub fn label_phase(&mut self, name: &str) {
        for point in &mut self.points {
            if point.phase_name.is_empty() {
                point.phase_name = name.to_string();
            }
        }
    }
}

impl IntoIterator for Trajectory {
    type Item = FlightPoint;
    type IntoIter = std::vec::IntoIter<FlightPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn speed_completion_keeps_representations_consistent() {
        let mut point = FlightPoint {
            altitude: 10_000.0,
            mach: 0.78,
            ..Default::default()
        };
        point.complete_speeds(SpeedKind::Mach);
        let atm = Atmosphere::at(10_000.0);
        assert_relative_eq!(point.true_airspeed, 0.78 * atm.speed_of_sound);
        assert!(point.equivalent_airspeed < point.true_airspeed);

        // Round-trip: drive from the derived EAS and recover the same TAS.
        let mut other = point.clone();
        other.complete_speeds(SpeedKind::EquivalentAirspeed);
        assert_relative_eq!(other.true_airspeed, point.true_airspeed, epsilon = 1e-9);
        assert_relative_eq!(other.mach, 0.78, epsilon = 1e-12);
    }

    #[test]
    fn parameter_access_round_trips() {
        let mut point = FlightPoint::default();
        for parameter in [
            Parameter::Altitude,
            Parameter::TrueAirspeed,
            Parameter::Mass,
            Parameter::Time,
            Parameter::GroundDistance,
        ] {
            point.set(parameter, 42.0);
            assert_eq!(point.get(parameter), 42.0);
        }
    }

    #[test]
    fn append_drops_duplicated_boundary_point() {
        let mut first = Trajectory::new();
        first.push(FlightPoint {
            time: 0.0,
            ..Default::default()
        });
        first.push(FlightPoint {
            time: 10.0,
            ..Default::default()
        });

        let mut second = Trajectory::new();
        second.push(FlightPoint {
            time: 10.0,
            ..Default::default()
        });
        second.push(FlightPoint {
            time: 20.0,
            ..Default::default()
        });

        first.append(second);
        assert_eq!(first.len(), 3);
        let times: Vec<f64> = first.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn engine_setting_parsing() {
        assert_eq!(EngineSetting::parse("climb").unwrap(), EngineSetting::Climb);
        assert!(EngineSetting::parse("afterburner").is_err());
    }
}
