//! Level cruise over a ground-distance target, with optional climb to a
//! declared or searched cruise altitude.

use tracing::debug;

use flight_core::constants::FOOT;
use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::registered::altitude_change::AltitudeChangeSegment;
use crate::step::{self, HeldSpeed, MAX_STEPS};
use crate::target::{OptimalKind, Target, TargetMode};
use crate::{AircraftModel, SegmentError};

/// Parameters of the climb flown before cruising, when the cruise altitude
/// differs from the start altitude.
#[derive(Debug, Clone)]
pub struct ClimbProfile {
    pub engine_setting: EngineSetting,
    pub thrust_rate: f64,
    pub time_step: f64,
}

impl Default for ClimbProfile {
    fn default() -> Self {
        Self {
            engine_setting: EngineSetting::Climb,
            thrust_rate: 0.93,
            time_step: 2.0,
        }
    }
}

/// Cruise at constant altitude and speed, thrust regulated to balance
/// drag, until a ground-distance target.
///
/// When the target altitude is the `optimal_flight_level` sentinel, the
/// cruise altitude is first chosen by evaluating climb-plus-cruise fuel
/// over candidate flight levels and keeping the cheapest.
#[derive(Debug, Clone)]
pub struct CruiseSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    /// Time per distance step (s).
    pub time_step: f64,
    pub climb: ClimbProfile,
}

impl CruiseSegment {
    pub fn new(target: Target, engine_setting: EngineSetting) -> Self {
        Self {
            target,
            engine_setting,
            time_step: 60.0,
            climb: ClimbProfile::default(),
        }
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        if self.target.entry(Parameter::GroundDistance).is_none() {
            return Err(SegmentError::AmbiguousTarget(
                "cruise needs a ground_distance target".to_string(),
            ));
        }
        Ok(())
    }

    fn climb_segment(&self, altitude_target: Target) -> AltitudeChangeSegment {
        AltitudeChangeSegment {
            target: altitude_target,
            engine_setting: self.climb.engine_setting,
            thrust_rate: self.climb.thrust_rate,
            time_step: self.climb.time_step,
        }
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let goal_distance = self
            .target
            .entry(Parameter::GroundDistance)
            .expect("validated")
            .effective_value(start);

        let mut current = start.clone();
        current.complete_speeds(SpeedKind::TrueAirspeed);

        match self.target.optimal_altitude() {
            Some(OptimalKind::FlightLevel) => {
                self.compute_best_flight_level(&current, goal_distance, model)
            }
            Some(OptimalKind::Altitude) => {
                let held = HeldSpeed::capture(&current, SpeedKind::Mach);
                let optimal = step::optimal_altitude(current.mass, held, model)?;
                let mut trajectory = Trajectory::new();
                if optimal > current.altitude + 1.0 {
                    let target = Target::new()
                        .with_optimal_altitude(OptimalKind::Altitude)
                        .with_constant(Parameter::Mach);
                    let climb = self.climb_segment(target);
                    trajectory = climb.compute(&current, model)?;
                    current = trajectory.last().expect("climb produced points").clone();
                }
                let cruise = self.cruise_at_altitude(&current, goal_distance, model)?;
                if trajectory.is_empty() {
                    Ok(cruise)
                } else {
                    trajectory.append(cruise);
                    Ok(trajectory)
                }
            }
            None => {
                let declared = self
                    .target
                    .entry(Parameter::Altitude)
                    .filter(|e| e.mode != TargetMode::Constant)
                    .map(|e| e.effective_value(start));
                let mut trajectory = Trajectory::new();
                if let Some(goal_altitude) = declared {
                    if (goal_altitude - current.altitude).abs()
                        > crate::target::tolerance(Parameter::Altitude)
                    {
                        let target = Target::new()
                            .with(Parameter::Altitude, TargetMode::Absolute, goal_altitude)
                            .with_constant(Parameter::Mach);
                        let climb = self.climb_segment(target);
                        trajectory = climb.compute(&current, model)?;
                        current = trajectory.last().expect("climb produced points").clone();
                    }
                }
                let cruise = self.cruise_at_altitude(&current, goal_distance, model)?;
                if trajectory.is_empty() {
                    Ok(cruise)
                } else {
                    trajectory.append(cruise);
                    Ok(trajectory)
                }
            }
        }
    }

    /// Fixed-altitude cruise from `start` to an absolute ground distance.
    fn cruise_at_altitude(
        &self,
        start: &FlightPoint,
        goal_distance: f64,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let mut current = start.clone();
        if current.true_airspeed < 1.0 {
            return Err(SegmentError::TargetUnreachable(
                "cruise requires a positive airspeed".to_string(),
            ));
        }
        step::complete_aero(&mut current, model);
        let required = current.drag;
        let mut fuel_flow =
            step::regulated_thrust(&mut current, model, self.engine_setting, required)?;
        current.slope_angle = 0.0;
        current.acceleration = 0.0;

        let mut trajectory = Trajectory::new();
        trajectory.push(current.clone());

        for _ in 0..MAX_STEPS {
            let remaining = goal_distance - current.ground_distance;
            if remaining <= crate::target::tolerance(Parameter::GroundDistance) {
                return Ok(trajectory);
            }
            let dx = remaining.min(current.true_airspeed * self.time_step);
            let dt = dx / current.true_airspeed;

            let mut next = current.clone();
            next.ground_distance = current.ground_distance + dx;
            next.time = current.time + dt;
            next.mass = current.mass - fuel_flow * dt;
            step::check_fuel(&next, "the cruise distance target")?;

            step::complete_aero(&mut next, model);
            let required = next.drag;
            fuel_flow =
                step::regulated_thrust(&mut next, model, self.engine_setting, required)?;

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the cruise distance target".to_string(),
        ))
    }

    /// Sweep candidate flight levels, evaluating climb-plus-cruise fuel to
    /// the distance target, and emit the cheapest feasible profile.
    fn compute_best_flight_level(
        &self,
        start: &FlightPoint,
        goal_distance: f64,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let held = HeldSpeed::capture(start, SpeedKind::Mach);
        let optimal = step::optimal_altitude(start.mass, held, model)?;
        let flight_level = 1_000.0 * FOOT;
        let top = step::round_down_to_flight_level(optimal) + flight_level;

        // Stay-at-current-altitude is always a candidate; above it, every
        // flight level up to one above the optimum.
        let mut candidates = vec![start.altitude];
        let mut level = step::round_down_to_flight_level(start.altitude) + flight_level;
        while level <= top && candidates.len() < 60 {
            candidates.push(level);
            level += flight_level;
        }

        let mut best: Option<(f64, Trajectory)> = None;
        for candidate in candidates {
            let evaluation = self.evaluate_candidate(start, candidate, goal_distance, model);
            match evaluation {
                Ok(trajectory) => {
                    let end_mass = trajectory.last().expect("non-empty").mass;
                    let fuel = start.mass - end_mass;
                    debug!(candidate, fuel, "cruise altitude candidate");
                    if best.as_ref().is_none_or(|(best_fuel, _)| fuel < *best_fuel) {
                        best = Some((fuel, trajectory));
                    }
                }
                // Physically infeasible candidates are simply skipped.
                Err(SegmentError::TargetUnreachable(_)) => continue,
                Err(other) => return Err(other),
            }
        }

        match best {
            Some((_, trajectory)) => Ok(trajectory),
            None => Err(SegmentError::TargetUnreachable(
                "no feasible cruise altitude among candidate flight levels".to_string(),
            )),
        }
    }

    fn evaluate_candidate(
        &self,
        start: &FlightPoint,
        altitude: f64,
        goal_distance: f64,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        if (altitude - start.altitude).abs() <= crate::target::tolerance(Parameter::Altitude) {
            return self.cruise_at_altitude(start, goal_distance, model);
        }
        let target = Target::new()
            .with(Parameter::Altitude, TargetMode::Absolute, altitude)
            .with_constant(Parameter::Mach);
        let climb = self.climb_segment(target);
        let mut trajectory = climb.compute(start, model)?;
        let after_climb = trajectory.last().expect("climb produced points").clone();
        if after_climb.ground_distance >= goal_distance {
            return Err(SegmentError::TargetUnreachable(
                "climb consumes the whole distance target".to_string(),
            ));
        }
        let cruise = self.cruise_at_altitude(&after_climb, goal_distance, model)?;
        trajectory.append(cruise);
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RawTargetValue;
    use approx::assert_relative_eq;
    use flight_polar::Polar;
    use flight_propulsion::TurbofanModel;

    fn polar() -> Polar {
        Polar::quadratic(0.02, 0.045, 1.5, 150).unwrap()
    }

    fn engine() -> TurbofanModel {
        TurbofanModel::new(240_000.0, 0.06)
    }

    fn cruise_start() -> FlightPoint {
        let mut point = FlightPoint {
            altitude: 10_000.0,
            mass: 65_000.0,
            mach: 0.78,
            time: 1_200.0,
            ground_distance: 150_000.0,
            ..Default::default()
        };
        point.complete_speeds(SpeedKind::Mach);
        point
    }

    #[test]
    fn covers_the_distance_target_exactly() {
        let polar = polar();
        let engine = engine();
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let target =
            Target::parse(&[("ground_distance", RawTargetValue::Number(500_000.0))]).unwrap();
        let segment = CruiseSegment::new(target, EngineSetting::Cruise);
        let trajectory = segment.compute(&cruise_start(), &model).unwrap();

        let end = trajectory.last().unwrap();
        assert_relative_eq!(end.ground_distance, 650_000.0, epsilon = 1.0);
        assert_relative_eq!(end.altitude, 10_000.0);
        assert!(end.mass < 65_000.0);
        assert!(end.time > 1_200.0);
    }

    #[test]
    fn thrust_balances_drag_during_cruise() {
        let polar = polar();
        let engine = engine();
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let target =
            Target::parse(&[("ground_distance", RawTargetValue::Number(200_000.0))]).unwrap();
        let segment = CruiseSegment::new(target, EngineSetting::Cruise);
        let trajectory = segment.compute(&cruise_start(), &model).unwrap();
        for point in trajectory.points() {
            assert_relative_eq!(point.thrust, point.drag, epsilon = 1.0);
        }
    }

    #[test]
    fn optimal_flight_level_lands_on_a_thousand_foot_multiple() {
        let polar = polar();
        let engine = engine();
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let mut start = cruise_start();
        start.altitude = 8_000.0;
        start.complete_speeds(SpeedKind::Mach);

        let target = Target::parse(&[
            ("ground_distance", RawTargetValue::Number(1_500_000.0)),
            (
                "altitude",
                RawTargetValue::Text("optimal_flight_level".to_string()),
            ),
        ])
        .unwrap();
        let segment = CruiseSegment::new(target, EngineSetting::Cruise);
        let trajectory = segment.compute(&start, &model).unwrap();

        let end = trajectory.last().unwrap();
        assert_relative_eq!(end.ground_distance, start.ground_distance + 1_500_000.0, epsilon = 1.0);
        // The chosen cruise altitude is a flight level above the start.
        let flight_level = 1_000.0 * FOOT;
        let levels = end.altitude / flight_level;
        assert!(end.altitude > start.altitude);
        assert_relative_eq!(levels, levels.round(), epsilon = 1e-6);
    }

    #[test]
    fn missing_distance_target_is_ambiguous() {
        let target = Target::parse(&[("time", RawTargetValue::Number(600.0))]).unwrap();
        let segment = CruiseSegment::new(target, EngineSetting::Cruise);
        assert!(matches!(
            segment.validate(),
            Err(SegmentError::AmbiguousTarget(_))
        ));
    }
}
