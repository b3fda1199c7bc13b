//! Acceleration/deceleration at constant altitude and thrust rate.

use tracing::debug;

use flight_core::{EngineSetting, FlightPoint, Parameter, SpeedKind, Trajectory};

use crate::step::{self, MAX_STEPS};
use crate::target::{Target, TargetMode};
use crate::{AircraftModel, SegmentError};

/// Changes one speed representation until its target value, holding
/// altitude and thrust rate.
#[derive(Debug, Clone)]
pub struct SpeedChangeSegment {
    pub target: Target,
    pub engine_setting: EngineSetting,
    pub thrust_rate: f64,
    /// Integration time step (s).
    pub time_step: f64,
}

impl SpeedChangeSegment {
    pub fn new(target: Target, engine_setting: EngineSetting, thrust_rate: f64) -> Self {
        Self {
            target,
            engine_setting,
            thrust_rate,
            time_step: 0.5,
        }
    }

    /// The declared speed parameter driving this segment.
    fn driver(&self) -> Option<Parameter> {
        [
            Parameter::Mach,
            Parameter::TrueAirspeed,
            Parameter::EquivalentAirspeed,
        ]
        .into_iter()
        .find(|p| {
            self.target
                .entry(*p)
                .is_some_and(|e| e.mode != TargetMode::Constant)
        })
    }

    pub fn validate(&self) -> Result<(), SegmentError> {
        let speed_targets = [
            Parameter::Mach,
            Parameter::TrueAirspeed,
            Parameter::EquivalentAirspeed,
        ]
        .into_iter()
        .filter(|p| {
            self.target
                .entry(*p)
                .is_some_and(|e| e.mode != TargetMode::Constant)
        })
        .count();
        if speed_targets == 0 {
            return Err(SegmentError::AmbiguousTarget(
                "speed_change needs a target speed".to_string(),
            ));
        }
        if speed_targets > 1 {
            return Err(SegmentError::AmbiguousTarget(
                "speed_change accepts a single target speed representation".to_string(),
            ));
        }
        if self
            .target
            .entry(Parameter::Altitude)
            .is_some_and(|e| e.mode != TargetMode::Constant)
        {
            return Err(SegmentError::AmbiguousTarget(
                "speed_change holds altitude; it cannot also target it".to_string(),
            ));
        }
        Ok(())
    }

    pub fn compute(
        &self,
        start: &FlightPoint,
        model: &AircraftModel<'_>,
    ) -> Result<Trajectory, SegmentError> {
        let parameter = self
            .driver()
            .expect("validated: exactly one speed target");
        let goal = self
            .target
            .entry(parameter)
            .expect("validated")
            .effective_value(start);

        let mut current = start.clone();
        current.complete_speeds(SpeedKind::TrueAirspeed);
        step::complete_aero(&mut current, model);
        let mut fuel_flow =
            step::manual_thrust(&mut current, model, self.engine_setting, self.thrust_rate);
        current.acceleration = (current.thrust - current.drag) / current.mass;
        current.slope_angle = 0.0;

        let direction = (goal - current.get(parameter)).signum();
        debug!(
            parameter = %parameter,
            goal,
            from = current.get(parameter),
            "speed change"
        );

        let mut trajectory = Trajectory::new();
        trajectory.push(current.clone());
        if (goal - current.get(parameter)).abs() <= crate::target::tolerance(parameter) {
            return Ok(trajectory);
        }

        for _ in 0..MAX_STEPS {
            let acceleration = (current.thrust - current.drag) / current.mass;
            if acceleration.signum() != direction || acceleration.abs() < 1.0e-6 {
                return Err(SegmentError::TargetUnreachable(format!(
                    "thrust/drag balance gives no {} toward the target speed",
                    if direction > 0.0 { "acceleration" } else { "deceleration" }
                )));
            }

            let dt = self.time_step;
            let mut next = current.clone();
            next.true_airspeed = current.true_airspeed + acceleration * dt;
            next.complete_speeds(SpeedKind::TrueAirspeed);
            next.time = current.time + dt;
            next.ground_distance =
                current.ground_distance + 0.5 * (current.true_airspeed + next.true_airspeed) * dt;
            next.mass = current.mass - fuel_flow * dt;
            step::check_fuel(&next, "the target speed")?;

            step::complete_aero(&mut next, model);
            fuel_flow = step::manual_thrust(&mut next, model, self.engine_setting, self.thrust_rate);
            next.acceleration = (next.thrust - next.drag) / next.mass;

            if step::crossed(&current, &next, parameter, goal) {
                let mut landed = step::interpolate_to(&current, &next, parameter, goal);
                landed.complete_speeds(parameter.speed_kind().expect("speed parameter"));
                trajectory.push(landed);
                return Ok(trajectory);
            }

            trajectory.push(next.clone());
            current = next;
        }
        Err(SegmentError::TargetUnreachable(
            "step budget exhausted before the target speed".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::RawTargetValue;
    use approx::assert_relative_eq;
    use flight_core::SpeedKind;
    use flight_polar::Polar;
    use flight_propulsion::TurbofanModel;

    fn model_parts() -> (Polar, TurbofanModel) {
        (
            Polar::quadratic(0.02, 0.045, 1.5, 150).unwrap(),
            TurbofanModel::new(240_000.0, 0.06),
        )
    }

    fn start() -> FlightPoint {
        let mut point = FlightPoint {
            altitude: 0.0,
            true_airspeed: 80.0,
            mass: 70_000.0,
            ..Default::default()
        };
        point.complete_speeds(SpeedKind::TrueAirspeed);
        point
    }

    #[test]
    fn accelerates_to_target_speed() {
        let (polar, engine) = model_parts();
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let target =
            Target::parse(&[("true_airspeed", RawTargetValue::Number(140.0))]).unwrap();
        let segment = SpeedChangeSegment::new(target, EngineSetting::Takeoff, 1.0);
        let trajectory = segment.compute(&start(), &model).unwrap();

        let end = trajectory.last().unwrap();
        assert_relative_eq!(end.true_airspeed, 140.0, epsilon = 1e-9);
        assert!(end.time > 0.0);
        assert!(end.mass < 70_000.0);
        assert_relative_eq!(end.altitude, 0.0);
    }

    #[test]
    fn rejects_acceleration_without_thrust() {
        let (polar, engine) = model_parts();
        let model = AircraftModel {
            polar: &polar,
            propulsion: &engine,
            reference_area: 120.0,
        };
        let target =
            Target::parse(&[("true_airspeed", RawTargetValue::Number(140.0))]).unwrap();
        let segment = SpeedChangeSegment::new(target, EngineSetting::Idle, 0.0);
        assert!(matches!(
            segment.compute(&start(), &model),
            Err(SegmentError::TargetUnreachable(_))
        ));
    }

    #[test]
    fn missing_speed_target_is_ambiguous() {
        let target = Target::parse(&[("time", RawTargetValue::Number(60.0))]).unwrap();
        let segment = SpeedChangeSegment::new(target, EngineSetting::Climb, 0.9);
        assert!(matches!(
            segment.validate(),
            Err(SegmentError::AmbiguousTarget(_))
        ));
    }
}
